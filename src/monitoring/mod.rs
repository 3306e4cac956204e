//! Feedback mode selection

mod mode;

pub use mode::{Mode, ModeCell};
