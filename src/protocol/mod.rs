//! Companion link text protocol
//!
//! Inbound frames are newline-delimited text of the form
//! `"<Command>:<Payload>"`. Outbound telemetry frames embed the sample value
//! and the session's identity fields.

mod codec;
mod decoder;
mod telemetry;

pub use codec::{parse_frame, Command, FrameError};
pub use decoder::FrameDecoder;
pub use telemetry::{format_heart_rate_frame, LinkIdentity};
