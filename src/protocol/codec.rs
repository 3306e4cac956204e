//! Frame parsing for the companion command protocol
//!
//! A frame is a single `"<Command>:<Payload>"` text unit. Parsing is a pure
//! step with no side effects; unknown command names are passed through to
//! the caller as [`Command::Unknown`] so the session can log them.

use crate::haptics::TriggerParams;

/// Per-frame parse errors
///
/// Always recoverable: the session logs the frame and continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Frame does not contain a `:` separator
    #[error("missing ':' separator")]
    Malformed,

    /// Command recognized but the payload has the wrong shape
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Parsed inbound command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `Monitoring:<mode>` - select the feedback mode
    Monitoring { mode: String },
    /// `Vibrate:<intensity>,<pulses>,<duration>,<interval>` - trigger feedback
    Vibrate(TriggerParams),
    /// Command name not understood; passed through for the caller to log
    Unknown { command: String },
}

/// Parse one frame into a command
///
/// Surrounding whitespace is trimmed and the frame is split on the first
/// `:` only, so the payload may itself contain `:`.
pub fn parse_frame(raw: &str) -> std::result::Result<Command, FrameError> {
    let frame = raw.trim();
    let (command, payload) = frame.split_once(':').ok_or(FrameError::Malformed)?;

    match command {
        "Monitoring" => Ok(Command::Monitoring {
            mode: payload.to_string(),
        }),
        "Vibrate" => parse_vibrate(payload),
        _ => Ok(Command::Unknown {
            command: command.to_string(),
        }),
    }
}

/// Parse the four comma-separated vibration parameters
fn parse_vibrate(payload: &str) -> std::result::Result<Command, FrameError> {
    let tokens: Vec<&str> = payload.split(',').collect();
    if tokens.len() != 4 {
        return Err(FrameError::InvalidPayload(format!(
            "expected 4 vibration parameters, got {}",
            tokens.len()
        )));
    }

    let mut values = [0u32; 4];
    for (slot, token) in values.iter_mut().zip(&tokens) {
        *slot = token.trim().parse().map_err(|_| {
            FrameError::InvalidPayload(format!("not a non-negative integer: {:?}", token))
        })?;
    }

    Ok(Command::Vibrate(TriggerParams {
        intensity: values[0],
        pulses: values[1],
        duration_ms: values[2],
        interval_ms: values[3],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitoring_frame() {
        let cmd = parse_frame("Monitoring:HeartRate").unwrap();
        assert_eq!(
            cmd,
            Command::Monitoring {
                mode: "HeartRate".to_string()
            }
        );
    }

    #[test]
    fn test_monitoring_payload_may_contain_colon() {
        // Split on the first ':' only
        let cmd = parse_frame("Monitoring:Heart:Rate").unwrap();
        assert_eq!(
            cmd,
            Command::Monitoring {
                mode: "Heart:Rate".to_string()
            }
        );
    }

    #[test]
    fn test_vibrate_frame() {
        let cmd = parse_frame("Vibrate:100,3,200,50").unwrap();
        assert_eq!(
            cmd,
            Command::Vibrate(TriggerParams {
                intensity: 100,
                pulses: 3,
                duration_ms: 200,
                interval_ms: 50,
            })
        );
    }

    #[test]
    fn test_whitespace_trimmed() {
        let cmd = parse_frame("  Vibrate:1,1,1,0 \r\n").unwrap();
        assert!(matches!(cmd, Command::Vibrate(_)));
    }

    #[test]
    fn test_missing_separator_is_malformed() {
        assert_eq!(parse_frame("HelloWorld"), Err(FrameError::Malformed));
        assert_eq!(parse_frame(""), Err(FrameError::Malformed));
    }

    #[test]
    fn test_vibrate_wrong_field_count() {
        assert!(matches!(
            parse_frame("Vibrate:1,2,3"),
            Err(FrameError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_frame("Vibrate:1,2,3,4,5"),
            Err(FrameError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_vibrate_non_numeric_tokens() {
        assert!(matches!(
            parse_frame("Vibrate:a,b,c,d"),
            Err(FrameError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_frame("Vibrate:1,-2,3,4"),
            Err(FrameError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_unknown_command_passed_through() {
        let cmd = parse_frame("Ping:now").unwrap();
        assert_eq!(
            cmd,
            Command::Unknown {
                command: "Ping".to_string()
            }
        );
    }
}
