//! Outbound telemetry frames and link identity
//!
//! Identity fields are derived once per session by a best-effort parse of
//! two human-readable device names. A pattern mismatch falls back to
//! sentinel values and never prevents telemetry from flowing.

use crate::core::HeartRateSample;

const UNKNOWN_USER: &str = "UnknownUser";
const UNKNOWN_WATCH: &str = "UnknownWatch";
const UNKNOWN_ANDROID: &str = "UnknownAndroid";

/// Identity fields embedded in every outbound telemetry frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkIdentity {
    pub user_id: String,
    pub watch_id: String,
    pub android_id: String,
}

impl LinkIdentity {
    /// All-sentinel identity
    pub fn unknown() -> Self {
        Self {
            user_id: UNKNOWN_USER.to_string(),
            watch_id: UNKNOWN_WATCH.to_string(),
            android_id: UNKNOWN_ANDROID.to_string(),
        }
    }

    /// Best-effort parse of the two device names
    ///
    /// `watch_name` must match `UserID-<digits>-SmartWatchID-<digits>` and
    /// `companion_name` must match `Android-<digits>`; each field falls back
    /// to its sentinel independently on mismatch.
    pub fn parse(watch_name: &str, companion_name: &str) -> Self {
        let (user_id, watch_id) = match parse_watch_name(watch_name) {
            Some(ids) => ids,
            None => {
                log::warn!("Unrecognized watch name format: {:?}", watch_name);
                (UNKNOWN_USER.to_string(), UNKNOWN_WATCH.to_string())
            }
        };

        let android_id = match parse_companion_name(companion_name) {
            Some(id) => id,
            None => {
                log::warn!("Unrecognized companion name format: {:?}", companion_name);
                UNKNOWN_ANDROID.to_string()
            }
        };

        Self {
            user_id,
            watch_id,
            android_id,
        }
    }
}

fn parse_watch_name(name: &str) -> Option<(String, String)> {
    let rest = name.strip_prefix("UserID-")?;
    let (user_id, rest) = take_digits(rest)?;
    let rest = rest.strip_prefix("-SmartWatchID-")?;
    let (watch_id, rest) = take_digits(rest)?;
    if rest.is_empty() {
        Some((user_id.to_string(), watch_id.to_string()))
    } else {
        None
    }
}

fn parse_companion_name(name: &str) -> Option<String> {
    let rest = name.strip_prefix("Android-")?;
    let (id, rest) = take_digits(rest)?;
    if rest.is_empty() {
        Some(id.to_string())
    } else {
        None
    }
}

/// Split off the leading ASCII digit run; None when there is none
fn take_digits(s: &str) -> Option<(&str, &str)> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        None
    } else {
        Some(s.split_at(end))
    }
}

/// Format one outbound heart-rate telemetry frame (newline-terminated)
pub fn format_heart_rate_frame(bpm: HeartRateSample, identity: &LinkIdentity) -> String {
    format!(
        "MonitoringType:HeartRate,Value:{},UserID:{},SmartWatchID:{},AndroidID:{}\n",
        bpm, identity.user_id, identity.watch_id, identity.android_id
    )
}
