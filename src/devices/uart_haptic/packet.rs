//! Packet encoding for the haptic controller UART protocol
//!
//! Frame layout:
//!
//! ```text
//! ┌──────┬────────┬─────────────┬─────────┬──────────┐
//! │ 0x5A │ CMD id │ Payload len │ Payload │ Checksum │
//! └──────┴────────┴─────────────┴─────────┴──────────┘
//! ```
//!
//! Checksum is the XOR of every byte after the sync byte.

/// Frame sync byte
const SYNC: u8 = 0x5A;

/// CMD=0x10: drive the motor at the given amplitude
const CMD_SET_AMPLITUDE: u8 = 0x10;

/// CMD=0x11: motor off
const CMD_STOP: u8 = 0x11;

fn encode(cmd: u8, payload: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(4 + payload.len());
    packet.push(SYNC);
    packet.push(cmd);
    packet.push(payload.len() as u8);
    packet.extend_from_slice(payload);
    let checksum = packet[1..].iter().fold(0u8, |acc, b| acc ^ b);
    packet.push(checksum);
    packet
}

/// Encode a set-amplitude command
pub fn encode_set_amplitude(amplitude: u8) -> Vec<u8> {
    encode(CMD_SET_AMPLITUDE, &[amplitude])
}

/// Encode a motor-off command
pub fn encode_stop() -> Vec<u8> {
    encode(CMD_STOP, &[])
}
