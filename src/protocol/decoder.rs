//! Inbound frame reassembly
//!
//! Stream reads deliver arbitrary chunks: one read may carry several frames
//! or only a fragment of one. The decoder accumulates bytes and yields
//! complete newline-delimited frames; a trailing unterminated fragment is
//! flushed as a final frame when the stream ends.

/// Initial capacity for the reassembly buffer (typical frame size)
const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Longest fragment the decoder will buffer while waiting for a newline
///
/// A peer that streams bytes without ever terminating a frame must not grow
/// the buffer without bound; the oversized fragment is discarded and the
/// session keeps reading.
const MAX_FRAME_LEN: usize = 4096;

/// Reassembles text frames from a byte stream
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Append a read chunk to the reassembly buffer
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete frame, trimmed; empty lines are skipped
    ///
    /// An unterminated fragment longer than [`MAX_FRAME_LEN`] is discarded
    /// as malformed.
    pub fn next_frame(&mut self) -> Option<String> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line).trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
        if self.buffer.len() > MAX_FRAME_LEN {
            log::warn!(
                "Discarding oversized frame fragment ({} bytes, no terminator)",
                self.buffer.len()
            );
            self.buffer.clear();
        }
        None
    }

    /// Flush an unterminated remainder at end-of-stream
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let text = String::from_utf8_lossy(&rest).trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
