use log::trace;

use super::{error::WireError, peer_message::PeerMessage};

pub const FRAME_HEADER_BYTES: usize = 4;
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1 << 20;

pub fn encode(message: &PeerMessage) -> Result<Vec<u8>, WireError> {
    serde_json::to_vec(message).map_err(|err| WireError::EncodeFailed {
        reason: err.to_string(),
    })
}

pub fn decode(bytes: &[u8]) -> Result<PeerMessage, WireError> {
    serde_json::from_slice(bytes).map_err(|err| WireError::DecodeFailed {
        reason: err.to_string(),
    })
}

/// Prefixes `payload` with its length as a big-endian `u32`.
pub fn frame(payload: &[u8]) -> Result<Vec<u8>, WireError> {
    let length = u32::try_from(payload.len()).map_err(|_| WireError::FrameTooLarge {
        length: payload.len(),
        limit: u32::MAX as usize,
    })?;
    let mut framed = Vec::with_capacity(FRAME_HEADER_BYTES + payload.len());
    framed.extend_from_slice(&length.to_be_bytes());
    framed.extend_from_slice(payload);
    Ok(framed)
}

/// Reassembles length-prefixed frames from a byte stream.
pub struct FrameDecoder {
    buffer: Vec<u8>,
    max_frame_bytes: usize,
}

impl FrameDecoder {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_frame_bytes,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Next complete frame payload, `Ok(None)` if more bytes are needed.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, WireError> {
        if self.buffer.len() < FRAME_HEADER_BYTES {
            return Ok(None);
        }
        let mut header = [0u8; FRAME_HEADER_BYTES];
        header.copy_from_slice(&self.buffer[..FRAME_HEADER_BYTES]);
        let length = u32::from_be_bytes(header) as usize;
        if length > self.max_frame_bytes {
            return Err(WireError::FrameTooLarge {
                length,
                limit: self.max_frame_bytes,
            });
        }
        if self.buffer.len() < FRAME_HEADER_BYTES + length {
            trace!(
                "waiting for {} more byte(s)",
                FRAME_HEADER_BYTES + length - self.buffer.len()
            );
            return Ok(None);
        }
        let payload = self.buffer[FRAME_HEADER_BYTES..FRAME_HEADER_BYTES + length].to_vec();
        self.buffer.drain(..FRAME_HEADER_BYTES + length);
        Ok(Some(payload))
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}
