use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: payload length (4) + handle (4) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// Default maximum payload size: 4 MiB.
///
/// GBXRemote documents are small; this bounds memory against a misbehaving
/// peer without rejecting any legitimate response.
pub const DEFAULT_MAX_PAYLOAD: usize = 4 * 1024 * 1024;

/// A framed message with its correlation handle.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Request handle this frame correlates to, or a server-assigned
    /// callback handle (top bit clear).
    pub handle: u32,
    /// The document payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(handle: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            handle,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────────┬─────────────┬──────────────────┐
/// │ Length      │ Handle      │ Payload          │
/// │ (4B LE)     │ (4B LE)     │ (Length bytes)   │
/// └─────────────┴─────────────┴──────────────────┘
/// ```
pub fn encode_frame(handle: u32, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u32_le(payload.len() as u32);
    dst.put_u32_le(handle);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let mut word = [0u8; 4];
    word.copy_from_slice(&src[0..4]);
    let payload_len = u32::from_le_bytes(word) as usize;
    word.copy_from_slice(&src[4..8]);
    let handle = u32::from_le_bytes(word);

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { handle, payload }))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 4 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
