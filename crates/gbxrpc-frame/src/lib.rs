//! Length-prefixed, handle-tagged message framing for GBXRemote.
//!
//! Every frame carries, little-endian:
//! - A 4-byte payload length
//! - A 4-byte request handle for request/response correlation
//! - The payload: one complete call or response document
//!
//! The handle space is partitioned by its top bit: client-originated
//! requests have it set, server-initiated callbacks have it clear.
//! No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod handle;
pub mod reader;
pub mod writer;

pub use codec::{decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use error::{FrameError, Result};
pub use handle::{is_request, is_server_callback, HandleAllocator, REQUEST_HANDLE_BASE};
pub use reader::FrameReader;
pub use writer::FrameWriter;
