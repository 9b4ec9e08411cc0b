use crate::handshake::PROTOCOL_BANNER;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] gbxrpc_frame::FrameError),

    /// Transport I/O error.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The handshake length prefix did not announce the expected banner.
    #[error("protocol mismatch: banner length {0} (expected {expected})", expected = PROTOCOL_BANNER.len())]
    BannerLength(u32),

    /// The handshake banner text was wrong.
    #[error("protocol mismatch: banner {0:?} (expected {PROTOCOL_BANNER:?})")]
    BannerMismatch(String),

    /// Outgoing documents must be ASCII; the wire encoding has no wider
    /// character repertoire.
    #[error("document contains non-ASCII characters")]
    NonAsciiDocument,

    /// The client has been shut down; no further sends are accepted.
    #[error("client is stopped")]
    Stopped,
}

pub type Result<T> = std::result::Result<T, ClientError>;
