//! GBXRemote connection handshake.
//!
//! The server speaks first: a 4-byte little-endian length that must equal
//! the banner length (11), then the ASCII banner naming the protocol and
//! its version. Anything else is fatal for the connection instance — there
//! is no retry or renegotiation.

use std::io::Read;

use tracing::debug;

use crate::error::{ClientError, Result};

/// Banner identifying the protocol and its version.
pub const PROTOCOL_BANNER: &str = "GBXRemote 2";

/// Read and validate the protocol banner from a freshly connected stream.
pub fn read_banner<T: Read>(stream: &mut T) -> Result<()> {
    let mut length_bytes = [0u8; 4];
    stream.read_exact(&mut length_bytes)?;
    let length = u32::from_le_bytes(length_bytes);

    if length as usize != PROTOCOL_BANNER.len() {
        return Err(ClientError::BannerLength(length));
    }

    let mut banner = [0u8; PROTOCOL_BANNER.len()];
    stream.read_exact(&mut banner)?;
    if banner != *PROTOCOL_BANNER.as_bytes() {
        return Err(ClientError::BannerMismatch(
            String::from_utf8_lossy(&banner).into_owned(),
        ));
    }

    debug!(banner = PROTOCOL_BANNER, "handshake complete");
    Ok(())
}
