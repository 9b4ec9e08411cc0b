//! Threaded GBXRemote transport client.
//!
//! [`RpcClient`] owns exactly one TCP connection: it performs the protocol
//! banner handshake, frames outgoing documents, and runs two dedicated
//! threads — a receive loop feeding a FIFO queue and a dispatch loop that
//! classifies each inbound frame by its handle and delivers it to the
//! registered [`ClientObserver`]. Any number of caller threads may `send`
//! concurrently; a single lock keeps handle allocation atomic with wire
//! order.

pub mod client;
pub mod error;
pub mod handshake;
pub mod observer;

pub use client::{ClientConfig, RpcClient};
pub use error::{ClientError, Result};
pub use handshake::PROTOCOL_BANNER;
pub use observer::ClientObserver;
