//! Callbacks for inbound traffic and connection lifecycle.

use crate::error::ClientError;

/// Receives inbound documents and connection events from a running client.
///
/// All methods are invoked from the client's dispatch thread, one at a time
/// and in arrival order. Implementations that block delay delivery of later
/// messages but never drop them. Every method has a no-op default so
/// implementors only override what they care about.
pub trait ClientObserver: Send + Sync {
    /// A response to a request previously issued with the given handle.
    fn on_method_response(&self, handle: u32, document: String) {
        let _ = (handle, document);
    }

    /// A server-initiated callback document.
    fn on_server_callback(&self, document: String) {
        let _ = document;
    }

    /// The connection failed outside of an orderly shutdown. Delivered at
    /// most once per client.
    fn on_connection_dropped(&self, cause: &ClientError) {
        let _ = cause;
    }
}
