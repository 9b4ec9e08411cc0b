//! Connection lifecycle, send path, and the receive/dispatch thread pair.

use std::collections::VecDeque;
use std::net::{Shutdown, TcpStream};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use gbxrpc_frame::{
    is_server_callback, FrameConfig, FrameReader, FrameWriter, HandleAllocator,
    DEFAULT_MAX_PAYLOAD,
};
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::handshake::read_banner;
use crate::observer::ClientObserver;

/// How long the dispatch thread parks before re-checking its queue.
const DISPATCH_POLL: Duration = Duration::from_millis(100);

/// Connection settings for [`RpcClient::connect`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server host name or address.
    pub address: String,
    /// Server TCP port.
    pub port: u16,
    /// Largest inbound or outbound payload the client will accept.
    pub max_payload_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 5000,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// One inbound document waiting for dispatch.
struct Message {
    handle: u32,
    document: String,
}

/// State shared between caller threads and the two worker threads.
struct Shared {
    queue: Mutex<VecDeque<Message>>,
    queue_signal: Condvar,
    stopping: AtomicBool,
    observer: Arc<dyn ClientObserver>,
}

/// Writer-side state guarded by a single lock so that handle allocation
/// order always matches wire order.
struct SendState {
    writer: FrameWriter<TcpStream>,
    handles: HandleAllocator,
}

/// A connected GBXRemote client.
///
/// Created by [`RpcClient::connect`], which performs the banner handshake
/// and starts the receive and dispatch threads. `send` may be called from
/// any number of threads; inbound documents arrive on the observer in the
/// order the server sent them. Dropping the client shuts it down.
pub struct RpcClient {
    shared: Arc<Shared>,
    send_state: Mutex<SendState>,
    stream: TcpStream,
    receive_thread: Option<JoinHandle<()>>,
    dispatch_thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient").finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Connect to a server, validate its banner, and start the worker
    /// threads.
    pub fn connect(config: ClientConfig, observer: Arc<dyn ClientObserver>) -> Result<Self> {
        let stream = TcpStream::connect((config.address.as_str(), config.port))?;
        stream.set_nodelay(true)?;

        let mut handshake_stream = stream.try_clone()?;
        read_banner(&mut handshake_stream)?;

        let frame_config = FrameConfig {
            max_payload_size: config.max_payload_size,
        };
        let reader = FrameReader::with_config(stream.try_clone()?, frame_config.clone());
        let writer = FrameWriter::with_config(stream.try_clone()?, frame_config);

        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            queue_signal: Condvar::new(),
            stopping: AtomicBool::new(false),
            observer,
        });

        let receive_shared = Arc::clone(&shared);
        let receive_thread = std::thread::Builder::new()
            .name("gbxrpc-receive".to_string())
            .spawn(move || receive_loop(reader, receive_shared))?;

        let dispatch_shared = Arc::clone(&shared);
        let dispatch_thread = std::thread::Builder::new()
            .name("gbxrpc-dispatch".to_string())
            .spawn(move || dispatch_loop(dispatch_shared))?;

        info!(
            address = %config.address,
            port = config.port,
            "connected"
        );

        Ok(Self {
            shared,
            send_state: Mutex::new(SendState {
                writer,
                handles: HandleAllocator::new(),
            }),
            stream,
            receive_thread: Some(receive_thread),
            dispatch_thread: Some(dispatch_thread),
        })
    }

    /// Send a request document and return the handle assigned to it.
    ///
    /// The response, when it arrives, is delivered to the observer's
    /// `on_method_response` with the same handle.
    pub fn send(&self, document: &str) -> Result<u32> {
        if self.shared.stopping.load(Ordering::SeqCst) {
            return Err(ClientError::Stopped);
        }
        if !document.is_ascii() {
            return Err(ClientError::NonAsciiDocument);
        }

        let mut state = self
            .send_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let handle = state.handles.allocate();
        state.writer.send(handle, document.as_bytes())?;
        debug!(handle, bytes = document.len(), "request sent");
        Ok(handle)
    }

    /// Stop the worker threads and close the connection.
    ///
    /// Queued inbound documents are still delivered before the dispatch
    /// thread exits. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.shared.stopping.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("shutting down");

        // Unblock the receive thread; the socket may already be gone.
        let _ = self.stream.shutdown(Shutdown::Both);
        self.shared.queue_signal.notify_all();

        if let Some(handle) = self.receive_thread.take() {
            if handle.join().is_err() {
                warn!("receive thread panicked");
            }
        }
        if let Some(handle) = self.dispatch_thread.take() {
            if handle.join().is_err() {
                warn!("dispatch thread panicked");
            }
        }
        Ok(())
    }
}

impl Drop for RpcClient {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn receive_loop(mut reader: FrameReader<TcpStream>, shared: Arc<Shared>) {
    loop {
        if shared.stopping.load(Ordering::SeqCst) {
            return;
        }

        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(err) => {
                if !shared.stopping.load(Ordering::SeqCst) {
                    warn!(error = %err, "connection lost");
                    shared.observer.on_connection_dropped(&err.into());
                }
                return;
            }
        };

        let document = String::from_utf8_lossy(frame.payload.as_ref()).into_owned();
        debug!(handle = frame.handle, bytes = document.len(), "frame received");

        let mut queue = shared.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.push_back(Message {
            handle: frame.handle,
            document,
        });
        drop(queue);
        shared.queue_signal.notify_one();
    }
}

fn dispatch_loop(shared: Arc<Shared>) {
    loop {
        let next = {
            let mut queue = shared.queue.lock().unwrap_or_else(PoisonError::into_inner);
            loop {
                if let Some(message) = queue.pop_front() {
                    break Some(message);
                }
                // Drain before stopping so queued documents are not lost.
                if shared.stopping.load(Ordering::SeqCst) {
                    break None;
                }
                let (guard, _timeout) = shared
                    .queue_signal
                    .wait_timeout(queue, DISPATCH_POLL)
                    .unwrap_or_else(PoisonError::into_inner);
                queue = guard;
            }
        };

        let Some(message) = next else {
            return;
        };

        let observer = Arc::clone(&shared.observer);
        let delivery = catch_unwind(AssertUnwindSafe(move || {
            if is_server_callback(message.handle) {
                observer.on_server_callback(message.document);
            } else {
                observer.on_method_response(message.handle, message.document);
            }
        }));
        if delivery.is_err() {
            warn!("observer panicked during dispatch");
        }
    }
}
