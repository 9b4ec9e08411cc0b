//! End-to-end tests against a loopback TCP server.

use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use gbxrpc_client::{ClientConfig, ClientError, ClientObserver, RpcClient, PROTOCOL_BANNER};
use gbxrpc_frame::{FrameReader, FrameWriter};
use gbxrpc_value::{MethodCall, MethodResponse, Value, ValueKind};

const WAIT_LIMIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Response { handle: u32, document: String },
    Callback { document: String },
    Dropped,
}

#[derive(Default)]
struct Recording {
    events: Mutex<Vec<Event>>,
}

impl Recording {
    fn snapshot(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn wait_for(&self, count: usize) -> Vec<Event> {
        let deadline = Instant::now() + WAIT_LIMIT;
        loop {
            let events = self.snapshot();
            if events.len() >= count {
                return events;
            }
            assert!(Instant::now() < deadline, "timed out waiting for events");
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

impl ClientObserver for Recording {
    fn on_method_response(&self, handle: u32, document: String) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Response { handle, document });
    }

    fn on_server_callback(&self, document: String) {
        self.events.lock().unwrap().push(Event::Callback { document });
    }

    fn on_connection_dropped(&self, _cause: &ClientError) {
        self.events.lock().unwrap().push(Event::Dropped);
    }
}

fn write_banner(stream: &mut TcpStream, text: &str) {
    use std::io::Write;
    let mut bytes = (text.len() as u32).to_le_bytes().to_vec();
    bytes.extend_from_slice(text.as_bytes());
    stream.write_all(&bytes).unwrap();
    stream.flush().unwrap();
}

/// Spawn a single-connection server running `serve` after the handshake.
fn spawn_server<F>(serve: F) -> (u16, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let thread = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        write_banner(&mut stream, PROTOCOL_BANNER);
        serve(stream);
    });
    (port, thread)
}

fn config_for(port: u16) -> ClientConfig {
    ClientConfig {
        address: "127.0.0.1".to_string(),
        port,
        ..ClientConfig::default()
    }
}

#[test]
fn rejects_wrong_banner() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        write_banner(&mut stream, "GBXRemote 9");
    });

    let err = RpcClient::connect(config_for(port), Arc::new(Recording::default())).unwrap_err();
    assert!(matches!(err, ClientError::BannerMismatch(_)));
    server.join().unwrap();
}

#[test]
fn rejects_wrong_banner_length() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        write_banner(&mut stream, "GBXRemote 1.1");
    });

    let err = RpcClient::connect(config_for(port), Arc::new(Recording::default())).unwrap_err();
    assert!(matches!(err, ClientError::BannerLength(13)));
    server.join().unwrap();
}

#[test]
fn handles_increase_and_echo_back() {
    let (port, server) = spawn_server(|stream| {
        let mut reader = FrameReader::new(stream.try_clone().unwrap());
        let mut writer = FrameWriter::new(stream);
        for _ in 0..3 {
            let frame = reader.read_frame().unwrap();
            writer.send(frame.handle, b"<ok/>").unwrap();
        }
    });

    let observer = Arc::new(Recording::default());
    let mut client = RpcClient::connect(config_for(port), observer.clone()).unwrap();

    let h1 = client.send("<a/>").unwrap();
    let h2 = client.send("<b/>").unwrap();
    let h3 = client.send("<c/>").unwrap();
    assert_eq!(h1, 0x8000_0001);
    assert_eq!(h2, 0x8000_0002);
    assert_eq!(h3, 0x8000_0003);

    let events = observer.wait_for(3);
    assert_eq!(
        events,
        vec![
            Event::Response {
                handle: h1,
                document: "<ok/>".to_string()
            },
            Event::Response {
                handle: h2,
                document: "<ok/>".to_string()
            },
            Event::Response {
                handle: h3,
                document: "<ok/>".to_string()
            },
        ]
    );

    client.shutdown().unwrap();
    server.join().unwrap();
}

#[test]
fn low_handle_frames_are_callbacks() {
    let (port, server) = spawn_server(|stream| {
        let mut reader = FrameReader::new(stream.try_clone().unwrap());
        let mut writer = FrameWriter::new(stream);
        let frame = reader.read_frame().unwrap();
        // Server-assigned callback handle first, response second.
        writer.send(5, b"<cb/>").unwrap();
        writer.send(frame.handle, b"<resp/>").unwrap();
    });

    let observer = Arc::new(Recording::default());
    let mut client = RpcClient::connect(config_for(port), observer.clone()).unwrap();
    let handle = client.send("<req/>").unwrap();

    let events = observer.wait_for(2);
    assert_eq!(
        events,
        vec![
            Event::Callback {
                document: "<cb/>".to_string()
            },
            Event::Response {
                handle,
                document: "<resp/>".to_string()
            },
        ]
    );

    client.shutdown().unwrap();
    server.join().unwrap();
}

#[test]
fn dispatch_preserves_arrival_order_under_slow_observer() {
    struct SlowRecording(Recording);

    impl ClientObserver for SlowRecording {
        fn on_server_callback(&self, document: String) {
            std::thread::sleep(Duration::from_millis(20));
            self.0.on_server_callback(document);
        }
    }

    let (port, server) = spawn_server(|stream| {
        let mut writer = FrameWriter::new(stream);
        for i in 0..5u32 {
            writer.send(i + 1, format!("<n{i}/>").as_bytes()).unwrap();
        }
    });

    let observer = Arc::new(SlowRecording(Recording::default()));
    let mut client = RpcClient::connect(config_for(port), observer.clone()).unwrap();

    let events = observer.0.wait_for(5);
    let documents: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            Event::Callback { document } => Some(document.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(documents, ["<n0/>", "<n1/>", "<n2/>", "<n3/>", "<n4/>"]);

    client.shutdown().unwrap();
    server.join().unwrap();
}

#[test]
fn observer_panic_does_not_stop_dispatch() {
    struct PanicOnFirst {
        seen: Mutex<Vec<String>>,
    }

    impl ClientObserver for PanicOnFirst {
        fn on_server_callback(&self, document: String) {
            let count = {
                let mut seen = self.seen.lock().unwrap();
                seen.push(document);
                seen.len()
            };
            if count == 1 {
                panic!("rejecting the first document");
            }
        }
    }

    let (port, server) = spawn_server(|stream| {
        let mut writer = FrameWriter::new(stream);
        writer.send(1, b"<first/>").unwrap();
        writer.send(2, b"<second/>").unwrap();
    });

    let observer = Arc::new(PanicOnFirst {
        seen: Mutex::new(Vec::new()),
    });
    let mut client = RpcClient::connect(config_for(port), observer.clone()).unwrap();

    let deadline = Instant::now() + WAIT_LIMIT;
    while observer.seen.lock().unwrap().len() < 2 {
        assert!(Instant::now() < deadline, "timed out waiting for dispatch");
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(*observer.seen.lock().unwrap(), ["<first/>", "<second/>"]);

    client.shutdown().unwrap();
    server.join().unwrap();
}

#[test]
fn orderly_shutdown_reports_no_drop() {
    let (port, server) = spawn_server(|stream| {
        let mut reader = FrameReader::new(stream);
        // Hold the connection open until the client closes it.
        let _ = reader.read_frame();
    });

    let observer = Arc::new(Recording::default());
    let mut client = RpcClient::connect(config_for(port), observer.clone()).unwrap();
    client.shutdown().unwrap();
    server.join().unwrap();

    assert!(!observer.snapshot().contains(&Event::Dropped));
    assert!(matches!(client.send("<x/>"), Err(ClientError::Stopped)));
}

#[test]
fn server_close_reports_drop_once() {
    let (port, server) = spawn_server(|stream| {
        drop(stream);
    });

    let observer = Arc::new(Recording::default());
    let mut client = RpcClient::connect(config_for(port), observer.clone()).unwrap();
    server.join().unwrap();

    let events = observer.wait_for(1);
    let drops = events.iter().filter(|e| **e == Event::Dropped).count();
    assert_eq!(drops, 1);

    // The client can still be shut down cleanly afterwards.
    client.shutdown().unwrap();
    assert_eq!(
        observer
            .snapshot()
            .iter()
            .filter(|e| **e == Event::Dropped)
            .count(),
        1
    );
}

#[test]
fn non_ascii_document_rejected_before_send() {
    let (port, server) = spawn_server(|stream| {
        let mut reader = FrameReader::new(stream);
        let _ = reader.read_frame();
    });

    let observer = Arc::new(Recording::default());
    let mut client = RpcClient::connect(config_for(port), observer).unwrap();

    let err = client.send("<value>café</value>").unwrap_err();
    assert!(matches!(err, ClientError::NonAsciiDocument));

    client.shutdown().unwrap();
    server.join().unwrap();
}

#[test]
fn method_call_response_roundtrip() {
    let (port, server) = spawn_server(|stream| {
        let mut reader = FrameReader::new(stream.try_clone().unwrap());
        let mut writer = FrameWriter::new(stream);

        let frame = reader.read_frame().unwrap();
        let document = String::from_utf8(frame.payload.to_vec()).unwrap();
        let mut call = MethodCall::new("system.multiply")
            .param(Value::Int(0))
            .param(Value::Int(0));
        call.parse(&document).unwrap();
        let (Value::Int(a), Value::Int(b)) = (&call.params()[0], &call.params()[1]) else {
            panic!("unexpected parameter kinds");
        };

        let mut response = MethodResponse::new(ValueKind::Int);
        response.set_returned(Value::Int(a * b));
        writer
            .send(frame.handle, response.render().as_bytes())
            .unwrap();
    });

    let observer = Arc::new(Recording::default());
    let mut client = RpcClient::connect(config_for(port), observer.clone()).unwrap();

    let call = MethodCall::new("system.multiply")
        .param(Value::Int(6))
        .param(Value::Int(7));
    let handle = client.send(&call.render()).unwrap();

    let events = observer.wait_for(1);
    let Event::Response { handle: got, document } = &events[0] else {
        panic!("expected a response event");
    };
    assert_eq!(*got, handle);

    let mut response = MethodResponse::new(ValueKind::Int);
    response.parse(document).unwrap();
    assert_eq!(response.returned(), Some(&Value::Int(42)));

    client.shutdown().unwrap();
    server.join().unwrap();
}
