use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lantern::config::ServerConfig;
use lantern::router::{Catalogue, Router};
use lantern::server::{self, Multiplexer, ShutdownHandle};
use tempfile::TempDir;

const INDEX: &str = "<html><body>served by lantern</body></html>";

struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    handle: Option<JoinHandle<std::io::Result<()>>>,
    _root: TempDir,
}

impl TestServer {
    fn start(read_timeout_ms: u64) -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("index.html"), INDEX).unwrap();
        fs::write(root.path().join("app.js"), "console.log(1);").unwrap();

        let cfg = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: "0".to_string(),
            read_timeout_ms,
            read_chunk_size: 64,
            ..ServerConfig::default()
        };

        let catalogue = Catalogue::load(root.path().to_str().unwrap(), 8).unwrap();
        let router = Router::with_default_routes(catalogue);
        let listener = server::bind(&cfg).unwrap();
        let mut mux = Multiplexer::new(listener, &cfg).unwrap();
        let addr = mux.local_addr().unwrap();
        let shutdown = mux.shutdown_handle();
        let handle = thread::spawn(move || mux.run(&router));

        Self {
            addr,
            shutdown,
            handle: Some(handle),
            _root: root,
        }
    }

    fn connect(&self) -> TcpStream {
        let stream = TcpStream::connect(self.addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .unwrap();
        stream
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.shutdown().unwrap();
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap().unwrap();
        }
    }
}

fn read_response(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    String::from_utf8(raw).unwrap()
}

fn exchange(server: &TestServer, request: &str) -> String {
    let mut stream = server.connect();
    stream.write_all(request.as_bytes()).unwrap();
    read_response(&mut stream)
}

#[test]
fn test_serves_static_file() {
    let server = TestServer::start(5_000);

    let response = exchange(&server, "GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\nDate: "));
    assert!(response.contains("Content-Type: text/html; charset=UTF-8\r\n"));
    assert!(response.contains(&format!("Content-Length: {}\r\n", INDEX.len())));
    assert!(response.ends_with(&format!("\r\n\r\n{}", INDEX)));
}

#[test]
fn test_unknown_path_is_404() {
    let server = TestServer::start(5_000);

    let response = exchange(&server, "GET /missing.html HTTP/1.1\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[test]
fn test_root_route() {
    let server = TestServer::start(5_000);

    let response = exchange(&server, "GET / HTTP/1.1\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with(INDEX));
}

#[test]
fn test_request_in_fragments() {
    let server = TestServer::start(5_000);
    let mut stream = server.connect();

    for piece in ["GE", "T /app.js HT", "TP/1.1\r\nHost: a\r", "\n\r", "\n"] {
        stream.write_all(piece.as_bytes()).unwrap();
        stream.flush().unwrap();
        thread::sleep(Duration::from_millis(20));
    }

    let response = read_response(&mut stream);
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: application/javascript\r\n"));
    assert!(response.ends_with("console.log(1);"));
}

#[test]
fn test_body_waits_for_content_length() {
    let server = TestServer::start(5_000);
    let mut stream = server.connect();

    stream
        .write_all(b"POST /index.html HTTP/1.1\r\nContent-Length: 5\r\n\r\nab")
        .unwrap();
    thread::sleep(Duration::from_millis(50));
    stream.write_all(b"cde").unwrap();

    let response = read_response(&mut stream);
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
}

#[test]
fn test_incomplete_request_handled_after_timeout() {
    let server = TestServer::start(200);
    let mut stream = server.connect();

    // No terminating blank line: handled once the socket goes quiet.
    stream
        .write_all(b"GET /index.html HTTP/1.1\r\nHost: a\r\n")
        .unwrap();

    let response = read_response(&mut stream);
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
}

#[test]
fn test_silent_connection_closed_after_timeout() {
    let server = TestServer::start(200);
    let mut stream = server.connect();

    let response = read_response(&mut stream);
    assert!(response.is_empty());
}

#[test]
fn test_malformed_request_closed_without_response() {
    let server = TestServer::start(5_000);

    let response = exchange(&server, "BREW /pot HTTP/1.1\r\n\r\n");

    assert!(response.is_empty());
}

#[test]
fn test_concurrent_clients() {
    let server = TestServer::start(5_000);

    // Open every socket before sending anything so they are multiplexed.
    let mut streams: Vec<TcpStream> = (0..8).map(|_| server.connect()).collect();
    for (i, stream) in streams.iter_mut().enumerate() {
        let path = if i % 2 == 0 { "/index.html" } else { "/nope" };
        stream
            .write_all(format!("GET {} HTTP/1.1\r\n\r\n", path).as_bytes())
            .unwrap();
    }

    for (i, stream) in streams.iter_mut().enumerate() {
        let response = read_response(stream);
        if i % 2 == 0 {
            assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        } else {
            assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        }
    }
}
