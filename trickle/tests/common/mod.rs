#![allow(dead_code)]

use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempDir;
use trickle::{Server, ServerBuilder, ShutdownHandle};

/// A server running on a background thread over a temporary document root.
pub struct TestServer {
    pub address: SocketAddr,
    pub root: TempDir,
    shutdown: ShutdownHandle,
    worker: Option<JoinHandle<trickle::Result<()>>>,
}

impl TestServer {
    pub fn start() -> Self {
        Self::start_with(|builder| builder)
    }

    pub fn start_with(configure: impl FnOnce(ServerBuilder) -> ServerBuilder) -> Self {
        let root = tempfile::tempdir().expect("Failed to create document root");

        let builder = ServerBuilder::new()
            .host(Ipv4Addr::LOCALHOST.into())
            .port(0)
            .backlog(200)
            .root(root.path());
        let server = Server::bind(configure(builder).build()).expect("Failed to bind server");

        let address = server.local_addr().expect("Failed to get local address");
        let shutdown = server.shutdown_handle();
        let worker = thread::spawn(move || server.run());

        Self {
            address,
            root,
            shutdown,
            worker: Some(worker),
        }
    }

    pub fn write_file(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.root.path().join(name), contents).expect("Failed to write file");
    }

    /// Requests the shutdown and waits for `run` to return.
    pub fn stop(mut self) -> trickle::Result<()> {
        self.shutdown.shutdown();
        self.worker
            .take()
            .expect("server already stopped")
            .join()
            .expect("server thread panicked")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.shutdown.shutdown();
            let _ = worker.join();
        }
    }
}

/// A parsed response: status line, header lines and body.
#[derive(Debug)]
pub struct Response {
    pub status_line: String,
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        let prefix = format!("{name}: ");
        self.headers
            .iter()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
    }
}

/// Sends `request` raw and reads until the server closes the connection.
pub fn exchange(address: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(address).expect("Failed to connect to server");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("Failed to set read timeout");

    stream.write_all(request).expect("Failed to write request");

    let mut raw = Vec::new();
    stream
        .read_to_end(&mut raw)
        .expect("Failed to read response");
    raw
}

pub fn get(address: SocketAddr, path: &str) -> Response {
    let request = format!("GET {path} HTTP/1.1\r\nHost: {address}\r\nAccept: */*\r\n\r\n");
    parse(&exchange(address, request.as_bytes()))
}

pub fn parse(raw: &[u8]) -> Response {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no blank line");

    let head = std::str::from_utf8(&raw[..split]).expect("response head is not UTF-8");
    let mut lines = head.split("\r\n").map(str::to_owned);

    Response {
        status_line: lines.next().expect("response has no status line"),
        headers: lines.collect(),
        body: raw[split + 4..].to_vec(),
    }
}

pub fn sha256(bytes: &[u8]) -> Vec<u8> {
    Sha256::digest(bytes).to_vec()
}

pub fn sha256_file(path: &Path) -> Vec<u8> {
    sha256(&std::fs::read(path).expect("Failed to read file"))
}

/// Deterministic, non-repeating-looking file contents.
pub fn pattern(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}
