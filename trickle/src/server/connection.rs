//! Per-connection state machine.
//!
//! ```text
//! AwaitingRequest --read--> HeadersPending --drained, file open--> StreamingBody
//!        |                        |                                     |
//!        +---- peer closed -------+---- drained, no file / EOF ---------+--> Closed
//! ```
//!
//! A connection serves exactly one request. Once a response is composed the
//! socket is watched for writability only. A readable event that still shows
//! up (an error or hang-up report) drains and discards input, and end of input
//! no longer closes the connection.

use super::buffer::ResponseBuffer;
use crate::config::ServerConfig;
use crate::http::{Method, Request, ResponseHead, Status};
use crate::net::Socket;

use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Upper bound on reads spent draining a client that is being closed.
const MAX_DISCARD_READS: usize = 16;

/// Where a connection is in its single request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    AwaitingRequest,
    HeadersPending,
    StreamingBody,
    Closed,
}

/// Result of handling a readable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Received {
    /// Nothing was available after all.
    Nothing,
    /// A response has just been composed; the socket must now be watched for writes.
    Composed,
    /// Input, or end of input, arrived after the response was composed and was dropped.
    Discarded,
    /// The peer shut down its side of the connection.
    PeerClosed,
}

/// Whether the event loop should keep the connection registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Keep,
    Close,
}

/// State owned by one accepted client.
#[derive(Debug)]
pub(crate) struct Connection {
    socket: Socket,
    peer: SocketAddr,
    request: Box<[u8]>,
    response: ResponseBuffer,
    file: Option<File>,
    response_started: bool,
    phase: Phase,
}

impl Connection {
    pub(crate) fn new(socket: Socket, peer: SocketAddr, config: &ServerConfig) -> Self {
        Self {
            socket,
            peer,
            request: vec![0; config.request_buffer_size()].into_boxed_slice(),
            response: ResponseBuffer::with_capacity(config.response_buffer_size()),
            file: None,
            response_started: false,
            phase: Phase::AwaitingRequest,
        }
    }

    pub(crate) fn socket(&self) -> &Socket {
        &self.socket
    }

    pub(crate) fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    /// Performs one non-blocking read and, on the first request chunk,
    /// composes the response.
    pub(crate) fn receive(&mut self, config: &ServerConfig) -> io::Result<Received> {
        let n = match self.socket.read(&mut self.request) {
            // A half-closed client still gets the response it asked for.
            Ok(0) if self.response_started => return Ok(Received::Discarded),
            Ok(0) => {
                self.phase = Phase::Closed;
                return Ok(Received::PeerClosed);
            }
            Ok(n) => n,
            Err(e) if is_transient(&e) => return Ok(Received::Nothing),
            Err(e) => return Err(e),
        };

        trace!(peer = %self.peer, bytes = n, "received");

        if self.response_started {
            return Ok(Received::Discarded);
        }

        if n == self.request.len() {
            warn!(
                peer = %self.peer,
                capacity = n,
                "request filled the input buffer; the request line may be truncated"
            );
        }

        let (head, file) = respond(Request::parse(&self.request[..n]), config);
        self.response.compose(&head)?;

        debug!(peer = %self.peer, status = %head.status(), "responding");

        self.file = file;
        self.response_started = true;
        self.phase = Phase::HeadersPending;

        Ok(Received::Composed)
    }

    /// Flushes pending output once and, when it drains, loads the next body chunk.
    pub(crate) fn send(&mut self) -> io::Result<Step> {
        if !self.response_started {
            return Ok(Step::Keep);
        }

        match self.socket.write(self.response.pending()) {
            Ok(n) => self.response.consume(n),
            Err(e) if is_transient(&e) => {}
            Err(e) => return Err(e),
        }

        if !self.response.is_drained() {
            return Ok(Step::Keep);
        }

        let Some(file) = self.file.as_mut() else {
            self.phase = Phase::Closed;
            return Ok(Step::Close);
        };

        let n = self.response.refill(file)?;
        if n > 0 {
            trace!(peer = %self.peer, bytes = n, "transmitting");
            self.phase = Phase::StreamingBody;
            return Ok(Step::Keep);
        }

        self.file = None;
        self.phase = Phase::Closed;
        Ok(Step::Close)
    }

    /// Reads and drops input that is already queued.
    ///
    /// Closing a socket with unread input makes the kernel reset the
    /// connection, which can cut off the tail of a response still in flight.
    pub(crate) fn discard_input(&mut self) {
        for _ in 0..MAX_DISCARD_READS {
            match self.socket.read(&mut self.request) {
                Ok(n) if n > 0 => {}
                _ => break,
            }
        }
    }
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Picks the response for a parsed request line.
fn respond(request: Option<Request>, config: &ServerConfig) -> (ResponseHead<'_>, Option<File>) {
    let server = config.server_name();

    let Some(request) = request else {
        debug!("malformed request line");
        return (ResponseHead::error(Status::BadRequest, server), None);
    };

    debug!(method = %request.method, path = %request.path, "requested");

    if request.method != Method::Get {
        return (ResponseHead::error(Status::BadRequest, server), None);
    }

    match open_regular_file(config.root(), &request.path) {
        Some((file, length)) => (ResponseHead::ok(length, server), Some(file)),
        None => (ResponseHead::error(Status::NotFound, server), None),
    }
}

/// Opens `name` under `root`, returning the file and its length.
///
/// Directories and other non-regular files count as missing.
fn open_regular_file(root: &Path, name: &str) -> Option<(File, u64)> {
    let file = File::open(root.join(name)).ok()?;
    let metadata = file.metadata().ok()?;

    metadata.is_file().then(|| (file, metadata.len()))
}
