//! The event loop.
//!
//! A [`Server`] owns the listening socket, the reactor and every live
//! [`Connection`]. [`Server::run`] is the only control thread: it blocks in
//! the reactor, then dispatches each ready token:
//! - the listener token accepts one client,
//! - a readable client is read (and answered straight away),
//! - a writable client gets its pending output flushed.
//!
//! An I/O error on a client closes that client and nothing else. Only a
//! failure of the poll itself stops the loop.

mod buffer;
mod connection;
mod shutdown;

pub use shutdown::ShutdownHandle;

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::net::Listener;
use crate::reactor::{Event, Interest, Reactor};
use crate::utils::Slab;
use connection::{Connection, Received, Step};

use std::io;
use std::net::SocketAddr;
use tracing::{debug, error, info, warn};

/// Token of the listening socket. Connection tokens come from the slab and stay far below it.
const LISTENER_TOKEN: usize = usize::MAX - 1;

/// Single-threaded, readiness-driven file server.
pub struct Server {
    config: ServerConfig,
    listener: Listener,
    reactor: Reactor,
    connections: Slab<Connection>,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Binds the listening socket and prepares the reactor.
    ///
    /// # Errors
    ///
    /// Fails if the poller cannot be created or the address cannot be bound.
    pub fn bind(config: ServerConfig) -> Result<Self> {
        let reactor = Reactor::new().map_err(ServerError::Poller)?;

        let address = config.address();
        let listener =
            Listener::bind(address, config.backlog()).map_err(|source| ServerError::Bind {
                address,
                source,
            })?;

        reactor
            .register(listener.raw_fd(), LISTENER_TOKEN, Interest::READABLE)
            .map_err(ServerError::Register)?;

        let shutdown = ShutdownHandle::new(reactor.waker());

        Ok(Self {
            config,
            listener,
            reactor,
            connections: Slab::with_capacity(64),
            shutdown,
        })
    }

    /// Address actually bound, useful when the configured port was `0`.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Configuration the server was bound with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns a handle that stops [`run`](Self::run) from another thread.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Runs the event loop until a shutdown is requested or polling fails.
    ///
    /// On return the listening socket, the reactor and all in-flight
    /// connections have been released.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Poll`] if the readiness poll fails.
    pub fn run(mut self) -> Result<()> {
        match self.local_addr() {
            Ok(address) => info!(%address, root = %self.config().root().display(), "listening"),
            Err(_) => info!(address = %self.config().address(), "listening"),
        }

        let outcome = loop {
            if self.shutdown.is_shutdown_requested() {
                break Ok(());
            }

            let events = match self.reactor.poll() {
                Ok(events) => events,
                Err(e) => {
                    error!(error = %e, "readiness poll failed, stopping");
                    break Err(ServerError::Poll(e));
                }
            };

            for event in &events {
                self.dispatch(*event);
            }

            self.reactor.recycle(events);
        };

        if !self.connections.is_empty() {
            debug!(count = self.connections.len(), "dropping in-flight connections");
        }
        for connection in self.connections.drain() {
            self.reactor.deregister(connection.socket().raw_fd());
        }

        info!("server stopped");
        outcome
    }

    fn dispatch(&mut self, event: Event) {
        if event.token == LISTENER_TOKEN {
            self.accept();
            return;
        }

        let result = if event.readable {
            self.on_readable(event.token)
        } else if event.writable {
            self.on_writable(event.token)
        } else {
            Ok(Step::Keep)
        };

        match result {
            Ok(Step::Keep) => {}
            Ok(Step::Close) => self.close(event.token),
            Err(e) => {
                debug!(token = event.token, error = %e, "connection failed");
                self.close(event.token);
            }
        }
    }

    fn accept(&mut self) {
        let (socket, peer) = match self.listener.accept() {
            Ok(accepted) => accepted,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
            Err(e) => {
                warn!(error = %e, "accept failed");
                return;
            }
        };

        let token = self.connections.vacant_key();
        if let Err(e) = self
            .reactor
            .register(socket.raw_fd(), token, Interest::READABLE)
        {
            warn!(%peer, error = %e, "could not register connection");
            return;
        }

        self.connections
            .insert(Connection::new(socket, peer, &self.config));

        debug!(%peer, token, "accepted");
    }

    /// Reads from the client and, when there is something to send, writes right away
    /// instead of waiting for the next writable event.
    fn on_readable(&mut self, token: usize) -> io::Result<Step> {
        let Some(connection) = self.connections.get_mut(token) else {
            return Ok(Step::Keep);
        };

        match connection.receive(&self.config)? {
            Received::Nothing => return Ok(Step::Keep),
            Received::PeerClosed => return Ok(Step::Close),
            Received::Composed => {
                self.reactor
                    .reregister(connection.socket().raw_fd(), token, Interest::WRITABLE)?;
            }
            Received::Discarded => {}
        }

        connection.send()
    }

    fn on_writable(&mut self, token: usize) -> io::Result<Step> {
        match self.connections.get_mut(token) {
            Some(connection) => connection.send(),
            None => Ok(Step::Keep),
        }
    }

    /// Deregisters and drops a connection, releasing its socket and file.
    fn close(&mut self, token: usize) {
        if let Some(mut connection) = self.connections.remove(token) {
            connection.discard_input();
            self.reactor.deregister(connection.socket().raw_fd());
            debug!(peer = %connection.peer(), phase = ?connection.phase(), "closed");
        }
    }
}
