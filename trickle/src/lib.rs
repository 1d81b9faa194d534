//! # Trickle
//!
//! **Trickle** is a small single-threaded file server built directly on the
//! operating system's readiness notifications (epoll on Linux, kqueue on
//! macOS). One thread services any number of concurrent clients by reacting
//! to readiness events instead of blocking per connection.
//!
//! Each connection goes through a fixed sequence:
//!
//! 1. accept, then wait for the request to become readable,
//! 2. read the request line and compose the response head,
//! 3. flush the head,
//! 4. stream the file body one buffer at a time,
//! 5. close.
//!
//! Only `GET` is served. Missing files get `404 Not Found`, other methods and
//! malformed request lines get `400 Bad Request`, and every response ends
//! with the server closing the connection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::thread;
//! use trickle::{Server, ServerBuilder};
//!
//! let config = ServerBuilder::new().port(8080).backlog(200).build();
//! let server = Server::bind(config)?;
//! let shutdown = server.shutdown_handle();
//!
//! let worker = thread::spawn(move || server.run());
//!
//! // ... later, from any thread:
//! shutdown.shutdown();
//! worker.join().expect("server thread panicked")?;
//! # Ok::<(), trickle::ServerError>(())
//! ```
//!
//! ## Modules
//!
//! - [`http`]: request-line parsing and response heads
//! - [`net`]: non-blocking listener and client socket

mod config;
mod error;
mod reactor;
mod server;
mod utils;

pub mod http;
pub mod net;

pub use config::{
    DEFAULT_BACKLOG, DEFAULT_PORT, DEFAULT_REQUEST_BUFFER_SIZE, DEFAULT_RESPONSE_BUFFER_SIZE,
    DEFAULT_SERVER_NAME, ServerBuilder, ServerConfig,
};
pub use error::{Result, ServerError};
pub use server::{Server, ShutdownHandle};
