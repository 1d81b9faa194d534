//! Server configuration.
//!
//! Everything is fixed at construction time; there is no runtime
//! reconfiguration. Build a [`ServerConfig`] through [`ServerBuilder`]:
//!
//! ```rust
//! use trickle::ServerBuilder;
//!
//! let config = ServerBuilder::new()
//!     .port(8080)
//!     .backlog(200)
//!     .root("./public")
//!     .build();
//!
//! assert_eq!(config.address().port(), 8080);
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BACKLOG: u32 = 200;
pub const DEFAULT_REQUEST_BUFFER_SIZE: usize = 255;
pub const DEFAULT_RESPONSE_BUFFER_SIZE: usize = 20 * 1024;
pub const DEFAULT_SERVER_NAME: &str = "async-server";

/// Immutable server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    host: IpAddr,
    port: u16,
    backlog: u32,
    root: PathBuf,
    request_buffer_size: usize,
    response_buffer_size: usize,
    server_name: String,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Maximum number of established connections the OS queues before `accept`.
    pub fn backlog(&self) -> u32 {
        self.backlog
    }

    /// Directory request paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Capacity of each connection's inbound buffer.
    ///
    /// A request line longer than this is cut at the buffer boundary.
    pub fn request_buffer_size(&self) -> usize {
        self.request_buffer_size
    }

    /// Capacity of each connection's outbound buffer, and therefore the largest body chunk.
    pub fn response_buffer_size(&self) -> usize {
        self.response_buffer_size
    }

    /// Value of the `Server` response header.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerBuilder::new().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    /// Starts from the defaults: every interface, port 8080, backlog 200,
    /// a 255-byte request buffer, a 20 KiB response buffer and the working
    /// directory as document root.
    pub fn new() -> Self {
        Self {
            config: ServerConfig {
                host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                port: DEFAULT_PORT,
                backlog: DEFAULT_BACKLOG,
                root: PathBuf::from("."),
                request_buffer_size: DEFAULT_REQUEST_BUFFER_SIZE,
                response_buffer_size: DEFAULT_RESPONSE_BUFFER_SIZE,
                server_name: DEFAULT_SERVER_NAME.to_owned(),
            },
        }
    }

    pub fn host(mut self, host: IpAddr) -> Self {
        self.config.host = host;
        self
    }

    /// Port to listen on; `0` lets the OS pick one.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn backlog(mut self, backlog: u32) -> Self {
        self.config.backlog = backlog;
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// # Panics
    ///
    /// Panics if `size == 0`.
    pub fn request_buffer_size(mut self, size: usize) -> Self {
        assert!(size > 0, "request_buffer_size must be > 0");

        self.config.request_buffer_size = size;
        self
    }

    /// # Panics
    ///
    /// Panics if `size == 0`.
    pub fn response_buffer_size(mut self, size: usize) -> Self {
        assert!(size > 0, "response_buffer_size must be > 0");

        self.config.response_buffer_size = size;
        self
    }

    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.config.server_name = name.into();
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
