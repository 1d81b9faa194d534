//! The HTTP/1.1 subset spoken by the server.
//!
//! - [`request`]: extracting method and target from the first request chunk,
//! - [`response`]: status lines and the fixed header block.
//!
//! Keep-alive, chunked encoding and header parsing are out of scope: every
//! response is followed by the server closing the connection.

pub mod request;
pub mod response;

pub use request::{Method, Request};
pub use response::{ResponseHead, Status};
