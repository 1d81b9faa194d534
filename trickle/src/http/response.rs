//! Response heads.
//!
//! Every response carries the same fixed header block; only the status line
//! and, for `200 OK`, the `Content-Length` differ. Headers are emitted in
//! this order, each terminated by CRLF, followed by an empty line:
//!
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: binary
//! Content-Length: 1037
//! Cache-Control: must-revalidate, post-check=0, pre-check=0
//! Expires: 0
//! Pragma: public
//! Server: async-server
//! Connection: close
//! ```

use std::fmt;
use std::io::{self, Write};

/// Response statuses the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    BadRequest,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NotFound => 404,
            Status::BadRequest => 400,
        }
    }

    pub fn reason_phrase(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::NotFound => "Not Found",
            Status::BadRequest => "Bad Request",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason_phrase())
    }
}

/// Status line plus header block of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead<'a> {
    status: Status,
    content_length: Option<u64>,
    server: &'a str,
}

impl<'a> ResponseHead<'a> {
    /// Head announcing a body of `content_length` bytes.
    pub fn ok(content_length: u64, server: &'a str) -> Self {
        Self {
            status: Status::Ok,
            content_length: Some(content_length),
            server,
        }
    }

    /// Body-less head for an error status.
    pub fn error(status: Status, server: &'a str) -> Self {
        Self {
            status,
            content_length: None,
            server,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Writes the head to `out`.
    ///
    /// Every status carries the same header set in the same order; only
    /// `Content-Length` is limited to heads that announce a body.
    ///
    /// # Errors
    ///
    /// Propagates the writer's error; writing into a slice that is too small
    /// fails with [`io::ErrorKind::WriteZero`].
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "HTTP/1.1 {}\r\n", self.status)?;
        out.write_all(b"Content-Type: binary\r\n")?;

        if let Some(length) = self.content_length {
            write!(out, "Content-Length: {length}\r\n")?;
        }

        out.write_all(b"Cache-Control: must-revalidate, post-check=0, pre-check=0\r\n")?;
        out.write_all(b"Expires: 0\r\n")?;
        out.write_all(b"Pragma: public\r\n")?;
        write!(out, "Server: {}\r\n", self.server)?;
        out.write_all(b"Connection: close\r\n")?;
        out.write_all(b"\r\n")
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(256);
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ok_head_carries_content_length() {
        let head = ResponseHead::ok(1037, "async-server");

        assert_eq!(
            String::from_utf8(head.to_bytes()).unwrap(),
            "HTTP/1.1 200 OK\r\n\
             Content-Type: binary\r\n\
             Content-Length: 1037\r\n\
             Cache-Control: must-revalidate, post-check=0, pre-check=0\r\n\
             Expires: 0\r\n\
             Pragma: public\r\n\
             Server: async-server\r\n\
             Connection: close\r\n\
             \r\n"
        );
    }

    #[test]
    fn error_heads_have_no_content_length() {
        let not_found =
            String::from_utf8(ResponseHead::error(Status::NotFound, "s").to_bytes()).unwrap();
        let bad =
            String::from_utf8(ResponseHead::error(Status::BadRequest, "s").to_bytes()).unwrap();

        assert!(not_found.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(bad.starts_with("HTTP/1.1 400 Bad Request\r\n"));

        for head in [not_found, bad] {
            assert!(!head.contains("Content-Length"));
            assert!(head.contains("Server: s\r\nConnection: close\r\n\r\n"));
            assert!(head.ends_with("\r\n\r\n"));
        }
    }

    #[test]
    fn error_head_keeps_the_cache_headers() {
        let head = ResponseHead::error(Status::NotFound, "async-server");

        assert_eq!(
            String::from_utf8(head.to_bytes()).unwrap(),
            "HTTP/1.1 404 Not Found\r\n\
             Content-Type: binary\r\n\
             Cache-Control: must-revalidate, post-check=0, pre-check=0\r\n\
             Expires: 0\r\n\
             Pragma: public\r\n\
             Server: async-server\r\n\
             Connection: close\r\n\
             \r\n"
        );
    }

    #[test]
    fn writing_into_a_short_slice_fails() {
        let mut small = [0u8; 16];
        let err = ResponseHead::ok(1, "async-server")
            .write_to(&mut small[..])
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn status_display_matches_status_line() {
        assert_eq!(Status::Ok.to_string(), "200 OK");
        assert_eq!(Status::NotFound.to_string(), "404 Not Found");
        assert_eq!(Status::BadRequest.to_string(), "400 Bad Request");
    }
}
