//! Request-line parsing.
//!
//! Only the first two whitespace-separated tokens of a request are consulted:
//! the method and the target. Everything after them (version, headers, body)
//! is ignored.

use std::fmt;

/// Request method, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    /// Any other method, upper-cased.
    Other(String),
}

impl Method {
    fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("GET") {
            Method::Get
        } else {
            Method::Other(token.to_ascii_uppercase())
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Other(name) => f.write_str(name),
        }
    }
}

/// The part of a request the server acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Target with its leading `/` removed, used as a path relative to the document root.
    pub path: String,
}

impl Request {
    /// Parses the method and target from the first bytes of a request.
    ///
    /// Returns `None` when fewer than two tokens are present. Non-UTF-8 bytes
    /// are replaced rather than rejected.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(bytes);
        let mut tokens = text.split_ascii_whitespace();

        let method = Method::parse(tokens.next()?);
        let target = tokens.next()?;
        let path = target.strip_prefix('/').unwrap_or(target).to_owned();

        Some(Self { method, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_get_and_strips_leading_slash() {
        let request = Request::parse(b"GET /tiny.gif HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();

        assert_eq!(
            request,
            Request {
                method: Method::Get,
                path: "tiny.gif".into()
            }
        );
    }

    #[test]
    fn method_is_case_insensitive() {
        let request = Request::parse(b"get /a/b.txt HTTP/1.1\r\n").unwrap();

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "a/b.txt");
    }

    #[test]
    fn other_methods_are_upper_cased() {
        let request = Request::parse(b"post /file.txt HTTP/1.1\r\n").unwrap();

        assert_eq!(request.method, Method::Other("POST".into()));
        assert_eq!(request.method.to_string(), "POST");
    }

    #[test]
    fn tabs_and_repeated_spaces_separate_tokens() {
        let request = Request::parse(b"  GET\t\t/x   HTTP/1.1").unwrap();

        assert_eq!(request.path, "x");
    }

    #[test]
    fn target_without_slash_is_kept() {
        let request = Request::parse(b"GET x.bin").unwrap();

        assert_eq!(request.path, "x.bin");
    }

    #[test]
    fn fewer_than_two_tokens_is_rejected() {
        assert_eq!(Request::parse(b""), None);
        assert_eq!(Request::parse(b"\r\n"), None);
        assert_eq!(Request::parse(b"GET"), None);
        assert_eq!(Request::parse(b"GET\r\n\r\n"), None);
    }
}
