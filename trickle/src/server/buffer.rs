use crate::http::ResponseHead;

use std::io::{self, Read};

/// Fixed-capacity outbound buffer with a send cursor.
///
/// Holds either the response head or one chunk of file body. Bytes in
/// `data[pos..len]` are still waiting for the socket.
#[derive(Debug)]
pub(crate) struct ResponseBuffer {
    data: Box<[u8]>,
    pos: usize,
    len: usize,
}

impl ResponseBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity].into_boxed_slice(),
            pos: 0,
            len: 0,
        }
    }

    /// Bytes composed but not yet sent.
    pub(crate) fn pending(&self) -> &[u8] {
        &self.data[self.pos..self.len]
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.pos == self.len
    }

    /// Marks `n` pending bytes as sent.
    pub(crate) fn consume(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.len);
    }

    /// Replaces the contents with an encoded response head.
    ///
    /// Fails with `WriteZero` if the head does not fit the buffer.
    pub(crate) fn compose(&mut self, head: &ResponseHead<'_>) -> io::Result<()> {
        let mut free = &mut self.data[..];
        let capacity = free.len();

        head.write_to(&mut free)?;

        self.pos = 0;
        self.len = capacity - free.len();
        Ok(())
    }

    /// Replaces the contents with the next chunk read from `source`.
    ///
    /// Returns the chunk length; `0` means `source` is exhausted.
    pub(crate) fn refill<R: Read>(&mut self, source: &mut R) -> io::Result<usize> {
        let n = loop {
            match source.read(&mut self.data) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };

        self.pos = 0;
        self.len = n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Status;
    use pretty_assertions::assert_eq;

    #[test]
    fn compose_exposes_the_whole_head() {
        let mut buffer = ResponseBuffer::with_capacity(512);
        let head = ResponseHead::error(Status::NotFound, "t");

        buffer.compose(&head).unwrap();

        assert_eq!(buffer.pending(), head.to_bytes().as_slice());
        assert!(!buffer.is_drained());
    }

    #[test]
    fn consume_advances_the_cursor() {
        let mut buffer = ResponseBuffer::with_capacity(512);
        buffer.compose(&ResponseHead::error(Status::BadRequest, "t")).unwrap();
        let total = buffer.pending().len();

        buffer.consume(9);
        assert_eq!(buffer.pending().len(), total - 9);
        assert!(buffer.pending().starts_with(b"400 Bad Request"));

        buffer.consume(total);
        assert!(buffer.is_drained());
    }

    #[test]
    fn head_larger_than_buffer_is_an_error() {
        let mut buffer = ResponseBuffer::with_capacity(32);

        let err = buffer.compose(&ResponseHead::ok(10, "t")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn refill_reads_at_most_capacity() {
        let body: Vec<u8> = (0..=255u8).cycle().take(100).collect();
        let mut source = &body[..];
        let mut buffer = ResponseBuffer::with_capacity(40);

        assert_eq!(buffer.refill(&mut source).unwrap(), 40);
        assert_eq!(buffer.pending(), &body[..40]);

        buffer.consume(40);
        assert_eq!(buffer.refill(&mut source).unwrap(), 40);
        assert_eq!(buffer.pending(), &body[40..80]);

        assert_eq!(buffer.refill(&mut source).unwrap(), 20);
        assert_eq!(buffer.pending(), &body[80..]);

        assert_eq!(buffer.refill(&mut source).unwrap(), 0);
        assert!(buffer.is_drained());
    }
}
