use crate::reactor::poller::platform::{sys_close, sys_recv, sys_send};

use std::io;
use std::os::fd::RawFd;

/// An accepted, non-blocking client socket.
///
/// Reads and writes never suspend: when the kernel has nothing to give or no
/// room to take, they fail with [`io::ErrorKind::WouldBlock`]. The descriptor
/// is closed on drop.
#[derive(Debug)]
pub struct Socket {
    fd: RawFd,
}

impl Socket {
    /// Takes ownership of a connected, non-blocking descriptor.
    pub(crate) fn from_raw(fd: RawFd) -> Self {
        Self { fd }
    }

    /// Reads up to `buffer.len()` bytes. `Ok(0)` means the peer closed its side.
    pub fn read(&self, buffer: &mut [u8]) -> io::Result<usize> {
        sys_recv(self.fd, buffer)
    }

    /// Writes as much of `buffer` as the kernel accepts right now.
    pub fn write(&self, buffer: &[u8]) -> io::Result<usize> {
        sys_send(self.fd, buffer)
    }

    pub(crate) fn raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        sys_close(self.fd);
    }
}
