use super::socket::Socket;
use crate::reactor::poller::platform::{
    domain_of, sys_accept, sys_bind, sys_close, sys_ipv6_is_necessary, sys_listen,
    sys_set_reuseaddr, sys_socket, sys_sockname,
};

use std::io;
use std::net::SocketAddr;
use std::os::fd::RawFd;

/// A non-blocking listening TCP socket.
///
/// Produces [`Socket`]s through [`accept`](Self::accept); owns no client state.
#[derive(Debug)]
pub struct Listener {
    fd: RawFd,
}

impl Listener {
    /// Binds a listener to `address` with room for `backlog` pending connections.
    ///
    /// This function:
    /// - creates a non-blocking socket,
    /// - enables `SO_REUSEADDR`,
    /// - configures IPv6 dual-stack if applicable,
    /// - binds and starts listening.
    pub fn bind(address: SocketAddr, backlog: u32) -> io::Result<Self> {
        let domain = domain_of(&address);
        let listener = Self {
            fd: sys_socket(domain)?,
        };

        sys_set_reuseaddr(listener.fd)?;
        sys_ipv6_is_necessary(listener.fd, domain)?;
        sys_bind(listener.fd, &address)?;
        sys_listen(listener.fd, backlog)?;

        Ok(listener)
    }

    /// Accepts one pending connection.
    ///
    /// Returns `WouldBlock` when the accept queue is empty.
    pub fn accept(&self) -> io::Result<(Socket, SocketAddr)> {
        let (fd, address) = sys_accept(self.fd)?;

        Ok((Socket::from_raw(fd), address))
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        sys_sockname(self.fd)
    }

    pub(crate) fn raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        sys_close(self.fd);
    }
}
