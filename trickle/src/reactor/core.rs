use super::event::Event;
use super::poller::{Interest, Poller, Waker};

use std::io;
use std::os::fd::RawFd;
use std::sync::Arc;

/// Readiness multiplexer driven by the event loop.
///
/// Owns the platform poller and the buffer of ready events. Tokens are
/// chosen by the caller; the reactor only hands them back on readiness.
pub(crate) struct Reactor {
    poller: Poller,
    events: Vec<Event>,
}

impl Reactor {
    pub(crate) fn new() -> io::Result<Self> {
        Ok(Self {
            poller: Poller::new()?,
            events: Vec::with_capacity(64),
        })
    }

    /// Starts monitoring `fd` for `interest`, reported under `token`.
    pub(crate) fn register(&self, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        self.poller.register(fd, token, interest)
    }

    /// Replaces the interest set of an already registered descriptor.
    pub(crate) fn reregister(&self, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        self.poller.reregister(fd, token, interest)
    }

    /// Stops monitoring `fd`. Calling it twice is harmless.
    pub(crate) fn deregister(&self, fd: RawFd) {
        self.poller.deregister(fd);
    }

    /// Returns a handle that interrupts [`poll`](Self::poll) from any thread.
    pub(crate) fn waker(&self) -> Arc<Waker> {
        self.poller.waker()
    }

    /// Blocks until something is ready and returns the ready set.
    ///
    /// The returned vector is owned by the caller, so handlers are free to
    /// register and deregister while walking it. Hand it back through
    /// [`recycle`](Self::recycle) to reuse its allocation.
    pub(crate) fn poll(&mut self) -> io::Result<Vec<Event>> {
        let mut events = std::mem::take(&mut self.events);

        self.poller.poll(&mut events)?;
        Ok(events)
    }

    pub(crate) fn recycle(&mut self, mut events: Vec<Event>) {
        events.clear();
        self.events = events;
    }
}

#[cfg(all(test, any(target_os = "linux", target_os = "android")))]
mod tests {
    use super::*;
    use std::net::Shutdown;
    use std::os::fd::AsRawFd;
    use std::os::unix::net::UnixStream;

    #[test]
    fn write_interest_ignores_peer_half_close() {
        let mut reactor = Reactor::new().unwrap();
        let (server, client) = UnixStream::pair().unwrap();
        server.set_nonblocking(true).unwrap();

        reactor
            .register(server.as_raw_fd(), 7, Interest::READABLE)
            .unwrap();
        reactor
            .reregister(server.as_raw_fd(), 7, Interest::WRITABLE)
            .unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let events = reactor.poll().unwrap();
        assert_eq!(
            events,
            vec![Event {
                token: 7,
                readable: false,
                writable: true,
            }]
        );

        reactor.deregister(server.as_raw_fd());
    }
}
