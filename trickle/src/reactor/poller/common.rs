use std::os::fd::RawFd;

/// Readiness a registration is interested in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Interest {
    pub(crate) read: bool,
    pub(crate) write: bool,
}

impl Interest {
    pub(crate) const READABLE: Interest = Interest {
        read: true,
        write: false,
    };

    pub(crate) const WRITABLE: Interest = Interest {
        read: false,
        write: true,
    };
}

/// Handle that interrupts a blocking poll from another thread.
///
/// Wraps the platform wake descriptor: an `eventfd` on Linux, the kqueue
/// itself (through `EVFILT_USER`) on BSD-like systems.
#[derive(Debug)]
pub(crate) struct Waker(pub(crate) RawFd);

unsafe impl Send for Waker {}
unsafe impl Sync for Waker {}
