//! Linux `epoll` backend.
//!
//! Registrations are level-triggered: a socket that still has unread input or
//! free send space keeps being reported until the server acts on it. The event
//! loop relies on that to resume a partially flushed response on the next cycle.

use super::common::{Interest, Waker};
use super::unix::sys_close;
use crate::reactor::event::{Event, merge_event};

use libc::{
    EPOLL_CLOEXEC, EPOLL_CTL_ADD, EPOLL_CTL_DEL, EPOLL_CTL_MOD, EPOLLERR, EPOLLHUP, EPOLLIN,
    EPOLLOUT, EPOLLRDHUP, epoll_create1, epoll_ctl, epoll_event, epoll_wait,
};
use std::io;
use std::os::unix::io::RawFd;
use std::sync::Arc;

/// Reserved token for the wake-up eventfd. The slab never hands it out.
const WAKE_TOKEN: u64 = u64::MAX;

/// Number of kernel events fetched per `epoll_wait` call.
const EVENTS_CAPACITY: usize = 256;

/// Linux `epoll` poller.
///
/// Owns the epoll instance, a reusable kernel event buffer and the
/// `eventfd` used to interrupt a blocking wait.
pub(crate) struct EpollPoller {
    epoll: RawFd,
    events: Vec<epoll_event>,
    waker: Arc<Waker>,
}

impl Waker {
    /// Makes a blocked `epoll_wait` return.
    pub(crate) fn wake(&self) {
        let buf: u64 = 1;
        unsafe {
            libc::write(self.0, &buf as *const _ as *const _, 8);
        }
    }
}

impl Drop for Waker {
    fn drop(&mut self) {
        sys_close(self.0);
    }
}

impl EpollPoller {
    /// Creates the epoll instance and registers the wake-up eventfd.
    pub(crate) fn new() -> io::Result<Self> {
        let epoll = unsafe { epoll_create1(EPOLL_CLOEXEC) };
        if epoll < 0 {
            return Err(io::Error::last_os_error());
        }

        let eventfd = unsafe { libc::eventfd(0, libc::EFD_NONBLOCK | libc::EFD_CLOEXEC) };
        if eventfd < 0 {
            let err = io::Error::last_os_error();
            sys_close(epoll);
            return Err(err);
        }

        let waker = Arc::new(Waker(eventfd));

        let mut event = epoll_event {
            events: EPOLLIN as u32,
            u64: WAKE_TOKEN,
        };

        if unsafe { epoll_ctl(epoll, EPOLL_CTL_ADD, eventfd, &mut event) } < 0 {
            let err = io::Error::last_os_error();
            sys_close(epoll);
            return Err(err);
        }

        Ok(Self {
            epoll,
            events: vec![epoll_event { events: 0, u64: 0 }; EVENTS_CAPACITY],
            waker,
        })
    }

    pub(crate) fn waker(&self) -> Arc<Waker> {
        self.waker.clone()
    }

    pub(crate) fn register(&self, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        self.control(EPOLL_CTL_ADD, fd, token, interest)
    }

    pub(crate) fn reregister(&self, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        self.control(EPOLL_CTL_MOD, fd, token, interest)
    }

    /// Removes a descriptor. Errors (already removed, already closed) are ignored.
    pub(crate) fn deregister(&self, fd: RawFd) {
        unsafe {
            epoll_ctl(self.epoll, EPOLL_CTL_DEL, fd, std::ptr::null_mut());
        }
    }

    fn control(&self, op: i32, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        let mut flags = 0;

        if interest.read {
            flags |= EPOLLIN | EPOLLRDHUP;
        }
        if interest.write {
            flags |= EPOLLOUT;
        }

        let mut event = epoll_event {
            events: flags as u32,
            u64: token as u64,
        };

        if unsafe { epoll_ctl(self.epoll, op, fd, &mut event) } < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }

    /// Blocks until at least one registration is ready or the waker fires.
    ///
    /// `events` is cleared first. A wait interrupted by a signal returns
    /// `Ok(())` with no events.
    pub(crate) fn poll(&mut self, events: &mut Vec<Event>) -> io::Result<()> {
        events.clear();

        let n = unsafe {
            epoll_wait(
                self.epoll,
                self.events.as_mut_ptr(),
                self.events.len() as i32,
                -1,
            )
        };

        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        for ev in &self.events[..n as usize] {
            // Copy out of the packed struct before use.
            let (flags, token) = (ev.events, ev.u64);

            if token == WAKE_TOKEN {
                let mut buf = 0u64;
                unsafe {
                    libc::read(self.waker.0, &mut buf as *mut _ as *mut _, 8);
                }
                continue;
            }

            let readable = flags & ((EPOLLIN | EPOLLERR | EPOLLHUP | EPOLLRDHUP) as u32) != 0;
            let writable = flags & (EPOLLOUT as u32) != 0;

            merge_event(events, token as usize, readable, writable);
        }

        Ok(())
    }
}

impl Drop for EpollPoller {
    fn drop(&mut self) {
        sys_close(self.epoll);
    }
}
