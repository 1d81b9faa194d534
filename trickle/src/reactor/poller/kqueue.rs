//! macOS `kqueue` backend.
//!
//! Exposes the same surface as the epoll poller. Read and write interest map
//! to two separate filters, so one socket may produce two kernel events per
//! cycle; they are merged into a single [`Event`].

use super::common::{Interest, Waker};
use super::unix::sys_close;
use crate::reactor::event::{Event, merge_event};

use libc::{
    EV_ADD, EV_CLEAR, EV_DELETE, EV_ENABLE, EV_EOF, EV_ERROR, EVFILT_READ, EVFILT_USER,
    EVFILT_WRITE, NOTE_TRIGGER, kevent, kqueue,
};
use std::io;
use std::os::unix::io::RawFd;
use std::ptr;
use std::sync::Arc;

/// Identifier of the user event used to wake the poller.
const WAKE_IDENT: usize = 1;

/// Token carried in `udata` by the wake-up event.
const WAKE_TOKEN: usize = usize::MAX;

const EVENTS_CAPACITY: usize = 256;

fn change(ident: usize, filter: i16, flags: u16, fflags: u32, token: usize) -> kevent {
    kevent {
        ident,
        filter,
        flags,
        fflags,
        data: 0,
        udata: token as *mut _,
    }
}

fn submit(kq: RawFd, changes: &[kevent]) -> io::Result<()> {
    let rc = unsafe {
        kevent(
            kq,
            changes.as_ptr(),
            changes.len() as i32,
            ptr::null_mut(),
            0,
            ptr::null(),
        )
    };

    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// macOS `kqueue` poller.
pub(crate) struct KqueuePoller {
    kqueue: RawFd,
    events: Vec<kevent>,
    waker: Arc<Waker>,
}

// The raw `udata` pointers in the event buffer are plain tokens, never dereferenced.
unsafe impl Send for KqueuePoller {}

impl Waker {
    /// Triggers the user event so a blocked `kevent` call returns.
    pub(crate) fn wake(&self) {
        let trigger = change(WAKE_IDENT, EVFILT_USER, 0, NOTE_TRIGGER, WAKE_TOKEN);
        let _ = submit(self.0, &[trigger]);
    }
}

impl Drop for Waker {
    fn drop(&mut self) {
        sys_close(self.0);
    }
}

impl KqueuePoller {
    pub(crate) fn new() -> io::Result<Self> {
        let kq = unsafe { kqueue() };
        if kq < 0 {
            return Err(io::Error::last_os_error());
        }

        let user = change(WAKE_IDENT, EVFILT_USER, EV_ADD | EV_ENABLE | EV_CLEAR, 0, WAKE_TOKEN);
        if let Err(e) = submit(kq, &[user]) {
            sys_close(kq);
            return Err(e);
        }

        // The waker owns its own descriptor so it stays valid after the poller is dropped.
        let wake_fd = unsafe { libc::dup(kq) };
        if wake_fd < 0 {
            let err = io::Error::last_os_error();
            sys_close(kq);
            return Err(err);
        }

        Ok(Self {
            kqueue: kq,
            events: vec![change(0, 0, 0, 0, 0); EVENTS_CAPACITY],
            waker: Arc::new(Waker(wake_fd)),
        })
    }

    pub(crate) fn waker(&self) -> Arc<Waker> {
        self.waker.clone()
    }

    pub(crate) fn register(&self, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        let mut changes = Vec::with_capacity(2);

        if interest.read {
            changes.push(change(fd as usize, EVFILT_READ, EV_ADD | EV_ENABLE, 0, token));
        }
        if interest.write {
            changes.push(change(fd as usize, EVFILT_WRITE, EV_ADD | EV_ENABLE, 0, token));
        }

        submit(self.kqueue, &changes)
    }

    /// Adds the wanted filters and drops the unwanted ones.
    pub(crate) fn reregister(&self, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        self.register(fd, token, interest)?;

        if !interest.read {
            let _ = submit(self.kqueue, &[change(fd as usize, EVFILT_READ, EV_DELETE, 0, 0)]);
        }
        if !interest.write {
            let _ = submit(self.kqueue, &[change(fd as usize, EVFILT_WRITE, EV_DELETE, 0, 0)]);
        }

        Ok(())
    }

    /// Removes both filters; a filter that was never added is not an error.
    pub(crate) fn deregister(&self, fd: RawFd) {
        for filter in [EVFILT_READ, EVFILT_WRITE] {
            let _ = submit(self.kqueue, &[change(fd as usize, filter, EV_DELETE, 0, 0)]);
        }
    }

    pub(crate) fn poll(&mut self, events: &mut Vec<Event>) -> io::Result<()> {
        events.clear();

        let n = unsafe {
            kevent(
                self.kqueue,
                ptr::null(),
                0,
                self.events.as_mut_ptr(),
                self.events.len() as i32,
                ptr::null(),
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
            let token = ev.udata as usize;

            if ev.filter == EVFILT_USER || token == WAKE_TOKEN {
                continue;
            }

            let failed = ev.flags & (EV_EOF | EV_ERROR) != 0;
            let readable = ev.filter == EVFILT_READ || failed;
            let writable = ev.filter == EVFILT_WRITE;

            merge_event(events, token, readable, writable);
        }

        Ok(())
    }
}

impl Drop for KqueuePoller {
    fn drop(&mut self) {
        sys_close(self.kqueue);
    }
}
