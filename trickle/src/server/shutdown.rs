use crate::reactor::Waker;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Stops a running [`Server`](super::Server) from another thread.
///
/// Cloning is cheap; every clone controls the same server. Requesting a
/// shutdown wakes the event loop, which finishes its current cycle, drops
/// all open connections and returns from `run`.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl ShutdownHandle {
    pub(crate) fn new(waker: Arc<Waker>) -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            waker,
        }
    }

    /// Asks the server to stop. Calling it more than once is harmless.
    pub fn shutdown(&self) {
        self.requested.store(true, Ordering::Release);
        self.waker.wake();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
