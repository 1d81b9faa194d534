//! Platform-specific readiness poller.
//!
//! The concrete backend is chosen at compile time:
//! - `epoll` on Linux and Android,
//! - `kqueue` on macOS.
//!
//! Both expose the same crate-private surface (`new`, `register`,
//! `reregister`, `deregister`, `poll`, `waker`) so the reactor never
//! names a backend directly.

pub(crate) mod common;

pub(crate) use common::{Interest, Waker};

#[cfg(any(target_os = "linux", target_os = "android"))]
mod epoll;

#[cfg(target_os = "macos")]
mod kqueue;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) type Poller = epoll::EpollPoller;

#[cfg(target_os = "macos")]
pub(crate) type Poller = kqueue::KqueuePoller;

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
compile_error!("trickle needs epoll (Linux) or kqueue (macOS)");

pub(crate) mod unix;

pub(crate) use unix as platform;
