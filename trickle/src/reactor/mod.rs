//! Readiness multiplexing.
//!
//! This module wraps the operating system's readiness facility behind the
//! [`Reactor`] type. The reactor is responsible for:
//! - keeping the set of monitored sockets and their interests,
//! - blocking until at least one of them is ready,
//! - being woken from another thread when the server must stop.
//!
//! It knows nothing about HTTP or connections; it only moves tokens.

mod core;

pub(crate) mod event;
pub(crate) mod poller;

pub(crate) use core::Reactor;
pub(crate) use event::Event;
pub(crate) use poller::{Interest, Waker};
