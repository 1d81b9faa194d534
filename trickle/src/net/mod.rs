//! Non-blocking TCP primitives.
//!
//! These are thinner than `std::net`: every call maps to one
//! syscall on a descriptor already switched to non-blocking mode, which is
//! what a readiness-driven loop needs.

mod listener;
mod socket;

pub use listener::Listener;
pub use socket::Socket;
