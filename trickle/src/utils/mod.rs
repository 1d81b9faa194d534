//! Small data structures shared by the server.
//!
//! Currently only the [`Slab`] that maps poller tokens to connections.

mod slab;

pub(crate) use slab::Slab;
