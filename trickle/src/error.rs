use std::io;
use std::net::SocketAddr;

/// Failures that stop the server as a whole.
///
/// Errors on an individual client socket never show up here: the event loop
/// closes that connection and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("could not listen on {address}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("could not create the readiness poller")]
    Poller(#[source] io::Error),

    #[error("could not register the listening socket")]
    Register(#[source] io::Error),

    #[error("readiness poll failed")]
    Poll(#[source] io::Error),
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;
