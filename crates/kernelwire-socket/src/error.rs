use std::time::Duration;

/// Errors that can occur in socket operations.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// The endpoint could not be connected (bad address or transport).
    #[error("cannot connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: zmq::Error,
    },

    /// The endpoint could not be bound.
    #[error("cannot bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: zmq::Error,
    },

    /// The operation is not allowed in the socket's current state.
    #[error("invalid socket state: {0}")]
    InvalidState(&'static str),

    /// The message cannot be sent or the peer sent something unusable.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// A blocking send or receive ran out of time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Any other libzmq failure.
    #[error("zeromq error: {0}")]
    Zmq(#[from] zmq::Error),
}

impl SocketError {
    /// Classify a send/receive failure. `EAGAIN` only happens once `timeout` ran out.
    pub(crate) fn from_transfer(err: zmq::Error, timeout: Option<Duration>) -> Self {
        match err {
            zmq::Error::EAGAIN => SocketError::Timeout(timeout.unwrap_or_default()),
            zmq::Error::EFSM => SocketError::InvalidState("send and receive out of order"),
            other => SocketError::Zmq(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SocketError>;
