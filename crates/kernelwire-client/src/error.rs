use kernelwire_protocol::ProtocolError;
use kernelwire_socket::SocketError;

/// Errors that can occur while talking to a kernel.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection or transport failure.
    #[error("socket error: {0}")]
    Socket(#[from] SocketError),

    /// Bad signature, framing or JSON in a message.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The reply answers a different request.
    #[error("reply to '{parent}' received while waiting for '{expected}'")]
    UnexpectedReply { expected: String, parent: String },
}

impl ClientError {
    /// Returns true for a reply whose signature did not verify.
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, ClientError::Protocol(ProtocolError::SignatureMismatch))
    }

    /// Returns true if a blocking receive ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Socket(SocketError::Timeout(_)))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
