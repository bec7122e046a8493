use std::fmt;
use std::io;

use kernelwire_client::ClientError;
use kernelwire_protocol::ProtocolError;
use kernelwire_socket::SocketError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::UnexpectedEof => TRANSPORT_ERROR,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn socket_error(context: &str, err: SocketError) -> CliError {
    let code = match &err {
        SocketError::Timeout(_) => TIMEOUT,
        SocketError::InvalidState(_) => INTERNAL,
        SocketError::Protocol(_) => DATA_INVALID,
        SocketError::Connect { .. } | SocketError::Bind { .. } | SocketError::Zmq(_) => {
            TRANSPORT_ERROR
        }
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn protocol_error(context: &str, err: ProtocolError) -> CliError {
    match err {
        ProtocolError::ConnectionFile { path, source } => {
            io_error(&format!("{context} {}", path.display()), source)
        }
        ProtocolError::Encode { .. } => CliError::new(INTERNAL, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Socket(err) => socket_error(context, err),
        ClientError::Protocol(err) => protocol_error(context, err),
        ClientError::UnexpectedReply { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn signature_mismatch_is_data_invalid() {
        let err = client_error(
            "kernel-info",
            ClientError::Protocol(ProtocolError::SignatureMismatch),
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("kernel-info: "));
    }

    #[test]
    fn malformed_endpoint_is_transport() {
        let err = client_error(
            "connect",
            ClientError::Socket(SocketError::Connect {
                endpoint: "bogus://x".to_string(),
                source: kernelwire_socket::ZmqError::EPROTONOSUPPORT,
            }),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.contains("bogus://x"));
    }

    #[test]
    fn reply_timeout_is_124() {
        let err = client_error(
            "kernel-info",
            ClientError::Socket(SocketError::Timeout(Duration::from_secs(1))),
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn out_of_order_socket_use_is_internal() {
        let err = socket_error("send", SocketError::InvalidState("reply outstanding"));
        assert_eq!(err.code, INTERNAL);
    }

    #[test]
    fn missing_connection_file_is_failure() {
        let err = protocol_error(
            "load",
            ProtocolError::ConnectionFile {
                path: "/nope.json".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.starts_with("load /nope.json: "));
    }
}
