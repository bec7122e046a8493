use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::config::SocketConfig;
use crate::endpoint::{port_of, tcp_endpoint};
use crate::error::{Result, SocketError};
use crate::traits::MultipartSocket;

/// Kernel side of a shell channel.
///
/// Every received message starts with the peer's routing identity followed by
/// the empty envelope frame; sending the same prefix back routes the reply.
pub struct RouterSocket {
    socket: zmq::Socket,
    endpoint: String,
    port: u16,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl RouterSocket {
    /// Bind on `host:port`. Port `0` picks a free one; see [`RouterSocket::port`].
    pub fn bind(context: &zmq::Context, host: &str, port: u16, config: &SocketConfig) -> Result<Self> {
        let requested = if port == 0 {
            format!("tcp://{host}:*")
        } else {
            tcp_endpoint(host, port)
        };

        let socket = context.socket(zmq::ROUTER)?;
        config.apply(&socket)?;
        socket.bind(&requested).map_err(|source| SocketError::Bind {
            endpoint: requested.clone(),
            source,
        })?;

        let endpoint = socket
            .get_last_endpoint()?
            .map_err(|_| SocketError::Protocol("bound endpoint is not UTF-8".to_string()))?;
        let port = port_of(&endpoint)
            .ok_or_else(|| SocketError::Protocol(format!("no port in endpoint {endpoint}")))?;
        debug!(endpoint = %endpoint, "ROUTER socket bound");

        Ok(Self {
            socket,
            endpoint,
            port,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
        })
    }

    /// Endpoint peers connect to, with the resolved port.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl MultipartSocket for RouterSocket {
    fn send_multipart(&mut self, parts: &[Bytes]) -> Result<()> {
        if parts.len() < 2 {
            return Err(SocketError::Protocol(
                "router messages need a routing identity".to_string(),
            ));
        }
        self.socket
            .send_multipart(parts.iter().map(|part| &part[..]), 0)
            .map_err(|err| SocketError::from_transfer(err, self.write_timeout))
    }

    fn recv_multipart(&mut self) -> Result<Vec<Bytes>> {
        let parts = self
            .socket
            .recv_multipart(0)
            .map_err(|err| SocketError::from_transfer(err, self.read_timeout))?;
        Ok(parts.into_iter().map(Bytes::from).collect())
    }
}

impl std::fmt::Debug for RouterSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterSocket")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_port_is_resolved() {
        let ctx = zmq::Context::new();
        let router = RouterSocket::bind(&ctx, "127.0.0.1", 0, &SocketConfig::default()).unwrap();
        assert_ne!(router.port(), 0);
        assert_eq!(router.endpoint(), tcp_endpoint("127.0.0.1", router.port()));
    }

    #[test]
    fn port_in_use_fails_to_bind() {
        let ctx = zmq::Context::new();
        let first = RouterSocket::bind(&ctx, "127.0.0.1", 0, &SocketConfig::default()).unwrap();
        let err =
            RouterSocket::bind(&ctx, "127.0.0.1", first.port(), &SocketConfig::default()).unwrap_err();
        assert!(matches!(err, SocketError::Bind { .. }));
    }

    #[test]
    fn recv_times_out_without_peers() {
        let ctx = zmq::Context::new();
        let config = SocketConfig::default().with_timeout(Duration::from_millis(50));
        let mut router = RouterSocket::bind(&ctx, "127.0.0.1", 0, &config).unwrap();
        let err = router.recv_multipart().unwrap_err();
        assert!(matches!(err, SocketError::Timeout(_)));
    }

    #[test]
    fn send_requires_identity() {
        let ctx = zmq::Context::new();
        let mut router = RouterSocket::bind(&ctx, "127.0.0.1", 0, &SocketConfig::default()).unwrap();
        let err = router
            .send_multipart(&[Bytes::from_static(b"orphan")])
            .unwrap_err();
        assert!(matches!(err, SocketError::Protocol(_)));
    }
}
