use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::{millis, SocketConfig};
use crate::error::{Result, SocketError};
use crate::traits::MultipartSocket;

/// Where a REQ socket is in its send/receive cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReqState {
    /// Ready to send a request.
    Idle,
    /// A request was sent; the next operation must be a receive.
    AwaitingReply,
}

/// Client side of a request/reply channel.
///
/// libzmq adds and strips the empty envelope frame, so callers only ever see
/// application parts. Strict alternation is checked here before libzmq would
/// refuse with `EFSM`, so misuse is reported as [`SocketError::InvalidState`].
pub struct ReqSocket {
    socket: zmq::Socket,
    endpoint: String,
    state: ReqState,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl ReqSocket {
    /// Create a REQ socket in `context` and connect it to `endpoint`.
    ///
    /// libzmq connects in the background; an unreachable kernel shows up as
    /// a send or receive timeout, not here.
    pub fn connect(context: &zmq::Context, endpoint: &str, config: &SocketConfig) -> Result<Self> {
        let socket = context.socket(zmq::REQ)?;
        config.apply(&socket)?;
        socket
            .connect(endpoint)
            .map_err(|source| SocketError::Connect {
                endpoint: endpoint.to_string(),
                source,
            })?;
        debug!(endpoint, "REQ socket connecting");

        Ok(Self {
            socket,
            endpoint: endpoint.to_string(),
            state: ReqState::Idle,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
        })
    }

    /// Current position in the request/reply cycle.
    pub fn state(&self) -> ReqState {
        self.state
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Change the receive timeout. `None` blocks forever.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_rcvtimeo(millis(timeout))?;
        self.read_timeout = timeout;
        Ok(())
    }
}

impl MultipartSocket for ReqSocket {
    fn send_multipart(&mut self, parts: &[Bytes]) -> Result<()> {
        if self.state == ReqState::AwaitingReply {
            return Err(SocketError::InvalidState(
                "cannot send while a reply is outstanding",
            ));
        }
        if parts.is_empty() {
            return Err(SocketError::Protocol("empty message".to_string()));
        }

        self.socket
            .send_multipart(parts.iter().map(|part| &part[..]), 0)
            .map_err(|err| SocketError::from_transfer(err, self.write_timeout))?;
        self.state = ReqState::AwaitingReply;
        trace!(parts = parts.len(), "request sent");
        Ok(())
    }

    fn recv_multipart(&mut self) -> Result<Vec<Bytes>> {
        if self.state == ReqState::Idle {
            return Err(SocketError::InvalidState(
                "cannot receive before sending a request",
            ));
        }

        // A timeout leaves the socket waiting, so the reply can still be collected.
        let parts = self
            .socket
            .recv_multipart(0)
            .map_err(|err| SocketError::from_transfer(err, self.read_timeout))?;
        self.state = ReqState::Idle;
        trace!(parts = parts.len(), "reply received");
        Ok(parts.into_iter().map(Bytes::from).collect())
    }
}

impl std::fmt::Debug for ReqSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqSocket")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RouterSocket;

    fn kernel(ctx: &zmq::Context) -> RouterSocket {
        let config = SocketConfig::default().with_timeout(Duration::from_secs(5));
        RouterSocket::bind(ctx, "127.0.0.1", 0, &config).unwrap()
    }

    fn client(ctx: &zmq::Context, kernel: &RouterSocket) -> ReqSocket {
        let config = SocketConfig::default().with_timeout(Duration::from_secs(5));
        ReqSocket::connect(ctx, kernel.endpoint(), &config).unwrap()
    }

    fn parts(items: &[&'static [u8]]) -> Vec<Bytes> {
        items.iter().map(|p| Bytes::from_static(p)).collect()
    }

    #[test]
    fn request_reply_round_trip() {
        let ctx = zmq::Context::new();
        let mut router = kernel(&ctx);
        let mut req = client(&ctx, &router);

        req.send_multipart(&parts(&[b"<IDS|MSG>", b"sig", b"{}"])).unwrap();
        assert_eq!(req.state(), ReqState::AwaitingReply);

        // Routing identity, then the empty envelope, then the parts.
        let received = router.recv_multipart().unwrap();
        assert_eq!(received.len(), 5);
        assert!(received[1].is_empty());
        assert_eq!(&received[2..], &parts(&[b"<IDS|MSG>", b"sig", b"{}"])[..]);

        let mut reply = received[..2].to_vec();
        reply.extend(parts(&[b"reply"]));
        router.send_multipart(&reply).unwrap();

        assert_eq!(req.recv_multipart().unwrap(), parts(&[b"reply"]));
        assert_eq!(req.state(), ReqState::Idle);
    }

    #[test]
    fn second_send_is_invalid_state() {
        let ctx = zmq::Context::new();
        let router = kernel(&ctx);
        let mut req = client(&ctx, &router);

        req.send_multipart(&parts(&[b"one"])).unwrap();
        let err = req.send_multipart(&parts(&[b"two"])).unwrap_err();
        assert!(matches!(err, SocketError::InvalidState(_)));
    }

    #[test]
    fn recv_before_send_is_invalid_state() {
        let ctx = zmq::Context::new();
        let router = kernel(&ctx);
        let mut req = client(&ctx, &router);

        let err = req.recv_multipart().unwrap_err();
        assert!(matches!(err, SocketError::InvalidState(_)));
    }

    #[test]
    fn empty_message_rejected() {
        let ctx = zmq::Context::new();
        let router = kernel(&ctx);
        let mut req = client(&ctx, &router);

        let err = req.send_multipart(&[]).unwrap_err();
        assert!(matches!(err, SocketError::Protocol(_)));
        assert_eq!(req.state(), ReqState::Idle);
    }

    #[test]
    fn read_timeout_keeps_reply_collectable() {
        let ctx = zmq::Context::new();
        let mut router = kernel(&ctx);
        let mut req = client(&ctx, &router);
        req.set_read_timeout(Some(Duration::from_millis(100))).unwrap();

        req.send_multipart(&parts(&[b"slow"])).unwrap();
        let request = router.recv_multipart().unwrap();

        let err = req.recv_multipart().unwrap_err();
        assert!(matches!(err, SocketError::Timeout(d) if d == Duration::from_millis(100)));
        assert_eq!(req.state(), ReqState::AwaitingReply);

        let mut reply = request[..2].to_vec();
        reply.extend(parts(&[b"late"]));
        router.send_multipart(&reply).unwrap();

        req.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        assert_eq!(req.recv_multipart().unwrap(), parts(&[b"late"]));
    }

    #[test]
    fn unreachable_kernel_times_out_on_send() {
        let ctx = zmq::Context::new();
        let config = SocketConfig::default().with_timeout(Duration::from_millis(200));
        let mut req = ReqSocket::connect(&ctx, "tcp://127.0.0.1:1", &config).unwrap();

        let err = req.send_multipart(&parts(&[b"hello"])).unwrap_err();
        assert!(matches!(err, SocketError::Timeout(_)));
        assert_eq!(req.state(), ReqState::Idle);
    }

    #[test]
    fn malformed_endpoint_fails_to_connect() {
        let ctx = zmq::Context::new();
        let err = ReqSocket::connect(&ctx, "bogus://nowhere", &SocketConfig::default()).unwrap_err();
        assert!(matches!(err, SocketError::Connect { ref endpoint, .. } if endpoint == "bogus://nowhere"));
    }

    #[test]
    fn debug_shows_endpoint_and_state() {
        let ctx = zmq::Context::new();
        let router = kernel(&ctx);
        let req = client(&ctx, &router);
        let rendered = format!("{req:?}");
        assert!(rendered.contains(router.endpoint()));
        assert!(rendered.contains("Idle"));
    }
}
