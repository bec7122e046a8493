use crate::config::SocketConfig;
use crate::error::Result;
use crate::req::ReqSocket;

/// Connect a REQ socket to `endpoint` in a fresh context with default options.
pub fn connect(endpoint: &str) -> Result<ReqSocket> {
    connect_with_config(&zmq::Context::new(), endpoint, &SocketConfig::default())
}

/// Connect a REQ socket in `context` with explicit timeouts and limits.
pub fn connect_with_config(
    context: &zmq::Context,
    endpoint: &str,
    config: &SocketConfig,
) -> Result<ReqSocket> {
    ReqSocket::connect(context, endpoint, config)
}
