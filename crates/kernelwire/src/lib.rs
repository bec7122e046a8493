//! Signed shell-channel messaging for Jupyter kernels.
//!
//! kernelwire talks to a running kernel over the request/reply (shell)
//! socket named in its connection file, through a libzmq REQ socket. The
//! default `vendored` feature of the socket crate builds libzmq from source.
//!
//! # Crate Structure
//!
//! - [`socket`]: REQ and ROUTER multipart sockets over libzmq
//! - [`protocol`]: Message codec, HMAC signer, wire framer, connection file
//! - [`client`]: Blocking shell client with typed replies

/// Re-export socket types.
pub mod socket {
    pub use kernelwire_socket::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use kernelwire_protocol::*;
}

/// Re-export client types.
pub mod client {
    pub use kernelwire_client::*;
}

pub use kernelwire_client::{ClientError, ShellClient};
pub use kernelwire_protocol::{ConnectionInfo, Message};
