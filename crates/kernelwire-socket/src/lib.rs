//! Request/reply sockets for kernel channels.
//!
//! Thin layer over libzmq. A [`ReqSocket`] connects to a kernel's shell port
//! and moves whole multipart messages while libzmq handles the REQ envelope.
//! A [`RouterSocket`] is the kernel side, used by stand-in kernels. Both sit
//! behind [`MultipartSocket`] so clients can be tested without a network.
//!
//! Sockets are created from an explicit [`Context`]; nothing here keeps
//! process-wide state.

pub mod config;
pub mod connector;
pub mod endpoint;
pub mod error;
pub mod req;
pub mod router;
pub mod traits;

pub use config::{SocketConfig, DEFAULT_MAX_MESSAGE_SIZE};
pub use connector::{connect, connect_with_config};
pub use endpoint::{port_of, tcp_endpoint};
pub use error::{Result, SocketError};
pub use req::{ReqSocket, ReqState};
pub use router::RouterSocket;
pub use traits::MultipartSocket;
pub use zmq::{version as libzmq_version, Context, Error as ZmqError};
