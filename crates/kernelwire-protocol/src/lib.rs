//! Jupyter messaging protocol core.
//!
//! A kernel message on the wire is a list of frames:
//!
//! ```text
//! [identities...] <IDS|MSG> signature header parent_header metadata content [buffers...]
//! ```
//!
//! The signature is a lowercase hex HMAC-SHA256 over the four JSON frames
//! that follow it. This crate turns logical [`Message`]s into that frame list
//! and back, and loads the connection file that carries the shared key.

pub mod codec;
pub mod connection;
pub mod error;
pub mod session;
pub mod signer;
pub mod wire;

pub use codec::{decode_field, encode_field, new_header, ContentFrames, Field, Mapping, Message};
pub use connection::ConnectionInfo;
pub use error::{ProtocolError, Result};
pub use session::{Session, PROTOCOL_VERSION};
pub use signer::{Signer, SCHEME_HMAC_SHA256};
pub use wire::{
    assemble, deserialize, serialize, split, split_with, TrailingFrames, WireMessage, DELIMITER,
};
