use bytes::Bytes;

use crate::error::Result;

/// A socket that moves whole multipart messages.
///
/// A message is sent and received atomically: the parts of one message are
/// never interleaved with another message on the same socket. A REQ socket
/// hides its envelope; a ROUTER socket exposes the routing identity and empty
/// frame as the leading parts.
pub trait MultipartSocket {
    /// Send one multipart message (blocking).
    fn send_multipart(&mut self, parts: &[Bytes]) -> Result<()>;

    /// Receive one multipart message (blocking).
    fn recv_multipart(&mut self) -> Result<Vec<Bytes>>;
}

impl<S: MultipartSocket + ?Sized> MultipartSocket for &mut S {
    fn send_multipart(&mut self, parts: &[Bytes]) -> Result<()> {
        (**self).send_multipart(parts)
    }

    fn recv_multipart(&mut self) -> Result<Vec<Bytes>> {
        (**self).recv_multipart()
    }
}

impl<S: MultipartSocket + ?Sized> MultipartSocket for Box<S> {
    fn send_multipart(&mut self, parts: &[Bytes]) -> Result<()> {
        (**self).send_multipart(parts)
    }

    fn recv_multipart(&mut self) -> Result<Vec<Bytes>> {
        (**self).recv_multipart()
    }
}
