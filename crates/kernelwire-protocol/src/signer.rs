use std::fmt;

use bytes::Bytes;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{ProtocolError, Result};

/// The only signature scheme kernels are expected to use.
pub const SCHEME_HMAC_SHA256: &str = "hmac-sha256";

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies the four content frames of a message.
///
/// An empty key disables signing: [`Signer::sign`] returns an empty signature
/// and [`Signer::verify`] accepts only an empty one.
#[derive(Clone)]
pub struct Signer {
    mac: Option<HmacSha256>,
}

impl Signer {
    /// HMAC-SHA256 signer for `key`.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Ok(Self::unsigned());
        }
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|err| ProtocolError::Config(format!("invalid signing key: {err}")))?;
        Ok(Self { mac: Some(mac) })
    }

    /// Signer for a named scheme. Only `hmac-sha256` is supported.
    pub fn from_scheme(scheme: &str, key: &[u8]) -> Result<Self> {
        if scheme != SCHEME_HMAC_SHA256 {
            return Err(ProtocolError::Config(format!(
                "unsupported signature scheme '{scheme}' (expected '{SCHEME_HMAC_SHA256}')"
            )));
        }
        Self::new(key)
    }

    /// A signer that produces and expects empty signatures.
    pub fn unsigned() -> Self {
        Self { mac: None }
    }

    /// Returns true if messages are actually signed.
    pub fn is_enabled(&self) -> bool {
        self.mac.is_some()
    }

    /// Lowercase hex digest over `frames` in order, as ASCII bytes.
    pub fn sign<F: AsRef<[u8]>>(&self, frames: &[F]) -> Bytes {
        let Some(mac) = &self.mac else {
            return Bytes::new();
        };
        let mut mac = mac.clone();
        for frame in frames {
            mac.update(frame.as_ref());
        }
        Bytes::from(hex::encode(mac.finalize().into_bytes()))
    }

    /// Recompute the signature and compare in constant time.
    pub fn verify<F: AsRef<[u8]>>(&self, frames: &[F], signature: &[u8]) -> bool {
        let expected = self.sign(frames);
        expected.as_ref().ct_eq(signature).into()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("scheme", &SCHEME_HMAC_SHA256)
            .field("key", &if self.is_enabled() { "<redacted>" } else { "<none>" })
            .finish()
    }
}
