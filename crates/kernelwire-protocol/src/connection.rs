use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProtocolError, Result};
use crate::signer::{Signer, SCHEME_HMAC_SHA256};

const TRANSPORT_TCP: &str = "tcp";

fn default_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_transport() -> String {
    TRANSPORT_TCP.to_string()
}

fn default_signature_scheme() -> String {
    SCHEME_HMAC_SHA256.to_string()
}

/// Contents of a kernel connection file.
///
/// Only `shell_port` and `key` are required. Unknown fields are ignored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub shell_port: u16,
    pub key: String,
    #[serde(default = "default_ip")]
    pub ip: String,
    #[serde(default = "default_transport")]
    pub transport: String,
    #[serde(default = "default_signature_scheme")]
    pub signature_scheme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iopub_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hb_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_name: Option<String>,
}

impl ConnectionInfo {
    /// Loopback TCP descriptor with the given shell port and key.
    pub fn new(shell_port: u16, key: impl Into<String>) -> Self {
        Self {
            shell_port,
            key: key.into(),
            ip: default_ip(),
            transport: default_transport(),
            signature_scheme: default_signature_scheme(),
            iopub_port: None,
            stdin_port: None,
            control_port: None,
            hb_port: None,
            kernel_name: None,
        }
    }

    /// Read and validate a connection file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ProtocolError::ConnectionFile {
            path: path.to_path_buf(),
            source,
        })?;
        let info = Self::from_reader(std::io::BufReader::new(file))?;
        debug!(path = %path.display(), port = info.shell_port, "loaded connection file");
        Ok(info)
    }

    /// Parse and validate connection JSON from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let info: Self = serde_json::from_reader(reader)
            .map_err(|err| ProtocolError::Config(format!("invalid connection file: {err}")))?;
        info.validate()?;
        Ok(info)
    }

    /// Parse and validate connection JSON from a string.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Reject transports and signature schemes this client cannot speak.
    pub fn validate(&self) -> Result<()> {
        if self.transport != TRANSPORT_TCP {
            return Err(ProtocolError::Config(format!(
                "unsupported transport '{}' (only '{TRANSPORT_TCP}' is supported)",
                self.transport
            )));
        }
        if self.signature_scheme != SCHEME_HMAC_SHA256 {
            return Err(ProtocolError::Config(format!(
                "unsupported signature scheme '{}' (expected '{SCHEME_HMAC_SHA256}')",
                self.signature_scheme
            )));
        }
        if self.shell_port == 0 {
            return Err(ProtocolError::Config("shell_port must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Signer for this connection's key and scheme.
    pub fn signer(&self) -> Result<Signer> {
        Signer::from_scheme(&self.signature_scheme, self.key.as_bytes())
    }

    /// `tcp://ip:shell_port`, for display.
    pub fn shell_endpoint(&self) -> String {
        format!("{}://{}:{}", self.transport, self.ip, self.shell_port)
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key: &dyn fmt::Debug = if self.key.is_empty() {
            &""
        } else {
            &"<redacted>"
        };
        f.debug_struct("ConnectionInfo")
            .field("shell_port", &self.shell_port)
            .field("key", key)
            .field("ip", &self.ip)
            .field("transport", &self.transport)
            .field("signature_scheme", &self.signature_scheme)
            .field("kernel_name", &self.kernel_name)
            .finish_non_exhaustive()
    }
}
