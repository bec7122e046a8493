use std::path::PathBuf;

/// Errors that can occur while encoding, signing or framing kernel messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A message field is not valid UTF-8 JSON.
    #[error("cannot decode {field}: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A message field is valid JSON but not an object.
    #[error("{field} is not a JSON object")]
    NotAMapping { field: &'static str },

    /// A message field could not be serialized.
    #[error("cannot encode {field}: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The reply signature does not match its content frames.
    #[error("signature mismatch")]
    SignatureMismatch,

    /// The frame list does not have the delimiter/signature/content layout.
    #[error("framing error: {0}")]
    Framing(String),

    /// Invalid connection settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// The connection file could not be read.
    #[error("cannot read connection file {}: {source}", .path.display())]
    ConnectionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
