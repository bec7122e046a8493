use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, Result};

/// A JSON object, the shape of every message field.
pub type Mapping = serde_json::Map<String, Value>;

/// The four signed frames in wire order: header, parent_header, metadata, content.
pub type ContentFrames = [Bytes; 4];

/// The four signed fields of a message, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Header,
    ParentHeader,
    Metadata,
    Content,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Header,
        Field::ParentHeader,
        Field::Metadata,
        Field::Content,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Header => "header",
            Field::ParentHeader => "parent_header",
            Field::Metadata => "metadata",
            Field::Content => "content",
        }
    }
}

/// Serialize one field as JSON text.
///
/// Key order is whatever the map holds; only the decoded value is stable.
pub fn encode_field(field: Field, value: &Mapping) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|source| ProtocolError::Encode {
            field: field.as_str(),
            source,
        })
}

/// Parse one field, which must be a UTF-8 JSON object.
pub fn decode_field(field: Field, bytes: &[u8]) -> Result<Mapping> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| ProtocolError::Decode {
        field: field.as_str(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ProtocolError::NotAMapping {
            field: field.as_str(),
        }),
    }
}

/// Minimal header: a fresh random `msg_id` and the given `msg_type`.
pub fn new_header(msg_type: &str) -> Mapping {
    let mut header = Mapping::new();
    header.insert(
        "msg_id".to_string(),
        Value::String(uuid::Uuid::new_v4().to_string()),
    );
    header.insert("msg_type".to_string(), Value::String(msg_type.to_string()));
    header
}

/// A logical kernel message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub header: Mapping,
    #[serde(default)]
    pub parent_header: Mapping,
    #[serde(default)]
    pub metadata: Mapping,
    #[serde(default)]
    pub content: Mapping,
    /// Unsigned binary frames that followed the content frame.
    #[serde(skip)]
    pub buffers: Vec<Bytes>,
}

impl Message {
    /// A message with empty parent header and metadata.
    pub fn new(header: Mapping, content: Mapping) -> Self {
        Self {
            header,
            content,
            ..Self::default()
        }
    }

    pub fn msg_id(&self) -> Option<&str> {
        self.header.get("msg_id").and_then(Value::as_str)
    }

    pub fn msg_type(&self) -> Option<&str> {
        self.header.get("msg_type").and_then(Value::as_str)
    }

    /// The `msg_id` of the request this message answers, if any.
    pub fn parent_msg_id(&self) -> Option<&str> {
        self.parent_header.get("msg_id").and_then(Value::as_str)
    }

    /// Deserialize `content` into a typed reply.
    pub fn content_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.content.clone())).map_err(|source| {
            ProtocolError::Decode {
                field: Field::Content.as_str(),
                source,
            }
        })
    }

    /// Serialize the four signed fields in wire order.
    pub fn to_frames(&self) -> Result<ContentFrames> {
        Ok([
            encode_field(Field::Header, &self.header)?,
            encode_field(Field::ParentHeader, &self.parent_header)?,
            encode_field(Field::Metadata, &self.metadata)?,
            encode_field(Field::Content, &self.content)?,
        ])
    }

    /// Inverse of [`Message::to_frames`]. Buffers start out empty.
    pub fn from_frames(frames: &ContentFrames) -> Result<Self> {
        let [header, parent_header, metadata, content] = frames;
        Ok(Self {
            header: decode_field(Field::Header, header)?,
            parent_header: decode_field(Field::ParentHeader, parent_header)?,
            metadata: decode_field(Field::Metadata, metadata)?,
            content: decode_field(Field::Content, content)?,
            buffers: Vec::new(),
        })
    }
}
