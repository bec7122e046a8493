use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::codec::{Mapping, Message};

/// Messaging protocol revision stamped into every header.
pub const PROTOCOL_VERSION: &str = "5.3";

const DEFAULT_USERNAME: &str = "kernelwire";

/// Identity shared by every message a client sends.
///
/// One session id per client; each header gets a fresh `msg_id` and the
/// current UTC time.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    username: String,
}

impl Session {
    /// New session with a random id and the login name from `USER`/`USERNAME`.
    pub fn new() -> Self {
        let username = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| DEFAULT_USERNAME.to_string());
        Self::with_username(username)
    }

    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// A complete header for a new message of `msg_type`.
    pub fn header(&self, msg_type: &str) -> Mapping {
        let mut header = Mapping::new();
        let text = |s: &str| Value::String(s.to_string());
        header.insert("msg_id".into(), text(&uuid::Uuid::new_v4().to_string()));
        header.insert("msg_type".into(), text(msg_type));
        header.insert("session".into(), text(&self.id));
        header.insert("username".into(), text(&self.username));
        header.insert(
            "date".into(),
            text(&Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        header.insert("version".into(), text(PROTOCOL_VERSION));
        header
    }

    /// A new request message with empty parent header and metadata.
    pub fn message(&self, msg_type: &str, content: Mapping) -> Message {
        Message::new(self.header(msg_type), content)
    }

    /// A reply to `parent`, carrying its header as `parent_header`.
    pub fn reply(&self, parent: &Message, msg_type: &str, content: Mapping) -> Message {
        Message {
            parent_header: parent.header.clone(),
            ..self.message(msg_type, content)
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
