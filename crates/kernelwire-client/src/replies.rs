//! Typed `content` of shell replies.
//!
//! Decode with [`Message::content_as`](kernelwire_protocol::Message::content_as).
//! Fields kernels commonly omit default instead of failing.

use std::collections::BTreeMap;

use kernelwire_protocol::Mapping;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome a kernel reports for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    #[default]
    Ok,
    Error,
    Aborted,
}

impl ReplyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReplyStatus::Ok => "ok",
            ReplyStatus::Error => "error",
            ReplyStatus::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpLink {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pygments_lexer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbconvert_exporter: Option<String>,
}

/// `kernel_info_reply` content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelInfoReply {
    #[serde(default)]
    pub status: ReplyStatus,
    pub protocol_version: String,
    #[serde(default)]
    pub implementation: String,
    #[serde(default)]
    pub implementation_version: String,
    #[serde(default)]
    pub language_info: LanguageInfo,
    #[serde(default)]
    pub banner: String,
    #[serde(default)]
    pub debugger: bool,
    #[serde(default)]
    pub help_links: Vec<HelpLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommInfo {
    pub target_name: String,
}

/// `comm_info_reply` content: open comms keyed by comm id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommInfoReply {
    #[serde(default)]
    pub status: ReplyStatus,
    #[serde(default)]
    pub comms: BTreeMap<String, CommInfo>,
}

/// `shutdown_reply` content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownReply {
    #[serde(default)]
    pub status: ReplyStatus,
    #[serde(default)]
    pub restart: bool,
}

/// `inspect_reply` content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectReply {
    #[serde(default)]
    pub status: ReplyStatus,
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub data: Mapping,
    #[serde(default)]
    pub metadata: Mapping,
}

/// `execute_reply` content. Errors carry [`ErrorReply`] fields as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteReply {
    #[serde(default)]
    pub status: ReplyStatus,
    #[serde(default)]
    pub execution_count: Option<u64>,
    #[serde(default)]
    pub user_expressions: Mapping,
    #[serde(default)]
    pub payload: Vec<Value>,
}

/// `complete_reply` content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompleteReply {
    #[serde(default)]
    pub status: ReplyStatus,
    #[serde(default)]
    pub matches: Vec<String>,
    /// Range of `code` the matches replace.
    #[serde(default)]
    pub cursor_start: usize,
    #[serde(default)]
    pub cursor_end: usize,
    #[serde(default)]
    pub metadata: Mapping,
}

/// One history cell: input alone, or input with its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryCell {
    Input(String),
    InputOutput(String, Option<String>),
}

impl HistoryCell {
    pub fn input(&self) -> &str {
        match self {
            HistoryCell::Input(input) | HistoryCell::InputOutput(input, _) => input,
        }
    }
}

/// `(session, line, cell)` as kernels send it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry(pub i64, pub u64, pub HistoryCell);

/// `history_reply` content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryReply {
    #[serde(default)]
    pub status: ReplyStatus,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsCompleteStatus {
    Complete,
    Incomplete,
    Invalid,
    Unknown,
}

/// `is_complete_reply` content. `indent` is only meaningful when incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsCompleteReply {
    pub status: IsCompleteStatus,
    #[serde(default)]
    pub indent: String,
}

/// Content of any reply whose status is `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    #[serde(default)]
    pub ename: String,
    #[serde(default)]
    pub evalue: String,
    #[serde(default)]
    pub traceback: Vec<String>,
}
