//! Typed `content` of shell requests that carry more than a field or two.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `execute_request` content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub code: String,
    /// Run without broadcasting output or incrementing the execution count.
    pub silent: bool,
    pub store_history: bool,
    /// Expressions evaluated after the code runs, keyed by name.
    pub user_expressions: BTreeMap<String, String>,
    pub allow_stdin: bool,
    /// Abort queued executions if this one raises.
    pub stop_on_error: bool,
}

impl ExecuteRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            silent: false,
            store_history: true,
            user_expressions: BTreeMap::new(),
            allow_stdin: false,
            stop_on_error: true,
        }
    }

    /// Silent runs never touch history.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self.store_history = false;
        self
    }

    pub fn user_expression(mut self, name: impl Into<String>, expr: impl Into<String>) -> Self {
        self.user_expressions.insert(name.into(), expr.into());
        self
    }
}

/// Which slice of history a `history_request` asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hist_access_type", rename_all = "lowercase")]
pub enum HistoryAccess {
    /// The last `n` cells.
    Tail { n: u32 },
    /// Lines `start..stop` of `session`; negative sessions count back from the current one.
    Range { session: i64, start: u64, stop: u64 },
    /// Cells matching a glob `pattern`.
    Search {
        pattern: String,
        #[serde(default)]
        unique: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        n: Option<u32>,
    },
}

/// `history_request` content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Include outputs alongside inputs.
    pub output: bool,
    /// Return raw input instead of transformed input.
    pub raw: bool,
    #[serde(flatten)]
    pub access: HistoryAccess,
}

impl HistoryRequest {
    pub fn tail(n: u32) -> Self {
        Self {
            output: false,
            raw: true,
            access: HistoryAccess::Tail { n },
        }
    }

    pub fn with_output(mut self) -> Self {
        self.output = true;
        self
    }
}
