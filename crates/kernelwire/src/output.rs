use std::io::{IsTerminal, Write};
use std::time::Duration;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use kernelwire_protocol::{Mapping, Message};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    msg_type: Option<&'a str>,
    msg_id: Option<&'a str>,
    parent_msg_id: Option<&'a str>,
    elapsed_ms: f64,
    content: &'a Mapping,
}

/// Rows shown for the table and pretty formats.
#[derive(Debug)]
pub struct ReplyView {
    pub title: &'static str,
    pub columns: [&'static str; 2],
    pub rows: Vec<[String; 2]>,
}

pub fn print_reply(reply: &Message, elapsed: Duration, view: &ReplyView, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReplyOutput {
                msg_type: reply.msg_type(),
                msg_id: reply.msg_id(),
                parent_msg_id: reply.parent_msg_id(),
                elapsed_ms: (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0,
                content: &reply.content,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(view.columns.to_vec());
            for row in &view.rows {
                table.add_row(row.to_vec());
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{}:", view.title);
            let width = view.rows.iter().map(|[k, _]| k.len()).max().unwrap_or(0);
            for [key, value] in &view.rows {
                println!("  {key:<width$}  {value}");
            }
        }
        OutputFormat::Raw => {
            let text = serde_json::to_string(&reply.content).unwrap_or_else(|_| "{}".to_string());
            print_raw(text.as_bytes());
            print_raw(b"\n");
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Render a content value for a table cell.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
