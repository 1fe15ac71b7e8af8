//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`, `skipped_line_notice`.
//! Role: Shared contract helper for CLI diagnostics (non-error events).
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use serde_json::{Map, Value, json};

use crate::core::reader::SkippedLine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub file: String,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("file".to_string(), json!(notice.file));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// Notice for a malformed line dropped under the skip policy.
pub fn skipped_line_notice(skipped: &SkippedLine, cmd: &str, file: &str, time: String) -> Notice {
    let mut details = Map::new();
    details.insert("line".to_string(), json!(skipped.line));
    details.insert("fields".to_string(), json!(skipped.fields));
    details.insert("text".to_string(), json!(skipped.text));
    Notice {
        kind: "skipped_line".to_string(),
        time,
        cmd: cmd.to_string(),
        file: file.to_string(),
        message: format!(
            "skipped line {}: expected 5 fields, found {}",
            skipped.line, skipped.fields
        ),
        details,
    }
}
