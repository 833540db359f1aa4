//! Decoding of attribute reports from text payloads.
//!
//! Gateways publish either a single JSON report object or an array of them.
//! Recorded captures are stored one JSON payload per line.

use crate::clusters::AttributeReport;
use crate::error::Result;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    One(AttributeReport),
    Many(Vec<AttributeReport>),
}

/// Decode a single payload into zero or more reports.
pub fn decode_payload(payload: &str) -> Result<Vec<AttributeReport>> {
    Ok(match serde_json::from_str::<Payload>(payload)? {
        Payload::One(report) => vec![report],
        Payload::Many(reports) => reports,
    })
}

/// Decode JSON-lines content, skipping blank lines and `#` comments.
///
/// Each item carries its 1-based line number so callers can report bad input.
pub fn decode_lines(content: &str) -> Vec<(usize, Result<Vec<AttributeReport>>)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| (idx + 1, decode_payload(line)))
        .collect()
}
