//! JSON Lines records to match against.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::io::BufRead;

use crate::filter::Input;

/// One input line and the attributes decoded from it.
#[derive(Debug, Clone)]
pub struct Record {
    pub line: String,
    pub input: Input,
}

/// Turn a JSON object into attributes. Arrays are value sequences, any
/// other value becomes a one-element sequence.
pub fn to_input(object: serde_json::Map<String, Value>) -> Input {
    object
        .into_iter()
        .map(|(key, value)| {
            let values = match value {
                Value::Array(values) => values,
                other => vec![other],
            };
            (key, values)
        })
        .collect()
}

pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("Input: Failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("Input: Invalid JSON on line {}", line_no))?;
        let Value::Object(object) = value else {
            bail!("Input: Line {} is not a JSON object", line_no);
        };

        records.push(Record {
            line,
            input: to_input(object),
        });
    }
    tracing::debug!("Read {} records", records.len());
    Ok(records)
}
