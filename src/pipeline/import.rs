use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::csv::{parse, CsvError};
use super::export::CSV_HEADER;
use crate::domain::{AgentRef, Event, EventId, EventPayload, EventType, Priority};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] CsvError),
    #[error("file is empty")]
    Empty,
    #[error("unexpected header, expected: {}", CSV_HEADER.join(","))]
    Header,
    #[error("row {row}: expected {expected} fields, found {found}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: invalid {field} {value:?}")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },
}

pub fn read_snapshot(path: &Path) -> Result<Vec<Event>, ImportError> {
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_snapshot(&text)
}

/// Rebuilds events from a CSV export. Fails as a whole on the first bad
/// row.
pub fn parse_snapshot(text: &str) -> Result<Vec<Event>, ImportError> {
    // tolerate a UTF-8 byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = parse(text)?.into_iter();
    let header = records.next().ok_or(ImportError::Empty)?;
    if header.iter().map(|h| h.trim()).ne(CSV_HEADER.iter().copied()) {
        return Err(ImportError::Header);
    }

    records
        .enumerate()
        .map(|(idx, record)| record_to_event(idx + 1, record))
        .collect()
}

fn record_to_event(row: usize, record: Vec<String>) -> Result<Event, ImportError> {
    let [timestamp, event_type, priority, source, target, processed, data]: [String; 7] =
        record.try_into().map_err(|r: Vec<String>| ImportError::FieldCount {
            row,
            expected: CSV_HEADER.len(),
            found: r.len(),
        })?;

    let created_at = DateTime::parse_from_rfc3339(&timestamp)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| ImportError::InvalidField {
            row,
            field: "timestamp",
            value: timestamp.clone(),
        })?;

    let priority = Priority::parse(&priority).ok_or_else(|| ImportError::InvalidField {
        row,
        field: "priority",
        value: priority.clone(),
    })?;

    let is_processed = match processed.as_str() {
        "Yes" => true,
        "No" => false,
        _ => {
            return Err(ImportError::InvalidField {
                row,
                field: "processed flag",
                value: processed,
            })
        }
    };

    let event_data = match serde_json::from_str(&data) {
        Ok(value) => EventPayload::new(value),
        Err(_) => EventPayload::new(serde_json::Value::String(data)),
    };

    Ok(Event {
        id: EventId(format!("csv-{}", row)),
        event_type: EventType::from(event_type),
        priority,
        source_agent: agent_from_name(source),
        target_agent: agent_from_name(target),
        event_data,
        created_at,
        is_processed,
        processed_at: None,
        expires_at: None,
    })
}

fn agent_from_name(name: String) -> Option<AgentRef> {
    if name == "N/A" || name.is_empty() {
        return None;
    }
    Some(AgentRef {
        name,
        group: String::new(),
    })
}
