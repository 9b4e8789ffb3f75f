use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use super::csv::quote;
use crate::domain::Event;

pub const CSV_HEADER: [&str; 7] = [
    "Timestamp",
    "Event Type",
    "Priority",
    "Source Agent",
    "Target Agent",
    "Processed",
    "Event Data",
];

const MISSING_AGENT: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("events-export-{}.{}", date.format("%Y-%m-%d"), self.extension())
    }

    pub fn render<'a, I>(&self, events: I) -> Result<String, serde_json::Error>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        match self {
            Self::Csv => Ok(to_csv(events)),
            Self::Json => to_json(events),
        }
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn to_csv<'a, I>(events: I) -> String
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut lines = vec![CSV_HEADER.join(",")];
    for event in events {
        let fields = [
            format_timestamp(&event.created_at),
            event.event_type.as_str().to_string(),
            event.priority.as_str().to_string(),
            event.source_name().unwrap_or(MISSING_AGENT).to_string(),
            event.target_name().unwrap_or(MISSING_AGENT).to_string(),
            if event.is_processed { "Yes" } else { "No" }.to_string(),
            event.event_data.to_compact(),
        ];
        let row: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

pub fn to_json<'a, I>(events: I) -> Result<String, serde_json::Error>
where
    I: IntoIterator<Item = &'a Event>,
{
    let events: Vec<&Event> = events.into_iter().collect();
    serde_json::to_string_pretty(&events)
}

/// Renders `events` and writes them into `dir` under the dated export
/// name. Returns the path written.
pub fn write_export(
    dir: &Path,
    format: ExportFormat,
    events: &[Event],
    date: NaiveDate,
) -> std::io::Result<PathBuf> {
    let body = format
        .render(events)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let path = dir.join(format.file_name(date));
    std::fs::write(&path, body)?;
    tracing::info!(
        path = %path.display(),
        mime = format.mime(),
        count = events.len(),
        "wrote event export"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{agent, at, event};
    use crate::domain::{EventPayload, EventType, Priority};
    use crate::pipeline::csv::parse;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn header_is_fixed_and_unquoted() {
        let csv = to_csv(&Vec::<Event>::new());
        assert_eq!(
            csv,
            "Timestamp,Event Type,Priority,Source Agent,Target Agent,Processed,Event Data"
        );
    }

    #[test]
    fn row_quotes_every_field() {
        let mut e = event("1", EventType::RiskAlert);
        e.priority = Priority::Critical;
        e.created_at = at(9, 5);
        e.source_agent = Some(agent("Risk \"Core\"", "risk"));
        e.is_processed = true;
        e.event_data = EventPayload::new(json!({ "x": "a,b" }));

        let csv = to_csv(&[e]);
        let row = csv.lines().nth(1).expect("data row");
        assert_eq!(
            row,
            r#""2026-03-01T09:05:00.000Z","risk_alert","critical","Risk ""Core""","N/A","Yes","{""x"":""a,b""}""#
        );
    }

    #[test]
    fn payload_with_comma_reparses_to_original() {
        let mut e = event("1", EventType::MarketData);
        e.event_data = EventPayload::new(json!({ "x": "a,b" }));

        let csv = to_csv(&[e]);
        assert!(csv.contains(r#""{""x"":""a,b""}""#));

        let records = parse(&csv).expect("parse export");
        assert_eq!(records[1][6], r#"{"x":"a,b"}"#);
    }

    #[test]
    fn round_trip_recovers_row_count() {
        let mut events = Vec::new();
        for i in 0..7 {
            let mut e = event(&i.to_string(), EventType::TradeSignal);
            e.event_data = EventPayload::new(json!({
                "note": format!("line {i}\nwith \"quotes\", commas"),
            }));
            events.push(e);
        }

        let records = parse(&to_csv(&events)).expect("parse export");
        assert_eq!(records.len() - 1, events.len());
        assert!(records.iter().all(|r| r.len() == CSV_HEADER.len()));
    }

    #[test]
    fn json_export_is_an_array_of_rows() {
        let events = vec![event("a", EventType::SystemStatus)];
        let body = to_json(&events).expect("json");
        let value: serde_json::Value = serde_json::from_str(&body).expect("valid json");
        assert_eq!(value[0]["id"], json!("a"));
        assert_eq!(value[0]["event_type"], json!("system_status"));
    }

    #[test]
    fn file_names_carry_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(ExportFormat::Csv.file_name(date), "events-export-2026-10-16.csv");
        assert_eq!(ExportFormat::Json.file_name(date), "events-export-2026-10-16.json");
        assert_eq!(ExportFormat::Csv.mime(), "text/csv");
        assert_eq!(ExportFormat::Json.mime(), "application/json");
    }

    #[test]
    fn write_export_creates_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let events = vec![event("a", EventType::MarketData)];

        let path = write_export(dir.path(), ExportFormat::Csv, &events, date).expect("write");
        assert_eq!(path, dir.path().join("events-export-2026-10-16.csv"));
        let body = std::fs::read_to_string(path).expect("read back");
        assert_eq!(body.lines().count(), 2);
    }
}
