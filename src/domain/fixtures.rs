use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use super::*;

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, minute, 0).unwrap()
}

pub fn event(id: &str, event_type: EventType) -> Event {
    Event {
        id: EventId::from(id),
        event_type,
        priority: Priority::Medium,
        source_agent: None,
        target_agent: None,
        event_data: EventPayload::new(json!({})),
        created_at: at(12, 0),
        is_processed: false,
        processed_at: None,
        expires_at: None,
    }
}

pub fn agent(name: &str, group: &str) -> AgentRef {
    AgentRef {
        name: name.to_string(),
        group: group.to_string(),
    }
}
