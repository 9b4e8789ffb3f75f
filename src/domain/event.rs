use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// Rows may use uuid or bigint primary keys.
impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Int(n) => Self(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    MarketData,
    TradeSignal,
    OrderExecution,
    RiskAlert,
    SystemStatus,
    Other(String),
}

impl EventType {
    pub const KNOWN: [EventType; 5] = [
        Self::MarketData,
        Self::TradeSignal,
        Self::OrderExecution,
        Self::RiskAlert,
        Self::SystemStatus,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::MarketData => "market_data",
            Self::TradeSignal => "trade_signal",
            Self::OrderExecution => "order_execution",
            Self::RiskAlert => "risk_alert",
            Self::SystemStatus => "system_status",
            Self::Other(name) => name,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::MarketData => "◆",
            Self::TradeSignal => "➚",
            Self::OrderExecution => "⇄",
            Self::RiskAlert => "⚠",
            Self::SystemStatus => "●",
            Self::Other(_) => "·",
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "market_data" => Self::MarketData,
            "trade_signal" => Self::TradeSignal,
            "order_execution" => Self::OrderExecution,
            "risk_alert" => Self::RiskAlert,
            "system_status" => Self::SystemStatus,
            _ => Self::Other(value),
        }
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    #[serde(alias = "agent_name")]
    pub name: String,
    #[serde(alias = "agent_group", default)]
    pub group: String,
}

/// Producer-defined payload. Kept as an opaque JSON value and only ever
/// rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventPayload(serde_json::Value);

impl EventPayload {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn to_compact(&self) -> String {
        self.0.to_string()
    }

    pub fn to_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub priority: Priority,
    #[serde(default)]
    pub source_agent: Option<AgentRef>,
    #[serde(default)]
    pub target_agent: Option<AgentRef>,
    #[serde(default)]
    pub event_data: EventPayload,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_processed: bool,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn source_name(&self) -> Option<&str> {
        self.source_agent.as_ref().map(|a| a.name.as_str())
    }

    pub fn target_name(&self) -> Option<&str> {
        self.target_agent.as_ref().map(|a| a.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_postgrest_row_with_embedded_agents() {
        let row = json!({
            "id": 42,
            "event_type": "risk_alert",
            "priority": "critical",
            "source_agent": { "agent_name": "risk-engine", "agent_group": "risk" },
            "target_agent": null,
            "event_data": { "drawdown": 0.12 },
            "created_at": "2026-03-01T12:30:00+00:00",
            "is_processed": false,
            "processed_at": null,
            "expires_at": null,
            "source_agent_id": "a1"
        });

        let event: Event = serde_json::from_value(row).expect("decode row");
        assert_eq!(event.id.as_str(), "42");
        assert_eq!(event.event_type, EventType::RiskAlert);
        assert_eq!(event.priority, Priority::Critical);
        assert_eq!(event.source_name(), Some("risk-engine"));
        assert_eq!(event.target_name(), None);
        assert_eq!(event.event_data.to_compact(), r#"{"drawdown":0.12}"#);
    }

    #[test]
    fn unknown_event_type_is_kept_verbatim() {
        let ty: EventType = serde_json::from_value(json!("heartbeat")).expect("decode");
        assert_eq!(ty, EventType::Other("heartbeat".to_string()));
        assert_eq!(serde_json::to_value(&ty).expect("encode"), json!("heartbeat"));
    }

    #[test]
    fn unknown_priority_is_rejected() {
        assert!(serde_json::from_value::<Priority>(json!("urgent")).is_err());
        assert_eq!(Priority::parse("high"), Some(Priority::High));
    }
}
