use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use super::{ClientError, ClientResult, EventSource};
use crate::domain::*;

#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub agents_table: String,
    pub schema: String,
    pub timeout: Duration,
}

/// Reads the event table through the PostgREST endpoint of a Supabase
/// project.
pub struct RestEventSource {
    client: reqwest::Client,
    endpoint: String,
    agents_table: String,
    timeout: Duration,
}

impl RestEventSource {
    pub fn new(config: RestConfig) -> ClientResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "project url must start with http:// or https://, got {:?}",
                config.base_url
            )));
        }
        if config.api_key.trim().is_empty() {
            return Err(ClientError::Config("api key cannot be empty".to_string()));
        }
        if config.table.trim().is_empty() {
            return Err(ClientError::Config("table name cannot be empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(config.api_key.trim())?);
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", config.api_key.trim()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("accept-profile", header_value(&config.schema)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build http client: {}", e)))?;

        tracing::info!("Using PostgREST endpoint {}/rest/v1/{}", base_url, config.table);

        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url, config.table.trim()),
            agents_table: config.agents_table,
            timeout: config.timeout,
        })
    }

    fn select_clause(&self) -> String {
        format!(
            "*,source_agent:{agents}!source_agent_id(agent_name,agent_group),target_agent:{agents}!target_agent_id(agent_name,agent_group)",
            agents = self.agents_table
        )
    }

    fn query_params(&self, query: &EventQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("select", self.select_clause()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(ref ty) = query.event_type {
            params.push(("event_type", format!("eq.{}", ty.as_str())));
        }
        if let Some(priority) = query.priority {
            params.push(("priority", format!("eq.{}", priority.as_str())));
        }
        if let Some(processed) = query.processed {
            params.push(("is_processed", format!("eq.{}", processed)));
        }
        if let Some(start) = query.start {
            params.push((
                "created_at",
                format!("gte.{}", start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ));
        }
        if let Some(end) = query.end {
            params.push((
                "created_at",
                format!("lte.{}", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }

    fn map_transport_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            tracing::warn!("event fetch timed out after {:?}", self.timeout);
            return ClientError::Timeout;
        }
        if error.is_connect() {
            return ClientError::Transport(format!("could not reach {}: {}", self.endpoint, error));
        }
        ClientError::Transport(error.to_string())
    }
}

#[async_trait]
impl EventSource for RestEventSource {
    async fn fetch_events(&self, query: &EventQuery) -> ClientResult<Vec<Event>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            let message = postgrest_message(&body);
            tracing::warn!(status = status.as_u16(), "event fetch rejected: {}", message);
            return Err(ClientError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        let mut events: Vec<Event> = serde_json::from_slice(&body)
            .map_err(|e| ClientError::Parse(format!("failed to decode events: {}", e)))?;

        if let Some(limit) = query.limit {
            events.truncate(limit);
        }

        tracing::debug!(count = events.len(), "fetched events");
        Ok(events)
    }
}

fn header_value(value: &str) -> ClientResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::Config(format!("invalid header value: {}", e)))
}

fn postgrest_message(body: &[u8]) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}
