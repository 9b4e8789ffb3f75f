use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::{Change, ChangeFeed, FeedEvent, FeedSink, FeedStatus, Subscription};
use crate::client::{ClientError, ClientResult};
use crate::domain::Event;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Supabase Realtime client speaking the Phoenix channel protocol over a
/// websocket, subscribed to `postgres_changes` for one table.
#[derive(Debug, Clone)]
pub struct SupabaseRealtime {
    inner: Arc<Settings>,
}

#[derive(Debug)]
struct Settings {
    socket_url: String,
    api_key: String,
    schema: String,
}

impl SupabaseRealtime {
    /// Derives the websocket endpoint from the project URL.
    pub fn new(project_url: &str, api_key: &str, schema: &str) -> ClientResult<Self> {
        let base = project_url.trim().trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            return Err(ClientError::Config(format!(
                "project url must start with http:// or https://, got {:?}",
                project_url
            )));
        };
        let socket_url = format!(
            "{}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            ws_base, api_key
        );
        Ok(Self::with_socket_url(socket_url, api_key, schema))
    }

    pub fn with_socket_url(socket_url: String, api_key: &str, schema: &str) -> Self {
        Self {
            inner: Arc::new(Settings {
                socket_url,
                api_key: api_key.to_string(),
                schema: schema.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ChangeFeed for SupabaseRealtime {
    async fn subscribe(&self, table: &str, sink: FeedSink) -> ClientResult<Subscription> {
        let settings = self.inner.clone();
        let topic = format!("realtime:busmon-{}", uuid::Uuid::new_v4().simple());
        let table = table.to_string();
        let task = tokio::spawn(run(settings, topic, table, sink));
        Ok(Subscription::new(task))
    }
}

async fn run(settings: Arc<Settings>, topic: String, table: String, sink: FeedSink) {
    let mut attempt: u32 = 0;
    loop {
        if sink.send(FeedEvent::Status(FeedStatus::Connecting)).is_err() {
            break;
        }

        match session(&settings, &topic, &table, &sink, &mut attempt).await {
            Ok(()) => break,
            Err(e) => {
                tracing::warn!(table = %table, "realtime connection lost: {}", e);
                let status = FeedStatus::Disconnected(e.to_string());
                if sink.send(FeedEvent::Status(status)).is_err() {
                    break;
                }
            }
        }

        attempt = attempt.saturating_add(1);
        tokio::time::sleep(reconnect_delay(attempt)).await;
    }
    tracing::debug!(table = %table, "realtime listener stopped");
}

fn reconnect_delay(attempt: u32) -> Duration {
    let secs = 2u64.pow(attempt.min(5));
    Duration::from_secs(secs).min(MAX_RECONNECT_DELAY)
}

/// One websocket connection. Returns `Ok` only when the sink is gone and
/// the listener should stop for good.
async fn session(
    settings: &Settings,
    topic: &str,
    table: &str,
    sink: &FeedSink,
    attempt: &mut u32,
) -> ClientResult<()> {
    let (ws, _) = connect_async(settings.socket_url.as_str())
        .await
        .map_err(|e| ClientError::Transport(format!("realtime connect failed: {}", e)))?;
    let (mut write, mut read) = ws.split();

    let mut next_ref: u64 = 1;
    let join = join_message(topic, &settings.schema, table, &settings.api_key, next_ref);
    write.send(Message::Text(join)).await.map_err(socket_error)?;

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                next_ref += 1;
                write
                    .send(Message::Text(heartbeat_message(next_ref)))
                    .await
                    .map_err(socket_error)?;
            }
            _ = sink.closed() => {
                let _ = write.send(Message::Close(None)).await;
                return Ok(());
            }
            frame = read.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(frame))) => {
                        return Err(ClientError::Transport(format!(
                            "realtime socket closed by server: {:?}",
                            frame.map(|f| f.reason.to_string())
                        )));
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(socket_error(e)),
                    None => {
                        return Err(ClientError::Transport("realtime socket closed".to_string()));
                    }
                };

                match decode_frame(&text, topic) {
                    Inbound::Joined => {
                        tracing::info!(table = %table, "realtime subscription active");
                        *attempt = 0;
                        if sink.send(FeedEvent::Status(FeedStatus::Subscribed)).is_err() {
                            return Ok(());
                        }
                    }
                    Inbound::Change(change) => {
                        if sink.send(FeedEvent::Change(change)).is_err() {
                            return Ok(());
                        }
                    }
                    Inbound::Rejected(reason) => {
                        return Err(ClientError::RequestFailed {
                            status: 0,
                            message: format!("realtime channel rejected: {}", reason),
                        });
                    }
                    Inbound::Malformed(reason) => {
                        tracing::warn!("dropping realtime message: {}", reason);
                    }
                    Inbound::Ignored => {}
                }
            }
        }
    }
}

fn socket_error(error: tokio_tungstenite::tungstenite::Error) -> ClientError {
    ClientError::Transport(format!("realtime socket error: {}", error))
}

pub(crate) fn join_message(topic: &str, schema: &str, table: &str, api_key: &str, reference: u64) -> String {
    json!({
        "topic": topic,
        "event": "phx_join",
        "payload": {
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [
                    { "event": "*", "schema": schema, "table": table }
                ]
            },
            "access_token": api_key
        },
        "ref": reference.to_string(),
        "join_ref": reference.to_string()
    })
    .to_string()
}

pub(crate) fn heartbeat_message(reference: u64) -> String {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": reference.to_string()
    })
    .to_string()
}

#[derive(Debug, PartialEq)]
pub(crate) enum Inbound {
    Joined,
    Change(Change),
    Rejected(String),
    Malformed(String),
    Ignored,
}

#[derive(Deserialize)]
struct Envelope {
    topic: String,
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Deserialize)]
struct ChangeData {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    record: Option<serde_json::Value>,
}

pub(crate) fn decode_frame(text: &str, topic: &str) -> Inbound {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => return Inbound::Malformed(format!("invalid frame: {}", e)),
    };
    if envelope.topic != topic {
        return Inbound::Ignored;
    }

    match envelope.event.as_str() {
        "phx_reply" => {
            let status = envelope.payload.get("status").and_then(|s| s.as_str());
            if status == Some("ok") {
                Inbound::Joined
            } else {
                Inbound::Rejected(reply_reason(&envelope.payload))
            }
        }
        "system" => {
            let status = envelope.payload.get("status").and_then(|s| s.as_str());
            if status == Some("error") {
                Inbound::Rejected(reply_reason(&envelope.payload))
            } else {
                Inbound::Ignored
            }
        }
        "phx_error" => Inbound::Rejected("channel error".to_string()),
        "phx_close" => Inbound::Rejected("channel closed".to_string()),
        "postgres_changes" => decode_change(&envelope.payload),
        _ => Inbound::Ignored,
    }
}

fn decode_change(payload: &serde_json::Value) -> Inbound {
    let Some(data) = payload.get("data") else {
        return Inbound::Malformed("postgres_changes without data".to_string());
    };
    let data: ChangeData = match serde_json::from_value(data.clone()) {
        Ok(data) => data,
        Err(e) => return Inbound::Malformed(format!("invalid change data: {}", e)),
    };

    let wrap: fn(Event) -> Change = match data.kind.as_str() {
        "INSERT" => Change::Insert,
        "UPDATE" => Change::Update,
        other => {
            tracing::debug!(kind = other, "ignoring realtime change");
            return Inbound::Ignored;
        }
    };

    let Some(record) = data.record else {
        return Inbound::Malformed(format!("{} without record", data.kind));
    };
    match serde_json::from_value::<Event>(record) {
        Ok(event) => Inbound::Change(wrap(event)),
        Err(e) => Inbound::Malformed(format!("invalid event record: {}", e)),
    }
}

fn reply_reason(payload: &serde_json::Value) -> String {
    payload
        .pointer("/response/reason")
        .or_else(|| payload.get("message"))
        .and_then(|r| r.as_str())
        .map(|r| r.to_string())
        .unwrap_or_else(|| payload.to_string())
}
