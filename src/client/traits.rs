use async_trait::async_trait;
use thiserror::Error;

use crate::domain::*;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("request timed out")]
    Timeout,
}

pub type ClientResult<T> = Result<T, ClientError>;

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events matching `query`, newest first, at most `query.limit`.
    async fn fetch_events(&self, query: &EventQuery) -> ClientResult<Vec<Event>>;
}
