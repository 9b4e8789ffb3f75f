//! Push notifications for the event table.
//!
//! The monitor only sees [`ChangeFeed`]; whichever backend delivers row
//! changes (Supabase Realtime, an in-process bus, ...) implements it.
//! Delivery is at-least-once with no ordering guarantee between
//! independent events. Consumers must not assume otherwise.

pub mod local;
pub mod phoenix;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::ClientResult;
use crate::domain::Event;

pub use local::LocalFeed;
pub use phoenix::SupabaseRealtime;

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert(Event),
    Update(Event),
}

impl Change {
    pub fn event(&self) -> &Event {
        match self {
            Self::Insert(event) | Self::Update(event) => event,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Connecting,
    Subscribed,
    Disconnected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Change(Change),
    Status(FeedStatus),
}

pub type FeedSink = mpsc::UnboundedSender<FeedEvent>;

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Starts delivering changes on `table` into `sink` until the returned
    /// [`Subscription`] is dropped or the sink's receiver goes away.
    async fn subscribe(&self, table: &str, sink: FeedSink) -> ClientResult<Subscription>;
}

/// Owned handle to a running subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}
