use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::{Change, ChangeFeed, FeedEvent, FeedSink, FeedStatus, Subscription};
use crate::client::ClientResult;

/// In-process change feed backed by a broadcast channel.
///
/// Useful when the producer lives in the same process (embedding, replay
/// tools, tests). Slow subscribers skip the oldest changes once the
/// channel capacity is exceeded.
#[derive(Clone, Debug)]
pub struct LocalFeed {
    tx: broadcast::Sender<(String, Change)>,
}

impl LocalFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Returns the number of subscribers that will see the change.
    pub fn publish(&self, table: &str, change: Change) -> usize {
        self.tx.send((table.to_string(), change)).unwrap_or(0)
    }
}

#[async_trait]
impl ChangeFeed for LocalFeed {
    async fn subscribe(&self, table: &str, sink: FeedSink) -> ClientResult<Subscription> {
        let mut rx = self.tx.subscribe();
        let table = table.to_string();
        let _ = sink.send(FeedEvent::Status(FeedStatus::Subscribed));

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok((from, change)) => {
                        if from != table {
                            continue;
                        }
                        if sink.send(FeedEvent::Change(change)).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "local feed subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Ok(Subscription::new(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::event;
    use crate::domain::EventType;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn forwards_changes_for_the_subscribed_table_only() {
        let feed = LocalFeed::new(16);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = feed.subscribe("event_bus", tx).await.expect("subscribe");

        assert_eq!(
            rx.recv().await,
            Some(FeedEvent::Status(FeedStatus::Subscribed))
        );

        feed.publish("other", Change::Insert(event("x", EventType::MarketData)));
        feed.publish("event_bus", Change::Insert(event("1", EventType::RiskAlert)));

        match rx.recv().await {
            Some(FeedEvent::Change(Change::Insert(e))) => assert_eq!(e.id.as_str(), "1"),
            other => panic!("unexpected feed event {:?}", other),
        }
        assert!(subscription.is_active());
    }

    #[tokio::test]
    async fn dropping_the_subscription_stops_delivery() {
        let feed = LocalFeed::new(16);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = feed.subscribe("event_bus", tx).await.expect("subscribe");
        let _ = rx.recv().await;

        subscription.unsubscribe();
        tokio::task::yield_now().await;

        feed.publish("event_bus", Change::Insert(event("1", EventType::RiskAlert)));
        // the aborted task owned the only sender
        assert_eq!(rx.recv().await, None);
    }
}
