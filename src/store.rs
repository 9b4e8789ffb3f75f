use crate::domain::{AgentRef, Event};
use crate::realtime::Change;

pub const DEFAULT_CAPACITY: usize = 500;

/// The in-memory event list shown by the monitor, newest first.
///
/// Fetches replace the list wholesale; realtime changes patch it. Both go
/// through here so a slow fetch cannot clobber changes that arrived after
/// it was issued.
#[derive(Debug)]
pub struct EventStore {
    events: Vec<Event>,
    capacity: usize,
    generation: u64,
    in_flight: bool,
    pending: Vec<Change>,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity: capacity.max(1),
            generation: 0,
            in_flight: false,
            pending: Vec::new(),
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    pub fn apply(&mut self, change: Change) {
        if self.in_flight {
            self.pending.push(change.clone());
        }
        self.apply_now(change);
    }

    fn apply_now(&mut self, change: Change) {
        match change {
            Change::Insert(event) => {
                self.events.insert(0, event);
                self.events.truncate(self.capacity);
            }
            Change::Update(event) => self.replace(event),
        }
    }

    fn replace(&mut self, mut event: Event) {
        let Some(slot) = self.events.iter_mut().find(|e| e.id == event.id) else {
            tracing::debug!(id = %event.id, "ignoring update for unknown event");
            return;
        };
        keep_agent(&mut event.source_agent, &slot.source_agent);
        keep_agent(&mut event.target_agent, &slot.target_agent);
        *slot = event;
    }

    /// Marks a fetch as issued and returns its generation.
    pub fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.in_flight = true;
        self.pending.clear();
        self.generation
    }

    /// Installs a fetched list unless a newer fetch has been issued since.
    /// Changes seen while the fetch was in flight are replayed on top.
    pub fn finish_fetch(&mut self, generation: u64, mut events: Vec<Event>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                latest = self.generation,
                "discarding stale fetch result"
            );
            return false;
        }

        events.truncate(self.capacity);
        self.events = events;
        self.in_flight = false;

        for change in std::mem::take(&mut self.pending) {
            match change {
                Change::Insert(event) if self.contains(&event) => self.replace(event),
                other => self.apply_now(other),
            }
        }
        true
    }

    /// Clears the in-flight flag after a fetch that failed, keeping the
    /// current list. Returns false for a stale generation.
    pub fn abandon_fetch(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.in_flight = false;
        self.pending.clear();
        true
    }

    /// Replaces the list without a fetch (snapshot import).
    pub fn replace_all(&mut self, mut events: Vec<Event>) {
        self.generation += 1;
        self.in_flight = false;
        self.pending.clear();
        events.truncate(self.capacity);
        self.events = events;
    }

    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    fn contains(&self, event: &Event) -> bool {
        self.events.iter().any(|e| e.id == event.id)
    }
}

fn keep_agent(incoming: &mut Option<AgentRef>, previous: &Option<AgentRef>) {
    if incoming.is_none() {
        incoming.clone_from(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{agent, event};
    use crate::domain::EventType;
    use pretty_assertions::assert_eq;

    fn ids(store: &EventStore) -> Vec<&str> {
        store.events().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn insert_prepends_and_caps_at_capacity() {
        let mut store = EventStore::default();
        for i in 0..DEFAULT_CAPACITY {
            store.apply(Change::Insert(event(&i.to_string(), EventType::MarketData)));
        }
        assert_eq!(store.len(), 500);
        let oldest_kept = store.events()[499].id.clone();
        assert_eq!(oldest_kept.as_str(), "0");

        store.apply(Change::Insert(event("new", EventType::RiskAlert)));

        assert_eq!(store.len(), 500);
        assert_eq!(store.events()[0].id.as_str(), "new");
        assert!(!store.events().iter().any(|e| e.id == oldest_kept));
        assert_eq!(store.events()[499].id.as_str(), "1");
    }

    #[test]
    fn update_replaces_in_place() {
        let mut store = EventStore::new(10);
        store.replace_all(vec![
            event("a", EventType::MarketData),
            event("b", EventType::TradeSignal),
            event("c", EventType::RiskAlert),
        ]);

        let mut updated = event("b", EventType::TradeSignal);
        updated.is_processed = true;
        store.apply(Change::Update(updated));

        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert!(store.events()[1].is_processed);
        assert!(!store.events()[0].is_processed);
    }

    #[test]
    fn update_keeps_agents_missing_from_the_change() {
        let mut store = EventStore::new(10);
        let mut original = event("a", EventType::RiskAlert);
        original.source_agent = Some(agent("risk-engine", "risk"));
        store.replace_all(vec![original]);

        let mut updated = event("a", EventType::RiskAlert);
        updated.is_processed = true;
        store.apply(Change::Update(updated));

        assert_eq!(store.events()[0].source_name(), Some("risk-engine"));
        assert!(store.events()[0].is_processed);
    }

    #[test]
    fn update_for_unknown_id_is_ignored() {
        let mut store = EventStore::new(10);
        store.replace_all(vec![event("a", EventType::MarketData)]);
        store.apply(Change::Update(event("zzz", EventType::MarketData)));
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[test]
    fn stale_fetch_is_discarded() {
        let mut store = EventStore::new(10);
        let first = store.begin_fetch();
        let second = store.begin_fetch();

        assert!(store.finish_fetch(second, vec![event("new", EventType::MarketData)]));
        assert!(!store.finish_fetch(first, vec![event("old", EventType::MarketData)]));
        assert_eq!(ids(&store), vec!["new"]);
        assert!(!store.is_fetching());
    }

    #[test]
    fn changes_during_fetch_are_replayed_on_the_result() {
        let mut store = EventStore::new(10);
        let generation = store.begin_fetch();

        store.apply(Change::Insert(event("live", EventType::RiskAlert)));
        store.apply(Change::Insert(event("both", EventType::RiskAlert)));

        let mut fetched_both = event("both", EventType::RiskAlert);
        fetched_both.source_agent = Some(agent("feed", "data"));
        assert!(store.finish_fetch(
            generation,
            vec![fetched_both, event("older", EventType::MarketData)]
        ));

        assert_eq!(ids(&store), vec!["live", "both", "older"]);
        assert_eq!(store.events()[1].source_name(), Some("feed"));
    }

    #[test]
    fn abandoned_fetch_keeps_the_previous_list() {
        let mut store = EventStore::new(10);
        store.replace_all(vec![event("a", EventType::MarketData)]);
        let generation = store.begin_fetch();
        assert!(!store.abandon_fetch(generation + 1));
        assert!(store.is_fetching());
        assert!(store.abandon_fetch(generation));
        assert_eq!(ids(&store), vec!["a"]);
        assert!(!store.is_fetching());
    }
}
