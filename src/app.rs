use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ratatui::widgets::TableState;

use crate::action::{Action, ViewType};
use crate::domain::*;
use crate::pipeline::{aggregate, search, EventStats, ExportFormat};
use crate::realtime::{Change, FeedEvent, FeedStatus};
use crate::store::EventStore;

const TOAST_TTL: Duration = Duration::from_secs(5);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Events,
    Detail,
    Stats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    Search,
    PendingG,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Error(String),
}

/// Where the list on screen comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Live,
    Snapshot(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadEvents { query: EventQuery, generation: u64 },
    Export { format: ExportFormat, events: Vec<Event> },
    ImportSnapshot(PathBuf),
    Quit,
}

/// Categorical filters toggled from the keyboard. Applied server-side on
/// fetch and client-side to pushed and imported events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub event_type: Option<EventType>,
    pub priority: Option<Priority>,
    pub processed: Option<bool>,
}

impl Filters {
    pub fn query(&self) -> EventQuery {
        EventQuery {
            event_type: self.event_type.clone(),
            priority: self.priority,
            processed: self.processed,
            ..EventQuery::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.event_type.is_none() && self.priority.is_none() && self.processed.is_none()
    }

    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if let Some(ref ty) = self.event_type {
            labels.push(format!("type={}", ty));
        }
        if let Some(priority) = self.priority {
            labels.push(format!("priority={}", priority));
        }
        if let Some(processed) = self.processed {
            labels.push(if processed { "processed" } else { "pending" }.to_string());
        }
        labels
    }
}

pub struct App {
    // View state
    pub view: View,
    pub active_tab: ViewType,
    pub input_mode: InputMode,
    pub overlay: Overlay,

    // Data
    pub store: EventStore,
    pub source: Source,
    pub filters: Filters,
    pub search_term: String,
    pub limit: usize,
    pub window_hours: u64,

    // Selection
    pub table_state: TableState,
    pub selected_event: Option<EventId>,
    pub detail_scroll: u16,

    // Input
    pub input_buffer: String,

    // Connection
    pub connection_status: ConnectionStatus,
    pub realtime_status: Option<FeedStatus>,

    // Polling
    pub polling_enabled: bool,
    pub polling_interval: Duration,
    pub base_polling_interval: Duration,
    pub last_refresh: Option<Instant>,
    pub error_count: u32,

    // App
    pub should_quit: bool,
    pub last_error: Option<(String, Instant)>,
    pub last_notice: Option<(String, Instant)>,
}

impl App {
    pub fn new(store: EventStore) -> Self {
        Self {
            view: View::Events,
            active_tab: ViewType::Events,
            input_mode: InputMode::Normal,
            overlay: Overlay::None,

            store,
            source: Source::Live,
            filters: Filters::default(),
            search_term: String::new(),
            limit: 100,
            window_hours: 24,

            table_state: TableState::default(),
            selected_event: None,
            detail_scroll: 0,

            input_buffer: String::new(),

            connection_status: ConnectionStatus::Connecting,
            realtime_status: None,

            polling_enabled: true,
            polling_interval: Duration::from_secs(30),
            base_polling_interval: Duration::from_secs(30),
            last_refresh: None,
            error_count: 0,

            should_quit: false,
            last_error: None,
            last_notice: None,
        }
    }

    pub fn update(&mut self, action: Action) -> Vec<Effect> {
        // Clear stale toasts
        if let Some((_, at)) = &self.last_error {
            if at.elapsed() > TOAST_TTL {
                self.last_error = None;
            }
        }
        if let Some((_, at)) = &self.last_notice {
            if at.elapsed() > TOAST_TTL {
                self.last_notice = None;
            }
        }

        match action {
            // Navigation
            Action::NavigateUp => {
                if self.view == View::Detail {
                    self.detail_scroll = self.detail_scroll.saturating_sub(1);
                } else {
                    self.move_selection(-1);
                }
                vec![]
            }
            Action::NavigateDown => {
                if self.view == View::Detail {
                    self.detail_scroll = self.detail_scroll.saturating_add(1);
                } else {
                    self.move_selection(1);
                }
                vec![]
            }
            Action::NavigateTop => {
                self.input_mode = InputMode::Normal;
                if self.view == View::Detail {
                    self.detail_scroll = 0;
                } else {
                    self.move_selection(isize::MIN);
                }
                vec![]
            }
            Action::NavigateBottom => {
                if self.view == View::Detail {
                    self.detail_scroll = u16::MAX;
                } else {
                    self.move_selection(isize::MAX);
                }
                vec![]
            }
            Action::PageUp => {
                if self.view == View::Detail {
                    self.detail_scroll = self.detail_scroll.saturating_sub(self.page_height() as u16);
                } else {
                    self.move_selection(-(self.page_height() as isize));
                }
                vec![]
            }
            Action::PageDown => {
                if self.view == View::Detail {
                    self.detail_scroll = self.detail_scroll.saturating_add(self.page_height() as u16);
                } else {
                    self.move_selection(self.page_height() as isize);
                }
                vec![]
            }
            Action::Select => {
                if self.view == View::Events {
                    if let Some(id) = self.highlighted_id() {
                        self.selected_event = Some(id);
                        self.detail_scroll = 0;
                        self.view = View::Detail;
                    }
                }
                vec![]
            }
            Action::Back => {
                match self.view {
                    View::Detail => {
                        self.view = View::Events;
                        self.selected_event = None;
                    }
                    View::Stats => self.switch_view(ViewType::Events),
                    View::Events => {
                        if !self.search_term.is_empty() {
                            self.set_search(String::new());
                        }
                    }
                }
                vec![]
            }

            // View switching
            Action::SwitchView(view_type) => {
                self.switch_view(view_type);
                vec![]
            }
            Action::NextView => {
                let next = match self.active_tab {
                    ViewType::Events => ViewType::Stats,
                    ViewType::Stats => ViewType::Events,
                };
                self.switch_view(next);
                vec![]
            }

            // Vim chord
            Action::EnterPendingG => {
                self.input_mode = InputMode::PendingG;
                vec![]
            }
            Action::CancelPending => {
                self.input_mode = InputMode::Normal;
                vec![]
            }

            // Filters
            Action::CycleTypeFilter => {
                self.filters.event_type = next_in(&EventType::KNOWN, &self.filters.event_type);
                self.filters_changed()
            }
            Action::CyclePriorityFilter => {
                self.filters.priority = next_in(&Priority::ALL, &self.filters.priority);
                self.filters_changed()
            }
            Action::CycleProcessedFilter => {
                self.filters.processed = next_in(&[false, true], &self.filters.processed);
                self.filters_changed()
            }

            Action::Export(format) => self.export(format),

            // UI
            Action::OpenCommandInput => {
                self.input_mode = InputMode::Command;
                self.input_buffer.clear();
                vec![]
            }
            Action::OpenSearch => {
                self.input_mode = InputMode::Search;
                self.input_buffer = self.search_term.clone();
                vec![]
            }
            Action::CloseOverlay => {
                if self.overlay != Overlay::None {
                    self.overlay = Overlay::None;
                } else if self.input_mode != InputMode::Normal {
                    self.input_mode = InputMode::Normal;
                    self.input_buffer.clear();
                }
                vec![]
            }
            Action::SubmitCommandInput(cmd) => {
                self.input_mode = InputMode::Normal;
                let effects = self.execute_command(&cmd);
                self.input_buffer.clear();
                effects
            }
            Action::SubmitSearch(term) => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.set_search(term);
                vec![]
            }
            Action::UpdateInputBuffer(buf) => {
                self.input_buffer = buf;
                vec![]
            }
            Action::ToggleHelp => {
                self.overlay = if self.overlay == Overlay::Help {
                    Overlay::None
                } else {
                    Overlay::Help
                };
                vec![]
            }

            // Data responses
            Action::EventsLoaded { generation, events } => {
                let highlighted = self.highlighted_id();
                if !self.store.finish_fetch(generation, events) {
                    return vec![];
                }
                self.connection_status = ConnectionStatus::Connected;
                self.reset_backoff();
                self.last_refresh = Some(Instant::now());
                self.reselect(highlighted);
                vec![]
            }
            Action::LoadFailed {
                generation,
                message,
            } => {
                if !self.store.abandon_fetch(generation) {
                    tracing::debug!(generation, "ignoring failure of a superseded fetch");
                    return vec![];
                }
                tracing::warn!("event fetch failed: {}", message);
                self.last_refresh = Some(Instant::now());
                self.error_count += 1;
                self.apply_backoff();
                self.connection_status = ConnectionStatus::Error(message.clone());
                self.last_error = Some((message, Instant::now()));
                vec![]
            }
            Action::Feed(FeedEvent::Status(status)) => {
                match &status {
                    FeedStatus::Subscribed => tracing::info!("realtime subscribed"),
                    FeedStatus::Disconnected(reason) => {
                        tracing::warn!("realtime disconnected: {}", reason)
                    }
                    FeedStatus::Connecting => {}
                }
                self.realtime_status = Some(status);
                vec![]
            }
            Action::Feed(FeedEvent::Change(change)) => {
                self.apply_change(change);
                vec![]
            }
            Action::Exported(path) => {
                self.last_notice = Some((format!("exported to {}", path.display()), Instant::now()));
                vec![]
            }
            Action::SnapshotLoaded { path, events } => {
                tracing::info!(path = %path.display(), count = events.len(), "showing snapshot");
                self.store.replace_all(events);
                self.last_notice = Some((
                    format!("snapshot {} ({} events), :live to resume", path.display(), self.store.len()),
                    Instant::now(),
                ));
                self.source = Source::Snapshot(path);
                self.selected_event = None;
                self.switch_view(ViewType::Events);
                self.reselect(None);
                vec![]
            }

            // App control
            Action::Refresh => {
                if self.is_snapshot() {
                    self.report_error("showing a snapshot, use :live to refresh".to_string());
                    return vec![];
                }
                self.start_fetch()
            }
            Action::Quit => {
                self.should_quit = true;
                vec![Effect::Quit]
            }
            Action::Tick => {
                if self.polling_enabled && !self.is_snapshot() && !self.store.is_fetching() {
                    let should_poll = self
                        .last_refresh
                        .map(|t| t.elapsed() >= self.polling_interval)
                        .unwrap_or(true);
                    if should_poll {
                        return self.start_fetch();
                    }
                }
                vec![]
            }
            Action::Error(msg) => {
                self.report_error(msg);
                vec![]
            }
            Action::ClearError => {
                self.last_error = None;
                vec![]
            }
            Action::TogglePolling => {
                self.polling_enabled = !self.polling_enabled;
                vec![]
            }
        }
    }

    /// Events on screen: the store narrowed by the search term and the
    /// categorical filters, newest first.
    pub fn visible_events(&self) -> Vec<&Event> {
        let filter = self.filters.query();
        search(self.store.events(), &self.search_term)
            .into_iter()
            .filter(|event| filter.matches(event))
            .collect()
    }

    pub fn stats(&self) -> EventStats {
        aggregate(self.visible_events())
    }

    /// The event opened in the detail view, if it is still held.
    pub fn detail_event(&self) -> Option<&Event> {
        let id = self.selected_event.as_ref()?;
        self.store.events().iter().find(|e| &e.id == id)
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self.source, Source::Snapshot(_))
    }

    /// Query for the next fetch, with the time window anchored at `now`.
    pub fn fetch_query(&self, now: DateTime<Utc>) -> EventQuery {
        let mut query = self.filters.query();
        if self.window_hours > 0 {
            query.start = window_start(now, self.window_hours);
        }
        query.limit = Some(self.limit);
        query
    }

    fn start_fetch(&mut self) -> Vec<Effect> {
        let generation = self.store.begin_fetch();
        let query = self.fetch_query(Utc::now());
        tracing::debug!(generation, "requesting events");
        vec![Effect::LoadEvents { query, generation }]
    }

    fn apply_change(&mut self, change: Change) {
        if self.is_snapshot() {
            tracing::debug!("snapshot shown, ignoring realtime change");
            return;
        }
        if let Change::Insert(ref event) = change {
            if !self.fetch_query(Utc::now()).matches(event) {
                tracing::debug!(id = %event.id, "realtime insert outside current filters");
                return;
            }
        }
        let highlighted = self.highlighted_id();
        self.store.apply(change);
        self.reselect(highlighted);
    }

    fn filters_changed(&mut self) -> Vec<Effect> {
        let highlighted = self.highlighted_id();
        self.reselect(highlighted);
        if self.is_snapshot() {
            vec![]
        } else {
            self.start_fetch()
        }
    }

    fn set_search(&mut self, term: String) {
        let highlighted = self.highlighted_id();
        self.search_term = term.trim().to_string();
        self.reselect(highlighted);
    }

    fn export(&mut self, format: ExportFormat) -> Vec<Effect> {
        let events: Vec<Event> = self.visible_events().into_iter().cloned().collect();
        if events.is_empty() {
            self.report_error("nothing to export".to_string());
            return vec![];
        }
        vec![Effect::Export { format, events }]
    }

    fn switch_view(&mut self, view_type: ViewType) {
        self.active_tab = view_type;
        self.view = match view_type {
            ViewType::Events => View::Events,
            ViewType::Stats => View::Stats,
        };
    }

    fn report_error(&mut self, message: String) {
        self.last_error = Some((message, Instant::now()));
    }

    fn execute_command(&mut self, cmd: &str) -> Vec<Effect> {
        let parts: Vec<&str> = cmd.trim().splitn(2, ' ').collect();
        let command = parts[0].to_lowercase();
        let args = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());

        match command.as_str() {
            "events" | "ev" => {
                self.switch_view(ViewType::Events);
                vec![]
            }
            "stats" | "st" => {
                self.switch_view(ViewType::Stats);
                vec![]
            }
            "window" | "w" => match args.map(str::parse::<u64>) {
                Some(Ok(hours)) if hours == 0 || window_start(Utc::now(), hours).is_some() => {
                    self.window_hours = hours;
                    self.filters_changed()
                }
                _ => {
                    self.report_error("usage: :window <hours> (0 = no window)".to_string());
                    vec![]
                }
            },
            "limit" | "l" => match args.map(str::parse::<usize>) {
                Some(Ok(limit)) if limit > 0 => {
                    self.limit = limit;
                    self.filters_changed()
                }
                _ => {
                    self.report_error("usage: :limit <n> (n > 0)".to_string());
                    vec![]
                }
            },
            "export" | "e" => match args.map(ExportFormat::parse) {
                None => self.export(ExportFormat::Csv),
                Some(Some(format)) => self.export(format),
                Some(None) => {
                    self.report_error("usage: :export csv|json".to_string());
                    vec![]
                }
            },
            "import" | "i" => match args {
                Some(path) => vec![Effect::ImportSnapshot(PathBuf::from(path))],
                None => {
                    self.report_error("usage: :import <file.csv>".to_string());
                    vec![]
                }
            },
            "live" => {
                if self.is_snapshot() {
                    self.source = Source::Live;
                    self.store.clear();
                    self.selected_event = None;
                    self.reselect(None);
                }
                self.start_fetch()
            }
            "clear" | "c" => {
                self.filters = Filters::default();
                self.set_search(String::new());
                self.filters_changed()
            }
            "quit" | "q" => {
                self.should_quit = true;
                vec![Effect::Quit]
            }
            "help" | "h" => {
                self.overlay = Overlay::Help;
                vec![]
            }
            _ => {
                self.report_error(format!("unknown command: {}", command));
                vec![]
            }
        }
    }

    fn highlighted_id(&self) -> Option<EventId> {
        let idx = self.table_state.selected()?;
        self.visible_events().get(idx).map(|e| e.id.clone())
    }

    /// Keeps the highlight on `id` when it is still visible, otherwise
    /// clamps the current index into range.
    fn reselect(&mut self, id: Option<EventId>) {
        let visible = self.visible_events();
        if visible.is_empty() {
            self.table_state.select(None);
            return;
        }
        let position = id.and_then(|id| visible.iter().position(|e| e.id == id));
        let index = match (position, self.table_state.selected()) {
            (Some(pos), _) => pos,
            (None, Some(idx)) => idx.min(visible.len() - 1),
            (None, None) => 0,
        };
        self.table_state.select(Some(index));
    }

    fn move_selection(&mut self, delta: isize) {
        if self.view != View::Events {
            return;
        }
        let len = self.visible_events().len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = current.saturating_add(delta).clamp(0, len as isize - 1);
        self.table_state.select(Some(next as usize));
    }

    fn reset_backoff(&mut self) {
        self.error_count = 0;
        self.polling_interval = self.base_polling_interval;
    }

    fn apply_backoff(&mut self) {
        let multiplier = 2u32.pow(self.error_count.min(5));
        self.polling_interval = self
            .base_polling_interval
            .saturating_mul(multiplier)
            .min(MAX_POLL_INTERVAL);
    }

    fn page_height(&self) -> usize {
        20
    }
}

fn next_in<T: Clone + PartialEq>(all: &[T], current: &Option<T>) -> Option<T> {
    match current {
        None => all.first().cloned(),
        Some(value) => all
            .iter()
            .position(|candidate| candidate == value)
            .and_then(|idx| all.get(idx + 1))
            .cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::event;
    use pretty_assertions::assert_eq;

    fn live_app(events: Vec<Event>) -> App {
        let mut app = App::new(EventStore::new(500));
        let generation = app.store.begin_fetch();
        app.update(Action::EventsLoaded { generation, events });
        app
    }

    fn recent(id: &str, ty: EventType) -> Event {
        let mut e = event(id, ty);
        e.created_at = Utc::now();
        e
    }

    fn visible_ids(app: &App) -> Vec<String> {
        app.visible_events()
            .iter()
            .map(|e| e.id.as_str().to_string())
            .collect()
    }

    fn generation_of(effects: &[Effect]) -> u64 {
        match effects {
            [Effect::LoadEvents { generation, .. }] => *generation,
            other => panic!("expected a single fetch, got {:?}", other),
        }
    }

    #[test]
    fn realtime_insert_is_prepended_when_it_matches_filters() {
        let mut app = live_app(vec![recent("a", EventType::MarketData)]);
        app.filters.event_type = Some(EventType::RiskAlert);

        app.update(Action::Feed(FeedEvent::Change(Change::Insert(recent(
            "skip",
            EventType::MarketData,
        )))));
        app.update(Action::Feed(FeedEvent::Change(Change::Insert(recent(
            "hit",
            EventType::RiskAlert,
        )))));

        assert_eq!(app.store.len(), 2);
        assert_eq!(app.store.events()[0].id.as_str(), "hit");
    }

    #[test]
    fn highlight_follows_event_when_new_ones_arrive() {
        let mut app = live_app(vec![
            recent("a", EventType::MarketData),
            recent("b", EventType::MarketData),
        ]);
        app.update(Action::NavigateDown);
        assert_eq!(app.table_state.selected(), Some(1));

        app.update(Action::Feed(FeedEvent::Change(Change::Insert(recent(
            "c",
            EventType::MarketData,
        )))));

        assert_eq!(app.table_state.selected(), Some(2));
        assert_eq!(app.highlighted_id().map(|id| id.0), Some("b".to_string()));
    }

    #[test]
    fn result_of_superseded_fetch_is_dropped() {
        let mut app = App::new(EventStore::default());
        let first = generation_of(&app.update(Action::Refresh));
        let second = generation_of(&app.update(Action::CycleTypeFilter));
        assert_eq!(app.filters.event_type, Some(EventType::MarketData));

        app.update(Action::EventsLoaded {
            generation: second,
            events: vec![recent("new", EventType::MarketData)],
        });
        app.update(Action::EventsLoaded {
            generation: first,
            events: vec![recent("old", EventType::RiskAlert)],
        });

        assert_eq!(visible_ids(&app), vec!["new"]);
        assert_eq!(app.connection_status, ConnectionStatus::Connected);
    }

    #[test]
    fn failures_back_off_and_success_resets() {
        let mut app = App::new(EventStore::default());
        app.base_polling_interval = Duration::from_secs(5);
        app.polling_interval = Duration::from_secs(5);

        for expected in [10, 20, 40, 60, 60] {
            let generation = generation_of(&app.update(Action::Refresh));
            app.update(Action::LoadFailed {
                generation,
                message: "timeout".to_string(),
            });
            assert_eq!(app.polling_interval, Duration::from_secs(expected));
        }
        assert!(app.last_error.is_some());
        assert!(matches!(app.connection_status, ConnectionStatus::Error(_)));

        let generation = generation_of(&app.update(Action::Refresh));
        app.update(Action::EventsLoaded {
            generation,
            events: vec![],
        });
        assert_eq!(app.polling_interval, Duration::from_secs(5));
        assert_eq!(app.error_count, 0);
    }

    #[test]
    fn backoff_saturates_for_huge_poll_intervals() {
        let mut app = App::new(EventStore::default());
        app.base_polling_interval = Duration::from_secs(u64::MAX);
        app.polling_interval = app.base_polling_interval;

        let generation = generation_of(&app.update(Action::Refresh));
        app.update(Action::LoadFailed {
            generation,
            message: "timeout".to_string(),
        });
        assert_eq!(app.polling_interval, MAX_POLL_INTERVAL);
    }

    #[test]
    fn window_beyond_the_time_range_is_rejected() {
        let mut app = App::new(EventStore::default());
        app.update(Action::SubmitCommandInput("window 6".to_string()));

        for hours in ["3000000000", "18446744073709551615"] {
            let effects = app.update(Action::SubmitCommandInput(format!("window {}", hours)));
            assert!(effects.is_empty());
            assert_eq!(app.window_hours, 6);
            assert!(app
                .last_error
                .as_ref()
                .is_some_and(|(msg, _)| msg.starts_with("usage: :window")));
        }
    }

    #[test]
    fn failed_fetch_keeps_previous_list() {
        let mut app = live_app(vec![recent("a", EventType::MarketData)]);
        let generation = generation_of(&app.update(Action::Refresh));
        app.update(Action::LoadFailed {
            generation,
            message: "boom".to_string(),
        });
        assert_eq!(visible_ids(&app), vec!["a"]);
    }

    #[test]
    fn tick_polls_only_when_due_and_idle() {
        let mut app = App::new(EventStore::default());
        let effects = app.update(Action::Tick);
        let generation = generation_of(&effects);

        // fetch in flight
        assert!(app.update(Action::Tick).is_empty());

        app.update(Action::EventsLoaded {
            generation,
            events: vec![],
        });
        assert!(app.update(Action::Tick).is_empty());

        app.polling_interval = Duration::ZERO;
        assert_eq!(app.update(Action::Tick).len(), 1);

        app.polling_enabled = false;
        app.last_refresh = None;
        app.store.abandon_fetch(generation + 1);
        assert!(app.update(Action::Tick).is_empty());
    }

    #[test]
    fn search_narrows_and_escape_clears() {
        let mut app = live_app(vec![
            recent("a", EventType::RiskAlert),
            recent("b", EventType::MarketData),
            recent("c", EventType::RiskAlert),
        ]);

        app.update(Action::SubmitSearch("RISK".to_string()));
        assert_eq!(visible_ids(&app), vec!["a", "c"]);

        app.update(Action::Back);
        assert_eq!(app.search_term, "");
        assert_eq!(visible_ids(&app), vec!["a", "b", "c"]);
    }

    #[test]
    fn export_uses_the_visible_list() {
        let mut app = live_app(vec![
            recent("a", EventType::RiskAlert),
            recent("b", EventType::MarketData),
        ]);
        app.update(Action::SubmitSearch("market".to_string()));

        match app.update(Action::Export(ExportFormat::Json)).as_slice() {
            [Effect::Export { format, events }] => {
                assert_eq!(*format, ExportFormat::Json);
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].id.as_str(), "b");
            }
            other => panic!("unexpected effects {:?}", other),
        }

        app.update(Action::SubmitSearch("nothing-matches".to_string()));
        assert!(app.update(Action::Export(ExportFormat::Csv)).is_empty());
        assert!(app.last_error.is_some());
    }

    #[test]
    fn snapshot_mode_ignores_live_updates_until_live_command() {
        let mut app = live_app(vec![recent("a", EventType::MarketData)]);
        app.update(Action::SnapshotLoaded {
            path: PathBuf::from("old.csv"),
            events: vec![event("csv-1", EventType::RiskAlert)],
        });
        assert!(app.is_snapshot());
        assert_eq!(visible_ids(&app), vec!["csv-1"]);

        app.update(Action::Feed(FeedEvent::Change(Change::Insert(recent(
            "live",
            EventType::RiskAlert,
        )))));
        assert!(app.update(Action::Tick).is_empty());
        assert!(app.update(Action::Refresh).is_empty());
        assert_eq!(visible_ids(&app), vec!["csv-1"]);

        let effects = app.update(Action::SubmitCommandInput("live".to_string()));
        assert_eq!(effects.len(), 1);
        assert!(!app.is_snapshot());
        assert!(app.store.is_empty());
    }

    #[test]
    fn commands_adjust_the_fetch_query() {
        let mut app = App::new(EventStore::default());
        let now = Utc::now();

        let effects = app.update(Action::SubmitCommandInput("window 6".to_string()));
        assert_eq!(effects.len(), 1);
        assert_eq!(app.fetch_query(now).start, Some(now - chrono::Duration::hours(6)));

        app.update(Action::SubmitCommandInput("limit 25".to_string()));
        assert_eq!(app.fetch_query(now).limit, Some(25));

        assert!(app
            .update(Action::SubmitCommandInput("limit 0".to_string()))
            .is_empty());
        assert_eq!(app.limit, 25);

        app.update(Action::SubmitCommandInput("window 0".to_string()));
        assert_eq!(app.fetch_query(now).start, None);

        app.update(Action::SubmitCommandInput("bogus".to_string()));
        assert!(app
            .last_error
            .as_ref()
            .is_some_and(|(msg, _)| msg.contains("unknown command")));
    }

    #[test]
    fn import_and_export_commands_emit_effects() {
        let mut app = live_app(vec![recent("a", EventType::MarketData)]);
        assert_eq!(
            app.update(Action::SubmitCommandInput("import /tmp/x.csv".to_string())),
            vec![Effect::ImportSnapshot(PathBuf::from("/tmp/x.csv"))]
        );
        assert!(matches!(
            app.update(Action::SubmitCommandInput("export json".to_string())).as_slice(),
            [Effect::Export {
                format: ExportFormat::Json,
                ..
            }]
        ));
        assert!(app
            .update(Action::SubmitCommandInput("export xml".to_string()))
            .is_empty());
    }

    #[test]
    fn filters_cycle_through_values_and_back_to_none() {
        let mut app = App::new(EventStore::default());
        app.update(Action::CycleProcessedFilter);
        assert_eq!(app.filters.processed, Some(false));
        app.update(Action::CycleProcessedFilter);
        assert_eq!(app.filters.processed, Some(true));
        app.update(Action::CycleProcessedFilter);
        assert_eq!(app.filters.processed, None);

        for _ in 0..Priority::ALL.len() {
            app.update(Action::CyclePriorityFilter);
        }
        assert_eq!(app.filters.priority, Some(Priority::Critical));
        app.update(Action::CyclePriorityFilter);
        assert_eq!(app.filters.priority, None);

        app.update(Action::CycleTypeFilter);
        app.update(Action::SubmitCommandInput("clear".to_string()));
        assert!(app.filters.is_empty());
    }

    #[test]
    fn detail_view_tracks_the_selected_event() {
        let mut app = live_app(vec![
            recent("a", EventType::MarketData),
            recent("b", EventType::RiskAlert),
        ]);
        app.update(Action::NavigateBottom);
        app.update(Action::Select);
        assert_eq!(app.view, View::Detail);
        assert_eq!(app.detail_event().map(|e| e.id.as_str()), Some("b"));

        let mut updated = recent("b", EventType::RiskAlert);
        updated.is_processed = true;
        app.update(Action::Feed(FeedEvent::Change(Change::Update(updated))));
        assert!(app.detail_event().is_some_and(|e| e.is_processed));

        app.update(Action::Back);
        assert_eq!(app.view, View::Events);
    }

    #[test]
    fn stats_cover_the_visible_events() {
        let mut app = live_app(vec![
            recent("a", EventType::MarketData),
            recent("b", EventType::RiskAlert),
            recent("c", EventType::RiskAlert),
        ]);
        app.update(Action::NextView);
        assert_eq!(app.view, View::Stats);

        let stats = app.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_type.get(&EventType::RiskAlert), Some(&2));

        app.update(Action::SubmitSearch("market".to_string()));
        assert_eq!(app.stats().total, 1);
    }
}
