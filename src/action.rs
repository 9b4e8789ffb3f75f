use std::path::PathBuf;

use crate::domain::Event;
use crate::pipeline::ExportFormat;
use crate::realtime::FeedEvent;

#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    NavigateUp,
    NavigateDown,
    NavigateTop,
    NavigateBottom,
    PageUp,
    PageDown,
    Select,
    Back,

    // View switching
    SwitchView(ViewType),
    NextView,

    // Vim chord
    EnterPendingG,
    CancelPending,

    // Filters
    CycleTypeFilter,
    CyclePriorityFilter,
    CycleProcessedFilter,

    // Export
    Export(ExportFormat),

    // UI
    OpenCommandInput,
    OpenSearch,
    CloseOverlay,
    SubmitCommandInput(String),
    SubmitSearch(String),
    UpdateInputBuffer(String),
    ToggleHelp,

    // Data responses
    EventsLoaded { generation: u64, events: Vec<Event> },
    LoadFailed { generation: u64, message: String },
    Feed(FeedEvent),
    Exported(PathBuf),
    SnapshotLoaded { path: PathBuf, events: Vec<Event> },

    // App control
    Refresh,
    Quit,
    Tick,
    Error(String),
    ClearError,
    TogglePolling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
    Events,
    Stats,
}

impl ViewType {
    pub const ALL: [ViewType; 2] = [Self::Events, Self::Stats];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Events => "Events",
            Self::Stats => "Stats",
        }
    }
}
