use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::action::Action;
use crate::client::EventSource;
use crate::domain::{Event, EventQuery};
use crate::pipeline::{read_snapshot, write_export, ExportFormat};

#[derive(Debug)]
pub enum Request {
    LoadEvents {
        query: EventQuery,
        generation: u64,
    },
    Export {
        format: ExportFormat,
        events: Vec<Event>,
    },
    ImportSnapshot {
        path: PathBuf,
    },
}

#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::UnboundedSender<Request>,
}

impl WorkerHandle {
    pub fn send(&self, request: Request) {
        let _ = self.tx.send(request);
    }
}

/// Runs fetches and file I/O off the UI task, answering each request with
/// exactly one [`Action`].
pub struct Worker {
    source: Arc<dyn EventSource>,
    export_dir: PathBuf,
    rx: mpsc::UnboundedReceiver<Request>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Worker {
    pub fn new(
        source: Arc<dyn EventSource>,
        export_dir: PathBuf,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> (Self, WorkerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = WorkerHandle { tx };
        let worker = Self {
            source,
            export_dir,
            rx,
            action_tx,
        };
        (worker, handle)
    }

    pub async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            let action = self.process(request).await;
            if self.action_tx.send(action).is_err() {
                break;
            }
        }
    }

    async fn process(&self, request: Request) -> Action {
        match request {
            Request::LoadEvents { query, generation } => {
                match self.source.fetch_events(&query).await {
                    Ok(events) => Action::EventsLoaded { generation, events },
                    Err(e) => Action::LoadFailed {
                        generation,
                        message: format!("failed to load events: {}", e),
                    },
                }
            }
            Request::Export { format, events } => {
                let dir = self.export_dir.clone();
                let date = Utc::now().date_naive();
                let written =
                    tokio::task::spawn_blocking(move || write_export(&dir, format, &events, date))
                        .await;
                match written {
                    Ok(Ok(path)) => Action::Exported(path),
                    Ok(Err(e)) => {
                        tracing::warn!("export failed: {}", e);
                        Action::Error(format!("export failed: {}", e))
                    }
                    Err(e) => Action::Error(format!("export task failed: {}", e)),
                }
            }
            Request::ImportSnapshot { path } => {
                let target = path.clone();
                match tokio::task::spawn_blocking(move || read_snapshot(&target)).await {
                    Ok(Ok(events)) => Action::SnapshotLoaded { path, events },
                    Ok(Err(e)) => {
                        tracing::warn!(path = %path.display(), "import failed: {}", e);
                        Action::Error(format!("import failed: {}", e))
                    }
                    Err(e) => Action::Error(format!("import task failed: {}", e)),
                }
            }
        }
    }
}
