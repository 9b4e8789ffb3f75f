use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use ratatui::layout::{Constraint, Layout};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use busmon::action::Action;
use busmon::app::{App, Effect, InputMode, Overlay, View};
use busmon::client::{EventSource, RestEventSource};
use busmon::config::{Cli, ConfigFile, Settings};
use busmon::event::{key_to_action, AppEvent, RawEventHandler};
use busmon::realtime::{ChangeFeed, FeedEvent, FeedStatus, SupabaseRealtime};
use busmon::store::EventStore;
use busmon::tui::Tui;
use busmon::widgets;
use busmon::worker::{Request, Worker, WorkerHandle};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file.as_deref())?;

    let settings = Settings::resolve(&cli, ConfigFile::load()?)?;
    run_tui(settings).await
}

/// Logs go to a file only; the terminal belongs to the UI.
fn init_logging(path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let file = std::fs::File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("busmon=info")),
        )
        .init();
    Ok(Some(guard))
}

async fn run_tui(settings: Settings) -> Result<()> {
    let source: Arc<dyn EventSource> = Arc::new(
        RestEventSource::new(settings.rest_config()).wrap_err("invalid connection settings")?,
    );

    let mut app = App::new(EventStore::new(settings.capacity));
    app.limit = settings.limit;
    app.window_hours = settings.window_hours;
    app.polling_interval = settings.poll_interval;
    app.base_polling_interval = settings.poll_interval;

    // Set up channels
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (feed_tx, mut feed_rx) = mpsc::unbounded_channel::<FeedEvent>();

    let (worker, handle) = Worker::new(source, settings.export_dir.clone(), action_tx);
    tokio::spawn(worker.run());

    // Dropping the subscription on exit closes the socket
    let _subscription = if settings.realtime {
        let feed = SupabaseRealtime::new(&settings.url, &settings.api_key, &settings.schema)
            .wrap_err("invalid realtime settings")?;
        app.realtime_status = Some(FeedStatus::Connecting);
        Some(feed.subscribe(&settings.table, feed_tx).await?)
    } else {
        drop(feed_tx);
        None
    };

    tracing::info!(table = %settings.table, realtime = settings.realtime, "starting monitor");

    // Initial data load
    let effects = app.update(Action::Refresh);
    handle_effects(effects, &handle);

    let mut terminal = busmon::tui::init()?;

    let result = event_loop(&mut terminal, &mut app, &handle, &mut action_rx, &mut feed_rx).await;

    busmon::tui::restore()?;
    result
}

async fn event_loop(
    terminal: &mut Tui,
    app: &mut App,
    handle: &WorkerHandle,
    action_rx: &mut mpsc::UnboundedReceiver<Action>,
    feed_rx: &mut mpsc::UnboundedReceiver<FeedEvent>,
) -> Result<()> {
    let mut events = RawEventHandler::new(Duration::from_secs(1));

    loop {
        terminal.draw(|frame| render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => {
                let action = match event {
                    AppEvent::Key(key) => key_to_action(
                        key,
                        app.view,
                        &app.input_mode,
                        &app.overlay,
                        &app.input_buffer,
                    ),
                    AppEvent::Tick => Some(Action::Tick),
                    AppEvent::Resize => None,
                };
                if let Some(action) = action {
                    let effects = app.update(action);
                    handle_effects(effects, handle);
                }
            }
            Some(action) = action_rx.recv() => {
                let effects = app.update(action);
                handle_effects(effects, handle);
            }
            Some(feed_event) = feed_rx.recv() => {
                let effects = app.update(Action::Feed(feed_event));
                handle_effects(effects, handle);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn render(app: &mut App, frame: &mut ratatui::Frame) {
    let area = frame.area();

    frame.render_widget(
        ratatui::widgets::Block::default()
            .style(ratatui::style::Style::default().bg(busmon::theme::BG_DARK)),
        area,
    );

    let prompt_height = match app.input_mode {
        InputMode::Command => 2,
        InputMode::Search => 1,
        _ => 0,
    };

    let layout = Layout::vertical([
        Constraint::Length(1),             // Header
        Constraint::Fill(1),               // Content
        Constraint::Length(prompt_height), // Prompt + suggestions
        Constraint::Length(1),             // Footer
    ])
    .split(area);

    widgets::header::render(app, frame, layout[0]);

    match app.view {
        View::Events => widgets::event_list::render(app, frame, layout[1]),
        View::Detail => widgets::event_detail::render(app, frame, layout[1]),
        View::Stats => widgets::stats_panel::render(app, frame, layout[1]),
    }

    if prompt_height > 0 {
        let prompt = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).split(layout[2]);
        widgets::command_input::render(app, frame, prompt[0]);
        widgets::command_input::render_suggestions(app, frame, prompt[1]);
    }

    widgets::footer::render(app, frame, layout[3]);

    if app.overlay == Overlay::Help {
        widgets::help_overlay::render(app.view, frame, area);
    }

    widgets::toast::render(app, frame, area);
}

fn handle_effects(effects: Vec<Effect>, handle: &WorkerHandle) {
    for effect in effects {
        match effect {
            Effect::LoadEvents { query, generation } => {
                handle.send(Request::LoadEvents { query, generation });
            }
            Effect::Export { format, events } => {
                handle.send(Request::Export { format, events });
            }
            Effect::ImportSnapshot(path) => {
                handle.send(Request::ImportSnapshot { path });
            }
            Effect::Quit => {}
        }
    }
}
