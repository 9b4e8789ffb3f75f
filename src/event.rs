use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::action::Action;
use crate::app::{InputMode, Overlay, View};
use crate::input::commands::matching_commands;
use crate::pipeline::ExportFormat;

/// Terminal input plus a periodic tick, delivered on one channel.
pub struct RawEventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

impl RawEventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut tick = tokio::time::interval(tick_rate);

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        if tx.send(AppEvent::Tick).is_err() {
                            break;
                        }
                    }
                    event = reader.next() => {
                        let app_event = match event {
                            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                                AppEvent::Key(key)
                            }
                            Some(Ok(Event::Resize(_, _))) => AppEvent::Resize,
                            Some(Ok(_)) => continue,
                            Some(Err(e)) => {
                                tracing::error!("terminal input failed: {}", e);
                                break;
                            }
                            None => break,
                        };
                        if tx.send(app_event).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

/// Map a key event to an action based on current app state
pub fn key_to_action(
    key: KeyEvent,
    view: View,
    input_mode: &InputMode,
    overlay: &Overlay,
    input_buffer: &str,
) -> Option<Action> {
    if *overlay == Overlay::Help {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Some(Action::ToggleHelp),
            _ => None,
        };
    }

    match input_mode {
        InputMode::Command => {
            return match key.code {
                KeyCode::Esc => Some(Action::CloseOverlay),
                KeyCode::Enter => Some(Action::SubmitCommandInput(input_buffer.to_string())),
                KeyCode::Tab => {
                    // complete to the first matching command
                    let input_cmd = input_buffer.split_whitespace().next().unwrap_or("");
                    matching_commands(input_cmd)
                        .first()
                        .map(|cmd| Action::UpdateInputBuffer(format!("{} ", cmd.name)))
                }
                KeyCode::Backspace => Some(edit_buffer(input_buffer, None)),
                KeyCode::Char(c) => Some(edit_buffer(input_buffer, Some(c))),
                _ => None,
            };
        }
        InputMode::Search => {
            return match key.code {
                KeyCode::Esc => Some(Action::CloseOverlay),
                KeyCode::Enter => Some(Action::SubmitSearch(input_buffer.to_string())),
                KeyCode::Backspace => Some(edit_buffer(input_buffer, None)),
                KeyCode::Char(c) => Some(edit_buffer(input_buffer, Some(c))),
                _ => None,
            };
        }
        InputMode::PendingG => {
            return match key.code {
                KeyCode::Char('g') => Some(Action::NavigateTop),
                _ => Some(Action::CancelPending),
            };
        }
        InputMode::Normal => {}
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('d') => Some(Action::PageDown),
            KeyCode::Char('u') => Some(Action::PageUp),
            _ => None,
        };
    }

    match key.code {
        // Global
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char(':') => Some(Action::OpenCommandInput),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('P') => Some(Action::TogglePolling),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::NextView),
        KeyCode::Esc => Some(Action::Back),

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => Some(Action::NavigateDown),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::NavigateUp),
        KeyCode::Char('g') => Some(Action::EnterPendingG),
        KeyCode::Char('G') => Some(Action::NavigateBottom),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Enter if view == View::Events => Some(Action::Select),

        // List views
        KeyCode::Char('/') if view != View::Detail => Some(Action::OpenSearch),
        KeyCode::Char('t') if view != View::Detail => Some(Action::CycleTypeFilter),
        KeyCode::Char('p') if view != View::Detail => Some(Action::CyclePriorityFilter),
        KeyCode::Char('x') if view != View::Detail => Some(Action::CycleProcessedFilter),
        KeyCode::Char('e') => Some(Action::Export(ExportFormat::Csv)),
        KeyCode::Char('E') => Some(Action::Export(ExportFormat::Json)),

        _ => None,
    }
}

fn edit_buffer(buffer: &str, push: Option<char>) -> Action {
    let mut buf = buffer.to_string();
    match push {
        Some(c) => buf.push(c),
        None => {
            buf.pop();
        }
    }
    Action::UpdateInputBuffer(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn normal(code: KeyCode, view: View) -> Option<Action> {
        key_to_action(press(code), view, &InputMode::Normal, &Overlay::None, "")
    }

    #[test]
    fn filter_keys_only_apply_to_list_views() {
        assert!(matches!(
            normal(KeyCode::Char('t'), View::Events),
            Some(Action::CycleTypeFilter)
        ));
        assert!(matches!(
            normal(KeyCode::Char('x'), View::Stats),
            Some(Action::CycleProcessedFilter)
        ));
        assert!(normal(KeyCode::Char('p'), View::Detail).is_none());
        assert!(matches!(
            normal(KeyCode::Char('P'), View::Detail),
            Some(Action::TogglePolling)
        ));
    }

    #[test]
    fn export_keys_pick_the_format() {
        assert!(matches!(
            normal(KeyCode::Char('e'), View::Events),
            Some(Action::Export(ExportFormat::Csv))
        ));
        assert!(matches!(
            normal(KeyCode::Char('E'), View::Stats),
            Some(Action::Export(ExportFormat::Json))
        ));
    }

    #[test]
    fn pending_g_completes_or_cancels() {
        let pending = |code| key_to_action(press(code), View::Events, &InputMode::PendingG, &Overlay::None, "");
        assert!(matches!(pending(KeyCode::Char('g')), Some(Action::NavigateTop)));
        assert!(matches!(pending(KeyCode::Char('j')), Some(Action::CancelPending)));
    }

    #[test]
    fn command_mode_edits_and_completes() {
        let command = |code, buf| key_to_action(press(code), View::Events, &InputMode::Command, &Overlay::None, buf);

        match command(KeyCode::Char('s'), "import") {
            Some(Action::UpdateInputBuffer(buf)) => assert_eq!(buf, "imports"),
            _ => panic!("expected buffer update"),
        }
        match command(KeyCode::Tab, "sta") {
            Some(Action::UpdateInputBuffer(buf)) => assert_eq!(buf, "stats "),
            _ => panic!("expected completion"),
        }
        match command(KeyCode::Enter, "window 6") {
            Some(Action::SubmitCommandInput(cmd)) => assert_eq!(cmd, "window 6"),
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn ctrl_keys_refresh_and_page() {
        let ctrl = |c| {
            key_to_action(
                KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL),
                View::Events,
                &InputMode::Normal,
                &Overlay::None,
                "",
            )
        };
        assert!(matches!(ctrl('r'), Some(Action::Refresh)));
        assert!(matches!(ctrl('d'), Some(Action::PageDown)));
    }
}
