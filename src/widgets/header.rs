use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::action::ViewType;
use crate::app::{App, ConnectionStatus, Source, View};
use crate::realtime::FeedStatus;
use crate::theme;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let mut left_spans: Vec<Span> = vec![
        Span::styled(
            " busmon ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(theme::TEXT_MUTED)),
    ];

    for tab in ViewType::ALL {
        let style = if tab == app.active_tab {
            Style::default()
                .fg(theme::TEXT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme::TEXT_MUTED)
        };
        left_spans.push(Span::styled(tab.label(), style));
        left_spans.push(Span::raw(" "));
    }

    if app.view == View::Detail {
        if let Some(id) = app.selected_event.as_ref() {
            left_spans.push(Span::styled("> ", Style::default().fg(theme::TEXT_MUTED)));
            left_spans.push(Span::styled(id.to_string(), Style::default().fg(theme::TEXT_DIM)));
        }
    }

    if !app.search_term.is_empty() {
        left_spans.push(Span::styled("  /", Style::default().fg(theme::GREEN)));
        left_spans.push(Span::styled(
            app.search_term.as_str(),
            Style::default().fg(theme::TEXT),
        ));
    }
    for label in app.filters.labels() {
        left_spans.push(Span::styled(
            format!("  [{}]", label),
            Style::default().fg(theme::CYAN),
        ));
    }

    let mut right_spans: Vec<Span> = Vec::new();

    match &app.source {
        Source::Snapshot(path) => {
            right_spans.push(Span::styled(
                format!("◼ snapshot {}", path.display()),
                Style::default().fg(theme::MAGENTA),
            ));
        }
        Source::Live => {
            right_spans.push(match &app.connection_status {
                ConnectionStatus::Connected => {
                    Span::styled("● Connected", Style::default().fg(theme::GREEN))
                }
                ConnectionStatus::Connecting => {
                    Span::styled("◌ Connecting...", Style::default().fg(theme::YELLOW))
                }
                ConnectionStatus::Error(_) => {
                    Span::styled("✗ Fetch failing", Style::default().fg(theme::RED))
                }
            });

            right_spans.push(match &app.realtime_status {
                None => Span::styled("  rt:off", Style::default().fg(theme::TEXT_MUTED)),
                Some(FeedStatus::Subscribed) => {
                    Span::styled("  rt:live", Style::default().fg(theme::GREEN))
                }
                Some(FeedStatus::Connecting) => {
                    Span::styled("  rt:connecting", Style::default().fg(theme::YELLOW))
                }
                Some(FeedStatus::Disconnected(_)) => {
                    Span::styled("  rt:down", Style::default().fg(theme::RED))
                }
            });

            if !app.polling_enabled {
                right_spans.push(Span::styled("  ⏸ paused", Style::default().fg(theme::YELLOW)));
            } else if app.error_count > 0 {
                right_spans.push(Span::styled(
                    format!("  ↻ backoff {}s", app.polling_interval.as_secs()),
                    Style::default().fg(theme::YELLOW),
                ));
            } else {
                right_spans.push(Span::styled(
                    format!("  ↻ {}s", app.polling_interval.as_secs()),
                    Style::default().fg(theme::TEXT_MUTED),
                ));
            }
        }
    }

    let shown = app.visible_events().len();
    let held = app.store.len();
    let count = if shown == held {
        format!("  [{} events]", held)
    } else {
        format!("  [{}/{} events]", shown, held)
    };
    right_spans.push(Span::styled(count, Style::default().fg(theme::TEXT_MUTED)));
    right_spans.push(Span::raw(" "));

    // Fill the gap so the status block is right-aligned
    let left_width: usize = left_spans.iter().map(|s| s.width()).sum();
    let right_width: usize = right_spans.iter().map(|s| s.width()).sum();
    let gap = (area.width as usize).saturating_sub(left_width + right_width);

    let mut spans = left_spans;
    spans.push(Span::raw(" ".repeat(gap)));
    spans.extend(right_spans);

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::BG_BAR));
    frame.render_widget(widget, area);
}
