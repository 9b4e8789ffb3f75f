use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, InputMode};
use crate::input::commands::{matching_commands, COMMANDS};
use crate::theme;

/// The `:` / `/` prompt line.
pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let (prefix, style) = match app.input_mode {
        InputMode::Command => (":", Style::default().fg(theme::YELLOW)),
        InputMode::Search => ("/", Style::default().fg(theme::GREEN)),
        _ => return,
    };

    let mut spans = vec![
        Span::styled(prefix, style),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(theme::TEXT)),
    ];

    // Ghost completion while the command word is still being typed
    if app.input_mode == InputMode::Command && !app.input_buffer.is_empty() && !app.input_buffer.contains(' ') {
        if let Some(cmd) = matching_commands(&app.input_buffer).first() {
            if let Some(ghost) = cmd.name.strip_prefix(app.input_buffer.as_str()) {
                spans.push(Span::styled(ghost, Style::default().fg(theme::TEXT_MUTED)));
            }
        }
    }

    spans.push(Span::styled("_", Style::default().fg(theme::TEXT_MUTED)));

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::BG_INPUT));
    frame.render_widget(widget, area);
}

pub fn render_suggestions(app: &App, frame: &mut Frame, area: Rect) {
    if app.input_mode != InputMode::Command {
        return;
    }

    let input_cmd = app.input_buffer.split_whitespace().next().unwrap_or("");
    let candidates: Vec<_> = if input_cmd.is_empty() {
        COMMANDS.iter().collect()
    } else if app.input_buffer.contains(' ') {
        vec![]
    } else {
        matching_commands(input_cmd)
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    if candidates.is_empty() && !app.input_buffer.contains(' ') {
        spans.push(Span::styled(
            "No matching commands",
            Style::default().fg(theme::TEXT_MUTED),
        ));
    }
    for (i, cmd) in candidates.iter().enumerate() {
        let cmd_style = if i == 0 {
            Style::default().fg(theme::CYAN)
        } else {
            Style::default().fg(theme::TEXT_DIM)
        };
        spans.push(Span::styled(format!(":{}", cmd.name), cmd_style));
        for alias in cmd.aliases {
            spans.push(Span::styled(
                format!("|{}", alias),
                Style::default().fg(theme::TEXT_MUTED),
            ));
        }
        spans.push(Span::styled(
            format!(" {}  ", cmd.description),
            Style::default().fg(theme::TEXT_MUTED),
        ));
    }

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::BG_SURFACE));
    frame.render_widget(widget, area);
}
