use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::format_time;
use crate::app::App;
use crate::domain::{AgentRef, Event};
use crate::theme;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let Some(event) = app.detail_event() else {
        let widget = Paragraph::new(" Event is no longer held (evicted or filtered out), Esc to go back")
            .style(Style::default().fg(theme::TEXT_MUTED));
        frame.render_widget(widget, area);
        return;
    };

    let paragraph = Paragraph::new(detail_lines(event))
        .block(Block::default().borders(Borders::NONE))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn detail_lines(event: &Event) -> Vec<Line<'static>> {
    let optional_time = |ts: Option<&chrono::DateTime<chrono::Utc>>| {
        ts.map(format_time).unwrap_or_else(|| "-".to_string())
    };

    let mut lines = vec![
        field_line("ID", event.id.to_string(), theme::TEXT),
        field_line(
            "Type",
            event.event_type.to_string(),
            theme::event_type_color(&event.event_type),
        ),
        field_line(
            "Priority",
            event.priority.to_string(),
            theme::priority_color(event.priority),
        ),
        field_line("Source", agent_label(event.source_agent.as_ref()), theme::TEXT),
        field_line("Target", agent_label(event.target_agent.as_ref()), theme::TEXT),
        field_line("Created", format_time(&event.created_at), theme::TEXT),
        field_line(
            "Processed",
            if event.is_processed { "yes" } else { "no" }.to_string(),
            if event.is_processed { theme::GREEN } else { theme::YELLOW },
        ),
        field_line("Processed At", optional_time(event.processed_at.as_ref()), theme::TEXT),
        field_line("Expires At", optional_time(event.expires_at.as_ref()), theme::TEXT),
        Line::from(""),
        Line::from(Span::styled(
            " Event Data:",
            Style::default().fg(theme::CYAN).add_modifier(Modifier::BOLD),
        )),
    ];

    for line in event.event_data.to_pretty().lines() {
        lines.push(Line::from(format!("   {}", line)));
    }
    lines
}

fn agent_label(agent: Option<&AgentRef>) -> String {
    match agent {
        Some(agent) if agent.group.is_empty() => agent.name.clone(),
        Some(agent) => format!("{} ({})", agent.name, agent.group),
        None => "-".to_string(),
    }
}

fn field_line(label: &'static str, value: String, color: ratatui::style::Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {:<14}", label), Style::default().fg(theme::TEXT_DIM)),
        Span::styled(value, Style::default().fg(color)),
    ])
}
