use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use super::format_time;
use crate::app::App;
use crate::domain::Event;
use crate::theme;

const HEADER: [&str; 7] = [" Time", "Type", "Priority", "Source", "Target", "Done", "Data"];

pub fn render(app: &mut App, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row<'static>> = app.visible_events().into_iter().map(event_row).collect();

    if rows.is_empty() {
        let label = if app.store.is_fetching() && app.store.is_empty() {
            " Loading events..."
        } else if app.store.is_empty() {
            " No events in the current window"
        } else {
            " No events match the search or filters"
        };
        let widget = Paragraph::new(label).style(Style::default().fg(theme::TEXT_MUTED));
        frame.render_widget(widget, area);
        return;
    }

    let header = Row::new(HEADER.iter().map(|label| Cell::from(*label)).collect::<Vec<_>>())
        .style(
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        )
        .height(1);

    let widths = [
        Constraint::Length(20),
        Constraint::Length(18),
        Constraint::Length(9),
        Constraint::Percentage(15),
        Constraint::Percentage(15),
        Constraint::Length(5),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::NONE))
        .row_highlight_style(
            Style::default()
                .bg(theme::BG_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn event_row(event: &Event) -> Row<'static> {
    let processed = if event.is_processed { "✓" } else { "·" };
    Row::new(vec![
        Cell::from(format!(" {}", format_time(&event.created_at))),
        Cell::from(format!(
            "{} {}",
            event.event_type.symbol(),
            event.event_type.as_str()
        ))
        .style(Style::default().fg(theme::event_type_color(&event.event_type))),
        Cell::from(event.priority.as_str())
            .style(Style::default().fg(theme::priority_color(event.priority))),
        Cell::from(event.source_name().unwrap_or("-").to_string()),
        Cell::from(event.target_name().unwrap_or("-").to_string()),
        Cell::from(processed),
        Cell::from(event.event_data.to_compact())
            .style(Style::default().fg(theme::TEXT_DIM)),
    ])
}
