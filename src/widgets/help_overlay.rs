use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::View;
use crate::input::commands::COMMANDS;
use crate::theme;

pub fn render(view: View, frame: &mut Frame, area: Rect) {
    let mut lines = vec![];

    lines.push(Line::from(""));
    lines.push(section("Navigation"));
    lines.push(binding("j / k / Up / Down", "Move / scroll"));
    lines.push(binding("gg / G", "Go to top / bottom"));
    lines.push(binding("Ctrl+D / Ctrl+U", "Page down / up"));
    if view == View::Events {
        lines.push(binding("Enter", "Open event detail"));
    }
    lines.push(binding("Esc", "Back / clear search"));
    lines.push(binding("Tab", "Switch events / stats"));

    if view != View::Detail {
        lines.push(Line::from(""));
        lines.push(section("Filtering"));
        lines.push(binding("/ (slash)", "Search type, source, payload"));
        lines.push(binding("t", "Cycle event type filter"));
        lines.push(binding("p", "Cycle priority filter"));
        lines.push(binding("x", "Cycle processed filter"));
    }

    lines.push(Line::from(""));
    lines.push(section("Data"));
    lines.push(binding("e / E", "Export visible events as CSV / JSON"));
    lines.push(binding("Ctrl+R", "Refresh now"));
    lines.push(binding("P (shift+p)", "Pause / resume polling"));

    lines.push(Line::from(""));
    lines.push(section("Commands"));
    for cmd in COMMANDS {
        lines.push(binding(cmd.name, cmd.description));
    }

    lines.push(Line::from(""));
    lines.push(binding("?", "Toggle this help"));

    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let modal_area = centered_rect(70, height, area);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .title(" Help (? to close) ");

    frame.render_widget(Paragraph::new(lines).block(block), modal_area);
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        format!("  {}", title),
        Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
    ))
}

fn binding<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {:<22}", key), Style::default().fg(theme::YELLOW)),
        Span::styled(desc, Style::default().fg(theme::TEXT)),
    ])
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .split(vertical[0]);
    horizontal[0]
}
