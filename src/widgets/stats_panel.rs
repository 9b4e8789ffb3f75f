use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Sparkline};
use ratatui::Frame;

use crate::app::App;
use crate::pipeline::EventStats;
use crate::theme;

const BAR_WIDTH: usize = 30;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let stats = app.stats();

    let layout = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(8),
    ])
    .split(area);

    frame.render_widget(Paragraph::new(summary_lines(&stats)), layout[0]);

    let columns = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);

    let by_type: Vec<(String, usize, Color)> = stats
        .by_type
        .iter()
        .map(|(ty, count)| {
            (
                format!("{} {}", ty.symbol(), ty.as_str()),
                *count,
                theme::event_type_color(ty),
            )
        })
        .collect();
    render_breakdown(frame, columns[0], " By Type ", &by_type, stats.total);

    // Highest priority first
    let by_priority: Vec<(String, usize, Color)> = stats
        .by_priority
        .iter()
        .rev()
        .map(|(p, count)| (p.as_str().to_string(), *count, theme::priority_color(*p)))
        .collect();
    render_breakdown(frame, columns[1], " By Priority ", &by_priority, stats.total);

    render_frequency(frame, layout[2], &stats);
}

fn summary_lines(stats: &EventStats) -> Vec<Line<'static>> {
    vec![Line::from(vec![
        Span::styled(" Total ", Style::default().fg(theme::TEXT_DIM)),
        Span::styled(
            stats.total.to_string(),
            Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Processed ", Style::default().fg(theme::TEXT_DIM)),
        Span::styled(stats.processed.to_string(), Style::default().fg(theme::GREEN)),
        Span::styled("   Pending ", Style::default().fg(theme::TEXT_DIM)),
        Span::styled(stats.pending().to_string(), Style::default().fg(theme::YELLOW)),
    ])]
}

fn render_breakdown(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    rows: &[(String, usize, Color)],
    total: usize,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::TEXT_MUTED))
        .title(title);

    if rows.is_empty() {
        let empty = Paragraph::new(" no events").style(Style::default().fg(theme::TEXT_MUTED));
        frame.render_widget(empty.block(block), area);
        return;
    }

    let max = rows.iter().map(|(_, count, _)| *count).max().unwrap_or(1).max(1);
    let lines: Vec<Line> = rows
        .iter()
        .map(|(label, count, color)| {
            let filled = count * BAR_WIDTH / max;
            let share = if total == 0 { 0 } else { count * 100 / total };
            Line::from(vec![
                Span::styled(format!(" {:<20}", label), Style::default().fg(*color)),
                Span::styled("█".repeat(filled.max(1)), Style::default().fg(*color)),
                Span::styled(
                    format!(" {} ({}%)", count, share),
                    Style::default().fg(theme::TEXT_DIM),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_frequency(frame: &mut Frame, area: Rect, stats: &EventStats) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::TEXT_MUTED))
        .title(" Events per hour (local, 00-23) ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(inner);

    let series = stats.hourly_series();
    let sparkline = Sparkline::default()
        .data(&series)
        .style(Style::default().fg(theme::ACCENT));
    frame.render_widget(sparkline, rows[0]);

    let peak = stats
        .message_frequency
        .iter()
        .max_by_key(|bucket| bucket.count)
        .map(|bucket| format!(" peak {:02}:00 with {} events", bucket.hour, bucket.count))
        .unwrap_or_else(|| " no activity".to_string());
    frame.render_widget(
        Paragraph::new(peak).style(Style::default().fg(theme::TEXT_DIM)),
        rows[1],
    );
}
