use ratatui::style::Color;

use crate::domain::{EventType, Priority};

// Backgrounds
pub const BG_DARK: Color = Color::Rgb(13, 13, 23);
pub const BG_BAR: Color = Color::Rgb(17, 17, 30);
pub const BG_SURFACE: Color = Color::Rgb(22, 22, 38);
pub const BG_HIGHLIGHT: Color = Color::Rgb(30, 30, 58);
pub const BG_INPUT: Color = Color::Rgb(30, 30, 30);

// Accent
pub const ACCENT: Color = Color::Rgb(62, 207, 142);
pub const ACCENT_DIM: Color = Color::Rgb(36, 140, 96);

// Text
pub const TEXT: Color = Color::Rgb(220, 220, 230);
pub const TEXT_DIM: Color = Color::Rgb(130, 130, 155);
pub const TEXT_MUTED: Color = Color::Rgb(75, 75, 100);

// Semantic
pub const GREEN: Color = Color::Rgb(52, 211, 153);
pub const BLUE: Color = Color::Rgb(96, 165, 250);
pub const RED: Color = Color::Rgb(248, 113, 113);
pub const YELLOW: Color = Color::Rgb(251, 191, 36);
pub const CYAN: Color = Color::Rgb(103, 232, 249);
pub const MAGENTA: Color = Color::Rgb(232, 121, 249);

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => TEXT_DIM,
        Priority::Medium => BLUE,
        Priority::High => YELLOW,
        Priority::Critical => RED,
    }
}

pub fn event_type_color(event_type: &EventType) -> Color {
    match event_type {
        EventType::MarketData => CYAN,
        EventType::TradeSignal => GREEN,
        EventType::OrderExecution => MAGENTA,
        EventType::RiskAlert => RED,
        EventType::SystemStatus => BLUE,
        EventType::Other(_) => TEXT_DIM,
    }
}
