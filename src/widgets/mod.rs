pub mod command_input;
pub mod event_detail;
pub mod event_list;
pub mod footer;
pub mod header;
pub mod help_overlay;
pub mod stats_panel;
pub mod toast;

use chrono::{DateTime, Local, Utc};

pub(crate) fn format_time(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
