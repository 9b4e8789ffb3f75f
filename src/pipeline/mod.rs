//! Client-side transforms over the in-memory event list: search, stats,
//! export and snapshot import. Everything here is pure apart from the
//! file helpers.

pub mod csv;
pub mod export;
pub mod import;
pub mod search;
pub mod stats;

pub use export::{to_csv, to_json, write_export, ExportFormat};
pub use import::{parse_snapshot, read_snapshot, ImportError};
pub use search::search;
pub use stats::{aggregate, aggregate_in, EventStats, HourlyCount};
