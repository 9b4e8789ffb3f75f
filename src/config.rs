use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use serde::Deserialize;

use crate::client::RestConfig;
use crate::domain::window_start;
use crate::store::DEFAULT_CAPACITY;

#[derive(Parser, Debug, Default)]
#[command(name = "busmon", about = "Terminal monitor for a Supabase event bus")]
pub struct Cli {
    /// Supabase project URL (https://<ref>.supabase.co)
    #[arg(long, env = "SUPABASE_URL")]
    pub url: Option<String>,

    /// Supabase anon or service key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Events table
    #[arg(long, env = "BUSMON_TABLE")]
    pub table: Option<String>,

    /// Agents table joined for source/target names
    #[arg(long)]
    pub agents_table: Option<String>,

    /// Database schema
    #[arg(long)]
    pub schema: Option<String>,

    /// Maximum number of events per fetch
    #[arg(long)]
    pub limit: Option<usize>,

    /// Only fetch events newer than this many hours (0 = no window)
    #[arg(long)]
    pub window_hours: Option<u64>,

    /// Polling interval in seconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Disable the realtime subscription and rely on polling only
    #[arg(long)]
    pub no_realtime: bool,

    /// Maximum number of events kept in memory
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Directory for CSV/JSON exports
    #[arg(long, env = "BUSMON_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// Log file path
    #[arg(long, env = "BUSMON_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: Option<String>,
    pub agents_table: Option<String>,
    pub schema: Option<String>,
    pub limit: Option<usize>,
    pub window_hours: Option<u64>,
    pub poll_interval: Option<u64>,
    pub timeout: Option<u64>,
    pub realtime: Option<bool>,
    pub capacity: Option<usize>,
    pub export_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("busmon").join("config.toml"))
    }

    /// Loads the user config file. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("missing {0} (set the flag, the environment variable or the config file)")]
    Missing(&'static str),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub url: String,
    pub api_key: String,
    pub table: String,
    pub agents_table: String,
    pub schema: String,
    pub limit: usize,
    pub window_hours: u64,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub realtime: bool,
    pub capacity: usize,
    pub export_dir: PathBuf,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: ConfigFile) -> Result<Self, ConfigError> {
        let url = cli
            .url
            .clone()
            .or(file.url)
            .ok_or(ConfigError::Missing("project url (--url / SUPABASE_URL)"))?;
        let api_key = cli
            .api_key
            .clone()
            .or(file.api_key)
            .ok_or(ConfigError::Missing("api key (--api-key / SUPABASE_ANON_KEY)"))?;

        let url = url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "url",
                reason: format!("expected http:// or https://, got {:?}", url),
            });
        }
        if api_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "api key",
                reason: "cannot be empty".to_string(),
            });
        }

        let settings = Settings {
            url,
            api_key: api_key.trim().to_string(),
            table: cli
                .table
                .clone()
                .or(file.table)
                .unwrap_or_else(|| "event_bus".to_string()),
            agents_table: cli
                .agents_table
                .clone()
                .or(file.agents_table)
                .unwrap_or_else(|| "ai_agents".to_string()),
            schema: cli
                .schema
                .clone()
                .or(file.schema)
                .unwrap_or_else(|| "public".to_string()),
            limit: cli.limit.or(file.limit).unwrap_or(100),
            window_hours: cli.window_hours.or(file.window_hours).unwrap_or(24),
            poll_interval: Duration::from_secs(cli.poll_interval.or(file.poll_interval).unwrap_or(30)),
            timeout: Duration::from_secs(cli.timeout.or(file.timeout).unwrap_or(10)),
            realtime: !cli.no_realtime && file.realtime.unwrap_or(true),
            capacity: cli.capacity.or(file.capacity).unwrap_or(DEFAULT_CAPACITY),
            export_dir: cli
                .export_dir
                .clone()
                .or(file.export_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        if settings.table.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "table",
                reason: "cannot be empty".to_string(),
            });
        }
        if settings.limit == 0 {
            return Err(ConfigError::Invalid {
                field: "limit",
                reason: "must be greater than zero".to_string(),
            });
        }
        if settings.capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        if settings.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "poll interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if settings.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if settings.window_hours > 0 && window_start(Utc::now(), settings.window_hours).is_none() {
            return Err(ConfigError::Invalid {
                field: "window hours",
                reason: format!("{} hours is out of range", settings.window_hours),
            });
        }

        Ok(settings)
    }

    pub fn rest_config(&self) -> RestConfig {
        RestConfig {
            base_url: self.url.clone(),
            api_key: self.api_key.clone(),
            table: self.table.clone(),
            agents_table: self.agents_table.clone(),
            schema: self.schema.clone(),
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn cli() -> Cli {
        Cli {
            url: Some("https://abc.supabase.co/".to_string()),
            api_key: Some("anon".to_string()),
            ..Cli::default()
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::resolve(&cli(), ConfigFile::default()).expect("valid settings");
        assert_eq!(settings.url, "https://abc.supabase.co");
        assert_eq!(settings.table, "event_bus");
        assert_eq!(settings.agents_table, "ai_agents");
        assert_eq!(settings.schema, "public");
        assert_eq!(settings.limit, 100);
        assert_eq!(settings.window_hours, 24);
        assert_eq!(settings.poll_interval, Duration::from_secs(30));
        assert_eq!(settings.capacity, 500);
        assert!(settings.realtime);
        assert_eq!(settings.export_dir, PathBuf::from("."));
    }

    #[test]
    fn flags_win_over_config_file() {
        let mut args = cli();
        args.limit = Some(20);
        args.no_realtime = true;
        let file = ConfigFile {
            limit: Some(50),
            table: Some("bus".to_string()),
            realtime: Some(true),
            ..ConfigFile::default()
        };

        let settings = Settings::resolve(&args, file).expect("valid settings");
        assert_eq!(settings.limit, 20);
        assert_eq!(settings.table, "bus");
        assert!(!settings.realtime);
    }

    #[test]
    fn missing_or_invalid_values_are_rejected() {
        let err = Settings::resolve(&Cli::default(), ConfigFile::default()).expect_err("no url");
        assert!(matches!(err, ConfigError::Missing(_)));

        let mut args = cli();
        args.url = Some("abc.supabase.co".to_string());
        assert!(matches!(
            Settings::resolve(&args, ConfigFile::default()),
            Err(ConfigError::Invalid { field: "url", .. })
        ));

        let mut args = cli();
        args.limit = Some(0);
        assert!(matches!(
            Settings::resolve(&args, ConfigFile::default()),
            Err(ConfigError::Invalid { field: "limit", .. })
        ));

        let mut args = cli();
        args.poll_interval = Some(0);
        assert!(Settings::resolve(&args, ConfigFile::default()).is_err());

        let mut args = cli();
        args.timeout = Some(0);
        assert!(matches!(
            Settings::resolve(&args, ConfigFile::default()),
            Err(ConfigError::Invalid { field: "timeout", .. })
        ));
    }

    #[test]
    fn window_hours_must_fit_the_time_range() {
        for hours in [3_000_000_000, u64::MAX] {
            let mut args = cli();
            args.window_hours = Some(hours);
            assert!(matches!(
                Settings::resolve(&args, ConfigFile::default()),
                Err(ConfigError::Invalid { field: "window hours", .. })
            ));
        }

        let mut args = cli();
        args.window_hours = Some(0);
        let settings = Settings::resolve(&args, ConfigFile::default()).expect("no window");
        assert_eq!(settings.window_hours, 0);
    }

    #[test]
    fn config_file_is_parsed_from_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "url = \"https://x.supabase.co\"\napi_key = \"k\"\npoll_interval = 5\nrealtime = false"
        )
        .expect("write config");

        let parsed = ConfigFile::load_from(file.path()).expect("parse config");
        assert_eq!(parsed.poll_interval, Some(5));
        assert_eq!(parsed.realtime, Some(false));

        let settings = Settings::resolve(&Cli::default(), parsed).expect("valid settings");
        assert_eq!(settings.url, "https://x.supabase.co");
        assert!(!settings.realtime);
    }

    #[test]
    fn broken_config_file_reports_its_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "limit = \"many\"").expect("write config");
        let err = ConfigFile::load_from(file.path()).expect_err("type mismatch");
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
