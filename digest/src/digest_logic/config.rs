use clap::Parser;
use log::Level;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read when `--config-path` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "market_digest.conf";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[clap(about = "Daily US market digest generator", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "DIGEST_OUTPUT", help = "Path of the HTML report to write.")]
    pub output: Option<PathBuf>,

    #[clap(long, env = "DIGEST_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "DIGEST_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "DIGEST_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "DIGEST_LOOKBACK_SESSIONS", help = "Trailing daily sessions requested per symbol.")]
    pub lookback_sessions: Option<u32>,

    #[clap(long, env = "DIGEST_FETCH_DEADLINE_SECONDS", help = "Overall deadline in seconds for the price fetch.")]
    pub fetch_deadline_seconds: Option<u64>,

    #[clap(long, env = "DIGEST_HTTP_TIMEOUT_SECONDS", help = "Timeout in seconds for a single HTTP request.")]
    pub http_timeout_seconds: Option<u64>,

    #[clap(long, env = "DIGEST_MAX_CONCURRENCY", help = "Maximum chart requests in flight.")]
    pub max_concurrency: Option<usize>,

    #[clap(long, env = "DIGEST_USER_AGENT", help = "User-Agent header sent to data sources.")]
    pub user_agent: Option<String>,

    #[clap(long, env = "DIGEST_SKIP_SENTIMENT", help = "Skip the CBOE, CNN and AAII gauges (true/false).")]
    pub skip_sentiment: Option<bool>,
}

/// Fully resolved settings, every value present.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub lookback_sessions: u32,
    pub fetch_deadline: Duration,
    pub http_timeout: Duration,
    pub max_concurrency: usize,
    pub user_agent: String,
    pub skip_sentiment: bool,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            output: other.output.or(self.output),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            lookback_sessions: other.lookback_sessions.or(self.lookback_sessions),
            fetch_deadline_seconds: other.fetch_deadline_seconds.or(self.fetch_deadline_seconds),
            http_timeout_seconds: other.http_timeout_seconds.or(self.http_timeout_seconds),
            max_concurrency: other.max_concurrency.or(self.max_concurrency),
            user_agent: other.user_agent.or(self.user_agent),
            skip_sentiment: other.skip_sentiment.or(self.skip_sentiment),
        }
    }

    /// Built-in defaults, the lowest layer.
    pub fn defaults() -> Config {
        Config {
            output: Some(PathBuf::from("index.html")),
            config_path: None,
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            lookback_sessions: Some(10),
            fetch_deadline_seconds: Some(45),
            http_timeout_seconds: Some(20),
            max_concurrency: Some(6),
            user_agent: Some("Mozilla/5.0".to_string()),
            skip_sentiment: Some(false),
        }
    }

    /// Fills anything still unset from [`Config::defaults`].
    pub fn resolve(self) -> Settings {
        let c = Config::defaults().merge(self);
        Settings {
            output: c.output.unwrap_or_else(|| PathBuf::from("index.html")),
            log_dir: c.log_dir.unwrap_or_else(|| PathBuf::from("./logs")),
            log_level: c.log_level.unwrap_or_else(|| "info".to_string()),
            lookback_sessions: c.lookback_sessions.unwrap_or(10).max(1),
            fetch_deadline: Duration::from_secs(c.fetch_deadline_seconds.unwrap_or(45)),
            http_timeout: Duration::from_secs(c.http_timeout_seconds.unwrap_or(20)),
            max_concurrency: c.max_concurrency.unwrap_or(6).max(1),
            user_agent: c.user_agent.unwrap_or_else(|| "Mozilla/5.0".to_string()),
            skip_sentiment: c.skip_sentiment.unwrap_or(false),
        }
    }
}

/// # Loaded Config
///
/// The layered config plus what happened while reading the file. Loading
/// runs before the logger is installed, so the notes are held here and
/// replayed with [`LoadedConfig::log_notes`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: Config,
    pub notes: Vec<(Level, String)>,
}

impl LoadedConfig {
    /// Sends every note to the installed logger at its level.
    pub fn log_notes(&self) {
        for (level, note) in &self.notes {
            log::log!(*level, "{}", note);
        }
    }
}

/// Reads a JSON config file. `Err` carries the note to log when the file is
/// missing, unreadable or unparseable.
fn read_config_file(path: &Path) -> Result<Config, (Level, String)> {
    if !path.exists() {
        return Err((
            Level::Info,
            format!("Config file not found at {}. Using defaults and environment/CLI variables.", path.display()),
        ));
    }

    let config_str = fs::read_to_string(path).map_err(|e| {
        (
            Level::Warn,
            format!("Failed to read config file: {} ({}). Falling back to other sources.", path.display(), e),
        )
    })?;

    serde_json::from_str::<Config>(&config_str).map_err(|e| {
        (
            Level::Warn,
            format!("Failed to parse config file: {} ({}). Falling back to other sources.", path.display(), e),
        )
    })
}

/// Layers defaults, the config file and `cli` (which already carries env vars).
pub fn load_config_from(cli: Config) -> LoadedConfig {
    let mut notes = Vec::new();

    // 1. Load defaults
    let mut current_config = Config::defaults();

    // 2. Load from config file (market_digest.conf) if present.
    //    The CLI may point at a different file.
    let config_file_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match read_config_file(&config_file_path) {
        Ok(file_config) => {
            notes.push((Level::Info, format!("Loaded config file {}", config_file_path.display())));
            current_config = current_config.merge(file_config);
        }
        Err(note) => notes.push(note),
    }

    // 3. Override with environment variables and CLI arguments
    LoadedConfig {
        config: current_config.merge(cli),
        notes,
    }
}

pub fn load_config() -> LoadedConfig {
    load_config_from(Config::parse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_resolve() {
        let s = Config::default().resolve();
        assert_eq!(s.output, PathBuf::from("index.html"));
        assert_eq!(s.log_dir, PathBuf::from("./logs"));
        assert_eq!(s.log_level, "info");
        assert_eq!(s.lookback_sessions, 10);
        assert_eq!(s.fetch_deadline, Duration::from_secs(45));
        assert_eq!(s.http_timeout, Duration::from_secs(20));
        assert_eq!(s.max_concurrency, 6);
        assert_eq!(s.user_agent, "Mozilla/5.0");
        assert!(!s.skip_sentiment);
    }

    #[test]
    fn test_file_overrides_defaults_and_cli_overrides_file() {
        let dir = tempdir().unwrap();
        let conf = dir.path().join("digest.conf");
        fs::write(&conf, r#"{"output":"site/daily.html","logLevel":"debug","maxConcurrency":3}"#).unwrap();

        let cli = Config {
            config_path: Some(conf),
            log_level: Some("warn".to_string()),
            ..Default::default()
        };
        let s = load_config_from(cli).config.resolve();

        assert_eq!(s.output, PathBuf::from("site/daily.html"));
        assert_eq!(s.max_concurrency, 3);
        assert_eq!(s.log_level, "warn");
        assert_eq!(s.lookback_sessions, 10);
    }

    #[test]
    fn test_unparseable_file_is_ignored() {
        let dir = tempdir().unwrap();
        let conf = dir.path().join("broken.conf");
        fs::write(&conf, "{ not json").unwrap();

        let cli = Config {
            config_path: Some(conf),
            ..Default::default()
        };
        let loaded = load_config_from(cli.clone());
        assert_eq!(loaded.config, Config::defaults().merge(cli));

        assert_eq!(loaded.notes.len(), 1);
        let (level, note) = &loaded.notes[0];
        assert_eq!(*level, Level::Warn);
        assert!(note.starts_with("Failed to parse config file"));
        assert!(note.contains("broken.conf"));
    }

    #[test]
    fn test_missing_file_is_noted_at_info() {
        let dir = tempdir().unwrap();
        let cli = Config {
            config_path: Some(dir.path().join("absent.conf")),
            ..Default::default()
        };
        let loaded = load_config_from(cli);

        assert_eq!(loaded.notes.len(), 1);
        assert_eq!(loaded.notes[0].0, Level::Info);
        assert!(loaded.notes[0].1.contains("absent.conf"));
    }

    #[test]
    fn test_loaded_file_is_noted() {
        let dir = tempdir().unwrap();
        let conf = dir.path().join("ok.conf");
        fs::write(&conf, r#"{"skipSentiment":true}"#).unwrap();

        let loaded = load_config_from(Config {
            config_path: Some(conf),
            ..Default::default()
        });

        assert!(loaded.config.resolve().skip_sentiment);
        assert_eq!(loaded.notes[0].0, Level::Info);
        assert!(loaded.notes[0].1.starts_with("Loaded config file"));
    }

    #[test]
    fn test_zero_limits_are_clamped() {
        let s = Config {
            lookback_sessions: Some(0),
            max_concurrency: Some(0),
            ..Default::default()
        }
        .resolve();
        assert_eq!(s.lookback_sessions, 1);
        assert_eq!(s.max_concurrency, 1);
    }
}
