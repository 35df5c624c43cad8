use anyhow::Result;
use colored::{ColoredString, Colorize};
use glob::{glob, Pattern};
use log::{Level, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};

/// Log files are named `market_digest_<timestamp>.log`.
pub const LOG_PREFIX: &str = "market_digest";

/// Installs the global logger: colored lines on stdout, plain lines in a new
/// timestamped file under `log_dir`. Returns the file's path.
pub fn setup_logging(log_dir: &Path, log_level: &str) -> Result<PathBuf> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }

    // Clean up old log files, keeping only the most recent one
    cleanup_old_logs(log_dir, 1)?;

    let log_file_name = format!("{}_{}.log", LOG_PREFIX, chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let log_path = log_dir.join(log_file_name);

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]").to_string().truecolor(128, 128, 128),
                record.target(),
                paint_level(record.level()),
                message
            ))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .chain(fern::log_file(&log_path)?);

    fern::Dispatch::new()
        .level(parse_level(log_level))
        // Retry middleware and connection pool chatter.
        .level_for("reqwest_retry", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .chain(console)
        .chain(file)
        .apply()?;

    Ok(log_path)
}

/// `trace|debug|info|warn|error`, case-insensitive; anything else is `Info`.
pub fn parse_level(log_level: &str) -> LevelFilter {
    match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

fn paint_level(level: Level) -> ColoredString {
    let name = level.as_str();
    match level {
        Level::Error => name.bright_red(),
        Level::Warn => name.bright_yellow(),
        Level::Info => name.bright_green(),
        Level::Debug => name.bright_white(),
        Level::Trace => name.bright_cyan(),
    }
}

/// Deletes all but the `keep` newest digest log files in `log_dir`.
/// Returns how many files were removed.
pub fn cleanup_old_logs(log_dir: &Path, keep: usize) -> Result<usize> {
    let pattern = format!(
        "{}/{}_*.log",
        Pattern::escape(&log_dir.display().to_string()),
        LOG_PREFIX
    );

    let mut log_files: Vec<PathBuf> = glob(&pattern)?.filter_map(|entry| entry.ok()).collect();

    // Timestamped names sort chronologically; newest first.
    log_files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

    let mut removed = 0;
    for old_file in log_files.iter().skip(keep) {
        match fs::remove_file(old_file) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!("Failed to delete old log file {}: {}", old_file.display(), e),
        }
    }

    Ok(removed)
}
