//! Logging Module
//!
//! Unified tracing setup for the command-line tools:
//! - log file in the system temp directory, rotated daily
//! - pruning of old log files
//! - stderr output for interactive runs
//!
//! # Examples
//!
//! ```no_run
//! use image_utils::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! init_logging("img_compare", LogConfig::default()).expect("Failed to initialize logging");
//! info!("Program started");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory, the system temp directory by default
    pub log_dir: PathBuf,
    /// Number of log files kept per program
    pub max_files: usize,
    /// Level used when `RUST_LOG` is not set
    pub level: Level,
    /// Mirror log lines to stderr
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: Level::WARN,
            stderr: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_stderr(mut self, enabled: bool) -> Self {
        self.stderr = enabled;
        self
    }

    /// Default directive: the program's own target plus this library.
    fn default_directive(&self, program_name: &str) -> String {
        let level = self.level.as_str().to_lowercase();
        format!(
            "{}={level},image_utils={level}",
            program_name.replace('-', "_")
        )
    }
}

/// Install the global subscriber.
///
/// Writes `{program_name}.log` (rotated daily) under `config.log_dir` and,
/// optionally, to stderr. May only succeed once per process.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let log_file_name = format!("{}.log", program_name);
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, &log_file_name);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive(program_name)));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    let stderr_layer = config.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .with_line_number(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Global tracing subscriber already installed")?;

    tracing::debug!(
        program = program_name,
        log_dir = ?config.log_dir,
        log_file = log_file_name,
        max_files = config.max_files,
        level = ?config.level,
        "Logging system initialized"
    );

    cleanup_old_logs(&config.log_dir, program_name, config.max_files)?;

    Ok(())
}

/// Keep only the `max_files` most recently modified logs of `program_name`.
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    use std::fs;

    let entries = fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(file_name) = path.file_name() {
            let file_name_str = file_name.to_string_lossy();
            if is_program_log(&file_name_str, program_name) {
                if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
                    log_files.push((path, modified));
                }
            }
        }
    }

    if log_files.len() > max_files {
        // newest first
        log_files.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in log_files.iter().skip(max_files) {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = ?path, error = %e, "Failed to remove old log file");
            } else {
                tracing::debug!(path = ?path, "Removed old log file");
            }
        }
    }

    Ok(())
}

/// `{program}.log` or a daily roll of it, `{program}.log.YYYY-MM-DD`.
fn is_program_log(file_name: &str, program_name: &str) -> bool {
    let Some(rest) = file_name
        .strip_prefix(program_name)
        .and_then(|r| r.strip_prefix(".log"))
    else {
        return false;
    };
    match rest.strip_prefix('.') {
        None => rest.is_empty(),
        Some(suffix) => {
            !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit() || c == '-')
        }
    }
}
