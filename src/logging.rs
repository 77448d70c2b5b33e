//! Structured JSONL logging plus human-readable stderr output.
//!
//! - **JSONL to file** (~/.wme-shortcuts/logs/wme-shortcuts.jsonl) for later parsing
//! - **Compact to stderr** for whoever is watching the terminal
//!
//! # Usage
//!
//! ```rust,ignore
//! use wme_shortcuts::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init();
//!
//! tracing::info!(event_type = "shortcut_lifecycle", shortcut_id = "demo", "Registered");
//! ```

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

// In-memory ring of recent categorized lines, shown by the CLI.
static LOG_BUFFER: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();
const MAX_LOG_LINES: usize = 50;

const LOG_FILE_NAME: &str = "wme-shortcuts.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// If the log file can't be opened, only stderr logging is installed.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }
    let log_path = log_dir.join(LOG_FILE_NAME);

    // Environment filter - default to info, allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Compact layer for stderr
    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file {}: {}", log_path.display(), e);
            None
        }
    };

    // Non-blocking writer so auto-save ticks never wait on disk
    let (json_layer, file_guard) = match file {
        Some(file) => {
            let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_names(true)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(layer), Some(file_guard))
        }
        None => (None, None),
    };

    // `None` disables the file layer
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (~/.wme-shortcuts/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".wme-shortcuts").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("wme-shortcuts-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

/// Categorized log line: goes to tracing and to the recent-lines ring.
///
/// Prefer tracing macros directly for structured fields.
pub fn log(category: &str, message: &str) {
    add_to_buffer(category, message);
    tracing::info!(category = category, "{}", message);
}

fn add_to_buffer(category: &str, message: &str) {
    let buffer = LOG_BUFFER.get_or_init(|| Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES)));
    let mut buf = buffer.lock();
    if buf.len() >= MAX_LOG_LINES {
        buf.pop_front();
    }
    buf.push_back(format!("[{}] {}", category, message));
}

/// Get recent log lines, oldest first
pub fn get_recent_logs() -> Vec<String> {
    LOG_BUFFER
        .get()
        .map(|buffer| buffer.lock().iter().cloned().collect())
        .unwrap_or_default()
}

/// Get the last N log lines, newest first
pub fn get_last_logs(n: usize) -> Vec<String> {
    LOG_BUFFER
        .get()
        .map(|buffer| buffer.lock().iter().rev().take(n).cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_uses_jsonl_file() {
        assert!(log_path().ends_with(LOG_FILE_NAME));
    }

    #[test]
    fn init_twice_keeps_first_subscriber() {
        let _first = init();
        let _second = init();
        assert!(tracing::dispatcher::has_been_set());
    }

    #[test]
    fn buffer_is_bounded_and_ordered() {
        for i in 0..(MAX_LOG_LINES + 5) {
            log("TEST", &format!("line {}", i));
        }
        let recent = get_recent_logs();
        assert!(recent.len() <= MAX_LOG_LINES);

        let last = get_last_logs(1);
        assert_eq!(last.len(), 1);
        assert!(last[0].starts_with('['));
    }
}
