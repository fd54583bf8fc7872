//! Diagnostics for `ntidy`.
//!
//! The report itself goes to stdout. Tracing output from this tool's crates
//! goes to stderr and, when configured, to a log file; other crates are held
//! at `warn` or quieter.

use notion_tidy_core::config::LoggingConfig;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Targets whose level follows the configuration.
const TOOL_TARGETS: &[&str] = &["ntidy", "notion_tidy_core"];

static FILE_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// configured filters.
pub fn init(cfg: &LoggingConfig) -> Result<(), String> {
    let stderr_level = parse_level(&cfg.level).unwrap_or(LevelFilter::WARN);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(filter_for(stderr_level));

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let Some(path) = cfg.file.as_deref() else {
        registry.init();
        debug!(stderr_level = %stderr_level, "logging to stderr");
        return Ok(());
    };

    let file_level = cfg
        .file_level
        .as_deref()
        .and_then(parse_level)
        .unwrap_or(LevelFilter::DEBUG);
    let file = open_log_file(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    if let Ok(mut slot) = FILE_GUARD.lock() {
        *slot = Some(guard);
    }

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter_for(file_level));

    registry.with(file_layer).init();
    debug!(
        stderr_level = %stderr_level,
        file_level = %file_level,
        log_file = %path.display(),
        "logging to stderr and file"
    );
    Ok(())
}

/// Flush pending file output. Must run before `process::exit`.
pub fn shutdown() {
    if let Ok(mut slot) = FILE_GUARD.lock() {
        slot.take();
    }
}

fn open_log_file(path: &Path) -> Result<File, String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create log directory {}: {e}", parent.display()))?;
    }
    File::create(path).map_err(|e| format!("cannot create log file {}: {e}", path.display()))
}

fn filter_for(level: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)))
}

/// `level` for this tool's targets, at most `warn` for everything else.
fn directives(level: LevelFilter) -> String {
    let base = level.min(LevelFilter::WARN);
    let mut out = base.to_string().to_lowercase();
    for target in TOOL_TARGETS {
        out.push_str(&format!(",{target}={}", level.to_string().to_lowercase()));
    }
    out
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.to_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("off"), Some(LevelFilter::OFF));
        assert_eq!(parse_level("WARN"), Some(LevelFilter::WARN));
        assert_eq!(parse_level("Info"), Some(LevelFilter::INFO));
        assert_eq!(parse_level("trace"), Some(LevelFilter::TRACE));
        assert_eq!(parse_level("verbose"), None);
        assert_eq!(parse_level(""), None);
    }

    #[test]
    fn test_directives_raise_only_tool_targets() {
        assert_eq!(
            directives(LevelFilter::DEBUG),
            "warn,ntidy=debug,notion_tidy_core=debug"
        );
    }

    #[test]
    fn test_directives_quieter_than_warn_apply_everywhere() {
        assert_eq!(directives(LevelFilter::ERROR), "error,ntidy=error,notion_tidy_core=error");
        assert_eq!(directives(LevelFilter::OFF), "off,ntidy=off,notion_tidy_core=off");
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/ntidy.log");
        open_log_file(&path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_open_log_file_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let err = open_log_file(&blocker.join("ntidy.log")).unwrap_err();
        assert!(err.contains("cannot create log"), "{err}");
    }
}
