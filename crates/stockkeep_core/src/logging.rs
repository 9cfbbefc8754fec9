//! Rolling file logs for the inventory core.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend at most once per process.
//! - Route panics through the `log` facade before the default hook runs.
//!
//! # Invariants
//! - Events carry metadata only (ids, counts, durations); record names and
//!   prices never reach log files.
//! - Once started, the level and directory are fixed for the process; a
//!   matching re-init is a no-op and a differing one is rejected.
//! - Initialization never panics.

use crate::config::LoggingConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "stockkeep";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

const LEVELS: &[(&str, &str)] = &[
    ("trace", "trace"),
    ("debug", "debug"),
    ("info", "info"),
    ("warn", "warn"),
    ("warning", "warn"),
    ("error", "error"),
];

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    status: LoggingStatus,
    _handle: LoggerHandle,
}

pub type LoggingResult<T> = Result<T, LoggingError>;

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    /// Log directory is empty or relative.
    InvalidDir(String),
    CreateDir {
        path: PathBuf,
        source: io::Error,
    },
    Backend(FlexiLoggerError),
    /// Logging already runs with a different level or directory.
    AlreadyActive {
        active: LoggingStatus,
        requested: LoggingStatus,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDir(message) => write!(f, "invalid log directory: {message}"),
            Self::CreateDir { path, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::AlreadyActive { active, requested } => write!(
                f,
                "logging already active as {active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Level and directory of the running logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingStatus {
    pub level: &'static str,
    pub log_dir: PathBuf,
}

impl Display for LoggingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "level={} dir=`{}`", self.level, self.log_dir.display())
    }
}

/// Starts rolling file logs at `level` under the absolute `log_dir`.
///
/// # Errors
/// - `UnsupportedLevel` / `InvalidDir` for bad arguments.
/// - `AlreadyActive` when a logger with other settings is running.
/// - `CreateDir` / `Backend` when the backend cannot start.
pub fn init_logging(level: &str, log_dir: impl AsRef<Path>) -> LoggingResult<()> {
    let requested = LoggingStatus {
        level: normalize_level(level)?,
        log_dir: normalize_log_dir(log_dir.as_ref())?,
    };

    let active = ACTIVE.get_or_try_init(|| start_backend(&requested))?;
    if active.status != requested {
        return Err(LoggingError::AlreadyActive {
            active: active.status.clone(),
            requested,
        });
    }
    Ok(())
}

/// Starts logging from the `logging` config section.
///
/// Returns `Ok(false)` without touching the logger when no directory is
/// configured, so embedding callers can keep their own `log` backend.
pub fn init_logging_from_config(config: &LoggingConfig) -> LoggingResult<bool> {
    match config.dir.as_deref() {
        Some(dir) => init_logging(&config.level, dir).map(|()| true),
        None => Ok(false),
    }
}

/// Settings of the running logger, or `None` before initialization.
pub fn logging_status() -> Option<LoggingStatus> {
    ACTIVE.get().map(|active| active.status.clone())
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_backend(status: &LoggingStatus) -> LoggingResult<ActiveLogger> {
    std::fs::create_dir_all(&status.log_dir).map_err(|source| LoggingError::CreateDir {
        path: status.log_dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(status.level)?
        .log_to_file(
            FileSpec::default()
                .directory(status.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    install_panic_hook();
    info!(
        "event=logging_init module=core status=ok level={} log_dir={} version={} os={}",
        status.level,
        status.log_dir.display(),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        status: status.clone(),
        _handle: handle,
    })
}

fn normalize_level(level: &str) -> LoggingResult<&'static str> {
    let wanted = level.trim().to_ascii_lowercase();
    LEVELS
        .iter()
        .find(|(alias, _)| *alias == wanted)
        .map(|(_, level)| *level)
        .ok_or(LoggingError::UnsupportedLevel(wanted))
}

fn normalize_log_dir(log_dir: &Path) -> LoggingResult<PathBuf> {
    if log_dir.as_os_str().is_empty() {
        return Err(LoggingError::InvalidDir("path is empty".to_string()));
    }
    if !log_dir.is_absolute() {
        return Err(LoggingError::InvalidDir(format!(
            "`{}` is not absolute",
            log_dir.display()
        )));
    }
    Ok(log_dir.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = panic_info.payload();
        let payload: &str = if let Some(message) = payload.downcast_ref::<&str>() {
            message
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.as_str()
        } else {
            "non-string panic payload"
        };
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            single_line(payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(panic_info);
    }));
}

/// Flattens line breaks and caps the message at `limit` characters.
fn single_line(message: &str, limit: usize) -> String {
    let mut flattened: String = message
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(limit)
        .collect();
    if message.chars().count() > limit {
        flattened.push_str("...");
    }
    flattened
}
