//! Process-wide logging for the InternHub binaries.
//!
//! Log lines carry `key=value` pairs (`event=`, `module=`, `status=`) so that
//! request and storage events can be grepped without a structured sink. The
//! backend is `flexi_logger`, started at most once per process.

use flexi_logger::{
    Cleanup, Criterion, DeferredNow, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, Record};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};

const FILE_STEM: &str = "internhub";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 200;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Sink selected at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stderr,
    Directory(PathBuf),
}

impl Display for LogDestination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnknownLevel(String),
    EmptyDirectory,
    Directory { path: PathBuf, reason: String },
    Backend(String),
    /// A logger is already running with other settings.
    AlreadyRunning { active: String, requested: String },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unknown log level `{level}` (use trace, debug, info, warn or error)"
            ),
            Self::EmptyDirectory => f.write_str("LOG_DIR is set but empty"),
            Self::Directory { path, reason } => {
                write!(f, "log directory `{}` unusable: {reason}", path.display())
            }
            Self::Backend(reason) => write!(f, "logger failed to start: {reason}"),
            Self::AlreadyRunning { active, requested } => write!(
                f,
                "logger already running as {active}; cannot reconfigure to {requested}"
            ),
        }
    }
}

impl std::error::Error for LoggingError {}

struct ActiveLogger {
    level: &'static str,
    destination: LogDestination,
    _handle: LoggerHandle,
}

/// Starts logging at `level`, into rotating files under `log_dir` when given
/// and to stderr otherwise.
///
/// Calling again with identical settings is a no-op.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), LoggingError> {
    let level = parse_level(level)?;
    let destination = match log_dir {
        Some(dir) => LogDestination::Directory(resolve_dir(dir)?),
        None => LogDestination::Stderr,
    };

    let active = ACTIVE.get_or_try_init(|| start(level, destination.clone()))?;
    if active.level != level || active.destination != destination {
        return Err(LoggingError::AlreadyRunning {
            active: format!("{}@{}", active.level, active.destination),
            requested: format!("{level}@{destination}"),
        });
    }
    Ok(())
}

pub fn logging_status() -> Option<(&'static str, LogDestination)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.destination.clone()))
}

/// Level used when `LOG_LEVEL` is unset.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(level: &'static str, destination: LogDestination) -> Result<ActiveLogger, LoggingError> {
    let logger =
        Logger::try_with_str(level).map_err(|err| LoggingError::Backend(err.to_string()))?;

    let logger = match &destination {
        LogDestination::Stderr => logger.log_to_stderr().format_for_stderr(line_format),
        LogDestination::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| LoggingError::Directory {
                path: dir.clone(),
                reason: err.to_string(),
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(FILE_STEM))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_ROTATED),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(line_format)
        }
    };
    let handle = logger
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    hook_panics();
    info!(
        "event=logging_init module=core status=ok level={} destination={} version={}",
        level,
        destination,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        destination,
        _handle: handle,
    })
}

/// `2026-01-05T09:30:00.125+00:00 INFO  [internhub_core::service] event=...`
fn line_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {:<5} [{}] {}",
        now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"),
        record.level(),
        record.module_path().unwrap_or("<unknown>"),
        record.args()
    )
}

fn parse_level(level: &str) -> Result<&'static str, LoggingError> {
    let lowered = level.trim().to_ascii_lowercase();
    let known = ["trace", "debug", "info", "warn", "error"]
        .into_iter()
        .find(|candidate| *candidate == lowered);
    match (known, lowered.as_str()) {
        (Some(found), _) => Ok(found),
        (None, "warning") => Ok("warn"),
        (None, _) => Err(LoggingError::UnknownLevel(lowered)),
    }
}

fn resolve_dir(raw: &str) -> Result<PathBuf, LoggingError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(LoggingError::EmptyDirectory);
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|err| LoggingError::Directory {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    Ok(cwd.join(path))
}

fn hook_panics() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |at| format!("{}:{}", at.file(), at.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<opaque panic payload>".to_string());
        error!(
            "event=panic module=core status=error location={} payload={}",
            location,
            single_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        chained(info);
    }));
}

/// Collapses line breaks and clips to `limit` characters.
fn single_line(value: &str, limit: usize) -> String {
    let mut out: String = value
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r') { ' ' } else { ch })
        .take(limit)
        .collect();
    if value.chars().count() > limit {
        out.push_str("...");
    }
    out
}
