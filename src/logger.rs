use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

const LEVEL_ENV: &str = "MAKE_DATA_LOG";

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();
static LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn parse(s: &str) -> LogLevel {
        match s.to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }

    fn threshold() -> LogLevel {
        *LEVEL.get_or_init(|| LogLevel::parse(&std::env::var(LEVEL_ENV).unwrap_or_default()))
    }

    fn label(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Route log lines to `log_path` instead of stderr.
pub fn init(log_path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = log_path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = LOG_FILE.set(Mutex::new(file));
    debug(&format!("logging initialized: {}", path.display()));
    Ok(path.to_path_buf())
}

/// Whether lines go to a file rather than stderr.
pub fn has_file_sink() -> bool {
    LOG_FILE.get().is_some()
}

/// `<unix-secs>.<millis> [LEVEL] message`
fn write_line(out: &mut impl Write, level: LogLevel, msg: &str) -> io::Result<()> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    writeln!(
        out,
        "{}.{:03} [{}] {}",
        now.as_secs(),
        now.subsec_millis(),
        level.label(),
        msg
    )?;
    out.flush()
}

fn log(level: LogLevel, msg: &str) {
    if level < LogLevel::threshold() {
        return;
    }
    match LOG_FILE.get() {
        Some(m) => {
            if let Ok(mut f) = m.lock() {
                let _ = write_line(&mut *f, level, msg);
            }
        }
        None => {
            let _ = write_line(&mut io::stderr().lock(), level, msg);
        }
    }
}

pub fn error(msg: &str) { log(LogLevel::Error, msg) }
pub fn warn(msg: &str) { log(LogLevel::Warn, msg) }
pub fn info(msg: &str) { log(LogLevel::Info, msg) }
pub fn debug(msg: &str) { log(LogLevel::Debug, msg) }
pub fn trace(msg: &str) { log(LogLevel::Trace, msg) }
