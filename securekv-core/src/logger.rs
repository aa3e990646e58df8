//! Forwarding of this crate's `log` records to a host-provided sink.
//!
//! Applications that embed the storage through a foreign-language bridge
//! usually have no `log` backend installed, so the records emitted around
//! store calls would be dropped. [`set_logger`] installs a `log`
//! implementation that hands them to a [`Logger`] supplied by the host.
//!
//! Records from `securekv_core` pass down to the configured level. Records
//! from other crates in the same process only pass at `Warn` and above.
//! Hosts that already install a `log` backend (the CLI does, through
//! `tracing-log`) should not call [`set_logger`].

use std::sync::Arc;

const CRATE_TARGET: &str = "securekv_core";

/// Sink for log messages, implemented by the host application.
///
/// # Examples
///
/// ```rust
/// use securekv_core::logger::{LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, target: &str, message: String) {
///         eprintln!("[{level:?}] {target}: {message}");
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Receives one record. `target` is the emitting module path.
    fn log(&self, level: LogLevel, target: &str, message: String);
}

/// Severity of a log message, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Failures the host should surface.
    Error,
    /// Suspicious input that was tolerated.
    Warn,
    /// Progress of the application.
    Info,
    /// One line per store call.
    Debug,
    /// Very detailed messages.
    Trace,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

/// `log` implementation filtering records before they reach the host.
struct HostLogger {
    sink: Arc<dyn Logger>,
    max_level: log::Level,
}

impl HostLogger {
    fn accepts(&self, metadata: &log::Metadata) -> bool {
        let target = metadata.target();
        let own = target == CRATE_TARGET
            || target
                .strip_prefix(CRATE_TARGET)
                .is_some_and(|rest| rest.starts_with("::"));
        if own {
            metadata.level() <= self.max_level
        } else {
            metadata.level() <= log::Level::Warn
        }
    }
}

impl log::Log for HostLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.accepts(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.accepts(record.metadata()) {
            self.sink
                .log(record.level().into(), record.target(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Installs `sink` as the process-wide destination of `log` records.
///
/// `max_level` bounds the records of this crate. Records of other crates are
/// forwarded from `Warn` up regardless.
///
/// # Errors
///
/// Fails if a `log` backend is already installed in the process. The sink is
/// dropped in that case.
pub fn set_logger(
    sink: Arc<dyn Logger>,
    max_level: LogLevel,
) -> Result<(), log::SetLoggerError> {
    let max_level = log::Level::from(max_level);
    log::set_boxed_logger(Box::new(HostLogger { sink, max_level }))?;
    log::set_max_level(max_level.to_level_filter().max(log::LevelFilter::Warn));
    Ok(())
}
