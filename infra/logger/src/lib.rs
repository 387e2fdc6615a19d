//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for `TripGate` binaries.
//!
//! * Compact, colored console output on stderr (on by default), leaving stdout to the
//!   binary's own output.
//! * Optional rolling log files in a directory, written through a non-blocking worker.
//!   Files rotate daily and only the newest `max_files` are kept.
//! * Optional JSON formatting for the file layer.
//! * Level filtering through a default [`LevelFilter`], an explicit directive string
//!   ([`LoggerBuilder::env_filter`]) or `RUST_LOG`.
//!
//! ## Example
//!
//! ```rust
//! use trip_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("tripgate")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug, Clone, PartialEq, Eq)]
struct LoggerSettings {
    console: bool,
    directory: Option<PathBuf>,
    level: LevelFilter,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            console: true,
            directory: None,
            level: LevelFilter::INFO,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

/// Builder state before a logger name is supplied.
#[derive(Debug)]
pub struct Unnamed;

/// Builder state once the logger has a name.
#[derive(Debug)]
pub struct Named(String);

/// Configures and installs the global subscriber. Obtain one through [`Logger::builder`].
#[derive(Debug)]
pub struct LoggerBuilder<N = Unnamed> {
    name: N,
    settings: LoggerSettings,
}

impl LoggerBuilder<Unnamed> {
    /// Names the logger. The name prefixes rolling log files (`<name>.<date>.log`).
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named> {
        LoggerBuilder { name: Named(name.into()), settings: self.settings }
    }
}

impl LoggerBuilder<Named> {
    /// Default level when neither [`Self::env_filter`] nor `RUST_LOG` narrows it.
    #[must_use = "The builder must be finished with .init()"]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Explicit filter directives, e.g. `trip_registration=debug,reqwest=warn`.
    ///
    /// An invalid directive string makes [`Self::init`] fail.
    #[must_use = "The builder must be finished with .init()"]
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.settings.env_filter = Some(directives.into());
        self
    }

    #[must_use = "The builder must be finished with .init()"]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Writes rolling log files into `directory`, creating it if needed.
    #[must_use = "The builder must be finished with .init()"]
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.settings.directory = Some(directory.into());
        self
    }

    /// Formats file output as JSON lines. Has no effect without [`Self::directory`].
    #[must_use = "The builder must be finished with .init()"]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.settings.json = enabled;
        self
    }

    #[must_use = "The builder must be finished with .init()"]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    /// Installs the subscriber.
    ///
    /// The returned [`Logger`] owns the file writer's worker guard; keep it alive until
    /// shutdown or buffered lines are lost.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, `max_files == 0`, a bad
    ///   filter string, or when no output is enabled.
    /// * [`LoggerError::Appender`] when the log directory cannot be used.
    /// * [`LoggerError::Subscriber`] when a global subscriber already exists.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { name: Named(name), settings } = self;
        check_settings(&name, &settings)?;

        let filter = env_filter(&settings)?;
        let mut layers = Vec::new();

        if settings.console {
            let console = layer().compact().with_target(true).with_writer(std::io::stderr);
            layers.push(console.boxed());
        }

        let guard = match &settings.directory {
            Some(directory) => {
                fs::create_dir_all(directory).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("Creating log directory {}", directory.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(Rotation::DAILY)
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(settings.max_files)
                    .build(directory)
                    .context(format!("Opening log directory {}", directory.display()))?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file = layer().with_writer(writer).with_ansi(false);
                layers.push(if settings.json { file.json().boxed() } else { file.boxed() });
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;
        tracing::debug!(logger = %name, "Logging initialized");

        Ok(Logger { guard })
    }

    /// Runs `f` with a console subscriber active on the current thread only.
    ///
    /// Meant for work that happens before the real logger can be configured, such as
    /// loading the configuration that holds the log settings. File output is ignored and
    /// no global subscriber is installed, so [`Self::init`] still works afterwards.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for an empty name or a bad filter string.
    pub fn scoped<R>(self, f: impl FnOnce() -> R) -> Result<R, LoggerError> {
        let Self { name: Named(name), mut settings } = self;
        settings.console = true;
        check_settings(&name, &settings)?;

        let console = layer().compact().with_target(true).with_writer(std::io::stderr);
        let subscriber = tracing_subscriber::registry().with(env_filter(&settings)?).with(console);

        Ok(tracing::subscriber::with_default(subscriber, f))
    }
}

/// Handle to the installed logging system.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts configuring the global subscriber.
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { name: Unnamed, settings: LoggerSettings::default() }
    }

    /// `true` when file output is active (a worker guard is held).
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing log files");
        }
    }
}

fn check_settings(name: &str, settings: &LoggerSettings) -> Result<(), LoggerError> {
    let problem = if name.trim().is_empty() {
        Some("Logger name cannot be empty")
    } else if settings.max_files == 0 {
        Some("max_files must be greater than zero")
    } else if !settings.console && settings.directory.is_none() {
        Some("No output enabled: turn on the console or set a log directory")
    } else {
        None
    };

    problem.map_or(Ok(()), |message| {
        Err(LoggerError::InvalidConfiguration { message: message.into(), context: None })
    })
}

fn env_filter(settings: &LoggerSettings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    match &settings.env_filter {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => builder.parse(directives).map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("Invalid filter '{directives}': {e}").into(),
                context: None,
            }
        }),
    }
}
