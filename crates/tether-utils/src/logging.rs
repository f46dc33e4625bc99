//! # Logging Utilities
//!
//! Diagnostics for Tether using `tracing`.
//!
//! Nothing is logged by default. Each `-debug` flag on the command line raises
//! the [`Verbosity`] by one, and the verbosity maps onto a [`Threshold`]:
//!
//! | Verbosity | Threshold | Tether crates | Span events |
//! |---|---|---|---|
//! | 0 | `Off` | no sink installed | - |
//! | 1 | `Fine` | `debug` | no |
//! | 2 | `Finer` | `trace` | no |
//! | 3+ | `Finest` | `trace` | open/close |
//!
//! Third-party crates stay at `warn` so the sink only speaks for the tool's
//! own logger namespace.
//!
//! ## Environment Variables
//!
//! - `TETHER_LOG_FORMAT`: console format (`json` or `pretty`, default: `pretty`)
//! - `TETHER_LOG_FILE`: optional path to an extra log file
//!
//! ## Example
//!
//! ```rust,no_run
//! use tether_utils::{Diagnostics, Settings, Verbosity};
//!
//! let mut verbosity = Verbosity::default();
//! verbosity.increment();
//!
//! let diagnostics = Diagnostics::new(verbosity, &Settings::from_env());
//! diagnostics.install().expect("Failed to install diagnostics");
//! tracing::debug!("visible at -debug");
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self as tracing_fmt};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::Settings;

/// Crate targets that make up the tool's logger namespace.
pub const NAMESPACE: &[&str] = &["tether", "tether_core", "tether_protocol", "tether_utils"];

/// Level applied to every target outside [`NAMESPACE`].
const FOREIGN_LEVEL: Level = Level::WARN;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Configuration of the sink that owns the global subscriber, set once per process.
static ACTIVE: OnceCell<SinkConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct SinkConfig
{
    threshold: Threshold,
    format: LogFormat,
    log_file: Option<PathBuf>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// JSON format, one object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// How many times `-debug` was given.
///
/// Only ever grows while arguments are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Verbosity(u8);

impl Verbosity
{
    /// Raise the verbosity by one step.
    pub fn increment(&mut self)
    {
        self.0 = self.0.saturating_add(1);
    }

    /// Number of `-debug` flags seen so far.
    #[must_use]
    pub const fn count(self) -> u8
    {
        self.0
    }

    /// `true` when at least one `-debug` flag was given.
    #[must_use]
    pub const fn is_enabled(self) -> bool
    {
        self.0 > 0
    }
}

impl From<u8> for Verbosity
{
    fn from(count: u8) -> Self
    {
        Verbosity(count)
    }
}

/// Discrete logging threshold derived from a [`Verbosity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Threshold
{
    /// No diagnostics sink
    Off,
    /// Stage progress and parameters
    Fine,
    /// Adds wire-level detail
    Finer,
    /// Everything, including span lifecycle
    Finest,
}

impl From<Verbosity> for Threshold
{
    fn from(verbosity: Verbosity) -> Self
    {
        match verbosity.count() {
            0 => Threshold::Off,
            1 => Threshold::Fine,
            2 => Threshold::Finer,
            _ => Threshold::Finest,
        }
    }
}

impl Threshold
{
    /// `tracing` level applied to the tool's namespace, `None` for [`Threshold::Off`].
    #[must_use]
    pub const fn level(self) -> Option<Level>
    {
        match self {
            Threshold::Off => None,
            Threshold::Fine => Some(Level::DEBUG),
            Threshold::Finer | Threshold::Finest => Some(Level::TRACE),
        }
    }

    /// Filter directives scoping the threshold to [`NAMESPACE`].
    ///
    /// For example `Fine` yields `warn,tether=debug,tether_core=debug,...`.
    #[must_use]
    pub fn directives(self) -> Option<String>
    {
        let level = self.level()?.to_string().to_lowercase();
        let mut directives = FOREIGN_LEVEL.to_string().to_lowercase();
        for target in NAMESPACE {
            directives.push_str(&format!(",{target}={level}"));
        }
        Some(directives)
    }

    fn span_events(self) -> FmtSpan
    {
        match self {
            Threshold::Finest => FmtSpan::NEW | FmtSpan::CLOSE,
            _ => FmtSpan::NONE,
        }
    }
}

impl fmt::Display for Threshold
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Threshold::Off => write!(f, "off"),
            Threshold::Fine => write!(f, "fine"),
            Threshold::Finer => write!(f, "finer"),
            Threshold::Finest => write!(f, "finest"),
        }
    }
}

/// Outcome of [`Diagnostics::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStatus
{
    /// Verbosity was zero; nothing was touched
    Skipped,
    /// The sink was installed by this call
    Installed,
    /// An equal configuration already owns the process-wide sink
    AlreadyInstalled,
}

/// Diagnostics configuration for one run.
///
/// This value is built once from the verbosity and [`Settings`] and passed to
/// whoever needs to set up or inspect logging. Installing it twice, or
/// installing a fresh value with the same configuration, never adds a second
/// sink.
pub struct Diagnostics
{
    threshold: Threshold,
    format: LogFormat,
    log_file: Option<PathBuf>,
    // Only the value that installed the sink holds the file writer guard; dropping it flushes.
    installed: OnceCell<Option<WorkerGuard>>,
}

impl fmt::Debug for Diagnostics
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Diagnostics")
            .field("threshold", &self.threshold)
            .field("format", &self.format)
            .field("log_file", &self.log_file)
            .field("installed", &self.is_installed())
            .finish()
    }
}

impl Diagnostics
{
    /// Build the configuration for `verbosity` using the format and file sink from `settings`.
    #[must_use]
    pub fn new(verbosity: Verbosity, settings: &Settings) -> Self
    {
        Self {
            threshold: Threshold::from(verbosity),
            format: settings.log_format,
            log_file: settings.log_file.clone(),
            installed: OnceCell::new(),
        }
    }

    /// Configuration that never installs anything.
    #[must_use]
    pub fn disabled() -> Self
    {
        Self::new(Verbosity::default(), &Settings::default())
    }

    #[must_use]
    pub const fn threshold(&self) -> Threshold
    {
        self.threshold
    }

    #[must_use]
    pub const fn format(&self) -> LogFormat
    {
        self.format
    }

    #[must_use]
    pub fn log_file(&self) -> Option<&Path>
    {
        self.log_file.as_deref()
    }

    /// Whether this value's configuration is the one installed in the process.
    #[must_use]
    pub fn is_installed(&self) -> bool
    {
        self.installed.get().is_some()
    }

    /// Install the console sink (plus the optional file sink) as the global subscriber.
    ///
    /// The first successful call in a process wins. Later calls with an equal
    /// threshold, format and log file report [`SinkStatus::AlreadyInstalled`].
    ///
    /// ## Errors
    ///
    /// - `InvalidFilter`: the namespace directives failed to parse
    /// - `InitializationFailed`: a different subscriber or configuration is already active
    /// - `InvalidLogFile`: the log file path names a directory or has no file name
    /// - `FileError` / `FileAppender`: the log file could not be created or opened
    pub fn install(&self) -> Result<SinkStatus, LoggingError>
    {
        let Some(directives) = self.threshold.directives() else {
            return Ok(SinkStatus::Skipped);
        };

        if self.is_installed() {
            return Ok(SinkStatus::AlreadyInstalled);
        }

        let wanted = self.sink_config();
        let mut guard = None;
        let mut fresh = false;
        let active = ACTIVE.get_or_try_init(|| {
            guard = self.init_global(&directives)?;
            fresh = true;
            Ok::<_, LoggingError>(wanted.clone())
        })?;

        if *active != wanted {
            return Err(LoggingError::InitializationFailed(format!(
                "diagnostics already active at the {} threshold ({:?})",
                active.threshold, active.format
            )));
        }

        if self.installed.set(guard).is_err() || !fresh {
            return Ok(SinkStatus::AlreadyInstalled);
        }

        tracing::debug!(threshold = %self.threshold, format = ?self.format, "diagnostics sink installed");
        Ok(SinkStatus::Installed)
    }

    fn sink_config(&self) -> SinkConfig
    {
        SinkConfig {
            threshold: self.threshold,
            format: self.format,
            log_file: self.log_file.clone(),
        }
    }

    fn init_global(&self, directives: &str) -> Result<Option<WorkerGuard>, LoggingError>
    {
        let mut layers: Vec<BoxedLayer> = vec![self.console_layer(directives)?];
        let mut guard = None;
        if let Some(path) = &self.log_file {
            let (layer, file_guard) = self.file_layer(path, directives)?;
            layers.push(layer);
            guard = Some(file_guard);
        }

        Registry::default()
            .with(layers)
            .try_init()
            .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;
        Ok(guard)
    }

    fn console_layer(&self, directives: &str) -> Result<BoxedLayer, LoggingError>
    {
        let filter = build_filter(directives)?;
        let base = tracing_fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_span_events(self.threshold.span_events())
            .with_writer(io::stderr);

        let layer = match self.format {
            LogFormat::Pretty => base.with_ansi(true).with_filter(filter).boxed(),
            LogFormat::Json => base
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(filter)
                .boxed(),
        };
        Ok(layer)
    }

    fn file_layer(&self, path: &Path, directives: &str) -> Result<(BoxedLayer, WorkerGuard), LoggingError>
    {
        let filter = build_filter(directives)?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| LoggingError::InvalidLogFile(path.to_path_buf()))?;
        if path.is_dir() {
            return Err(LoggingError::InvalidLogFile(path.to_path_buf()));
        }

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&directory)?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(name)
            .build(&directory)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        let base = tracing_fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_span_events(self.threshold.span_events())
            .with_ansi(false); // No ANSI in files

        let layer = match self.format {
            LogFormat::Pretty => base.with_filter(filter).boxed(),
            LogFormat::Json => base
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(filter)
                .boxed(),
        };
        Ok((layer, guard))
    }
}

fn build_filter(directives: &str) -> Result<EnvFilter, LoggingError>
{
    EnvFilter::try_new(directives).map_err(|e| LoggingError::InvalidFilter(format!("{directives}: {e}")))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Filter directives could not be parsed
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),

    /// The log file path is a directory or has no usable file name
    #[error("Log file must name a file: {}", .0.display())]
    InvalidLogFile(PathBuf),

    /// The log file could not be opened for appending
    #[error("File logging error: {0}")]
    FileAppender(#[from] InitError),
}
