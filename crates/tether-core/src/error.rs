//! # Error Types
//!
//! Error handling for a bootstrap run.
//!
//! We use `thiserror` to generate the `Error` implementations. Each concern has
//! its own enum, and [`BootstrapError`] gathers them at the top level together
//! with the context needed to report a failure without re-running at higher
//! verbosity.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tether_utils::LoggingError;
use thiserror::Error;

use crate::types::{AttachmentDescriptor, ProcessId};

/// Malformed, missing or contradictory attachment parameters.
///
/// Reported with the usage synopsis and exit status 1.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError
{
    /// Neither attachment mode was given
    #[error("Neither -pid nor -socket option was specified")]
    MissingMode,

    /// Both attachment modes were given
    ///
    /// There is no documented precedence between the two modes, so the
    /// combination is refused instead of letting one silently win.
    #[error("Both -pid {pid} and -socket {socket} were specified; choose one attachment mode")]
    ConflictingModes
    {
        /// Raw `-pid` value
        pid: i64,
        /// Raw `-socket` value
        socket: String,
    },

    /// `-socket` does not split into `PORT` or `HOST:PORT`
    #[error("Invalid argument to the -socket option: {0}")]
    InvalidSocket(String),

    /// Port part of `-socket` is not an integer in `0..=65535`
    #[error("Invalid port '{port}' in the -socket option: {socket}")]
    InvalidPort
    {
        /// Full `-socket` value
        socket: String,
        /// Offending port token
        port: String,
    },

    /// `-pid` does not fit a process identifier
    #[error("Process id out of range: {0}")]
    PidOutOfRange(i64),

    /// The connector produced no session for a resolved descriptor
    #[error("No attachment mode resolved to a session ({0})")]
    NoSession(AttachmentDescriptor),
}

/// Failure reported by the session connector.
#[derive(Error, Debug)]
pub enum ConnectionError
{
    /// The process with the given PID doesn't exist or has exited
    #[error("Process not found: PID {0}")]
    ProcessNotFound(ProcessId),

    /// The process exists but runs no socket debug agent
    #[error("No debug agent listening in process {pid}: {details}")]
    NoDebugAgent
    {
        /// Target process
        pid: ProcessId,
        /// What was found instead
        details: String,
    },

    /// The address could not be resolved to a socket address
    #[error("Cannot resolve address {0}")]
    UnresolvedAddress(String),

    /// Socket-level failure (refused, reset, unreachable)
    #[error("Connection to {address} failed: {source}")]
    Io
    {
        /// Address that was dialled
        address: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The peer answered with something other than the protocol greeting
    #[error("Handshake with {address} rejected: received {received:?}")]
    HandshakeRejected
    {
        /// Address of the peer
        address: String,
        /// Bytes received instead of the greeting, lossily decoded
        received: String,
    },

    /// No answer within the configured timeout
    #[error("Timed out after {after:?} connecting to {address}")]
    Timeout
    {
        /// Address that was dialled
        address: String,
        /// Configured timeout
        after: Duration,
    },

    /// The attachment mode is not available on this platform
    #[error("Unsupported attachment: {0}")]
    Unsupported(String),
}

/// Failure reported by the script executor.
#[derive(Error, Debug)]
pub enum ExecutionError
{
    /// The script file could not be read
    #[error("Cannot read script {path}: {source}")]
    ScriptUnreadable
    {
        /// Script path as given
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A script was given but no engine is configured to run it
    #[error("No script engine configured to run {script}; set TETHER_SCRIPT_ENGINE")]
    EngineNotConfigured
    {
        /// Script that could not be run
        script: PathBuf,
    },

    /// The engine program could not be started
    #[error("Failed to start script engine {engine}: {source}")]
    EngineSpawn
    {
        /// Engine program
        engine: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The engine ran and reported failure
    #[error("Script engine {engine} exited unsuccessfully (status {code:?})")]
    EngineFailed
    {
        /// Engine program
        engine: PathBuf,
        /// Exit status, `None` when terminated by a signal
        code: Option<i32>,
    },
}

/// Top-level failure of a bootstrap run.
///
/// Every variant maps to a stable process exit status through
/// [`BootstrapError::exit_code`].
#[derive(Error, Debug)]
pub enum BootstrapError
{
    /// Bad attachment parameters, or no session resolved
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The connector failed for the given target
    #[error("Failed to attach to {target}: {source}")]
    Connection
    {
        /// Descriptor the connector was asked for
        target: AttachmentDescriptor,
        /// Connector error, unchanged
        #[source]
        source: ConnectionError,
    },

    /// The executor failed
    #[error("Script execution failed: {0}")]
    Execution(#[from] ExecutionError),

    /// The diagnostics sink requested with -debug could not be installed
    #[error(transparent)]
    Diagnostics(#[from] LoggingError),
}

impl BootstrapError
{
    /// Process exit status for this failure.
    ///
    /// | Kind | Status |
    /// |---|---|
    /// | configuration | 1 |
    /// | connection | 2 |
    /// | execution | 3 |
    /// | diagnostics | 4 |
    #[must_use]
    pub const fn exit_code(&self) -> u8
    {
        match self {
            BootstrapError::Configuration(_) => 1,
            BootstrapError::Connection { .. } => 2,
            BootstrapError::Execution(_) => 3,
            BootstrapError::Diagnostics(_) => 4,
        }
    }

    /// Short machine-readable kind, used for structured error output.
    #[must_use]
    pub const fn kind(&self) -> &'static str
    {
        match self {
            BootstrapError::Configuration(_) => "configuration",
            BootstrapError::Connection { .. } => "connection",
            BootstrapError::Execution(_) => "execution",
            BootstrapError::Diagnostics(_) => "diagnostics",
        }
    }

    /// `true` for errors that should be followed by the usage synopsis.
    #[must_use]
    pub const fn is_configuration(&self) -> bool
    {
        matches!(self, BootstrapError::Configuration(_))
    }
}

/// Convenience type alias for results of the connector.
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;

/// Convenience type alias for `Result<T, BootstrapError>`
///
/// ```rust
/// use tether_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, BootstrapError>;
