//! # Session Collaborators
//!
//! The two outside parties a bootstrap run talks to.
//!
//! - A [`SessionConnector`] turns an attachment target into a session handle.
//!   The bootstrapper calls exactly one of its two methods per run, matching
//!   the resolved descriptor.
//! - A [`ScriptExecutor`] takes ownership of that handle and runs the user
//!   script (or nothing, when no script was given) inside the session.
//!
//! The core never looks inside a session; it only checks that one was
//! produced. Releasing the session is up to whoever ends up owning it.

use std::path::{Path, PathBuf};

use crate::error::{ConnectionResult, ExecutionError};
use crate::types::ProcessId;

/// Establishes debugging sessions.
///
/// Both methods may block (socket connect, local attach handshake). Returning
/// `Ok(None)` means the connector declined without an error; the bootstrapper
/// reports that as an unresolved session.
pub trait SessionConnector
{
    /// Opaque session handle handed on to the executor
    type Session;

    /// Attach to a process on this machine.
    ///
    /// ## Errors
    ///
    /// Any [`ConnectionError`](crate::error::ConnectionError); it reaches the
    /// caller unchanged.
    fn connect_local(&mut self, pid: ProcessId) -> ConnectionResult<Option<Self::Session>>;

    /// Attach to a debug agent listening on `host:port`.
    ///
    /// ## Errors
    ///
    /// Any [`ConnectionError`](crate::error::ConnectionError); it reaches the
    /// caller unchanged.
    fn connect_remote(&mut self, host: &str, port: u16) -> ConnectionResult<Option<Self::Session>>;
}

/// Runs a script against an established session.
pub trait ScriptExecutor<S>
{
    /// Execute `script` inside `session`.
    ///
    /// `None` is a valid input meaning "no script"; implementations decide
    /// what that does (interactive mode, a summary, nothing at all) but must
    /// not treat it as an error.
    ///
    /// ## Errors
    ///
    /// Any [`ExecutionError`]; it reaches the caller unchanged.
    fn execute(&mut self, session: S, script: Option<&Path>) -> Result<ExecutionReport, ExecutionError>;
}

/// What the executor did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport
{
    /// Script that was run, `None` for a script-less run
    pub script: Option<PathBuf>,
    /// Human-readable summary of the run
    pub summary: String,
}

impl ExecutionReport
{
    #[must_use]
    pub fn new(script: Option<&Path>, summary: impl Into<String>) -> Self
    {
        Self {
            script: script.map(Path::to_path_buf),
            summary: summary.into(),
        }
    }
}
