//! Attachment input and the validated descriptor built from it.

use std::fmt;
use std::path::PathBuf;

use super::ProcessId;

/// Value of `-pid` when the flag was not given.
pub const UNSET_PID: i64 = -1;

/// Host used when `-socket` names only a port.
pub const DEFAULT_HOST: &str = "localhost";

/// Attachment parameters exactly as they came off the command line.
///
/// `pid` keeps the signed sentinel form: any negative value means "not set".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRequest
{
    /// Raw `-pid` value, [`UNSET_PID`] when absent
    pub pid: i64,
    /// Raw `-socket` value in `[HOST:]PORT` form
    pub socket: Option<String>,
}

impl Default for AttachmentRequest
{
    fn default() -> Self
    {
        Self { pid: UNSET_PID, socket: None }
    }
}

impl AttachmentRequest
{
    /// Request for a local process only.
    #[must_use]
    pub fn local(pid: i64) -> Self
    {
        Self { pid, socket: None }
    }

    /// Request for a remote socket only.
    #[must_use]
    pub fn remote(socket: impl Into<String>) -> Self
    {
        Self {
            pid: UNSET_PID,
            socket: Some(socket.into()),
        }
    }

    /// `true` when `-pid` carries a usable (non-negative) value.
    #[must_use]
    pub const fn has_pid(&self) -> bool
    {
        self.pid >= 0
    }
}

/// How to reach the debuggee. Exactly one mode is ever populated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttachmentDescriptor
{
    /// Attach to a process on this machine
    Local
    {
        /// Target process
        pid: ProcessId,
    },
    /// Attach to a debug agent listening on a socket
    Remote
    {
        /// Host name or address, `localhost` when omitted
        host: String,
        /// Listening port
        port: u16,
    },
}

impl AttachmentDescriptor
{
    /// Short name of the attachment mode, used in logs and error context.
    #[must_use]
    pub const fn mode(&self) -> &'static str
    {
        match self {
            AttachmentDescriptor::Local { .. } => "local",
            AttachmentDescriptor::Remote { .. } => "remote",
        }
    }
}

impl fmt::Display for AttachmentDescriptor
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            AttachmentDescriptor::Local { pid } => write!(f, "local process {pid}"),
            AttachmentDescriptor::Remote { host, port } => write!(f, "socket {host}:{port}"),
        }
    }
}

/// Everything the bootstrapper needs for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchRequest
{
    /// Raw attachment parameters
    pub attachment: AttachmentRequest,
    /// Script to hand to the executor; `None` is a valid "no script" run
    pub script: Option<PathBuf>,
}
