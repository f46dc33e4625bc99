//! # JDWP Session Connector
//!
//! [`SessionConnector`] over the JDWP socket transport.
//!
//! - **Remote**: dial `host:port` and handshake
//! - **Local**: read the target's agent options from the process filesystem,
//!   then dial the address they name
//!
//! A JVM that was started without a listening socket agent cannot be reached
//! by pid; the error says what was found on its command line instead.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tether_core::error::{ConnectionError, ConnectionResult};
use tether_core::session::SessionConnector;
use tether_core::types::{AttachmentDescriptor, ProcessId};
use tether_utils::config::DEFAULT_CONNECT_TIMEOUT;
use tracing::{debug, info};

use crate::discovery::{find_agent_address, read_cmdline};
use crate::probe::DEFAULT_PROC_ROOT;
use crate::session::JdwpSession;
use crate::transport;

/// Connector for JDWP agents listening on a socket.
#[derive(Debug, Clone)]
pub struct JdwpConnector
{
    timeout: Duration,
    proc_root: PathBuf,
}

impl Default for JdwpConnector
{
    fn default() -> Self
    {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl JdwpConnector
{
    /// Connector using `timeout` for both connect and handshake.
    #[must_use]
    pub fn new(timeout: Duration) -> Self
    {
        Self {
            timeout,
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
        }
    }

    /// Look up local processes under a different process filesystem root.
    #[must_use]
    pub fn with_proc_root(mut self, proc_root: impl Into<PathBuf>) -> Self
    {
        self.proc_root = proc_root.into();
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration
    {
        self.timeout
    }

    #[must_use]
    pub fn proc_root(&self) -> &Path
    {
        &self.proc_root
    }

    fn dial(&self, host: &str, port: u16, target: AttachmentDescriptor) -> ConnectionResult<JdwpSession>
    {
        let (stream, peer) = transport::open(host, port, self.timeout)?;
        let session = JdwpSession::new(stream, peer, target);
        info!(%peer, "session established");
        Ok(session)
    }
}

impl SessionConnector for JdwpConnector
{
    type Session = JdwpSession;

    fn connect_local(&mut self, pid: ProcessId) -> ConnectionResult<Option<JdwpSession>>
    {
        if !self.proc_root.is_dir() {
            return Err(ConnectionError::Unsupported(format!(
                "local attach needs a process filesystem at {}",
                self.proc_root.display()
            )));
        }

        let args = read_cmdline(&self.proc_root, pid).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConnectionError::ProcessNotFound(pid),
            _ => ConnectionError::NoDebugAgent {
                pid,
                details: format!("cannot read command line: {e}"),
            },
        })?;

        let agent = find_agent_address(&args).map_err(|miss| ConnectionError::NoDebugAgent {
            pid,
            details: miss.to_string(),
        })?;
        debug!(%pid, %agent, "discovered local agent");

        self.dial(&agent.host, agent.port, AttachmentDescriptor::Local { pid })
            .map(Some)
    }

    fn connect_remote(&mut self, host: &str, port: u16) -> ConnectionResult<Option<JdwpSession>>
    {
        let target = AttachmentDescriptor::Remote {
            host: host.to_string(),
            port,
        };
        self.dial(host, port, target).map(Some)
    }
}
