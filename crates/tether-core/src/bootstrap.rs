//! # Session Bootstrapper
//!
//! The orchestrating entry point of a run.
//!
//! ## Stages
//!
//! 1. **Preflight**: probe the environment, print remediation if needed (always).
//!    The outcome is logged under a `preflight` span once stage 2 is done
//! 2. **Diagnostics**: install the log sink when verbosity is above zero
//! 3. **Resolve**: build the [`AttachmentDescriptor`] from the raw parameters
//! 4. **Connect**: ask the connector for a session, via exactly one of
//!    `connect_local` / `connect_remote`
//! 5. **Dispatch**: hand the session and optional script to the executor
//!
//! Stages 3 to 5 run under `resolve`, `connect` and `dispatch` spans carrying
//! the attachment parameters.
//!
//! Stages run in order, once each. A failure at any stage ends the run; there
//! is no retry and no re-entry.

use std::io::{self, Write};

use tether_utils::{Diagnostics, SinkStatus};
use tracing::{debug, info, info_span};

use crate::error::{BootstrapError, ConfigurationError, Result};
use crate::preflight::{Preflight, ProtocolProbe};
use crate::resolver::resolve;
use crate::session::{ExecutionReport, ScriptExecutor, SessionConnector};
use crate::types::{AttachmentDescriptor, LaunchRequest};

/// Drives one run from raw parameters to script execution.
///
/// ## Example
///
/// ```rust,no_run
/// # use tether_core::bootstrap::Bootstrapper;
/// # use tether_core::preflight::Preflight;
/// # use tether_core::types::{AttachmentRequest, LaunchRequest};
/// # use tether_utils::Diagnostics;
/// # fn demo<C, E, P>(connector: C, executor: E, probe: P) -> tether_core::Result<()>
/// # where
/// #     C: tether_core::SessionConnector,
/// #     E: tether_core::ScriptExecutor<C::Session>,
/// #     P: tether_core::ProtocolProbe,
/// # {
/// let mut bootstrapper = Bootstrapper::new(connector, executor, Preflight::new(probe), Diagnostics::disabled());
/// let request = LaunchRequest {
///     attachment: AttachmentRequest::remote("localhost:5005"),
///     script: None,
/// };
/// let report = bootstrapper.run(&request)?;
/// println!("{}", report.summary);
/// # Ok(())
/// # }
/// ```
pub struct Bootstrapper<C, E, P, W = io::Stderr>
{
    connector: C,
    executor: E,
    preflight: Preflight<P>,
    diagnostics: Diagnostics,
    advisory: W,
}

impl<C, E, P> Bootstrapper<C, E, P>
where
    C: SessionConnector,
    E: ScriptExecutor<C::Session>,
    P: ProtocolProbe,
{
    /// Create a bootstrapper whose preflight advice goes to standard error.
    #[must_use]
    pub fn new(connector: C, executor: E, preflight: Preflight<P>, diagnostics: Diagnostics) -> Self
    {
        Self {
            connector,
            executor,
            preflight,
            diagnostics,
            advisory: io::stderr(),
        }
    }
}

impl<C, E, P, W> Bootstrapper<C, E, P, W>
where
    C: SessionConnector,
    E: ScriptExecutor<C::Session>,
    P: ProtocolProbe,
    W: Write,
{
    /// Send preflight advice somewhere other than standard error.
    #[must_use]
    pub fn with_advisory_sink<W2: Write>(self, advisory: W2) -> Bootstrapper<C, E, P, W2>
    {
        Bootstrapper {
            connector: self.connector,
            executor: self.executor,
            preflight: self.preflight,
            diagnostics: self.diagnostics,
            advisory,
        }
    }

    #[must_use]
    pub fn connector(&self) -> &C
    {
        &self.connector
    }

    #[must_use]
    pub fn executor(&self) -> &E
    {
        &self.executor
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics
    {
        &self.diagnostics
    }

    #[must_use]
    pub fn advisory(&self) -> &W
    {
        &self.advisory
    }

    /// Run every stage for `request`.
    ///
    /// ## Errors
    ///
    /// - `Diagnostics`: `-debug` was given but the sink could not be installed
    /// - `Configuration`: the attachment parameters did not resolve, or the
    ///   connector produced no session
    /// - `Connection`: the connector failed; carries the attempted target
    /// - `Execution`: the executor failed
    pub fn run(&mut self, request: &LaunchRequest) -> Result<ExecutionReport>
    {
        let preflight = self.preflight.check(&mut self.advisory);

        if self.diagnostics.install()? == SinkStatus::Installed {
            debug!(threshold = %self.diagnostics.threshold(), "diagnostics enabled");
        }

        let span = info_span!("bootstrap");
        let _enter = span.enter();

        info_span!("preflight", available = preflight.is_available()).in_scope(|| self.preflight.report(&preflight));

        let target = self.resolve_target(request)?;

        let Some(session) = self.connect(&target)? else {
            return Err(ConfigurationError::NoSession(target).into());
        };

        let script = request.script.as_deref();
        let _dispatch = info_span!("dispatch", mode = target.mode(), %target, script = ?script).entered();
        debug!("dispatching session to executor");
        let report = self.executor.execute(session, script)?;
        info!(summary = %report.summary, "script execution finished");
        Ok(report)
    }

    fn resolve_target(&self, request: &LaunchRequest) -> Result<AttachmentDescriptor>
    {
        let attachment = &request.attachment;
        let _span = info_span!("resolve", pid = attachment.pid, socket = attachment.socket.as_deref()).entered();
        let target = resolve(attachment)?;
        info!(mode = target.mode(), %target, "attaching");
        Ok(target)
    }

    fn connect(&mut self, target: &AttachmentDescriptor) -> Result<Option<C::Session>>
    {
        let _span = info_span!("connect", mode = target.mode(), %target).entered();
        let session = match target {
            AttachmentDescriptor::Local { pid } => self.connector.connect_local(*pid),
            AttachmentDescriptor::Remote { host, port } => self.connector.connect_remote(host, *port),
        };

        session.map_err(|source| BootstrapError::Connection {
            target: target.clone(),
            source,
        })
    }
}
