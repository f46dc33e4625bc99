//! # Environment Preflight Check
//!
//! Inspects the local environment (not the target) before any connection
//! attempt.
//!
//! The check is advisory. When the debugging protocol support is missing, a
//! remediation message goes to the error stream and the run carries on; the
//! connect stage will then fail with its own, more precise error.
//!
//! The remediation text is data, not code: it comes from the probe by default
//! and can be replaced through configuration (`TETHER_PREFLIGHT_HINT`).
//!
//! The check runs before the diagnostics sink exists, so [`Preflight::check`]
//! emits no `tracing` events. The bootstrapper passes the outcome to
//! [`Preflight::report`] once diagnostics are installed.

use std::io::Write;

use tracing::{debug, warn};

/// Detects whether the debugging protocol is usable in this environment.
pub trait ProtocolProbe
{
    /// Name of the protocol support being probed, for logs.
    fn protocol(&self) -> &str;

    /// `true` when the protocol support is reachable.
    fn is_available(&self) -> bool;

    /// Message telling the operator how to make the protocol available.
    fn default_remediation(&self) -> String;
}

/// Result of [`Preflight::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightOutcome
{
    /// Protocol support found
    Available,
    /// Protocol support missing
    Unavailable
    {
        /// Remediation text for the advisory sink
        remediation: String,
        /// `false` when writing to the advisory sink failed
        delivered: bool,
    },
}

impl PreflightOutcome
{
    #[must_use]
    pub const fn is_available(&self) -> bool
    {
        matches!(self, PreflightOutcome::Available)
    }
}

/// A probe plus the remediation text to show when it fails.
#[derive(Debug, Clone)]
pub struct Preflight<P>
{
    probe: P,
    remediation: Option<String>,
}

impl<P: ProtocolProbe> Preflight<P>
{
    #[must_use]
    pub fn new(probe: P) -> Self
    {
        Self { probe, remediation: None }
    }

    /// Replace the probe's remediation text, e.g. from configuration.
    #[must_use]
    pub fn with_remediation(mut self, remediation: Option<String>) -> Self
    {
        self.remediation = remediation;
        self
    }

    #[must_use]
    pub fn remediation(&self) -> String
    {
        self.remediation
            .clone()
            .unwrap_or_else(|| self.probe.default_remediation())
    }

    #[must_use]
    pub fn probe(&self) -> &P
    {
        &self.probe
    }

    /// Run the probe, writing the remediation to `advisory` if it fails.
    ///
    /// Never fails: a write error on the advisory sink is recorded in the outcome.
    pub fn check<W: Write>(&self, advisory: &mut W) -> PreflightOutcome
    {
        if self.probe.is_available() {
            return PreflightOutcome::Available;
        }

        let remediation = self.remediation();
        let delivered = writeln!(advisory, "{remediation}").is_ok();
        PreflightOutcome::Unavailable { remediation, delivered }
    }

    /// Log an outcome of [`Preflight::check`] against this probe.
    pub fn report(&self, outcome: &PreflightOutcome)
    {
        let protocol = self.probe.protocol();
        match outcome {
            PreflightOutcome::Available => debug!(protocol, "protocol support available"),
            PreflightOutcome::Unavailable { remediation, delivered } => {
                warn!(protocol, %remediation, "protocol support unavailable");
                if !delivered {
                    warn!(protocol, "could not write preflight remediation");
                }
            }
        }
    }
}
