//! Script executor backed by an external engine program.
//!
//! The engine is configured with `TETHER_SCRIPT_ENGINE`. It is started with
//! the script path as its only argument and learns where the session lives
//! from its environment:
//!
//! - `TETHER_SESSION_ADDR`: `ip:port` of the JDWP agent
//! - `TETHER_SESSION_TARGET`: human-readable attachment target
//!
//! JDWP agents accept a single debugger, so our own socket is released before
//! the engine starts. Without an engine and without a script the run is a
//! dry attach: the session summary is printed and the session released.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tether_core::error::ExecutionError;
use tether_core::session::{ExecutionReport, ScriptExecutor};
use tether_protocol::JdwpSession;
use tracing::{debug, info};

/// Environment variable carrying the agent address to the engine.
pub const SESSION_ADDR_VAR: &str = "TETHER_SESSION_ADDR";
/// Environment variable carrying the attachment target to the engine.
pub const SESSION_TARGET_VAR: &str = "TETHER_SESSION_TARGET";

pub struct EngineExecutor<W = io::Stdout>
{
    engine: Option<PathBuf>,
    out: W,
}

impl EngineExecutor
{
    #[must_use]
    pub fn new(engine: Option<PathBuf>) -> Self
    {
        Self {
            engine,
            out: io::stdout(),
        }
    }
}

impl<W: Write> EngineExecutor<W>
{
    /// Print dry-attach summaries somewhere other than standard output.
    #[must_use]
    pub fn with_output<W2: Write>(self, out: W2) -> EngineExecutor<W2>
    {
        EngineExecutor {
            engine: self.engine,
            out,
        }
    }

    #[must_use]
    pub fn output(&self) -> &W
    {
        &self.out
    }

    fn run_engine(engine: &Path, session: JdwpSession, script: Option<&Path>) -> Result<ExecutionReport, ExecutionError>
    {
        let address = session.peer().to_string();
        let target = session.target().to_string();
        session.release();

        let mut command = Command::new(engine);
        if let Some(script) = script {
            command.arg(script);
        }
        command.env(SESSION_ADDR_VAR, &address).env(SESSION_TARGET_VAR, &target);

        info!(engine = %engine.display(), %address, "starting script engine");
        let status = command.status().map_err(|source| ExecutionError::EngineSpawn {
            engine: engine.to_path_buf(),
            source,
        })?;

        if !status.success() {
            return Err(ExecutionError::EngineFailed {
                engine: engine.to_path_buf(),
                code: status.code(),
            });
        }

        Ok(ExecutionReport::new(script, format!("{} finished against {target}", engine.display())))
    }
}

impl<W: Write> ScriptExecutor<JdwpSession> for EngineExecutor<W>
{
    fn execute(&mut self, session: JdwpSession, script: Option<&Path>) -> Result<ExecutionReport, ExecutionError>
    {
        if let Some(path) = script {
            File::open(path).map_err(|source| ExecutionError::ScriptUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        }

        match (&self.engine, script) {
            (Some(engine), _) => Self::run_engine(engine, session, script),
            (None, Some(path)) => {
                session.release();
                Err(ExecutionError::EngineNotConfigured {
                    script: path.to_path_buf(),
                })
            }
            (None, None) => {
                let summary = session.to_string();
                session.release();
                if let Err(e) = writeln!(self.out, "{summary}") {
                    debug!(error = %e, "could not print session summary");
                }
                Ok(ExecutionReport::new(None, summary))
            }
        }
    }
}
