//! Recording collaborators shared by the integration tests

#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tether_core::error::{ConnectionError, ConnectionResult, ExecutionError};
use tether_core::preflight::{Preflight, ProtocolProbe};
use tether_core::session::{ExecutionReport, ScriptExecutor, SessionConnector};
use tether_core::types::ProcessId;
use tether_core::Bootstrapper;
use tether_utils::Diagnostics;

/// One call observed by [`RecordingConnector`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectCall
{
    Local(ProcessId),
    Remote(String, u16),
}

/// What [`RecordingConnector`] answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome
{
    Session,
    Absent,
    Refused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeSession
{
    pub label: String,
}

pub struct RecordingConnector
{
    pub calls: Vec<ConnectCall>,
    pub outcome: ConnectOutcome,
}

impl RecordingConnector
{
    pub fn new(outcome: ConnectOutcome) -> Self
    {
        Self { calls: Vec::new(), outcome }
    }

    fn answer(&self, label: String) -> ConnectionResult<Option<FakeSession>>
    {
        match self.outcome {
            ConnectOutcome::Session => Ok(Some(FakeSession { label })),
            ConnectOutcome::Absent => Ok(None),
            ConnectOutcome::Refused => Err(ConnectionError::Io {
                address: label,
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }),
        }
    }
}

impl SessionConnector for RecordingConnector
{
    type Session = FakeSession;

    fn connect_local(&mut self, pid: ProcessId) -> ConnectionResult<Option<FakeSession>>
    {
        self.calls.push(ConnectCall::Local(pid));
        self.answer(format!("pid:{pid}"))
    }

    fn connect_remote(&mut self, host: &str, port: u16) -> ConnectionResult<Option<FakeSession>>
    {
        self.calls.push(ConnectCall::Remote(host.to_string(), port));
        self.answer(format!("{host}:{port}"))
    }
}

#[derive(Default)]
pub struct RecordingExecutor
{
    pub runs: Vec<(FakeSession, Option<PathBuf>)>,
    pub fail: bool,
}

impl ScriptExecutor<FakeSession> for RecordingExecutor
{
    fn execute(&mut self, session: FakeSession, script: Option<&Path>) -> Result<ExecutionReport, ExecutionError>
    {
        self.runs.push((session.clone(), script.map(Path::to_path_buf)));
        if self.fail {
            return Err(ExecutionError::EngineFailed {
                engine: PathBuf::from("fake-engine"),
                code: Some(7),
            });
        }
        Ok(ExecutionReport::new(script, format!("ran against {}", session.label)))
    }
}

pub struct StubProbe
{
    pub available: bool,
}

impl ProtocolProbe for StubProbe
{
    fn protocol(&self) -> &str
    {
        "stub"
    }

    fn is_available(&self) -> bool
    {
        self.available
    }

    fn default_remediation(&self) -> String
    {
        "enable the stub protocol".to_string()
    }
}

pub type TestBootstrapper = Bootstrapper<RecordingConnector, RecordingExecutor, StubProbe, Vec<u8>>;

pub fn bootstrapper(outcome: ConnectOutcome) -> TestBootstrapper
{
    bootstrapper_with(outcome, true, RecordingExecutor::default())
}

pub fn bootstrapper_with(outcome: ConnectOutcome, available: bool, executor: RecordingExecutor) -> TestBootstrapper
{
    Bootstrapper::new(
        RecordingConnector::new(outcome),
        executor,
        Preflight::new(StubProbe { available }),
        Diagnostics::disabled(),
    )
    .with_advisory_sink(Vec::new())
}

#[derive(Clone, Default)]
struct EventBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for EventBuffer
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>
    {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()>
    {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return everything it logged.
///
/// New spans are printed with their fields, one line each.
pub fn capture_events<T>(f: impl FnOnce() -> T) -> (T, String)
{
    let buffer = EventBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NEW)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    (result, text)
}
