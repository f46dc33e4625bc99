//! # tether-core
//!
//! Attachment resolution and session bootstrap orchestration for Tether.
//!
//! This crate decides *how* and *whether* a debugging session is reached:
//! - Resolving `-pid` / `-socket` parameters into one attachment target
//! - Probing the environment for debugging protocol support
//! - Driving the connector and script executor in a fixed stage order
//!
//! The connector and the executor are traits ([`SessionConnector`],
//! [`ScriptExecutor`]); this crate implements neither the debugging protocol
//! nor a script engine.

pub mod bootstrap;
pub mod error;
pub mod prelude;
pub mod preflight;
pub mod resolver;
pub mod session;
pub mod types;

pub use bootstrap::Bootstrapper;
// Re-export commonly used types
pub use error::{BootstrapError, ConfigurationError, ConnectionError, ExecutionError, Result};
pub use preflight::{Preflight, PreflightOutcome, ProtocolProbe};
pub use session::{ExecutionReport, ScriptExecutor, SessionConnector};
pub use types::{AttachmentDescriptor, AttachmentRequest, LaunchRequest, ProcessId};
