//! Convenient re-exports for implementing collaborators.
//!
//! ```rust
//! use tether_core::prelude::*;
//! ```

pub use crate::error::{ConnectionError, ConnectionResult, ExecutionError};
pub use crate::preflight::ProtocolProbe;
pub use crate::session::{ExecutionReport, ScriptExecutor, SessionConnector};
pub use crate::types::{AttachmentDescriptor, ProcessId};
