//! # Types
//!
//! Values that flow through a bootstrap run.
//!
//! Raw command-line input arrives as an [`AttachmentRequest`] and is validated
//! into exactly one [`AttachmentDescriptor`]. The descriptor is consumed once to
//! request a session and is never persisted.

pub mod descriptor;
pub mod process;

// Re-export all public types
pub use descriptor::{AttachmentDescriptor, AttachmentRequest, LaunchRequest, DEFAULT_HOST, UNSET_PID};
pub use process::ProcessId;
