//! # Tether Utilities
//!
//! Shared logging and configuration for Tether.
//!
//! This crate provides the diagnostics layer (verbosity, thresholds and the
//! `tracing` sink built on top of them) and the `TETHER_*` environment settings
//! used across the workspace.

pub mod config;
pub mod logging;

// Re-export commonly used items for convenience
pub use config::Settings;
pub use logging::{Diagnostics, LogFormat, LoggingError, SinkStatus, Threshold, Verbosity};
pub use tracing::{debug, error, info, trace, warn};
