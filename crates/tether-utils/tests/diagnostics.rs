//! Tests for installing the diagnostics sink
//!
//! Installation touches the global subscriber, so everything that installs
//! lives in this one test binary and one test function.

use std::collections::HashMap;

use tether_utils::config::LOG_FORMAT_VAR;
use tether_utils::{Diagnostics, LogFormat, LoggingError, Settings, SinkStatus, Threshold, Verbosity};

#[test]
fn test_install_is_idempotent_and_exclusive()
{
    let settings = Settings::from_map(&HashMap::from([(LOG_FORMAT_VAR.to_string(), "json".to_string())]));
    let diagnostics = Diagnostics::new(Verbosity::from(2), &settings);
    assert_eq!(diagnostics.threshold(), Threshold::Finer);
    assert_eq!(diagnostics.format(), LogFormat::Json);
    assert!(!diagnostics.is_installed());

    assert_eq!(diagnostics.install().unwrap(), SinkStatus::Installed);
    assert!(diagnostics.is_installed());

    // Re-running on the same value never stacks another sink
    assert_eq!(diagnostics.install().unwrap(), SinkStatus::AlreadyInstalled);
    assert_eq!(diagnostics.install().unwrap(), SinkStatus::AlreadyInstalled);

    // A fresh value at the same verbosity and settings reuses the active sink
    let again = Diagnostics::new(Verbosity::from(2), &settings);
    assert_eq!(again.install().unwrap(), SinkStatus::AlreadyInstalled);
    assert!(again.is_installed());
    assert_eq!(again.install().unwrap(), SinkStatus::AlreadyInstalled);

    // A higher threshold is a different configuration
    let finest = Diagnostics::new(Verbosity::from(3), &settings);
    assert!(matches!(finest.install(), Err(LoggingError::InitializationFailed(_))));
    assert!(!finest.is_installed());

    // A second, independent configuration cannot replace the global sink
    let other = Diagnostics::new(Verbosity::from(1), &Settings::default());
    assert!(matches!(other.install(), Err(LoggingError::InitializationFailed(_))));
    assert!(!other.is_installed());

    // Zero verbosity never competes for the sink
    assert_eq!(Diagnostics::disabled().install().unwrap(), SinkStatus::Skipped);

    tracing::trace!(target: "tether_core", "visible at finer");
}

#[test]
fn test_zero_verbosity_never_installs()
{
    let diagnostics = Diagnostics::new(Verbosity::default(), &Settings::default());
    assert_eq!(diagnostics.threshold(), Threshold::Off);
    assert_eq!(diagnostics.install().unwrap(), SinkStatus::Skipped);
    assert!(!diagnostics.is_installed());
}
