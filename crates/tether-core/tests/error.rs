//! Tests for error handling

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tether_core::error::{BootstrapError, ConfigurationError, ConnectionError, ExecutionError};
use tether_core::types::{AttachmentDescriptor, ProcessId};
use tether_utils::LoggingError;

#[test]
fn test_missing_mode_message()
{
    let message = ConfigurationError::MissingMode.to_string();
    assert_eq!(message, "Neither -pid nor -socket option was specified");
}

#[test]
fn test_invalid_socket_message_names_input()
{
    let message = ConfigurationError::InvalidSocket("a:b:9009".to_string()).to_string();
    assert_eq!(message, "Invalid argument to the -socket option: a:b:9009");
}

#[test]
fn test_configuration_error_is_transparent()
{
    let err: BootstrapError = ConfigurationError::MissingMode.into();
    assert_eq!(err.to_string(), ConfigurationError::MissingMode.to_string());
    assert!(err.is_configuration());
}

#[test]
fn test_exit_codes_are_stable()
{
    let configuration: BootstrapError = ConfigurationError::MissingMode.into();
    let connection = BootstrapError::Connection {
        target: AttachmentDescriptor::Local { pid: ProcessId(1) },
        source: ConnectionError::ProcessNotFound(ProcessId(1)),
    };
    let execution: BootstrapError = ExecutionError::EngineNotConfigured {
        script: PathBuf::from("a.txt"),
    }
    .into();
    let diagnostics: BootstrapError = LoggingError::InitializationFailed("taken".to_string()).into();

    assert_eq!(configuration.exit_code(), 1);
    assert_eq!(connection.exit_code(), 2);
    assert_eq!(execution.exit_code(), 3);
    assert_eq!(diagnostics.exit_code(), 4);
    assert!(!connection.is_configuration());
}

#[test]
fn test_connection_error_carries_context()
{
    let err = BootstrapError::Connection {
        target: AttachmentDescriptor::Local { pid: ProcessId(4321) },
        source: ConnectionError::ProcessNotFound(ProcessId(4321)),
    };
    let message = err.to_string();
    assert!(message.contains("local process 4321"));
    assert!(message.contains("Process not found: PID 4321"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_connection_error_messages()
{
    let timeout = ConnectionError::Timeout {
        address: "devbox:5005".to_string(),
        after: Duration::from_millis(250),
    };
    assert!(timeout.to_string().contains("devbox:5005"));

    let io = ConnectionError::Io {
        address: "localhost:9009".to_string(),
        source: io::Error::from(io::ErrorKind::ConnectionRefused),
    };
    assert!(io.to_string().starts_with("Connection to localhost:9009 failed"));

    let rejected = ConnectionError::HandshakeRejected {
        address: "localhost:9009".to_string(),
        received: "HTTP/1.1 400".to_string(),
    };
    assert!(rejected.to_string().contains("HTTP/1.1 400"));
}

#[test]
fn test_execution_error_messages()
{
    let failed = ExecutionError::EngineFailed {
        engine: PathBuf::from("/usr/bin/engine"),
        code: Some(3),
    };
    assert!(failed.to_string().contains("/usr/bin/engine"));
    assert!(failed.to_string().contains("Some(3)"));

    let missing = ExecutionError::EngineNotConfigured {
        script: PathBuf::from("probe.txt"),
    };
    assert!(missing.to_string().contains("TETHER_SCRIPT_ENGINE"));
}
