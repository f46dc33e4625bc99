//! Tests for attachment types

use tether_core::types::{AttachmentDescriptor, AttachmentRequest, LaunchRequest, ProcessId, UNSET_PID};

#[test]
fn test_process_id_conversions()
{
    let pid = ProcessId::from(12345);
    assert_eq!(pid.0, 12345);
    let value: u32 = pid.into();
    assert_eq!(value, 12345);
    assert_eq!(pid.to_string(), "12345");
}

#[test]
fn test_request_defaults_to_unset()
{
    let request = AttachmentRequest::default();
    assert_eq!(request.pid, UNSET_PID);
    assert_eq!(request.socket, None);
    assert!(!request.has_pid());
    assert!(AttachmentRequest::local(0).has_pid());
}

#[test]
fn test_launch_request_default_has_no_script()
{
    let request = LaunchRequest::default();
    assert_eq!(request.script, None);
    assert_eq!(request.attachment, AttachmentRequest::default());
}

#[test]
fn test_descriptor_display_and_mode()
{
    let local = AttachmentDescriptor::Local { pid: ProcessId(77) };
    let remote = AttachmentDescriptor::Remote {
        host: "devbox".to_string(),
        port: 5005,
    };

    assert_eq!(local.to_string(), "local process 77");
    assert_eq!(remote.to_string(), "socket devbox:5005");
    assert_eq!(local.mode(), "local");
    assert_eq!(remote.mode(), "remote");
}
