//! # Attachment Descriptor Resolver
//!
//! Turns raw `-pid` / `-socket` values into a single [`AttachmentDescriptor`].
//!
//! Resolution is a pure function: it never touches the target. Whether the
//! process exists or the port is listening is the connector's business.
//!
//! | `-pid` | `-socket` | Result |
//! |---|---|---|
//! | `>= 0` | absent | `Local { pid }` |
//! | unset | `PORT` | `Remote { localhost, PORT }` |
//! | unset | `HOST:PORT` | `Remote { HOST, PORT }` |
//! | unset | absent | [`ConfigurationError::MissingMode`] |
//! | `>= 0` | present | [`ConfigurationError::ConflictingModes`] |

use tracing::trace;

use crate::error::ConfigurationError;
use crate::types::{AttachmentDescriptor, AttachmentRequest, ProcessId, DEFAULT_HOST};

/// Resolve raw attachment parameters into a descriptor.
///
/// ## Errors
///
/// - `MissingMode`: neither `-pid` nor `-socket` was given
/// - `ConflictingModes`: both were given
/// - `PidOutOfRange`: `-pid` does not fit a `u32`
/// - `InvalidSocket` / `InvalidPort`: `-socket` is malformed
///
/// ## Example
///
/// ```rust
/// use tether_core::resolver::resolve;
/// use tether_core::types::{AttachmentDescriptor, AttachmentRequest};
///
/// let target = resolve(&AttachmentRequest::remote("9009"))?;
/// assert_eq!(
///     target,
///     AttachmentDescriptor::Remote { host: "localhost".to_string(), port: 9009 }
/// );
/// # Ok::<(), tether_core::error::ConfigurationError>(())
/// ```
pub fn resolve(request: &AttachmentRequest) -> Result<AttachmentDescriptor, ConfigurationError>
{
    let descriptor = match (request.has_pid(), request.socket.as_deref()) {
        (true, Some(socket)) => {
            return Err(ConfigurationError::ConflictingModes {
                pid: request.pid,
                socket: socket.to_string(),
            })
        }
        (true, None) => {
            let pid = u32::try_from(request.pid).map_err(|_| ConfigurationError::PidOutOfRange(request.pid))?;
            AttachmentDescriptor::Local { pid: ProcessId(pid) }
        }
        (false, Some(socket)) => {
            let (host, port) = parse_socket(socket)?;
            AttachmentDescriptor::Remote { host, port }
        }
        (false, None) => return Err(ConfigurationError::MissingMode),
    };

    trace!(mode = descriptor.mode(), %descriptor, "attachment resolved");
    Ok(descriptor)
}

/// Split a `[HOST:]PORT` value into host and port.
///
/// ## Errors
///
/// - `InvalidSocket`: empty value, empty host, or more than two `:`-separated tokens
/// - `InvalidPort`: port token is not an integer in `0..=65535`
pub fn parse_socket(socket: &str) -> Result<(String, u16), ConfigurationError>
{
    let tokens: Vec<&str> = socket.split(':').collect();
    let (host, port) = match tokens.as_slice() {
        [port] if !port.trim().is_empty() => (DEFAULT_HOST, *port),
        [host, port] if !host.trim().is_empty() => (*host, *port),
        _ => return Err(ConfigurationError::InvalidSocket(socket.to_string())),
    };

    let port = port.trim().parse::<u16>().map_err(|_| ConfigurationError::InvalidPort {
        socket: socket.to_string(),
        port: port.to_string(),
    })?;

    Ok((host.trim().to_string(), port))
}
