//! # JDWP Transport Handshake
//!
//! A JDWP socket connection starts with both sides exchanging the 14 ASCII
//! bytes `JDWP-Handshake`. The debugger writes first, then expects the same
//! bytes back before any packet is sent.
//!
//! See: [JDWP Transport](https://docs.oracle.com/en/java/javase/21/docs/specs/jdwp/jdwp-spec.html)

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tether_core::error::{ConnectionError, ConnectionResult};
use tracing::{debug, trace};

/// Greeting exchanged by both peers.
pub const HANDSHAKE: &[u8; 14] = b"JDWP-Handshake";

/// Connect to `host:port` and complete the handshake within `timeout`.
///
/// Every resolved address is tried in order; the last failure is reported.
///
/// ## Errors
///
/// - `UnresolvedAddress`: the host resolves to nothing
/// - `Timeout`: connect or handshake exceeded `timeout`
/// - `Io`: connection refused, reset, or similar
/// - `HandshakeRejected`: the peer answered with something else
pub fn open(host: &str, port: u16, timeout: Duration) -> ConnectionResult<(TcpStream, SocketAddr)>
{
    let address = format!("{host}:{port}");
    let candidates: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|_| ConnectionError::UnresolvedAddress(address.clone()))?
        .collect();

    let mut last_error = ConnectionError::UnresolvedAddress(address.clone());
    for candidate in candidates {
        trace!(%candidate, "dialling");
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => {
                handshake(&stream, &address, timeout)?;
                debug!(%candidate, "handshake complete");
                return Ok((stream, candidate));
            }
            Err(e) => last_error = classify(e, &address, timeout),
        }
    }
    Err(last_error)
}

/// Perform the greeting exchange on an open stream.
///
/// ## Errors
///
/// See [`open`].
pub fn handshake(stream: &TcpStream, address: &str, timeout: Duration) -> ConnectionResult<()>
{
    let io_error = |e: io::Error| classify(e, address, timeout);

    stream.set_read_timeout(Some(timeout)).map_err(io_error)?;
    stream.set_write_timeout(Some(timeout)).map_err(io_error)?;

    let mut writer = stream;
    writer.write_all(HANDSHAKE).map_err(io_error)?;
    writer.flush().map_err(io_error)?;

    let mut reply = [0_u8; HANDSHAKE.len()];
    let mut reader = stream;
    let mut filled = 0;
    while filled < reply.len() {
        match reader.read(&mut reply[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(io_error(e)),
        }
    }

    if &reply[..filled] != HANDSHAKE.as_slice() {
        return Err(ConnectionError::HandshakeRejected {
            address: address.to_string(),
            received: String::from_utf8_lossy(&reply[..filled]).into_owned(),
        });
    }

    // The engine owns pacing from here on.
    stream.set_read_timeout(None).map_err(io_error)?;
    stream.set_write_timeout(None).map_err(io_error)?;
    Ok(())
}

fn classify(error: io::Error, address: &str, timeout: Duration) -> ConnectionError
{
    match error.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ConnectionError::Timeout {
            address: address.to_string(),
            after: timeout,
        },
        _ => ConnectionError::Io {
            address: address.to_string(),
            source: error,
        },
    }
}
