//! Session handle produced by [`JdwpConnector`](crate::JdwpConnector).

use std::fmt;
use std::net::{Shutdown, SocketAddr, TcpStream};

use chrono::{DateTime, Utc};
use tether_core::types::AttachmentDescriptor;
use tracing::debug;

/// An open, handshaken JDWP connection.
///
/// The socket is closed when the session is dropped, unless the stream was
/// taken with [`JdwpSession::into_stream`].
#[derive(Debug)]
pub struct JdwpSession
{
    stream: TcpStream,
    peer: SocketAddr,
    target: AttachmentDescriptor,
    connected_at: DateTime<Utc>,
}

impl JdwpSession
{
    pub(crate) fn new(stream: TcpStream, peer: SocketAddr, target: AttachmentDescriptor) -> Self
    {
        Self {
            stream,
            peer,
            target,
            connected_at: Utc::now(),
        }
    }

    /// Socket address of the agent.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr
    {
        self.peer
    }

    /// Descriptor this session was requested for.
    #[must_use]
    pub const fn target(&self) -> &AttachmentDescriptor
    {
        &self.target
    }

    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc>
    {
        self.connected_at
    }

    /// Take the raw stream, e.g. to hand it to an in-process engine.
    #[must_use]
    pub fn into_stream(self) -> TcpStream
    {
        self.stream
    }

    /// Close the connection so another debugger can attach to the agent.
    pub fn release(self)
    {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            debug!(error = %e, peer = %self.peer, "session socket already closed");
        }
    }
}

impl fmt::Display for JdwpSession
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(
            f,
            "JDWP session with {} at {} (connected {})",
            self.target,
            self.peer,
            self.connected_at.to_rfc3339()
        )
    }
}
