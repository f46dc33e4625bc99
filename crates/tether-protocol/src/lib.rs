//! # tether-protocol
//!
//! Transport side of a Tether session.
//!
//! - [`JdwpConnector`]: opens the socket to a JDWP agent and performs the
//!   transport handshake, either at an explicit `host:port` or at the address
//!   found in a local process's agent options
//! - [`JdwpSession`]: the handle produced by the connector
//! - [`ProcfsProbe`]: preflight probe for local agent discovery
//!
//! Nothing past the handshake is spoken here; command packets, events and
//! breakpoints belong to the script engine that receives the session.

pub mod connector;
pub mod discovery;
pub mod probe;
pub mod session;
pub mod transport;

pub use connector::JdwpConnector;
pub use discovery::AgentAddress;
pub use probe::ProcfsProbe;
pub use session::JdwpSession;
