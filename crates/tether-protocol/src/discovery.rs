//! # Local Agent Discovery
//!
//! Finds where a local JVM's JDWP agent listens by reading the agent options
//! off the process command line.
//!
//! Recognised spellings:
//!
//! - `-agentlib:jdwp=transport=dt_socket,server=y,address=5005`
//! - `-Xrunjdwp:transport=dt_socket,server=y,address=*:5005`
//!
//! Only socket agents in server mode with an explicit address can be reached.
//! A missing host, `*` or `0.0.0.0` means the agent listens on every interface,
//! which we reach through `localhost`.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use tether_core::types::{ProcessId, DEFAULT_HOST};

const AGENTLIB_PREFIX: &str = "-agentlib:jdwp=";
const XRUN_PREFIX: &str = "-Xrunjdwp:";

/// Listen address of a local JDWP agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAddress
{
    pub host: String,
    pub port: u16,
}

impl fmt::Display for AgentAddress
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Why no reachable agent was found on a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryMiss
{
    /// No JDWP agent option at all
    NoAgent,
    /// Agent uses a transport other than `dt_socket`
    Transport(String),
    /// Agent connects out (`server=n`) instead of listening
    ClientMode,
    /// Listening agent without a fixed address
    NoAddress,
    /// Address option could not be parsed
    BadAddress(String),
}

impl fmt::Display for DiscoveryMiss
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            DiscoveryMiss::NoAgent => write!(f, "no -agentlib:jdwp option on the command line"),
            DiscoveryMiss::Transport(transport) => write!(f, "agent uses transport {transport}, not dt_socket"),
            DiscoveryMiss::ClientMode => write!(f, "agent runs with server=n and does not listen"),
            DiscoveryMiss::NoAddress => write!(f, "agent listens on an ephemeral address"),
            DiscoveryMiss::BadAddress(address) => write!(f, "cannot parse agent address {address}"),
        }
    }
}

/// Find the agent listen address among command-line arguments.
///
/// The last JDWP option wins, matching how the JVM treats repeated agent flags.
///
/// ## Example
///
/// ```rust
/// use tether_protocol::discovery::find_agent_address;
///
/// let args = ["java", "-agentlib:jdwp=transport=dt_socket,server=y,address=*:5005", "Main"];
/// let address = find_agent_address(&args).unwrap();
/// assert_eq!(address.to_string(), "localhost:5005");
/// ```
///
/// ## Errors
///
/// A [`DiscoveryMiss`] describing what was found instead.
pub fn find_agent_address<S: AsRef<str>>(args: &[S]) -> Result<AgentAddress, DiscoveryMiss>
{
    let options = args
        .iter()
        .filter_map(|arg| {
            let arg = arg.as_ref();
            arg.strip_prefix(AGENTLIB_PREFIX).or_else(|| arg.strip_prefix(XRUN_PREFIX))
        })
        .last()
        .ok_or(DiscoveryMiss::NoAgent)?;

    let mut transport = None;
    let mut server = false;
    let mut address = None;
    for option in options.split(',') {
        match option.split_once('=') {
            Some(("transport", value)) => transport = Some(value),
            Some(("server", value)) => server = value.eq_ignore_ascii_case("y"),
            Some(("address", value)) => address = Some(value),
            _ => {}
        }
    }

    match transport {
        Some("dt_socket") => {}
        other => return Err(DiscoveryMiss::Transport(other.unwrap_or("none").to_string())),
    }
    if !server {
        return Err(DiscoveryMiss::ClientMode);
    }

    let address = address.filter(|a| !a.is_empty()).ok_or(DiscoveryMiss::NoAddress)?;
    parse_address(address).ok_or_else(|| DiscoveryMiss::BadAddress(address.to_string()))
}

fn parse_address(address: &str) -> Option<AgentAddress>
{
    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => (host.trim_start_matches('[').trim_end_matches(']'), port),
        None => ("", address),
    };

    let port = port.parse::<u16>().ok().filter(|p| *p != 0)?;
    let host = match host {
        "" | "*" | "0.0.0.0" => DEFAULT_HOST,
        host => host,
    };

    Some(AgentAddress {
        host: host.to_string(),
        port,
    })
}

/// Read the NUL-separated command line of `pid` under `proc_root`.
///
/// ## Errors
///
/// `NotFound` when the process does not exist, other I/O errors as-is.
pub fn read_cmdline(proc_root: &Path, pid: ProcessId) -> io::Result<Vec<String>>
{
    let raw = fs::read(proc_root.join(pid.to_string()).join("cmdline"))?;
    Ok(raw
        .split(|b| *b == 0)
        .filter(|arg| !arg.is_empty())
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_address_forms()
    {
        assert_eq!(parse_address("5005").unwrap().to_string(), "localhost:5005");
        assert_eq!(parse_address("*:5005").unwrap().to_string(), "localhost:5005");
        assert_eq!(parse_address("0.0.0.0:5005").unwrap().to_string(), "localhost:5005");
        assert_eq!(parse_address("10.1.2.3:8000").unwrap().to_string(), "10.1.2.3:8000");
        assert_eq!(parse_address("[::1]:8000").unwrap().host, "::1");
    }

    #[test]
    fn test_parse_address_rejects_garbage()
    {
        assert!(parse_address("host:").is_none());
        assert!(parse_address("abc").is_none());
        assert!(parse_address("0").is_none());
    }
}
