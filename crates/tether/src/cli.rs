//! Command-line surface.
//!
//! The historical spellings `-pid`, `-socket` and `-debug` are rewritten to
//! their `--` forms before clap sees them, so both styles are accepted.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser};
use tether_core::types::{AttachmentRequest, LaunchRequest, UNSET_PID};
use tether_utils::Verbosity;

/// Usage synopsis printed after configuration errors.
pub const USAGE: &str = "tether [options...] [script file]";

const LEGACY_FLAGS: &[&str] = &["pid", "socket", "debug"];

/// Attach to a running JVM over JDWP and hand a script to the session.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "tether")]
#[command(version)]
#[command(about = "Attach to a running JVM over JDWP and hand a script to the session", long_about = None)]
#[command(override_usage = USAGE)]
pub struct Cli
{
    /// Attaches to the local process of the given PID
    #[arg(long = "pid", value_name = "PID", default_value_t = UNSET_PID, allow_negative_numbers = true)]
    pub pid: i64,

    /// Attaches to the target process by a socket
    #[arg(long = "socket", value_name = "[HOST:]PORT")]
    pub socket: Option<String>,

    /// Increase the debug output level. Specify multiple times to get more detailed logging
    #[arg(long = "debug", action = ArgAction::Count)]
    pub debug: u8,

    /// Script to run inside the session
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,
}

impl Cli
{
    /// Parse already-normalized arguments.
    ///
    /// ## Errors
    ///
    /// The clap error for unknown flags, missing values and the like.
    pub fn parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_legacy_flags(args))
    }

    #[must_use]
    pub fn verbosity(&self) -> Verbosity
    {
        Verbosity::from(self.debug)
    }

    #[must_use]
    pub fn launch_request(&self) -> LaunchRequest
    {
        LaunchRequest {
            attachment: AttachmentRequest {
                pid: self.pid,
                socket: self.socket.clone(),
            },
            script: self.script.clone(),
        }
    }
}

/// Rewrite `-pid`, `-socket` and `-debug` (with or without `=value`) to `--` form.
///
/// Arguments after a bare `--` are left alone so script paths starting with a
/// dash survive.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') && is_legacy(rest) => OsString::from(format!("-{text}")),
                _ => arg,
            }
        })
        .collect()
}

fn is_legacy(flag: &str) -> bool
{
    let name = flag.split_once('=').map_or(flag, |(name, _)| name);
    LEGACY_FLAGS.contains(&name)
}

/// Print `message` followed by the usage synopsis and option list.
pub fn print_usage_failure<W: Write>(out: &mut W, message: &str) -> io::Result<()>
{
    writeln!(out, "{message}")?;
    let help = Cli::command().render_help();
    writeln!(out, "{help}")
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString>
    {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_normalize_legacy_flags()
    {
        let normalized = normalize_legacy_flags(["tether", "-pid", "12", "-debug", "-socket=9009", "-x"]);
        assert_eq!(normalized, os(&["tether", "--pid", "12", "--debug", "--socket=9009", "-x"]));
    }

    #[test]
    fn test_normalize_stops_at_double_dash()
    {
        let normalized = normalize_legacy_flags(["tether", "-pid", "1", "--", "-debug"]);
        assert_eq!(normalized, os(&["tether", "--pid", "1", "--", "-debug"]));
    }

    #[test]
    fn test_double_dash_forms_untouched()
    {
        let normalized = normalize_legacy_flags(["tether", "--socket", "h:1"]);
        assert_eq!(normalized, os(&["tether", "--socket", "h:1"]));
    }

    #[test]
    fn test_parse_pid_without_script()
    {
        let cli = Cli::parse_args(["tether", "-pid", "1234"]).unwrap();
        assert_eq!(cli.pid, 1234);
        assert_eq!(cli.socket, None);
        assert_eq!(cli.script, None);
        assert_eq!(cli.launch_request().attachment, AttachmentRequest::local(1234));
    }

    #[test]
    fn test_parse_socket_with_script()
    {
        let cli = Cli::parse_args(["tether", "-socket", "9009", "script.txt"]).unwrap();
        let request = cli.launch_request();
        assert_eq!(request.attachment, AttachmentRequest::remote("9009"));
        assert_eq!(request.script, Some(PathBuf::from("script.txt")));
    }

    #[test]
    fn test_parse_defaults()
    {
        let cli = Cli::parse_args(["tether"]).unwrap();
        assert_eq!(cli.pid, UNSET_PID);
        assert_eq!(cli.verbosity(), Verbosity::default());
        assert_eq!(cli.launch_request(), LaunchRequest::default());
    }

    #[test]
    fn test_debug_is_counted()
    {
        let cli = Cli::parse_args(["tether", "-debug", "-debug", "--debug", "-pid", "1"]).unwrap();
        assert_eq!(cli.verbosity().count(), 3);
    }

    #[test]
    fn test_negative_pid_is_accepted()
    {
        let cli = Cli::parse_args(["tether", "-pid", "-1", "-socket", "5005"]).unwrap();
        assert_eq!(cli.pid, -1);
    }

    #[test]
    fn test_non_numeric_pid_is_a_parse_error()
    {
        assert!(Cli::parse_args(["tether", "-pid", "abc"]).is_err());
    }

    #[test]
    fn test_usage_failure_output()
    {
        let mut out = Vec::new();
        print_usage_failure(&mut out, "Invalid argument to the -socket option: a:b:9009").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Invalid argument to the -socket option: a:b:9009\n"));
        assert!(text.contains(USAGE));
        assert!(text.contains("--socket"));
    }

    #[test]
    fn test_cli_definition_is_consistent()
    {
        Cli::command().debug_assert();
    }
}
