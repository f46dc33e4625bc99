use std::io::{self, Write};
use std::process::ExitCode;

use clap::error::ErrorKind;
use tether_core::{BootstrapError, Bootstrapper, Preflight};
use tether_protocol::{JdwpConnector, ProcfsProbe};
use tether_utils::{error, info, Diagnostics, Settings};

mod cli;
mod executor;

use cli::{print_usage_failure, Cli};
use executor::EngineExecutor;

fn main() -> ExitCode
{
    let cli = match Cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => return ExitCode::from(report_parse_error(&e, &mut io::stdout())),
    };

    let settings = Settings::from_env();
    let diagnostics = Diagnostics::new(cli.verbosity(), &settings);
    let preflight = Preflight::new(ProcfsProbe::default()).with_remediation(settings.preflight_hint.clone());
    let connector = JdwpConnector::new(settings.connect_timeout);
    let executor = EngineExecutor::new(settings.script_engine.clone());

    let mut bootstrapper = Bootstrapper::new(connector, executor, preflight, diagnostics);
    match bootstrapper.run(&cli.launch_request()) {
        Ok(report) => {
            info!(summary = %report.summary, "run complete");
            ExitCode::SUCCESS
        }
        Err(e) => ExitCode::from(report_failure(&e, &mut io::stdout(), &mut io::stderr())),
    }
}

fn report_parse_error<O: Write>(e: &clap::Error, out: &mut O) -> u8
{
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        // --help and --version are not failures
        return match e.print() {
            Ok(()) => 0,
            Err(_) => 1,
        };
    }

    let rendered = e.to_string();
    let message = rendered.lines().next().unwrap_or_default();
    // Nothing else to report to if stdout is gone
    let _ = print_usage_failure(out, message);
    1
}

/// Print `e` the way the process reports it and return the exit code.
///
/// Configuration errors go to `out` followed by the usage text; everything else
/// goes to `err` tagged with its kind.
fn report_failure<O: Write, E: Write>(e: &BootstrapError, out: &mut O, err: &mut E) -> u8
{
    if e.is_configuration() {
        let _ = print_usage_failure(out, &e.to_string());
        return e.exit_code();
    }

    error!(kind = e.kind(), error = %e, "run failed");
    let _ = writeln!(err, "Error [{}]: {e}", e.kind());
    e.exit_code()
}

#[cfg(test)]
mod tests
{
    use std::net::TcpListener;
    use std::time::Duration;

    use tether_core::error::ConnectionError;
    use tether_core::resolver::resolve;
    use tether_core::types::AttachmentDescriptor;
    use tether_core::SessionConnector;

    use super::*;
    use crate::cli::USAGE;

    struct Reported
    {
        code: u8,
        out: String,
        err: String,
    }

    fn report(e: &BootstrapError) -> Reported
    {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = report_failure(e, &mut out, &mut err);
        Reported {
            code,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    fn resolve_args(args: &[&str]) -> BootstrapError
    {
        let cli = Cli::parse_args(args.iter().copied()).unwrap();
        resolve(&cli.launch_request().attachment).unwrap_err().into()
    }

    #[test]
    fn test_malformed_socket_prints_usage()
    {
        let reported = report(&resolve_args(&["tether", "-socket", "a:b:9009"]));

        assert_eq!(reported.code, 1);
        assert!(reported.out.lines().next().unwrap().contains("a:b:9009"));
        assert!(reported.out.contains(USAGE));
        assert!(reported.err.is_empty());
    }

    #[test]
    fn test_no_arguments_prints_usage()
    {
        let reported = report(&resolve_args(&["tether"]));

        assert_eq!(reported.code, 1);
        assert!(reported.out.contains(USAGE));
        assert!(reported.err.is_empty());
    }

    #[test]
    fn test_connection_error_goes_to_stderr()
    {
        // Bind then drop to get a port with nothing listening
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let mut connector = JdwpConnector::new(Duration::from_millis(500));
        let source = connector.connect_remote("127.0.0.1", port).unwrap_err();
        assert!(matches!(source, ConnectionError::Io { .. }));
        let e = BootstrapError::Connection {
            target: AttachmentDescriptor::Remote {
                host: "127.0.0.1".to_string(),
                port,
            },
            source,
        };

        let reported = report(&e);

        assert_eq!(reported.code, 2);
        assert!(reported.out.is_empty());
        assert!(reported.err.starts_with("Error [connection]:"), "{}", reported.err);
        assert!(reported.err.contains(&format!("socket 127.0.0.1:{port}")));
    }

    #[test]
    fn test_unknown_flag_prints_usage()
    {
        let e = Cli::parse_args(["tether", "-bogus"]).unwrap_err();
        let mut out = Vec::new();

        assert_eq!(report_parse_error(&e, &mut out), 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("-bogus"));
        assert!(text.contains(USAGE));
    }
}
