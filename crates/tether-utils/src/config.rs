//! # Environment Configuration
//!
//! Runtime settings read from `TETHER_*` environment variables.
//!
//! Unknown or malformed values never fail startup: each setting falls back to
//! its default, the same way an unrecognised `TETHER_LOG_FORMAT` falls back to
//! the pretty format.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `TETHER_LOG_FORMAT` | `pretty` or `json` console sink | `pretty` |
//! | `TETHER_LOG_FILE` | extra file sink for diagnostics | none |
//! | `TETHER_CONNECT_TIMEOUT_MS` | connect and handshake timeout | `5000` |
//! | `TETHER_SCRIPT_ENGINE` | program that runs scripts against a session | none |
//! | `TETHER_PREFLIGHT_HINT` | replacement remediation text for the preflight check | none |

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::logging::LogFormat;

/// Environment variable selecting the console log format.
pub const LOG_FORMAT_VAR: &str = "TETHER_LOG_FORMAT";
/// Environment variable naming an additional log file.
pub const LOG_FILE_VAR: &str = "TETHER_LOG_FILE";
/// Environment variable holding the connect timeout in milliseconds.
pub const CONNECT_TIMEOUT_VAR: &str = "TETHER_CONNECT_TIMEOUT_MS";
/// Environment variable naming the script engine program.
pub const SCRIPT_ENGINE_VAR: &str = "TETHER_SCRIPT_ENGINE";
/// Environment variable overriding the preflight remediation text.
pub const PREFLIGHT_HINT_VAR: &str = "TETHER_PREFLIGHT_HINT";

/// Default socket connect and handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Settings shared by every stage of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings
{
    /// Console sink format used when diagnostics are enabled
    pub log_format: LogFormat,
    /// Optional file sink added next to the console sink
    pub log_file: Option<PathBuf>,
    /// Upper bound for establishing a session socket
    pub connect_timeout: Duration,
    /// Program that interprets scripts against an established session
    pub script_engine: Option<PathBuf>,
    /// Replacement for the built-in preflight remediation message
    pub preflight_hint: Option<String>,
}

impl Default for Settings
{
    fn default() -> Self
    {
        Self {
            log_format: LogFormat::Pretty,
            log_file: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            script_engine: None,
            preflight_hint: None,
        }
    }
}

impl Settings
{
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings from an explicit variable map.
    ///
    /// Used by tests and by callers that want to pin configuration without
    /// touching the process environment.
    #[must_use]
    pub fn from_map(vars: &HashMap<String, String>) -> Self
    {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_format = lookup(LOG_FORMAT_VAR)
            .and_then(|s| LogFormat::from_str(&s).ok())
            .unwrap_or(defaults.log_format);

        let connect_timeout = lookup(CONNECT_TIMEOUT_VAR)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map_or(defaults.connect_timeout, Duration::from_millis);

        Self {
            log_format,
            log_file: non_empty(lookup(LOG_FILE_VAR)).map(PathBuf::from),
            connect_timeout,
            script_engine: non_empty(lookup(SCRIPT_ENGINE_VAR)).map(PathBuf::from),
            preflight_hint: non_empty(lookup(PREFLIGHT_HINT_VAR)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String>
{
    value.filter(|s| !s.trim().is_empty())
}
