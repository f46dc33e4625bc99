//! Preflight probe for local attachment.

use std::path::{Path, PathBuf};

use tether_core::preflight::ProtocolProbe;

/// Default mount point of the process filesystem.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Checks that process command lines can be read, which `-pid` attachment
/// depends on.
#[derive(Debug, Clone)]
pub struct ProcfsProbe
{
    proc_root: PathBuf,
}

impl Default for ProcfsProbe
{
    fn default() -> Self
    {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcfsProbe
{
    #[must_use]
    pub fn new(proc_root: impl Into<PathBuf>) -> Self
    {
        Self {
            proc_root: proc_root.into(),
        }
    }

    #[must_use]
    pub fn proc_root(&self) -> &Path
    {
        &self.proc_root
    }
}

impl ProtocolProbe for ProcfsProbe
{
    fn protocol(&self) -> &str
    {
        "jdwp-local-discovery"
    }

    fn is_available(&self) -> bool
    {
        self.proc_root.join("self").join("cmdline").is_file()
    }

    fn default_remediation(&self) -> String
    {
        format!(
            "Local attach needs a readable process filesystem at {}. Mount procfs, or launch the target JVM with \
             '-agentlib:jdwp=transport=dt_socket,server=y,address=PORT' and attach with -socket PORT",
            self.proc_root.display()
        )
    }
}
