//! Startup requirement validation for procio.
//!
//! Reading another process's `io` record requires root or
//! `CAP_SYS_PTRACE`; an unprivileged run still works but only sees the
//! caller's own processes, so most problems here are warnings rather than
//! errors.

use nix::unistd::geteuid;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("proc root {root} is not accessible: {reason}")]
    ProcRootInaccessible { root: String, reason: String },
}

/// Validate runtime requirements before the first pass.
pub fn validate_requirements(proc_root: &Path) -> Result<(), ValidationError> {
    check_user_privileges();
    check_proc_access(proc_root)?;
    check_io_accounting(proc_root);
    Ok(())
}

/// Check if running with sufficient privileges
fn check_user_privileges() {
    if !geteuid().is_root() {
        warn!("not running as root; I/O counters of other users' processes will be unreadable");
    } else {
        debug!("running as root (uid=0)");
    }
}

/// An unopenable enumeration root can never produce a pass; fail up front.
fn check_proc_access(proc_root: &Path) -> Result<(), ValidationError> {
    match fs::read_dir(proc_root) {
        Ok(_) => Ok(()),
        Err(e) => Err(ValidationError::ProcRootInaccessible {
            root: proc_root.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

/// The `io` record only exists on kernels built with task I/O accounting.
fn check_io_accounting(proc_root: &Path) {
    let own_io = proc_root
        .join(std::process::id().to_string())
        .join("io");
    match fs::metadata(&own_io) {
        Ok(_) => debug!("I/O accounting records available"),
        Err(e) => warn!(
            "cannot stat {}: {} - the kernel may lack task I/O accounting",
            own_io.display(),
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_proc_root_fails_validation() {
        let dir = tempdir().expect("Failed to create temp dir");
        let gone = dir.path().join("absent");
        assert!(validate_requirements(&gone).is_err());
    }

    #[test]
    fn test_readable_root_passes_despite_missing_io_record() {
        let dir = tempdir().expect("Failed to create temp dir");
        // No <pid>/io for us under the fake root; that is only a warning.
        assert!(validate_requirements(dir.path()).is_ok());
    }
}
