//! Locating the project and the Go installation.

use std::path::{Path, PathBuf};
use std::process::Command;

use godep_error::{Error, Result};
use tracing::{debug, info};

/// The project root: `dir` when given, else the current directory.
pub fn project_root(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) if dir.is_dir() => Ok(dir.to_path_buf()),
        Some(dir) => Err(Error::invalid_argument(format!(
            "project directory {} does not exist",
            dir.display()
        ))
        .with_operation("discovery::project_root")),
        None => std::env::current_dir().map_err(|e| {
            Error::from(e)
                .with_operation("discovery::project_root")
                .with_context("reason", "cannot get current dir")
        }),
    }
}

/// GOROOT from the caller when it points at a directory, else from `go env GOROOT`.
///
/// `None` means standard library packages are recognised by name only.
pub fn discover_goroot(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(goroot) = explicit {
        if goroot.is_dir() {
            return Some(goroot);
        }
        info!(goroot = %goroot.display(), "ignoring GOROOT that is not a directory");
    }

    let output = Command::new("go").args(["env", "GOROOT"]).output().ok()?;
    if !output.status.success() {
        debug!("`go env GOROOT` failed");
        return None;
    }
    let goroot = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
    if goroot.as_os_str().is_empty() || !goroot.is_dir() {
        return None;
    }
    debug!(goroot = %goroot.display(), "using GOROOT from go tool");
    Some(goroot)
}
