//! Runtime binary resolution.
//!
//! # Responsibilities
//! - Resolve the `java` binary: `-java-home` override, `JAVA_HOME`, `PATH`
//! - Probe the runtime version for memory-flag selection
//!
//! # Design Decisions
//! - An explicit `-java-home` that does not hold a runtime is fatal;
//!   a stale `JAVA_HOME` merely falls through to the `PATH` search
//! - Environment is passed in as a plain map so resolution is testable
//!   without mutating the process environment

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::launcher::error::LauncherError;
use crate::launcher::memory::RuntimeVersion;

/// Name of the runtime executable under `<home>/bin`.
pub const RUNTIME_BINARY: &str = "java";

/// Environment variable naming the runtime installation root.
pub const ENV_RUNTIME_HOME: &str = "JAVA_HOME";

/// Environment variable holding default runtime options, whitespace-split,
/// merged at the lowest precedence.
pub const ENV_RUNTIME_OPTS: &str = "JAVA_OPTS";

/// Resolve the runtime binary to launch.
pub fn resolve(
    override_home: Option<&Path>,
    env: &HashMap<String, String>,
) -> Result<PathBuf, LauncherError> {
    if let Some(home) = override_home {
        let candidate = home.join("bin").join(RUNTIME_BINARY);
        if is_executable(&candidate) {
            return Ok(candidate);
        }
        return Err(LauncherError::TargetNotFound { path: candidate });
    }

    if let Some(home) = env.get(ENV_RUNTIME_HOME) {
        let candidate = Path::new(home).join("bin").join(RUNTIME_BINARY);
        if is_executable(&candidate) {
            return Ok(candidate);
        }
        tracing::debug!(home = %home, "JAVA_HOME does not hold a runtime, falling back to PATH");
    }

    find_in_path(RUNTIME_BINARY, env).ok_or_else(|| LauncherError::TargetNotFound {
        path: PathBuf::from(RUNTIME_BINARY),
    })
}

/// Probe the runtime version by running `<java> -version`.
///
/// Returns `None` when the probe fails or the banner is unrecognized;
/// callers fall back to the legacy memory flags in that case.
pub fn probe_version(java: &Path) -> Option<RuntimeVersion> {
    let output = Command::new(java).arg("-version").output().ok()?;
    // The banner historically goes to stderr.
    RuntimeVersion::from_banner(&String::from_utf8_lossy(&output.stderr))
        .or_else(|| RuntimeVersion::from_banner(&String::from_utf8_lossy(&output.stdout)))
}

fn find_in_path(binary: &str, env: &HashMap<String, String>) -> Option<PathBuf> {
    let path_var = env.get("PATH")?;
    std::env::split_paths(path_var)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
