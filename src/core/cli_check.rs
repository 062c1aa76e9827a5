//! Executable resolution and the availability probe.
//!
//! Resolution answers "how do we start this command?": a bare name is looked
//! up on `PATH` first (`which`/`where`), then through the user's login shell
//! (`$SHELL -l -i -c "command -v <cmd>"`) so aliases and shell functions are
//! found as well. Command names are validated against `^[a-zA-Z0-9_-]{1,64}$`
//! before they ever reach a shell.
//!
//! The [`AvailabilityProbe`] answers "does it respond?" by running a version
//! query under a short deadline. Its first outcome is cached on the probe
//! instance and reused until [`AvailabilityProbe::reset`] is called.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::RwLock;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::error::{BridgeError, ProbeFailure};
use crate::core::executor::{Invocation, ProcessRunner};

/// Deadline for the version query issued by the probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Argument the probe passes to the executable.
pub const VERSION_FLAG: &str = "--version";

/// Result of resolving a CLI command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResolution {
    /// Found as an executable file on `PATH`.
    PathExecutable(PathBuf),
    /// Only known to the login shell (alias, function or builtin).
    ShellCommand(String),
    /// Not found by any method.
    NotFound,
}

impl CommandResolution {
    /// Returns `true` if the command was found by any method.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

/// Validates that a command name is safe for shell invocation.
///
/// Only ASCII alphanumerics, `-` and `_` are allowed, up to 64 characters.
///
/// ```
/// use taskbridge::core::cli_check::is_safe_command_name;
///
/// assert!(is_safe_command_name("claude"));
/// assert!(!is_safe_command_name("cmd; rm -rf"));
/// assert!(!is_safe_command_name(""));
/// ```
#[must_use]
pub fn is_safe_command_name(command: &str) -> bool {
    !command.is_empty()
        && command.len() <= 64
        && command
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Resolves a command name through `PATH`, then the login shell.
#[must_use]
pub fn resolve_cli_command(command: &str) -> CommandResolution {
    if !is_safe_command_name(command) {
        return CommandResolution::NotFound;
    }

    if let Some(path) = find_on_path(command) {
        return CommandResolution::PathExecutable(path);
    }

    #[cfg(unix)]
    if let Some(resolution) = resolve_via_shell(command) {
        return resolution;
    }

    CommandResolution::NotFound
}

fn find_on_path(command: &str) -> Option<PathBuf> {
    #[cfg(windows)]
    let lookup = "where";
    #[cfg(not(windows))]
    let lookup = "which";

    let output = Command::new(lookup)
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    // `where` may list several matches; the first one wins.
    let text = String::from_utf8_lossy(&output.stdout);
    let path = PathBuf::from(text.lines().next()?.trim());
    is_executable(&path).then_some(path)
}

#[cfg(unix)]
fn resolve_via_shell(command: &str) -> Option<CommandResolution> {
    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
    let output = Command::new(&shell)
        .args(["-l", "-i", "-c", &format!("command -v {command}")])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(classify_command_v_output(text))
}

/// Classifies the output of `command -v`.
///
/// An absolute path to an executable file is a direct executable; anything
/// else (alias definitions, function names, builtins) needs the shell.
#[cfg(unix)]
fn classify_command_v_output(output: &str) -> CommandResolution {
    let path = Path::new(output);
    if path.is_absolute() && is_executable(path) {
        CommandResolution::PathExecutable(path.to_path_buf())
    } else {
        CommandResolution::ShellCommand(output.to_string())
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(windows)]
fn is_executable(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                matches!(
                    ext.to_ascii_lowercase().as_str(),
                    "exe" | "cmd" | "bat" | "com"
                )
            })
}

/// Confirms the executable is installed and responsive.
///
/// The first outcome, success or failure, is cached for the lifetime of the
/// probe. Concurrent first calls may both run the version query; either result
/// is equally valid.
#[derive(Debug)]
pub struct AvailabilityProbe {
    timeout: Duration,
    outcome: RwLock<Option<Result<(), ProbeFailure>>>,
}

impl Default for AvailabilityProbe {
    fn default() -> Self {
        Self::new(PROBE_TIMEOUT)
    }
}

impl AvailabilityProbe {
    /// Creates a probe whose version query must answer within `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            outcome: RwLock::new(None),
        }
    }

    /// Returns the cached answer, if a probe has already run.
    #[must_use]
    pub fn cached(&self) -> Option<bool> {
        self.cached_outcome().map(|outcome| outcome.is_ok())
    }

    /// Forgets the cached answer so the next check probes again.
    pub fn reset(&self) {
        match self.outcome.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    /// Checks that `runner`'s executable answers a version query.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Unavailable`] with the cause when the probe
    /// (now or previously) failed.
    pub async fn check(&self, runner: &dyn ProcessRunner) -> Result<(), BridgeError> {
        let outcome = if let Some(outcome) = self.cached_outcome() {
            outcome
        } else {
            let outcome = self.run_version_query(runner).await;
            self.store(outcome.clone());
            outcome
        };

        outcome.map_err(|cause| BridgeError::Unavailable {
            executable: runner.executable(),
            cause,
        })
    }

    async fn run_version_query(&self, runner: &dyn ProcessRunner) -> Result<(), ProbeFailure> {
        let invocation = Invocation::new([VERSION_FLAG]).with_deadline(self.timeout);
        let outcome = match runner.execute(&invocation).await {
            Ok(version) => {
                info!(executable = %runner.executable(), version = version.trim(), "executable available");
                return Ok(());
            }
            Err(BridgeError::Spawn { source, .. }) => match source.kind() {
                std::io::ErrorKind::NotFound => ProbeFailure::NotFound,
                std::io::ErrorKind::PermissionDenied => ProbeFailure::PermissionDenied,
                _ => ProbeFailure::Other(source.to_string()),
            },
            Err(BridgeError::Timeout { .. }) => ProbeFailure::TimedOut,
            Err(BridgeError::Process { code, .. }) => ProbeFailure::ExitedWith(code),
            Err(other) => ProbeFailure::Other(other.to_string()),
        };
        warn!(executable = %runner.executable(), cause = %outcome, "executable unavailable");
        Err(outcome)
    }

    fn cached_outcome(&self) -> Option<Result<(), ProbeFailure>> {
        match self.outcome.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store(&self, outcome: Result<(), ProbeFailure>) {
        debug!(available = outcome.is_ok(), "caching availability");
        match self.outcome.write() {
            Ok(mut guard) => *guard = Some(outcome),
            Err(poisoned) => *poisoned.into_inner() = Some(outcome),
        }
    }
}
