//! Subprocess execution for the AI CLI.
//!
//! A call starts the executable with all three standard streams piped, writes
//! the input payload and closes stdin, then waits for exit while draining
//! stdout and stderr concurrently. Draining while waiting matters: a child
//! that fills a pipe buffer blocks until someone reads it.
//!
//! Exactly one outcome is produced per call: the collected stdout text,
//! [`BridgeError::Timeout`], [`BridgeError::Process`] or [`BridgeError::Spawn`].
//! Nothing started by a call outlives it. On timeout the process group is
//! killed and reaped and the reader tasks are aborted; the child is also
//! spawned with `kill_on_drop` so a cancelled call cannot leak it.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::cli_check::{CommandResolution, resolve_cli_command};
use crate::core::error::BridgeError;

/// One request to run the executable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Arguments passed to the executable, in order.
    pub args: Vec<String>,
    /// Text written to the process's stdin; may be empty.
    pub input: String,
    /// Maximum time the process may run. `None` waits indefinitely.
    pub deadline: Option<Duration>,
}

impl Invocation {
    /// Creates an invocation with the given arguments, no input and no deadline.
    #[must_use]
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            input: String::new(),
            deadline: None,
        }
    }

    /// Sets the stdin payload.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    /// Sets the deadline. A zero duration means no deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = (!deadline.is_zero()).then_some(deadline);
        self
    }

    /// Sets the deadline in milliseconds. Non-positive values mean no deadline.
    #[must_use]
    pub fn with_deadline_ms(mut self, deadline_ms: i64) -> Self {
        self.deadline = deadline_from_millis(deadline_ms);
        self
    }
}

/// Converts a millisecond setting into a deadline; non-positive means unbounded.
#[must_use]
pub fn deadline_from_millis(deadline_ms: i64) -> Option<Duration> {
    u64::try_from(deadline_ms)
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

/// Runs one [`Invocation`] to completion.
///
/// This is the seam between the bridge and the operating system. The bridge
/// only ever talks to a `ProcessRunner`, so tests can substitute a scripted
/// runner and never spawn anything.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs the executable and returns its stdout text on a zero exit status.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Spawn`], [`BridgeError::Timeout`] or
    /// [`BridgeError::Process`] as described in the module documentation.
    async fn execute(&self, invocation: &Invocation) -> Result<String, BridgeError>;

    /// Returns a printable name of the executable for diagnostics.
    fn executable(&self) -> String;
}

/// How the executable is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// Run a program directly.
    Direct {
        program: PathBuf,
        /// Arguments placed before every invocation's own arguments.
        prefix: Vec<String>,
    },
    /// Run a shell alias or function through the user's login shell.
    Shell {
        shell: PathBuf,
        command: String,
        prefix: Vec<String>,
    },
}

impl Launcher {
    /// Runs `program` directly with no prefix arguments.
    #[must_use]
    pub fn direct(program: impl Into<PathBuf>) -> Self {
        Self::Direct {
            program: program.into(),
            prefix: Vec::new(),
        }
    }

    /// Resolves an executable setting into a launcher.
    ///
    /// Values containing a path separator are used as-is. Bare names are
    /// looked up on `PATH` first and then through the login shell, so aliases
    /// and shell functions work too. A name that cannot be resolved is kept
    /// unchanged; starting it later reports the failure.
    #[must_use]
    pub fn resolve(executable: &str, prefix: Vec<String>) -> Self {
        if executable.contains('/') || executable.contains('\\') {
            return Self::Direct {
                program: PathBuf::from(executable),
                prefix,
            };
        }

        match resolve_cli_command(executable) {
            CommandResolution::PathExecutable(program) => Self::Direct { program, prefix },
            CommandResolution::ShellCommand(_) => Self::Shell {
                shell: login_shell(),
                command: executable.to_string(),
                prefix,
            },
            CommandResolution::NotFound => Self::Direct {
                program: PathBuf::from(executable),
                prefix,
            },
        }
    }

    /// Returns the printable name used in diagnostics.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Direct { program, .. } => program.display().to_string(),
            Self::Shell { command, .. } => command.clone(),
        }
    }

    fn command(&self, args: &[String]) -> Command {
        match self {
            Self::Direct { program, prefix } => {
                let mut cmd = Command::new(program);
                cmd.args(prefix).args(args);
                cmd
            }
            Self::Shell {
                shell,
                command,
                prefix,
            } => {
                let mut line = command.clone();
                for arg in prefix.iter().chain(args) {
                    line.push(' ');
                    line.push_str(&shell_escape_arg(arg));
                }
                let mut cmd = Command::new(shell);
                cmd.args(["-l", "-i", "-c", &line]);
                cmd
            }
        }
    }
}

fn login_shell() -> PathBuf {
    std::env::var_os("SHELL").map_or_else(|| PathBuf::from("/bin/sh"), PathBuf::from)
}

/// Quotes an argument for inclusion in a shell command line.
fn shell_escape_arg(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '='))
    {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', "'\\''"))
}

/// Executes invocations by spawning a real process.
#[derive(Debug, Clone)]
pub struct CliProcessExecutor {
    launcher: Launcher,
}

impl CliProcessExecutor {
    /// Creates an executor for the given launcher.
    #[must_use]
    pub const fn new(launcher: Launcher) -> Self {
        Self { launcher }
    }

    /// Returns the launcher this executor starts.
    #[must_use]
    pub const fn launcher(&self) -> &Launcher {
        &self.launcher
    }
}

#[async_trait]
impl ProcessRunner for CliProcessExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<String, BridgeError> {
        run_process(&self.launcher, invocation).await
    }

    fn executable(&self) -> String {
        self.launcher.display_name()
    }
}

/// Captured result of a process that exited on its own.
struct Exited {
    status: io::Result<std::process::ExitStatus>,
    input: io::Result<()>,
    stdout: io::Result<Vec<u8>>,
    stderr: io::Result<Vec<u8>>,
}

async fn run_process(launcher: &Launcher, invocation: &Invocation) -> Result<String, BridgeError> {
    let executable = launcher.display_name();
    let started = Instant::now();

    let mut cmd = launcher.command(&invocation.args);
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // New session: the child leads its own process group, so a timeout can take
    // down anything it forked, and it has no controlling terminal, so an
    // interactive login shell cannot be stopped by SIGTTIN.
    #[cfg(unix)]
    // SAFETY: the closure runs between fork and exec and only makes
    // async-signal-safe syscalls.
    unsafe {
        cmd.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            // Children die with us even if we are SIGKILLed.
            #[cfg(target_os = "linux")]
            if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL) == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let mut child = cmd.spawn().map_err(|source| BridgeError::Spawn {
        executable: executable.clone(),
        source,
    })?;

    debug!(
        executable = %executable,
        pid = child.id(),
        args = invocation.args.len(),
        input_bytes = invocation.input.len(),
        "spawned process"
    );

    let writer = tokio::spawn(write_input(
        child.stdin.take(),
        invocation.input.clone().into_bytes(),
    ));
    let stdout_reader = tokio::spawn(read_stream(child.stdout.take()));
    let stderr_reader = tokio::spawn(read_stream(child.stderr.take()));
    let helpers = [
        writer.abort_handle(),
        stdout_reader.abort_handle(),
        stderr_reader.abort_handle(),
    ];

    let collect = async {
        let status = child.wait().await;
        Exited {
            status,
            input: flatten(writer).await,
            stdout: flatten(stdout_reader).await,
            stderr: flatten(stderr_reader).await,
        }
    };

    let exited = match invocation.deadline {
        Some(limit) => {
            if let Ok(exited) = tokio::time::timeout(limit, collect).await {
                exited
            } else {
                terminate(&mut child).await;
                for helper in &helpers {
                    helper.abort();
                }
                warn!(
                    executable = %executable,
                    deadline_ms = limit.as_millis(),
                    "process exceeded its deadline and was killed"
                );
                return Err(BridgeError::Timeout {
                    executable,
                    deadline_ms: limit.as_millis(),
                });
            }
        }
        None => collect.await,
    };

    finish(executable, exited, started)
}

fn finish(executable: String, exited: Exited, started: Instant) -> Result<String, BridgeError> {
    let stderr_text = match exited.stderr {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => format!("<failed to read stderr: {e}>"),
    };

    let status = exited.status.map_err(|e| BridgeError::Process {
        executable: executable.clone(),
        code: None,
        stderr: format!("failed to wait for process: {e}"),
    })?;

    debug!(
        executable = %executable,
        exit_code = status.code(),
        elapsed_ms = started.elapsed().as_millis(),
        "process exited"
    );

    if !status.success() {
        return Err(BridgeError::Process {
            executable,
            code: status.code(),
            stderr: stderr_text,
        });
    }

    if let Err(e) = exited.input
        && e.kind() != io::ErrorKind::BrokenPipe
    {
        return Err(BridgeError::Process {
            executable,
            code: status.code(),
            stderr: format!("failed to write input: {e}"),
        });
    }

    match exited.stdout {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => Err(BridgeError::Process {
            executable,
            code: status.code(),
            stderr: format!("failed to read stdout: {e}"),
        }),
    }
}

/// Kills the child's process group and reaps the child.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pgid) = child.id().and_then(|id| libc::pid_t::try_from(id).ok()) {
        // SAFETY: plain signal delivery to the group created at spawn.
        unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }

    if let Err(e) = child.kill().await {
        debug!(error = %e, "kill after deadline failed; process already gone");
    }
}

async fn write_input(stdin: Option<ChildStdin>, payload: Vec<u8>) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    if !payload.is_empty() {
        stdin.write_all(&payload).await?;
        stdin.flush().await?;
    }
    // Dropping closes the pipe so the tool sees EOF.
    drop(stdin);
    Ok(())
}

async fn read_stream<R>(stream: Option<R>) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn flatten<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle.await.unwrap_or_else(|e| Err(io::Error::other(e)))
}
