use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::command::{CommandBuilder, CommandLine};
use crate::error::{PassError, Result};

const SHELL: &str = "/bin/sh";
const DRAIN_CHUNK: usize = 8 * 1024;

/// Lifecycle of one asynchronous invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationState {
    Running,
    Succeeded(String),
    Failed(String),
}

impl InvocationState {
    pub fn is_running(&self) -> bool {
        matches!(self, InvocationState::Running)
    }
}

/// Runs the external tool in one of three modes: a blocking run returning
/// captured stdout, an asynchronous run that drains output on background tasks,
/// and an interactive edit session limited to one at a time.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    program: PathBuf,
    env: Vec<(String, String)>,
    edit_lock: Arc<Mutex<()>>,
}

impl ProcessInvoker {
    /// Resolve `program` (a path, or a bare name searched on `PATH`) and fail
    /// if it is missing or not executable.
    pub fn new(program: &str) -> Result<Self> {
        let program = resolve_executable(program)?;
        debug!(program = %program.display(), "resolved external executable");
        Ok(Self {
            program,
            env: Vec::new(),
            edit_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Extra environment for every child process.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn builder(&self) -> CommandBuilder {
        CommandBuilder::new(&self.program)
    }

    /// Run through the shell and block until the command exits.
    ///
    /// A non-zero exit is an error carrying the tool's own diagnostic, so a
    /// missing entry never masquerades as empty output.
    pub fn run(&self, cmd: &CommandLine) -> Result<String> {
        self.run_with_input(cmd, None)
    }

    /// Like [`run`](Self::run), with `input` written to the child's stdin.
    pub fn run_with_input(&self, cmd: &CommandLine, input: Option<&str>) -> Result<String> {
        let line = cmd.shell_line()?;
        debug!(action = cmd.action(), entry = cmd.entry(), "running external tool");

        let mut command = std::process::Command::new(SHELL);
        command
            .arg("-c")
            .arg(&line)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn()?;

        // Feed stdin from its own thread so a chatty child can't deadlock us.
        let feeder = match (input, child.stdin.take()) {
            (Some(input), Some(mut stdin)) => {
                let bytes = Zeroizing::new(input.as_bytes().to_vec());
                Some(std::thread::spawn(move || stdin.write_all(&bytes)))
            }
            _ => None,
        };

        let output = child.wait_with_output()?;
        if let Some(feeder) = feeder {
            if let Ok(Err(e)) = feeder.join() {
                warn!("failed to write to {} stdin: {}", cmd.action(), e);
            }
        }

        let stdout = into_text(output.stdout);
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = into_text(output.stderr);
        debug!(action = cmd.action(), status = %output.status, "external tool failed");
        Err(PassError::external(
            cmd.action(),
            cmd.entry(),
            describe_failure(output.status, &stderr, &stdout),
        ))
    }

    /// Start `cmd` without blocking. Stdout and stderr are drained by their
    /// own tasks for the whole life of the child.
    pub fn spawn(&self, cmd: &CommandLine) -> Result<Invocation> {
        debug!(action = cmd.action(), entry = cmd.entry(), "spawning external tool");
        let mut child = tokio::process::Command::new(cmd.program())
            .args(cmd.argv())
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (tx, rx) = watch::channel(InvocationState::Running);
        let action = cmd.action().to_string();

        let task = tokio::spawn(async move {
            let out_task = tokio::spawn(drain(stdout));
            let err_task = tokio::spawn(drain(stderr));

            let status = child.wait().await;
            let output = out_task.await.unwrap_or_default();
            let errors = err_task.await.unwrap_or_default();

            let next = match status {
                Ok(status) if status.success() => InvocationState::Succeeded(output),
                Ok(status) => InvocationState::Failed(describe_failure(status, &errors, &output)),
                Err(e) => InvocationState::Failed(e.to_string()),
            };
            let succeeded = matches!(next, InvocationState::Succeeded(_));
            debug!(action = %action, succeeded, "invocation finished");
            let _ = tx.send(next);
        });

        Ok(Invocation {
            action: cmd.action().to_string(),
            entry: cmd.entry().to_string(),
            state: rx,
            task,
        })
    }

    /// Start `cmd` and hand its complete output to `callback` once it exits
    /// successfully. On failure the callback is dropped uncalled and the error
    /// comes back through the returned handle.
    pub fn run_async<F>(&self, cmd: &CommandLine, callback: F) -> Result<JoinHandle<Result<()>>>
    where
        F: FnOnce(String) + Send + 'static,
    {
        let invocation = self.spawn(cmd)?;
        Ok(tokio::spawn(async move {
            let output = invocation.finish().await?;
            callback(output);
            Ok(())
        }))
    }

    /// Hand the terminal to `pass edit`. Only one session may be live; a second
    /// request is refused before anything is spawned.
    pub fn spawn_edit(&self, cmd: &CommandLine) -> Result<EditSession> {
        let guard = self
            .edit_lock
            .clone()
            .try_lock_owned()
            .map_err(|_| PassError::EditInProgress(cmd.entry().to_string()))?;

        debug!(entry = cmd.entry(), "starting edit session");
        let mut child = tokio::process::Command::new(cmd.program())
            .args(cmd.argv())
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        let action = cmd.action().to_string();
        let entry = cmd.entry().to_string();
        let task_entry = entry.clone();
        let task = tokio::spawn(async move {
            let status = child.wait().await;
            drop(guard);
            let status = status?;
            if status.success() {
                debug!(entry = %task_entry, "edit session finished");
                Ok(())
            } else {
                Err(PassError::external(
                    &action,
                    &task_entry,
                    format!("editor session exited with {}", status),
                ))
            }
        });

        Ok(EditSession { entry, task })
    }

    #[cfg(test)]
    pub fn edit_in_progress(&self) -> bool {
        self.edit_lock.try_lock().is_err()
    }
}

/// Handle to one in-flight asynchronous invocation.
#[derive(Debug)]
pub struct Invocation {
    action: String,
    entry: String,
    state: watch::Receiver<InvocationState>,
    task: JoinHandle<()>,
}

impl Invocation {
    #[cfg(test)]
    pub fn state(&self) -> InvocationState {
        self.state.borrow().clone()
    }

    /// Wait for the child to exit and return its complete stdout.
    pub async fn finish(mut self) -> Result<String> {
        let state = match self.state.wait_for(|s| !s.is_running()).await {
            Ok(state) => state.clone(),
            Err(_) => InvocationState::Failed("invocation was aborted".to_string()),
        };
        let _ = (&mut self.task).await;

        match state {
            InvocationState::Succeeded(output) => Ok(output),
            InvocationState::Failed(message) => {
                Err(PassError::external(&self.action, &self.entry, message))
            }
            InvocationState::Running => unreachable!("wait_for returned a running state"),
        }
    }
}

/// A live `pass edit` session. Holds the single-flight slot until the editor exits.
#[derive(Debug)]
pub struct EditSession {
    entry: String,
    task: JoinHandle<Result<()>>,
}

impl EditSession {
    pub async fn wait(self) -> Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(PassError::external("edit", &self.entry, e.to_string())),
        }
    }
}

/// Read a child stream to EOF, appending chunks in arrival order.
async fn drain(handle: Option<impl AsyncRead + Unpin>) -> String {
    let Some(mut handle) = handle else {
        return String::new();
    };
    let mut output = Vec::new();
    let mut chunk = [0u8; DRAIN_CHUNK];
    loop {
        match handle.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => output.extend_from_slice(&chunk[..n]),
            Err(e) => {
                warn!("Error reading child output: {}", e);
                break;
            }
        }
    }
    into_text(output)
}

fn into_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        let bytes = Zeroizing::new(e.into_bytes());
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

fn describe_failure(status: ExitStatus, stderr: &str, stdout: &str) -> String {
    let diagnostic = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    if diagnostic.is_empty() {
        format!("exited with {}", status)
    } else {
        format!("{} ({})", diagnostic, status)
    }
}

fn resolve_executable(program: &str) -> Result<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(PassError::ExecutableNotFound(program.to_string()))
        };
    }

    std::env::var_os("PATH")
        .iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
        .ok_or_else(|| PassError::ExecutableNotFound(program.to_string()))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
