//! Devcontainer CLI boundary: lifecycle, remote exec transport and
//! capability probing.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use which::which;

use crate::util::{shell_escape, shell_join};

/// Environment variables injected into a single remote invocation via
/// `--remote-env`; not persisted across steps.
pub type RemoteEnv = BTreeMap<String, String>;

/// Outcome of one remote command: exit code plus whatever output was
/// captured before exit. Transport-level failures (container unreachable,
/// spawn error) fold into a non-zero code; callers cannot structurally tell
/// them apart from a failing remote command.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub code: i32,
    pub output: String,
}

impl StepResult {
    pub fn ok() -> Self {
        StepResult {
            code: 0,
            output: String::new(),
        }
    }

    pub fn failed(code: i32, output: impl Into<String>) -> Self {
        StepResult {
            code,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Seam between the bootstrap pipeline and the `devcontainer` CLI.
///
/// Every call blocks until the remote process tree exits; no two remote
/// commands run concurrently within one invocation.
pub trait ContainerRuntime {
    /// Start (or, with `purge`, forcibly recreate) the container backing
    /// `workspace`.
    fn up(&self, workspace: &Path, purge: bool) -> StepResult;

    /// Run `command` through `bash -c` inside the container, streaming
    /// output. `remote_env` is visible only to this invocation.
    fn exec(&self, workspace: &Path, command: &str, remote_env: Option<&RemoteEnv>) -> StepResult;

    /// True when `name` resolves on the container's PATH.
    ///
    /// A transport failure is indistinguishable from "not installed" and
    /// reads as `false`; the probe is never retried.
    fn probe(&self, workspace: &Path, name: &str) -> bool;
}

/// The real `devcontainer` CLI, resolved from PATH.
pub struct DevcontainerCli {
    binary: PathBuf,
    verbose: bool,
}

/// Locate the `devcontainer` binary on PATH.
pub fn devcontainer_cli_path() -> io::Result<PathBuf> {
    if let Ok(p) = which("devcontainer") {
        return Ok(p);
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "the devcontainer CLI is required but was not found in PATH",
    ))
}

impl DevcontainerCli {
    pub fn locate(verbose: bool) -> io::Result<Self> {
        Ok(DevcontainerCli {
            binary: devcontainer_cli_path()?,
            verbose,
        })
    }

    /// Attach an interactive shell to the container.
    pub fn shell(&self, workspace: &Path) -> StepResult {
        let args = shell_args(workspace);
        self.run(&args, false)
    }

    fn run(&self, args: &[String], quiet: bool) -> StepResult {
        if self.verbose {
            eprintln!("dni: devcontainer: {}", shell_join(args.iter()));
        }
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        if quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        match cmd.status() {
            Ok(status) => StepResult {
                code: status.code().unwrap_or(1),
                output: String::new(),
            },
            Err(e) => StepResult::failed(127, e.to_string()),
        }
    }
}

impl ContainerRuntime for DevcontainerCli {
    fn up(&self, workspace: &Path, purge: bool) -> StepResult {
        self.run(&up_args(workspace, purge), false)
    }

    fn exec(&self, workspace: &Path, command: &str, remote_env: Option<&RemoteEnv>) -> StepResult {
        self.run(&exec_args(workspace, command, remote_env), false)
    }

    fn probe(&self, workspace: &Path, name: &str) -> bool {
        let command = probe_command(name);
        self.run(&exec_args(workspace, &command, None), true).success()
    }
}

/// Argv for `devcontainer up`, after the binary itself.
pub fn up_args(workspace: &Path, purge: bool) -> Vec<String> {
    let mut args = vec![
        "up".to_string(),
        "--workspace-folder".to_string(),
        workspace.display().to_string(),
    ];
    if purge {
        args.push("--remove-existing-container".to_string());
    }
    args
}

/// Argv for `devcontainer exec`, running `command` through `bash -c`.
pub fn exec_args(workspace: &Path, command: &str, remote_env: Option<&RemoteEnv>) -> Vec<String> {
    let mut args = vec![
        "exec".to_string(),
        "--workspace-folder".to_string(),
        workspace.display().to_string(),
    ];
    if let Some(env) = remote_env {
        for (key, value) in env {
            args.push("--remote-env".to_string());
            args.push(format!("{key}={value}"));
        }
    }
    args.push("bash".to_string());
    args.push("-c".to_string());
    args.push(command.to_string());
    args
}

/// Argv for an interactive shell attachment.
pub fn shell_args(workspace: &Path) -> Vec<String> {
    vec![
        "exec".to_string(),
        "--workspace-folder".to_string(),
        workspace.display().to_string(),
        "zsh".to_string(),
        "-i".to_string(),
    ]
}

/// Remote command used by the capability probe; exit status only, output
/// discarded.
pub fn probe_command(name: &str) -> String {
    format!("command -v {}", shell_escape(name))
}
