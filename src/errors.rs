//! Error taxonomy and exit-code mapping.
//!
//! The library returns typed errors; only the `main` boundary turns them into
//! process exit codes. Mapping follows the usual shell convention: 127 when
//! the `devcontainer` binary itself cannot be found, 1 for everything else.
//! Beyond that single io case no failure kind is distinguishable by exit
//! code.

use std::fmt;
use std::io;

use crate::bootstrap::Stage;

#[derive(Debug)]
pub enum SetupError {
    /// A source candidate did not match the expected URL or `owner/repo`
    /// shape.
    InvalidFormat(String),
    /// Both `--repo` and `--github` were given.
    ConflictingSources,
    /// Neither `--repo` nor `--github` was given.
    MissingSource,
    /// The container has no supported base package manager.
    UnsupportedEnvironment,
    /// A remote command for the named pipeline stage returned non-zero.
    StepFailed(Stage),
    /// The `devcontainer` CLI could not be resolved.
    Transport(io::Error),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::InvalidFormat(msg) => write!(f, "{msg}"),
            SetupError::ConflictingSources => {
                write!(f, "cannot specify both --repo and --github")
            }
            SetupError::MissingSource => {
                write!(f, "must specify either --repo or --github")
            }
            SetupError::UnsupportedEnvironment => {
                write!(f, "container has no supported package manager (apt)")
            }
            SetupError::StepFailed(stage) => {
                write!(f, "setup failed at stage: {}", stage.as_str())
            }
            SetupError::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SetupError {}

impl From<io::Error> for SetupError {
    fn from(e: io::Error) -> Self {
        SetupError::Transport(e)
    }
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Convert a SetupError to an exit code (parity with the io::Error mapping).
pub fn exit_code_for_setup_error(e: &SetupError) -> u8 {
    match e {
        SetupError::Transport(ioe) => exit_code_for_io_error(ioe),
        _ => 1,
    }
}
