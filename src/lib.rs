//! dni — Devcontainer Nix Injector.
//!
//! Provisions a devcontainer by driving the `devcontainer` CLI through a
//! fail-fast bootstrap pipeline (container start, package-manager check,
//! idempotent tool installs) and then applying a flake-based home-manager
//! configuration inside it.

pub mod bootstrap;
pub mod cli;
pub mod devcontainer;
pub mod errors;
pub mod source;
pub mod util;

pub use bootstrap::{apply_command, run_setup, SetupOptions, Stage, NIX_CONFIG_FLAKES};
pub use devcontainer::{
    devcontainer_cli_path, exec_args, probe_command, shell_args, up_args, ContainerRuntime,
    DevcontainerCli, RemoteEnv, StepResult,
};
pub use errors::{exit_code_for_io_error, exit_code_for_setup_error, SetupError};
pub use source::ConfigSource;
pub use util::{shell_escape, shell_join};
