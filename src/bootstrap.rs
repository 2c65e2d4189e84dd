//! The bootstrap pipeline: container start, idempotent tool installs, then
//! the home-manager switch that applies the user configuration.
//!
//! Steps run strictly in sequence and fail fast: the first non-zero result
//! stops the run and nothing already applied is rolled back. Re-running
//! against the same workspace skips every tool that is already present.

use std::path::PathBuf;

use once_cell::sync::Lazy;

use crate::devcontainer::{ContainerRuntime, RemoteEnv};
use crate::errors::SetupError;
use crate::source::ConfigSource;

/// Everything one setup run needs, built once at the CLI boundary.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Workspace directory backing the devcontainer.
    pub workspace: PathBuf,
    /// Where the configuration flake lives.
    pub source: ConfigSource,
    /// Flake output name of the home-manager configuration to apply.
    pub config: String,
    /// Discard any pre-existing container before starting.
    pub purge: bool,
    pub verbose: bool,
}

/// Pipeline stage names for failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ContainerStart,
    Install(&'static str),
    ApplyConfiguration,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Stage::ContainerStart => "container start",
            Stage::Install(tool) => tool,
            Stage::ApplyConfiguration => "apply configuration",
        }
    }
}

struct ToolInstall {
    /// Executable name the probe looks for.
    name: &'static str,
    /// Remote install command, run only when the probe misses.
    install: &'static str,
}

// Ordered: curl fetches the nix installer, nix installs home-manager.
static TOOL_INSTALLS: Lazy<Vec<ToolInstall>> = Lazy::new(|| {
    vec![
        ToolInstall {
            name: "curl",
            install: "sudo apt update && sudo apt install -y curl",
        },
        ToolInstall {
            name: "nix",
            install: "curl -L https://nixos.org/nix/install | \
                      sh -s -- --no-daemon --nix-extra-conf-file <(echo 'sandbox = false') && \
                      . $HOME/.nix-profile/etc/profile.d/nix.sh",
        },
        ToolInstall {
            name: "home-manager",
            install: "nix-channel --add https://github.com/nix-community/home-manager/archive/master.tar.gz home-manager && \
                      nix-channel --update && \
                      nix-shell '<home-manager>' -A install",
        },
    ]
});

/// Flakes are still gated behind an experimental toggle; enable it for the
/// apply invocation only.
pub const NIX_CONFIG_FLAKES: &str = "experimental-features = nix-command flakes";

/// The home-manager switch command applying `config` from `flake_ref`, with
/// automatic backup of conflicting pre-existing files.
pub fn apply_command(flake_ref: &str, config: &str) -> String {
    format!(
        "nix run --inputs-from {flake_ref} home-manager -- switch --flake {flake_ref}#{config} -b backup"
    )
}

/// Run the full bootstrap pipeline against `runtime`.
pub fn run_setup<R: ContainerRuntime>(runtime: &R, opts: &SetupOptions) -> Result<(), SetupError> {
    let ws = opts.workspace.as_path();

    println!("Starting devcontainer in {}...", ws.display());
    if !runtime.up(ws, opts.purge).success() {
        return Err(SetupError::StepFailed(Stage::ContainerStart));
    }
    println!("Devcontainer started successfully! Starting environment setup...");

    println!("Installing system dependencies...");
    if !runtime.probe(ws, "apt") {
        return Err(SetupError::UnsupportedEnvironment);
    }

    for tool in TOOL_INSTALLS.iter() {
        if runtime.probe(ws, tool.name) {
            continue;
        }
        println!("Installing {}...", tool.name);
        if !runtime.exec(ws, tool.install, None).success() {
            return Err(SetupError::StepFailed(Stage::Install(tool.name)));
        }
    }

    println!("Applying personal configuration...");
    let flake_ref = opts.source.flake_ref();
    let mut env = RemoteEnv::new();
    env.insert("NIX_CONFIG".to_string(), NIX_CONFIG_FLAKES.to_string());
    let command = apply_command(&flake_ref, &opts.config);
    if !runtime.exec(ws, &command, Some(&env)).success() {
        return Err(SetupError::StepFailed(Stage::ApplyConfiguration));
    }

    println!("Devcontainer setup completed successfully!");
    Ok(())
}
