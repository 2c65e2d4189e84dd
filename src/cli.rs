use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "dni",
    version,
    about = "Devcontainer Nix Injector: provision devcontainers with Nix, home-manager and flake-based user configurations.",
    after_long_help = "Examples:\n  dni setup --github octocat/dotfiles --config work\n  dni setup ~/src/proj --repo https://git.example.com/me/dotfiles --config home --purge\n  dni shell ~/src/proj\n"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Set up a devcontainer with Nix, home-manager and a personal configuration
    Setup {
        /// Workspace directory containing the devcontainer
        #[arg(default_value = ".")]
        workspace: PathBuf,

        /// URL of the repository holding the configuration flake
        #[arg(long, short = 'r')]
        repo: Option<String>,

        /// GitHub repo holding the configuration flake, as owner/repo
        #[arg(long, short = 'g')]
        github: Option<String>,

        /// Name of the configuration to apply
        #[arg(long)]
        config: String,

        /// Discard any existing container before starting
        #[arg(long)]
        purge: bool,

        /// Print each devcontainer invocation before running it
        #[arg(long)]
        verbose: bool,
    },

    /// Open an interactive shell in the devcontainer
    Shell {
        /// Workspace directory containing the devcontainer
        #[arg(default_value = ".")]
        workspace: PathBuf,
    },

    /// Run diagnostics to check environment and configuration
    Doctor,
}
