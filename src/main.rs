use std::path::Path;
use std::process::{Command, ExitCode};

use clap::Parser;

use dni::cli::{Cli, Cmd};
use dni::{
    exit_code_for_io_error, exit_code_for_setup_error, run_setup, ConfigSource, DevcontainerCli,
    SetupOptions,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Cmd::Setup {
            workspace,
            repo,
            github,
            config,
            purge,
            verbose,
        } => {
            // Validate the source before touching the container.
            let source = match ConfigSource::select(repo.as_deref(), github.as_deref()) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("dni: {e}");
                    return ExitCode::from(exit_code_for_setup_error(&e));
                }
            };
            let runtime = match DevcontainerCli::locate(verbose) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("dni: {e}");
                    return ExitCode::from(exit_code_for_io_error(&e));
                }
            };
            let opts = SetupOptions {
                workspace,
                source,
                config,
                purge,
                verbose,
            };
            match run_setup(&runtime, &opts) {
                Ok(()) => ExitCode::from(0),
                Err(e) => {
                    eprintln!("dni: {e}");
                    ExitCode::from(exit_code_for_setup_error(&e))
                }
            }
        }

        Cmd::Shell { workspace } => run_shell(&workspace),

        Cmd::Doctor => {
            run_doctor();
            ExitCode::from(0)
        }
    }
}

fn run_shell(workspace: &Path) -> ExitCode {
    println!("Opening shell in devcontainer at {}...", workspace.display());
    let runtime = match DevcontainerCli::locate(false) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("dni: {e}");
            return ExitCode::from(exit_code_for_io_error(&e));
        }
    };
    let result = runtime.shell(workspace);
    if result.success() {
        ExitCode::from(0)
    } else {
        eprintln!("dni: failed to run shell in container");
        ExitCode::from(1)
    }
}

fn run_doctor() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("dni doctor");
    eprintln!("  version: v{version}");
    eprintln!("  host: {} / {}", std::env::consts::OS, std::env::consts::ARCH);

    match dni::devcontainer_cli_path() {
        Ok(p) => {
            eprintln!("  devcontainer: {}", p.display());
            if let Ok(out) = Command::new(&p).arg("--version").output() {
                let s = String::from_utf8_lossy(&out.stdout).trim().to_string();
                if !s.is_empty() {
                    eprintln!("  devcontainer --version: {s}");
                }
            }
        }
        Err(e) => {
            eprintln!("  devcontainer: not found ({e})");
        }
    }

    eprintln!("doctor: completed diagnostics.");
}
