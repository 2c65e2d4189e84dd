use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use dni::{
    run_setup, ConfigSource, ContainerRuntime, RemoteEnv, SetupError, SetupOptions, Stage,
    StepResult,
};

/// Scripted container runtime recording every call the pipeline makes.
#[derive(Default)]
struct MockRuntime {
    up_fails: bool,
    present: HashSet<&'static str>,
    /// First exec whose command contains this substring returns non-zero.
    fail_exec_containing: Option<&'static str>,
    up_calls: RefCell<Vec<bool>>,
    probes: RefCell<Vec<String>>,
    execs: RefCell<Vec<(String, Option<RemoteEnv>)>>,
}

impl MockRuntime {
    fn with_present(present: &[&'static str]) -> Self {
        MockRuntime {
            present: present.iter().copied().collect(),
            ..MockRuntime::default()
        }
    }

    fn exec_commands(&self) -> Vec<String> {
        self.execs.borrow().iter().map(|(c, _)| c.clone()).collect()
    }
}

impl ContainerRuntime for MockRuntime {
    fn up(&self, _workspace: &Path, purge: bool) -> StepResult {
        self.up_calls.borrow_mut().push(purge);
        if self.up_fails {
            StepResult::failed(1, "up failed")
        } else {
            StepResult::ok()
        }
    }

    fn exec(&self, _workspace: &Path, command: &str, remote_env: Option<&RemoteEnv>) -> StepResult {
        self.execs
            .borrow_mut()
            .push((command.to_string(), remote_env.cloned()));
        match self.fail_exec_containing {
            Some(needle) if command.contains(needle) => StepResult::failed(1, "exec failed"),
            _ => StepResult::ok(),
        }
    }

    fn probe(&self, _workspace: &Path, name: &str) -> bool {
        self.probes.borrow_mut().push(name.to_string());
        self.present.contains(name)
    }
}

fn opts() -> SetupOptions {
    SetupOptions {
        workspace: PathBuf::from("/work/proj"),
        source: ConfigSource::select(None, Some("octocat/dotfiles")).unwrap(),
        config: "work".to_string(),
        purge: false,
        verbose: false,
    }
}

#[test]
fn everything_present_issues_only_the_apply_command() {
    let rt = MockRuntime::with_present(&["apt", "curl", "nix", "home-manager"]);
    run_setup(&rt, &opts()).expect("setup should succeed");

    let cmds = rt.exec_commands();
    assert_eq!(cmds.len(), 1, "only the apply should run: {cmds:?}");
    assert_eq!(
        cmds[0],
        "nix run --inputs-from github:octocat/dotfiles home-manager -- \
         switch --flake github:octocat/dotfiles#work -b backup"
    );

    // The experimental-features toggle is scoped to the apply invocation.
    let env = rt.execs.borrow()[0].1.clone().expect("apply carries remote env");
    assert_eq!(
        env.get("NIX_CONFIG").map(String::as_str),
        Some("experimental-features = nix-command flakes")
    );
}

#[test]
fn missing_package_manager_stops_before_any_install() {
    let rt = MockRuntime::with_present(&[]);
    let err = run_setup(&rt, &opts()).unwrap_err();
    assert!(matches!(err, SetupError::UnsupportedEnvironment), "got: {err}");
    assert!(
        rt.exec_commands().is_empty(),
        "no remote command may run without a package manager"
    );
    assert_eq!(rt.probes.borrow().as_slice(), ["apt"]);
}

#[test]
fn all_absent_and_failing_apply_issues_three_installs_plus_apply() {
    let mut rt = MockRuntime::with_present(&["apt"]);
    rt.fail_exec_containing = Some("switch --flake");
    let err = run_setup(&rt, &opts()).unwrap_err();
    assert!(
        matches!(err, SetupError::StepFailed(Stage::ApplyConfiguration)),
        "got: {err}"
    );

    let cmds = rt.exec_commands();
    assert_eq!(cmds.len(), 4, "3 installs + 1 apply expected: {cmds:?}");
    assert!(cmds[0].contains("apt install -y curl"));
    assert!(cmds[1].contains("nixos.org/nix/install"));
    assert!(cmds[2].contains("home-manager/archive/master.tar.gz"));
    assert!(cmds[3].contains("switch --flake"));

    // Install commands carry no remote env.
    for (cmd, env) in rt.execs.borrow().iter().take(3) {
        assert!(env.is_none(), "install should not set remote env: {cmd}");
    }
}

#[test]
fn failed_install_stops_the_pipeline() {
    let mut rt = MockRuntime::with_present(&["apt"]);
    rt.fail_exec_containing = Some("nixos.org/nix/install");
    let err = run_setup(&rt, &opts()).unwrap_err();
    assert!(
        matches!(err, SetupError::StepFailed(Stage::Install("nix"))),
        "got: {err}"
    );

    let cmds = rt.exec_commands();
    assert_eq!(cmds.len(), 2, "curl install then the failing nix install: {cmds:?}");
    assert!(
        !cmds.iter().any(|c| c.contains("home-manager/archive")),
        "later installs must not run after a failure"
    );
    assert!(
        !cmds.iter().any(|c| c.contains("switch --flake")),
        "the apply must not run after a failure"
    );
}

#[test]
fn failed_container_start_runs_nothing_remote() {
    let rt = MockRuntime {
        up_fails: true,
        ..MockRuntime::default()
    };
    let err = run_setup(&rt, &opts()).unwrap_err();
    assert!(
        matches!(err, SetupError::StepFailed(Stage::ContainerStart)),
        "got: {err}"
    );
    assert!(rt.probes.borrow().is_empty());
    assert!(rt.exec_commands().is_empty());
}

#[test]
fn present_tools_are_never_reinstalled() {
    let rt = MockRuntime::with_present(&["apt", "nix"]);
    run_setup(&rt, &opts()).expect("setup should succeed");

    let cmds = rt.exec_commands();
    assert!(
        !cmds.iter().any(|c| c.contains("nixos.org/nix/install")),
        "nix is present and must not be reinstalled: {cmds:?}"
    );
    assert!(cmds.iter().any(|c| c.contains("apt install -y curl")));
    assert!(cmds.iter().any(|c| c.contains("home-manager/archive")));
    assert_eq!(
        rt.probes.borrow().as_slice(),
        ["apt", "curl", "nix", "home-manager"],
        "probe order is fixed"
    );
}

#[test]
fn purge_flag_reaches_the_lifecycle_call() {
    let rt = MockRuntime::with_present(&["apt", "curl", "nix", "home-manager"]);
    let mut o = opts();
    o.purge = true;
    run_setup(&rt, &o).unwrap();
    assert_eq!(rt.up_calls.borrow().as_slice(), [true]);

    let rt = MockRuntime::with_present(&["apt", "curl", "nix", "home-manager"]);
    run_setup(&rt, &opts()).unwrap();
    assert_eq!(rt.up_calls.borrow().as_slice(), [false]);
}

#[test]
fn url_source_is_used_verbatim_as_flake_ref() {
    let rt = MockRuntime::with_present(&["apt", "curl", "nix", "home-manager"]);
    let mut o = opts();
    o.source = ConfigSource::select(Some("https://example.com/me/dotfiles"), None).unwrap();
    o.config = "home".to_string();
    run_setup(&rt, &o).unwrap();

    let cmds = rt.exec_commands();
    assert_eq!(cmds.len(), 1);
    assert!(cmds[0].contains("--inputs-from https://example.com/me/dotfiles "));
    assert!(cmds[0].contains("--flake https://example.com/me/dotfiles#home"));
}
