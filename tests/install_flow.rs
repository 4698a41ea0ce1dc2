#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the install flow: resolution, manager selection,
//! environment handling, linking and idempotency, driven end to end through
//! the orchestrator with a recording executor.

mod common;

use common::*;

use appstrap::catalog::{App, AppCatalog};
use appstrap::commands::install::requested_apps;
use appstrap::cli::InstallOpts;
use appstrap::config::{self, Settings};
use appstrap::error::ManagerError;
use appstrap::logging::AppStatus;
use appstrap::managers::{ManagerKind, ManagerOptions, Mode};
use appstrap::orchestrator::{InstallOptions, Orchestrator};

fn editor_catalog() -> AppCatalog {
    let mut catalog = AppCatalog::empty();
    catalog.register(App::new("editorX", vec!["ex".to_string()]).unwrap());
    catalog
}

fn miniforge_options() -> InstallOptions {
    InstallOptions {
        mode: Mode::Explicit(ManagerKind::Miniforge),
        ..InstallOptions::default()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn catalog_hit_and_unknown_name_are_both_enqueued_for_user_space_manager() {
    let sandbox = Sandbox::new(false);
    sandbox.install_fake_miniforge();
    let executor = RecordingExecutor::new(&sandbox);
    let catalog = editor_catalog();

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&["editorX", "unknown Tool"])
        .unwrap();

    assert_eq!(outcome.manager, Some(ManagerKind::Miniforge));
    assert_eq!(outcome.queued_packages(), ["editorx", "unknown-tool"]);
    assert_eq!(outcome.queued[1].commands(), ["unknown-tool"]);
    let mamba = sandbox.mamba().display().to_string();
    assert_eq!(
        executor.calls_containing(" install "),
        [format!("{mamba} install -n apps -y editorx unknown-tool")]
    );
}

#[test]
fn unknown_names_derive_lowercase_commands() {
    let catalog = editor_catalog();
    assert_eq!(catalog.resolve("unknownTool").commands(), ["unknowntool"]);
    assert_eq!(catalog.resolve("Unknown Tool").commands(), ["unknown-tool"]);
    assert_eq!(catalog.resolve("EDITORX").commands(), ["ex"]);
}

#[test]
fn installed_catalog_app_enqueues_nothing() {
    let sandbox = Sandbox::new(false);
    let executor = RecordingExecutor::new(&sandbox).with_on_path(&["ex"]);
    let catalog = editor_catalog();

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&["editorX"])
        .unwrap();

    assert!(outcome.queued.is_empty());
    assert!(executor.calls().is_empty());
    assert!(sandbox.log.names_with(AppStatus::Installed).is_empty());
    assert_eq!(sandbox.log.names_with(AppStatus::Skipped), ["editorX"]);
    assert!(!sandbox.log.has_failures());
}

#[test]
fn failing_custom_installer_falls_back_to_manager() {
    // No curl/wget and no brew: the neovim installer cannot succeed.
    let sandbox = Sandbox::new(false);
    sandbox.install_fake_miniforge();
    let executor = RecordingExecutor::new(&sandbox).provides("neovim", &["nvim"]);
    let catalog = AppCatalog::builtin();

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), miniforge_options())
        .run(&["neovim"])
        .unwrap();

    assert_eq!(outcome.queued_packages(), ["neovim"]);
    assert_eq!(outcome.links.linked, ["nvim"]);
    assert_eq!(sandbox.log.names_with(AppStatus::Installed), ["neovim"]);
}

// ---------------------------------------------------------------------------
// Manager selection
// ---------------------------------------------------------------------------

#[test]
fn elevated_access_selects_homebrew() {
    let sandbox = Sandbox::new(true);
    let executor = RecordingExecutor::new(&sandbox).with_on_path(&["brew"]);
    let catalog = AppCatalog::builtin();

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&["ripgrep", "fd-find"])
        .unwrap();

    assert_eq!(outcome.manager, Some(ManagerKind::Homebrew));
    assert_eq!(executor.calls(), ["/usr/bin/brew install ripgrep fd-find"]);
    assert!(sandbox.linked().is_empty());
}

#[test]
fn explicit_mode_overrides_elevated_access() {
    let sandbox = Sandbox::new(true);
    sandbox.install_fake_miniforge();
    let executor = RecordingExecutor::new(&sandbox).with_on_path(&["brew"]);
    let catalog = AppCatalog::builtin();

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), miniforge_options())
        .run(&["bottom"])
        .unwrap();

    assert_eq!(outcome.manager, Some(ManagerKind::Miniforge));
    assert!(executor.calls_containing("brew").is_empty());
}

// ---------------------------------------------------------------------------
// Isolated environment
// ---------------------------------------------------------------------------

#[test]
fn missing_environment_is_created_before_install_then_reused() {
    let sandbox = Sandbox::new(false);
    sandbox.install_fake_miniforge();
    let executor = RecordingExecutor::new(&sandbox);
    let catalog = AppCatalog::builtin();
    let mamba = sandbox.mamba().display().to_string();

    Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&["jq"])
        .unwrap();
    assert_eq!(
        executor.calls(),
        [
            format!("{mamba} env list"),
            format!("{mamba} create -n apps -y"),
            format!("{mamba} install -n apps -y jq"),
        ]
    );

    Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&["yq"])
        .unwrap();
    assert_eq!(executor.calls_containing(" create ").len(), 1);
    assert_eq!(
        executor.calls().last().map(String::as_str),
        Some(format!("{mamba} install -n apps -y yq").as_str())
    );
}

#[test]
fn configured_environment_name_is_used() {
    let sandbox = Sandbox::new(false);
    sandbox.install_fake_miniforge();
    let executor = RecordingExecutor::new(&sandbox);
    let catalog = AppCatalog::builtin();
    let options = InstallOptions {
        manager: ManagerOptions {
            custom_bin_path: Some(sandbox.mamba()),
            env_name: "tools".to_string(),
        },
        ..InstallOptions::default()
    };

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), options)
        .run(&["jq"])
        .unwrap();

    assert_eq!(executor.calls_containing("create -n tools -y").len(), 1);
    assert_eq!(outcome.links.linked, ["jq"]);
    assert_eq!(
        std::fs::read_link(sandbox.env.user_local_bin.join("jq")).unwrap(),
        sandbox.env_bin("tools").join("jq")
    );
}

// ---------------------------------------------------------------------------
// Linking and idempotency
// ---------------------------------------------------------------------------

#[test]
fn links_available_binaries_and_skips_missing_ones() {
    let sandbox = Sandbox::new(false);
    sandbox.install_fake_miniforge();
    // The package ships node and npm but not npx.
    let executor = RecordingExecutor::new(&sandbox).provides("nodejs", &["node", "npm"]);
    let catalog = AppCatalog::builtin();

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&["nodejs"])
        .unwrap();

    assert_eq!(outcome.links.linked, ["node", "npm"]);
    assert_eq!(outcome.links.skipped, ["npx"]);
    assert_eq!(sandbox.linked(), ["node", "npm"]);
    assert!(!sandbox.log.has_failures());
}

#[test]
fn link_failure_does_not_stop_later_apps() {
    let sandbox = Sandbox::new(false);
    sandbox.install_fake_miniforge();
    std::fs::create_dir_all(sandbox.env_bin("apps").join("sub")).unwrap();
    std::fs::write(sandbox.env.user_local_bin.join("sub"), "").unwrap();
    let executor = RecordingExecutor::new(&sandbox)
        .provides("tools", &["sub/tool"])
        .provides("ripgrep", &["rg"]);
    let mut catalog = AppCatalog::builtin();
    catalog.register(App::new("tools", vec!["sub/tool".to_string()]).unwrap());

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&["tools", "ripgrep"])
        .unwrap();

    assert_eq!(outcome.links.failed, ["sub/tool"]);
    assert_eq!(outcome.links.linked, ["rg"]);
    assert_eq!(sandbox.linked(), ["rg", "sub"]);
    assert_eq!(
        sandbox.log.names_with(AppStatus::Installed),
        ["tools", "ripgrep"]
    );
}

#[test]
fn existing_user_binary_is_not_replaced() {
    let sandbox = Sandbox::new(false);
    sandbox.install_fake_miniforge();
    std::fs::write(sandbox.env.user_local_bin.join("gofmt"), "mine").unwrap();
    let executor = RecordingExecutor::new(&sandbox).provides("go", &["go", "gofmt"]);
    let catalog = AppCatalog::builtin();

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&["go"])
        .unwrap();

    assert_eq!(outcome.links.linked, ["go"]);
    assert_eq!(outcome.links.present, ["gofmt"]);
    assert_eq!(
        std::fs::read_to_string(sandbox.env.user_local_bin.join("gofmt")).unwrap(),
        "mine"
    );
}

#[test]
fn second_run_installs_and_links_nothing() {
    let sandbox = Sandbox::new(false);
    sandbox.install_fake_miniforge();
    let executor = RecordingExecutor::new(&sandbox)
        .provides("ripgrep", &["rg"])
        .provides("git-delta", &["delta"]);
    let catalog = AppCatalog::builtin();
    let names = ["ripgrep", "git-delta"];

    Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&names)
        .unwrap();
    let calls_after_first = executor.calls().len();
    let links_after_first = sandbox.linked();
    assert_eq!(links_after_first, ["delta", "rg"]);

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&names)
        .unwrap();

    assert!(outcome.queued.is_empty());
    assert_eq!(executor.calls().len(), calls_after_first);
    assert_eq!(sandbox.linked(), links_after_first);
    assert_eq!(sandbox.log.names_with(AppStatus::Skipped), names);
}

#[test]
fn force_reinstalls_present_apps() {
    let sandbox = Sandbox::new(false);
    sandbox.install_fake_miniforge();
    let executor = RecordingExecutor::new(&sandbox).provides("ripgrep", &["rg"]);
    let catalog = AppCatalog::builtin();

    Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&["ripgrep"])
        .unwrap();
    let forced = InstallOptions {
        force: true,
        ..InstallOptions::default()
    };
    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), forced)
        .run(&["ripgrep"])
        .unwrap();

    assert_eq!(outcome.queued_packages(), ["ripgrep"]);
    assert_eq!(
        executor.calls_containing("--force-reinstall").len(),
        1,
        "second run should pass --force-reinstall"
    );
    assert_eq!(outcome.links.present, ["rg"]);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn batch_failure_is_fatal_and_marks_every_app_failed() {
    let sandbox = Sandbox::new(false);
    sandbox.install_fake_miniforge();
    let executor = RecordingExecutor::new(&sandbox).fail_when(" install ");
    let catalog = AppCatalog::builtin();

    let err = Orchestrator::new(&catalog, sandbox.ctx(&executor), InstallOptions::default())
        .run(&["ripgrep", "bottom"])
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ManagerError>(),
        Some(ManagerError::BatchInstall { .. })
    ));
    assert_eq!(sandbox.log.failure_count(), 2);
    assert!(sandbox.linked().is_empty());
}

#[test]
fn dry_run_touches_nothing() {
    let sandbox = Sandbox::new(false);
    let executor = RecordingExecutor::new(&sandbox);
    let catalog = AppCatalog::builtin();
    let options = InstallOptions {
        dry_run: true,
        ..InstallOptions::default()
    };

    let outcome = Orchestrator::new(&catalog, sandbox.ctx(&executor), options)
        .run(&["neovim", "ripgrep"])
        .unwrap();

    assert_eq!(outcome.queued_packages(), ["ripgrep"]);
    assert!(executor.calls().is_empty());
    assert!(!sandbox.mamba().exists());
    assert_eq!(
        sandbox.log.names_with(AppStatus::DryRun),
        ["neovim", "ripgrep"]
    );
}

// ---------------------------------------------------------------------------
// Configuration feeding the flow
// ---------------------------------------------------------------------------

#[test]
fn lists_and_command_overrides_drive_resolution() {
    let lists = tempfile::tempdir().unwrap();
    write_list(lists.path(), "minimal", "# core\nripgrep\neditorX\n");
    write_list(lists.path(), "extra", "bottom\n");
    std::fs::write(
        lists.path().join("commands.json"),
        r#"{"editorx": ["ex"]}"#,
    )
    .unwrap();

    let opts = InstallOpts {
        apps: vec!["fd-find".to_string()],
        app_lists: vec!["full".to_string()],
        ..InstallOpts::default()
    };
    let names = requested_apps(&opts, Some(lists.path())).unwrap();
    assert_eq!(names, ["bottom", "ripgrep", "editorX", "fd-find"]);

    let catalog = config::load_catalog(Some(lists.path()), &Settings::default()).unwrap();
    let sandbox = Sandbox::new(false);
    let executor = RecordingExecutor::new(&sandbox).with_on_path(&["btm", "ex"]);
    let outcome = Orchestrator::new(
        &catalog,
        sandbox.ctx(&executor),
        InstallOptions {
            dry_run: true,
            ..InstallOptions::default()
        },
    )
    .run(&names)
    .unwrap();

    assert_eq!(outcome.queued_packages(), ["ripgrep", "fd-find"]);
    assert_eq!(
        sandbox.log.names_with(AppStatus::Skipped),
        ["bottom", "editorX"]
    );
}
