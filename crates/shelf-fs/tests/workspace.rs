use shelf_core::ExitCode;
use shelf_fs::{
    DEFAULT_PROFILE, init_workspace, list_profiles, load_config, resolve_workspace, save_config,
    set_active_profile, set_profile_server,
};

#[test]
fn init_workspace_creates_expected_layout() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("ws");

    let result =
        init_workspace(Some(&root), Some("https://lists.example.com/")).expect("init workspace");

    assert!(result.paths.root.is_dir());
    assert!(result.paths.data_dir.is_dir());
    assert!(result.paths.config_path.is_file());
    assert!(result.paths.state_db_path.is_file());
    assert!(result.created.contains(&result.paths.config_path));

    let config = load_config(&result.paths).expect("load config");
    assert_eq!(config.active_profile, DEFAULT_PROFILE);
    assert_eq!(
        config
            .profiles
            .get(DEFAULT_PROFILE)
            .map(|p| p.server.as_str()),
        Some("https://lists.example.com")
    );
}

#[test]
fn init_workspace_is_idempotent() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("ws");

    init_workspace(Some(&root), None).expect("first init");
    let second = init_workspace(Some(&root), Some("https://other.example.com")).expect("second");

    assert!(second.created.is_empty());
    let config = load_config(&second.paths).expect("load config");
    assert_ne!(
        config
            .profiles
            .get(DEFAULT_PROFILE)
            .map(|p| p.server.as_str()),
        Some("https://other.example.com")
    );
}

#[test]
fn resolve_workspace_fails_when_uninitialized() {
    let temp = tempfile::tempdir().expect("tempdir");

    let error =
        resolve_workspace(Some(temp.path())).expect_err("workspace should not be initialized");

    assert_eq!(error.exit_code(), ExitCode::Usage);
}

#[test]
fn profile_mutation_round_trip() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("ws");

    let result = init_workspace(Some(&root), None).expect("init workspace");
    let mut config = load_config(&result.paths).expect("load config");

    set_profile_server(&mut config, "work", "https://work.example.com").expect("set server");
    set_active_profile(&mut config, "work").expect("set active profile");
    save_config(&result.paths, &config).expect("save config");

    let saved = load_config(&result.paths).expect("reload config");
    assert_eq!(saved.active_profile, "work");

    let views = list_profiles(&saved);
    assert_eq!(views.len(), 2);
    assert!(views.iter().any(|view| view.name == "work" && view.active));
    assert!(
        views
            .iter()
            .any(|view| view.name == DEFAULT_PROFILE && !view.active)
    );
}
