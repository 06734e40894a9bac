use assert_cmd::Command;
use serde_json::Value;
use shelf_fs::resolve_workspace;
use shelf_store::{ListsStore, StoredSession};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SERVER: &str = "http://127.0.0.1:9";

#[test]
fn auth_login_status_logout_round_trip() {
    let workspace = temp_workspace();
    init_workspace(&workspace.path, SERVER);

    let mut login = base_command(&workspace.path);
    login
        .args(["auth", "login", "--json"])
        .env("SHELF_TOKEN", "token-from-env");
    let login_json = stdout_json(login.assert().success().get_output());
    assert_eq!(login_json["ok"], true);
    assert_eq!(login_json["result"]["profile"], "default");
    assert_eq!(login_json["result"]["server"], SERVER);

    let session = load_session_fixture(&workspace.path).expect("session after login");
    assert_eq!(session.access_token, "token-from-env");
    assert_eq!(session.server, SERVER);

    let status_json = run_json(&workspace.path, &["auth", "status", "--json"]);
    assert_eq!(status_json["ok"], true);
    assert_eq!(status_json["result"]["authenticated"], true);

    let logout_json = run_json(&workspace.path, &["auth", "logout", "--json"]);
    assert_eq!(logout_json["result"]["logged_out"], true);
    assert!(load_session_fixture(&workspace.path).is_none());

    let mut status = base_command(&workspace.path);
    status.args(["auth", "status", "--json"]);
    let output = status.assert().code(3).get_output().clone();
    let status_json = stdout_json(&output);
    assert_eq!(status_json["result"]["authenticated"], false);
    assert_eq!(status_json["result"]["reason"], "no stored session");
}

#[test]
fn auth_login_without_token_is_an_auth_error() {
    let workspace = temp_workspace();
    init_workspace(&workspace.path, SERVER);

    let mut cmd = base_command(&workspace.path);
    cmd.args(["auth", "login", "--json"]);
    let output = cmd.assert().code(3).get_output().clone();

    let stderr: Value =
        serde_json::from_slice(&output.stderr).expect("json error on stderr");
    assert_eq!(stderr["ok"], false);
    assert_eq!(stderr["error"]["kind"], "auth");
    assert!(load_session_fixture(&workspace.path).is_none());
}

#[test]
fn auth_status_rejects_session_from_another_server() {
    let workspace = temp_workspace();
    init_workspace(&workspace.path, SERVER);

    let mut login = base_command(&workspace.path);
    login.args(["auth", "login", "--token", "token-1"]);
    login.assert().success();

    let mut status = base_command(&workspace.path);
    status.args([
        "auth",
        "status",
        "--json",
        "--server",
        "http://127.0.0.1:10",
    ]);
    let output = status.assert().code(3).get_output().clone();
    assert_eq!(
        stdout_json(&output)["result"]["reason"],
        "stored session belongs to a different server"
    );
}

#[test]
fn profile_set_use_and_list() {
    let workspace = temp_workspace();
    init_workspace(&workspace.path, SERVER);

    let set_json = run_json(
        &workspace.path,
        &[
            "profile",
            "set",
            "--name",
            "staging",
            "--server",
            "https://staging.example.com/",
            "--json",
        ],
    );
    assert_eq!(set_json["result"]["profile"], "staging");
    assert_eq!(set_json["result"]["server"], "https://staging.example.com");

    let use_json = run_json(&workspace.path, &["profile", "use", "staging", "--json"]);
    assert_eq!(use_json["result"]["profile"], "staging");

    let list_json = run_json(&workspace.path, &["profile", "list", "--json"]);
    assert_eq!(list_json["result"]["active_profile"], "staging");
    let profiles = list_json["result"]["profiles"]
        .as_array()
        .expect("profiles array");
    assert_eq!(profiles.len(), 2);

    let mut unknown = base_command(&workspace.path);
    unknown.args(["profile", "use", "missing"]);
    unknown.assert().code(2);

    let mut bad_server = base_command(&workspace.path);
    bad_server.args(["profile", "set", "--server", "ftp://example.com"]);
    bad_server.assert().code(2);
}

fn init_workspace(workspace: &Path, server_url: &str) {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("shelf");
    cmd.args([
        "init",
        "--workspace",
        workspace.to_str().expect("workspace path"),
        "--server",
        server_url,
        "--json",
    ]);

    cmd.assert().success();
}

fn run_json(workspace: &Path, args: &[&str]) -> Value {
    let mut cmd = base_command(workspace);
    cmd.args(args);
    stdout_json(cmd.assert().success().get_output())
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    serde_json::from_str(&stdout).expect("json stdout")
}

fn base_command(workspace: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("shelf");
    cmd.current_dir(workspace)
        .env_remove("SHELF_TOKEN")
        .env_remove("RUST_LOG")
        .args(["--workspace", workspace.to_str().expect("workspace path")]);
    cmd
}

#[derive(Debug)]
struct TestWorkspace {
    _temp: TempDir,
    path: PathBuf,
}

fn temp_workspace() -> TestWorkspace {
    let temp = tempfile::tempdir().expect("tempdir");
    let workspace_path = temp.path().join("workspace");
    fs::create_dir_all(&workspace_path).expect("create workspace dir");
    TestWorkspace {
        _temp: temp,
        path: workspace_path,
    }
}

fn load_session_fixture(workspace: &Path) -> Option<StoredSession> {
    let paths = resolve_workspace(Some(workspace)).expect("resolve workspace");
    let store = ListsStore::open(&paths, "default").expect("lists store");
    store.load_session().expect("load session")
}
