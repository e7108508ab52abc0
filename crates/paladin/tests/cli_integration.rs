use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn paladin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_paladin"));
    for var in ["ANTHROPIC_API_KEY", "OPENAI_API_KEY", "GROQ_API_KEY", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

fn run_hook(project_root: &Path, stdin: &str) -> Output {
    run_hook_with_env(project_root, stdin, &[])
}

fn run_hook_with_env(project_root: &Path, stdin: &str, vars: &[(&str, &str)]) -> Output {
    let mut cmd = paladin();
    for (key, value) in vars {
        cmd.env(key, value);
    }
    let mut child = cmd
        .args(["hook", "--project-root"])
        .arg(project_root)
        .current_dir(project_root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "stdout: {}", stdout);
    serde_json::from_str(stdout.trim()).unwrap()
}

#[test]
fn test_paladin_version() {
    let output = paladin().arg("--version").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_paladin_help() {
    let output = paladin().arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["hook", "install", "uninstall", "doctor", "init", "guard", "heal"] {
        assert!(stdout.contains(command), "missing {}", command);
    }
}

#[test]
fn test_hook_rejects_empty_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_hook(dir.path(), r#"{"prompt": "   "}"#);

    assert!(output.status.success());
    let response = stdout_json(&output);
    assert_eq!(response["continue"], false);
    assert!(response["userMessage"].as_str().unwrap().contains("Empty prompt"));
}

#[test]
fn test_hook_invalid_input_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_hook(dir.path(), "this is not json");

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["continue"], false);
}

#[test]
fn test_hook_without_keys_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_hook(dir.path(), r#"{"prompt": "add pagination to the orders table"}"#);

    assert!(output.status.success());
    let response = stdout_json(&output);
    assert_eq!(response["continue"], true);
    assert_eq!(response["prompt"], "add pagination to the orders table");
    let logs: Vec<String> = std::fs::read_dir(dir.path().join(".paladin"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        logs.iter().any(|name| name.starts_with("hook.") && name.ends_with(".log")),
        "logs: {:?}",
        logs
    );
}

#[test]
fn test_hook_with_huge_timeout_still_answers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("paladin.toml"), "[hook]\ncall_timeout_secs = 1e20\n").unwrap();
    let output = run_hook_with_env(
        dir.path(),
        r#"{"prompt": "add tests"}"#,
        &[("HOOK_TIMEOUT_SECS", "1e20")],
    );

    assert!(output.status.success());
    let response = stdout_json(&output);
    assert_eq!(response["continue"], true);
    assert_eq!(response["prompt"], "add tests");
}

#[test]
fn test_hook_with_broken_config_still_answers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("paladin.toml"), "[hook\nbroken").unwrap();
    let output = run_hook(dir.path(), r#"{"prompt": ""}"#);

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["continue"], false);
}

#[test]
fn test_proceed_echoes_prompt() {
    let output = paladin().args(["proceed", "ship it"]).output().unwrap();

    assert!(output.status.success());
    let ack: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ack["verdict"], "proceed");
    assert_eq!(ack["prompt"], "ship it");
}

#[test]
fn test_init_then_refuse_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paladin.toml");

    let first = paladin().arg("init").arg(&path).output().unwrap();
    assert!(first.status.success());
    assert!(path.exists());

    let second = paladin().arg("init").arg(&path).output().unwrap();
    assert!(!second.status.success());
}

#[test]
fn test_install_and_uninstall_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let hooks_file = dir.path().join("hooks.json");
    let project = dir.path().join("project");
    std::fs::create_dir_all(&project).unwrap();

    let install = paladin()
        .args(["install", "--hooks-file"])
        .arg(&hooks_file)
        .arg("--project-root")
        .arg(&project)
        .output()
        .unwrap();
    assert!(install.status.success());
    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&hooks_file).unwrap()).unwrap();
    let command = doc["hooks"]["beforeSubmitPrompt"][0]["command"].as_str().unwrap();
    assert!(command.contains(" hook --project-root "));

    let uninstall = paladin()
        .args(["uninstall", "--hooks-file"])
        .arg(&hooks_file)
        .arg("--project-root")
        .arg(&project)
        .output()
        .unwrap();
    assert!(uninstall.status.success());
    assert!(!hooks_file.exists());
}
