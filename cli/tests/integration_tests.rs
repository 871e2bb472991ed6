use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const REGISTRY_YAML: &str = r#"options:
  - flag: v,verbose
    type: bool
    min: 0
    max: 0
    info: say more
  - flag: n
    name: count
    type: int
    min: 1
    max: 1
    default: "10"
  - flag: m
    name: mode
    type: enum
    min: 1
    max: 1
    default: fast
    enum:
      name: mode
      values:
        - { name: fast, value: 1 }
        - { name: slow, value: 2 }
  - name: files
    type: string
    min: 0
    max: unbounded
"#;

fn write_registry(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("failed to write registry");
    path
}

fn argbind(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_argbind"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run argbind")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn test_check_valid_registry() {
    let dir = TempDir::new().unwrap();
    let registry = write_registry(&dir, "reg.yaml", REGISTRY_YAML);

    let output = argbind(&["check", &path_arg(&registry)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("4 option(s), 1 positional"));
}

#[test]
fn test_check_reports_schema_error() {
    let dir = TempDir::new().unwrap();
    let registry = write_registry(
        &dir,
        "reg.json",
        r#"{"options": [
            {"name": "a", "type": "string", "min": 0, "max": "unbounded"},
            {"name": "b", "type": "string", "min": 1, "max": "unbounded"}
        ]}"#,
    );

    let output = argbind(&["check", &path_arg(&registry)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("error: "));
}

#[test]
fn test_check_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let registry = write_registry(&dir, "reg.toml", "");
    let output = argbind(&["check", &path_arg(&registry)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unsupported registry file extension"));
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn test_parse_prints_bound_values() {
    let dir = TempDir::new().unwrap();
    let registry = write_registry(&dir, "reg.yaml", REGISTRY_YAML);

    let output = argbind(&["parse", &path_arg(&registry), "--", "-n", "7", "-m", "slow", "a.txt", "b.txt"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let options = report["options"].as_array().unwrap();
    assert_eq!(options[0]["option"], "--verbose");
    assert_eq!(options[0]["value"], false);
    assert_eq!(options[0]["source"], "default");
    assert_eq!(options[1]["option"], "-n");
    assert_eq!(options[1]["value"], 7);
    assert_eq!(options[1]["source"], "command-line");
    assert_eq!(options[2]["value"], "slow");
    assert_eq!(options[3]["option"], "<files>");
    assert_eq!(options[3]["count"], 2);
    assert_eq!(options[3]["value"], serde_json::json!(["a.txt", "b.txt"]));
}

#[test]
fn test_parse_yaml_output() {
    let dir = TempDir::new().unwrap();
    let registry = write_registry(&dir, "reg.yml", REGISTRY_YAML);

    let output = argbind(&["parse", &path_arg(&registry), "--format", "yaml", "--", "-v"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("--verbose"));
    assert!(text.contains("value: true"));
}

#[test]
fn test_parse_reads_response_file() {
    let dir = TempDir::new().unwrap();
    let registry = write_registry(&dir, "reg.yaml", REGISTRY_YAML);
    let rf = dir.path().join("args.txt");
    fs::write(&rf, "-n 3 # count\nc.txt\n").unwrap();
    let at = format!("@{}", rf.display());

    let output = argbind(&["parse", &path_arg(&registry), "--response-files", "--", &at]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["options"][1]["value"], 3);
    assert_eq!(report["options"][1]["source"], "response-file");
    assert_eq!(report["options"][3]["value"], serde_json::json!(["c.txt"]));
}

#[test]
fn test_parse_error_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let registry = write_registry(&dir, "reg.yaml", REGISTRY_YAML);

    let output = argbind(&["parse", &path_arg(&registry), "--", "-n", "seven"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output).trim(), "error: couldn't parse \"seven\" as int for -n");
}

#[test]
fn test_parse_help_token() {
    let dir = TempDir::new().unwrap();
    let registry = write_registry(&dir, "reg.yaml", REGISTRY_YAML);

    let output = argbind(&["parse", &path_arg(&registry), "--help-token", "--", "-n", "--help"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "help requested");
}

// ---------------------------------------------------------------------------
// tokens
// ---------------------------------------------------------------------------

#[test]
fn test_tokens_quotes_for_shell() {
    let output = argbind(&["tokens", "--", "-n", "5", "two words", "it's"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim_end(), r#"-n 5 "two words" "it's""#);
}

#[test]
fn test_tokens_drop_comment_regions() {
    let output = argbind(&["tokens", "--comments", "--", "a", "-{", "b", "}-", "c"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim_end(), "a c");
}

#[test]
fn test_tokens_unbalanced_comment() {
    let output = argbind(&["tokens", "--comments", "--", "}-"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("error: "));
}
