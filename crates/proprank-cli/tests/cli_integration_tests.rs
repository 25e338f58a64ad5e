//! CLI integration tests for proprank
//!
//! Tests the proprank CLI commands end-to-end using assert_cmd. Every test
//! gets its own config directory and none of them reach the network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated to `config_dir`
#[allow(deprecated)]
fn proprank_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("proprank").unwrap();
    cmd.env("PROPRANK_CONFIG_DIR", config_dir.path());
    cmd.env_remove("PROPRANK_SPARQL_ENDPOINT");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    proprank_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rank"))
        .stdout(predicate::str::contains("features"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_path_uses_override() {
    let dir = TempDir::new().unwrap();
    proprank_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains(
            dir.path().to_string_lossy().as_ref(),
        ));
}

#[test]
fn test_config_get_default() {
    let dir = TempDir::new().unwrap();
    proprank_cmd(&dir)
        .args(["config", "get", "graph.endpoint"])
        .assert()
        .success()
        .stdout("http://dbpedia.org/sparql\n");
}

#[test]
fn test_config_set_persists() {
    let dir = TempDir::new().unwrap();

    proprank_cmd(&dir)
        .args(["config", "set", "scorer.kind", "linear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set scorer.kind = linear"));

    assert!(dir.path().join("config.toml").exists());

    proprank_cmd(&dir)
        .args(["config", "get", "scorer.kind"])
        .assert()
        .success()
        .stdout("linear\n");

    proprank_cmd(&dir)
        .args(["config", "reset"])
        .assert()
        .success();

    proprank_cmd(&dir)
        .args(["config", "get", "scorer.kind"])
        .assert()
        .success()
        .stdout("ranklib\n");
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    proprank_cmd(&dir)
        .args(["config", "set", "graph.nope", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_list() {
    let dir = TempDir::new().unwrap();
    proprank_cmd(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("autocomplete.max_prefix_len = 4"))
        .stdout(predicate::str::contains("ranking.include_incoming = false"));
}

#[test]
fn test_endpoint_env_override() {
    let dir = TempDir::new().unwrap();
    proprank_cmd(&dir)
        .env("PROPRANK_SPARQL_ENDPOINT", "http://localhost:8890/sparql")
        .args(["config", "get", "graph.endpoint"])
        .assert()
        .success()
        .stdout("http://localhost:8890/sparql\n");
}

#[test]
fn test_rank_invalid_resource_prints_error_report() {
    let dir = TempDir::new().unwrap();
    proprank_cmd(&dir)
        .args(["rank", "Iron Maiden> } #", "--compact"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""error":"E800""#))
        .stdout(predicate::str::contains(r#""resources":[]"#));
}

#[test]
fn test_rank_malformed_config_prints_error_report() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "graph = [\n").unwrap();

    proprank_cmd(&dir)
        .args(["rank", "Iron_Maiden", "--compact"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""error":"E600""#))
        .stdout(predicate::str::contains(r#""resources":[]"#))
        .stderr(predicate::str::contains("Hint:"));
}

#[test]
fn test_rank_requires_resource() {
    let dir = TempDir::new().unwrap();
    proprank_cmd(&dir).arg("rank").assert().failure();
}
