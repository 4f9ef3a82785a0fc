#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Runs against the embedded sample cluster with no config file in reach.
fn xpai(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("crossplane-ai").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("CROSSPLANE_AI_MODE", "mock")
        .env_remove("OPENAI_API_KEY")
        .env_remove("CROSSPLANE_AI_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_sample_cluster_json() {
    let dir = TempDir::new().unwrap();
    let v = json_stdout(xpai(&dir).args(["analyze", "-o", "json"]));

    assert_eq!(v["total_count"], 11);
    assert_eq!(v["healthy_count"], 10);
    assert_eq!(v["issue_count"], 1);
    assert_eq!(v["health_score"], 91);
    assert_eq!(v["issues"][0]["related_resource"], "failing-test-resource");
    assert_eq!(v["issues"][0]["severity"], "Warning");
    assert!(v.get("narrative").is_none());
}

#[test]
fn analyze_provider_filter_narrows() {
    let dir = TempDir::new().unwrap();
    let v = json_stdout(xpai(&dir).args(["analyze", "--provider", "aws", "-o", "json"]));

    assert_eq!(v["total_count"], 4);
    assert_eq!(v["healthy_count"], 3);
    assert_eq!(v["health_score"], 75);
    let titles: Vec<&str> = v["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"Investigate Resource Issues"));
}

#[test]
fn analyze_table_lists_issue() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("Health score: 91/100"))
        .stdout(predicate::str::contains("failing-test-resource"))
        .stdout(predicate::str::contains("Not Ready"));
}

#[test]
fn analyze_unknown_name_reports_no_match() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .args(["analyze", "no-such-resource"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No Crossplane resources found matching the criteria.",
        ));
}

#[test]
fn analyze_unknown_name_json_is_empty_result() {
    let dir = TempDir::new().unwrap();
    let v = json_stdout(xpai(&dir).args(["analyze", "no-such-resource", "-o", "json"]));
    assert_eq!(v["total_count"], 0);
    assert_eq!(v["health_score"], 0);
    assert_eq!(v["recommendations"][0]["title"], "Install Crossplane Providers");
}

#[test]
fn analyze_provider_flag_ignores_case() {
    let dir = TempDir::new().unwrap();
    let v = json_stdout(xpai(&dir).args(["analyze", "--provider", "AWS", "-o", "json"]));
    assert_eq!(v["total_count"], 4);
}

#[test]
fn analyze_summary_yaml() {
    let dir = TempDir::new().unwrap();
    let out = xpai(&dir)
        .args(["analyze", "--summary", "-o", "yaml"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_yaml::Value = serde_yaml::from_slice(&out).unwrap();
    assert_eq!(v["health_score"].as_u64(), Some(91));
    assert_eq!(v["recommendation_count"].as_u64(), Some(2));
    assert_eq!(v["top_recommendations"][0].as_str(), Some("Multi-Cloud Management"));
    assert!(v.get("issues").is_none());
}

#[test]
fn analyze_summary_table_lists_top_recommendations() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .args(["analyze", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recommendations: 2"))
        .stdout(predicate::str::contains("Top recommendations:"))
        .stdout(predicate::str::contains("  - Enable Monitoring and Alerting"));
}

#[test]
fn missing_kubeconfig_reports_init_error_once() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .env_remove("CROSSPLANE_AI_MODE")
        .args(["analyze", "--kubeconfig", "missing-kubeconfig"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: failed to initialize cluster client"))
        .stderr(predicate::str::contains("failed to initialize cluster client").count(1));
}

// ---------------------------------------------------------------------------
// ask
// ---------------------------------------------------------------------------

#[test]
fn ask_routes_aws_before_database() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .args(["ask", "show", "my", "aws", "database"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("AWS Resources:"));
}

#[test]
fn ask_fallback_quotes_request() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .args(["ask", "How do I rotate Credentials?"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "I understand you're asking about: How do I rotate Credentials?",
        ));
}

#[test]
fn ask_json_reports_template_source() {
    let dir = TempDir::new().unwrap();
    let v = json_stdout(xpai(&dir).args(["ask", "which resources failed", "-o", "json"]));
    assert_eq!(v["source"], "template");
    assert!(v["text"].as_str().unwrap().contains("failing-test-resource"));
}

// ---------------------------------------------------------------------------
// suggest
// ---------------------------------------------------------------------------

#[test]
fn suggest_respects_limit() {
    let dir = TempDir::new().unwrap();
    let v = json_stdout(xpai(&dir).args(["suggest", "database", "--limit", "1", "-o", "json"]));
    assert_eq!(v.as_array().unwrap().len(), 1);
}

#[test]
fn suggest_unknown_category_uses_general() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .args(["suggest", "gardening"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggestions (general):"));
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_database_template() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .args(["generate", "a", "postgres", "database"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kind: DBInstance"))
        .stdout(predicate::str::contains("rds.aws.crossplane.io"));
}

#[test]
fn generate_json_output() {
    let dir = TempDir::new().unwrap();
    let v = json_stdout(xpai(&dir).args(["generate", "s3 bucket", "--provider", "aws", "-o", "json"]));
    assert_eq!(v["kind"], "Bucket");
    assert_eq!(v["apiVersion"], "s3.aws.crossplane.io/v1beta1");
}

#[test]
fn generate_requires_description() {
    let dir = TempDir::new().unwrap();
    xpai(&dir).arg("generate").assert().code(2);
}

// ---------------------------------------------------------------------------
// examples
// ---------------------------------------------------------------------------

#[test]
fn examples_writes_manifests() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .args(["examples", "--dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 example manifests"));

    for file in [
        "xdatabase-composition.yaml",
        "xdatabase-definition.yaml",
        "database-claim.yaml",
        "provider-aws.yaml",
    ] {
        assert!(dir.path().join("out").join(file).is_file(), "{file} missing");
    }
}

#[test]
fn examples_list_writes_nothing() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .args(["examples", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("provider-aws.yaml"));
    assert!(!dir.path().join("examples").exists());
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_defaults() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".crossplane-ai.yaml"),
        "analysis:\n  timeout: 0\n",
    )
    .unwrap();
    xpai(&dir)
        .args(["config", "validate"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[error]"));
}

#[test]
fn config_show_masks_key() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".crossplane-ai.yaml"),
        "ai:\n  provider: openai\n  api_key: sk-secret\n",
    )
    .unwrap();
    xpai(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("sk-secret").not());
}

#[test]
fn config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    xpai(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join(".crossplane-ai.yaml").is_file());

    xpai(&dir)
        .args(["config", "init"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
    xpai(&dir).args(["config", "init", "--force"]).assert().success();
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .args(["--config", "nope.yaml", "analyze"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error:"));
}

// ---------------------------------------------------------------------------
// interactive
// ---------------------------------------------------------------------------

#[test]
fn interactive_runs_line_commands() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .arg("interactive")
        .write_stdin("status\nhealth\nwhat resources do I have?\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("failing-test-resource"))
        .stdout(predicate::str::contains("Health score: 91/100 (10/11 ready) - healthy"))
        .stdout(predicate::str::contains("Resource Summary:"))
        .stdout(predicate::str::contains("Goodbye!"));
}

#[test]
fn interactive_ends_on_eof() {
    let dir = TempDir::new().unwrap();
    xpai(&dir)
        .arg("interactive")
        .write_stdin("help\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("suggest [type]"))
        .stdout(predicate::str::contains("Goodbye!"));
}

// ---------------------------------------------------------------------------
// mcp
// ---------------------------------------------------------------------------

#[test]
fn mcp_answers_each_request_line() {
    let dir = TempDir::new().unwrap();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#, "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"crossplane_analyze","arguments":{}}}"#, "\n",
        "not json\n",
    );
    let out = xpai(&dir)
        .arg("mcp")
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let responses: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "crossplane-ai");
    assert_eq!(responses[1]["id"], 2);
    assert!(responses[1]["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Health score: 91/100"));
    assert_eq!(responses[2]["error"]["code"], -32700);
}
