use super::helpers::{stderr, stdout, TestProject};
use std::fs;

fn sample_project(test_env: &TestProject, project: &str) {
    test_env.init_node_project(project, &["left-pad", "@acme/widgets", "gpl-thing"]);
    test_env.install(project, "left-pad", Some("MIT"));
    test_env.install(project, "@acme/widgets", Some("(ISC OR MIT)"));
    test_env.install(project, "gpl-thing", Some("GPL-3.0"));
}

#[test]
fn test_basic_license_extraction() {
    let test_env = TestProject::new();
    sample_project(&test_env, "app");

    let output = test_env.run_auditor("app", &["check", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let packages = report["packages"].as_array().unwrap();
    let names: Vec<&str> = packages.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["@acme/widgets", "gpl-thing", "left-pad"]);
    assert_eq!(packages[2]["license"], "MIT");
    assert_eq!(packages[2]["repoBaseUrl"], "https://github.com/acme/left-pad");
    assert_eq!(report["summary"]["total_packages"], 3);
}

#[test]
fn test_different_output_formats() {
    let test_env = TestProject::new();
    sample_project(&test_env, "app");

    let table_output = test_env.run_auditor("app", &["check", "--format", "table"]);
    assert!(table_output.status.success());
    assert!(stdout(&table_output).contains("License Summary"));

    let csv_output = test_env.run_auditor("app", &["check", "--format", "csv"]);
    assert!(csv_output.status.success());
    let csv = stdout(&csv_output);
    assert!(csv.starts_with("\"module name\",\"version\",\"licenses\""));
    assert!(csv.contains("\"left-pad\",\"1.0.0\",\"MIT\""));

    let licenses_output = test_env.run_auditor("app", &["check", "--licenses"]);
    assert!(stdout(&licenses_output).contains("GPL-3.0: gpl-thing"));
}

#[test]
fn test_output_file() {
    let test_env = TestProject::new();
    sample_project(&test_env, "app");

    let output = test_env.run_auditor("app", &["check", "-f", "json", "-o", "report.json"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());

    let content = fs::read_to_string(test_env.path("app/report.json")).unwrap();
    assert!(content.contains("\"generated_at\""));
}

#[test]
fn test_fail_on_glob() {
    let test_env = TestProject::new();
    sample_project(&test_env, "app");

    let output = test_env.run_auditor("app", &["-q", "check", "--fail-on", "*gpl*"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("GPL-3.0"));

    let output = test_env.run_auditor("app", &["-q", "check", "--fail-on", "AGPL*"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_fail_on_missing() {
    let test_env = TestProject::new();
    test_env.init_node_project("app", &["mystery"]);
    test_env.install("app", "mystery", None);

    let output = test_env.run_auditor("app", &["check", "--format", "json"]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["unresolved"][0]["name"], "mystery");

    let output = test_env.run_auditor("app", &["-q", "check", "--fail-on-missing"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_whitelist_violation_detection() {
    let test_env = TestProject::new();
    sample_project(&test_env, "app");

    let init_output = test_env.run_auditor("app", &["init", "strict"]);
    assert!(init_output.status.success(), "stderr: {}", stderr(&init_output));
    assert!(test_env.path("app/license-whitelist.json").exists());
    let config = fs::read_to_string(test_env.path("app/.node-license-auditor.toml")).unwrap();
    assert!(config.contains("whitelist = \"license-whitelist.json\""));

    let output = test_env.run_auditor("app", &["check", "--format", "json"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("violations found"));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let violations = report["whitelist"]["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["name"], "gpl-thing");
    assert_eq!(report["whitelist"]["valid"], 2);
}

#[test]
fn test_init_refuses_to_overwrite() {
    let test_env = TestProject::new();
    sample_project(&test_env, "app");

    assert!(test_env.run_auditor("app", &["init"]).status.success());
    let output = test_env.run_auditor("app", &["init", "lenient"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--force"));

    let output = test_env.run_auditor("app", &["init", "lenient", "--force"]);
    assert!(output.status.success());

    let output = test_env.run_auditor("app", &["-q", "check"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_fix_subcommand() {
    let test_env = TestProject::new();
    sample_project(&test_env, "app");
    assert!(test_env.run_auditor("app", &["init", "strict"]).status.success());

    let dry_run = test_env.run_auditor("app", &["fix", "--dry-run"]);
    assert!(dry_run.status.success());
    assert!(stdout(&dry_run).contains("Would add 1 exceptions"));
    assert_eq!(test_env.run_auditor("app", &["-q", "check"]).status.code(), Some(4));

    let fix = test_env.run_auditor("app", &["fix"]);
    assert!(fix.status.success());
    assert!(stdout(&fix).contains("gpl-thing"));

    let whitelist: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(test_env.path("app/license-whitelist.json")).unwrap(),
    )
    .unwrap();
    let rule = whitelist
        .as_array()
        .unwrap()
        .iter()
        .find(|rule| rule["license"] == "GPL-3.0")
        .unwrap();
    assert_eq!(rule["modules"], serde_json::json!(["gpl-thing"]));

    let output = test_env.run_auditor("app", &["check", "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["whitelist"]["exceptions"][0]["name"], "gpl-thing");
}

#[test]
fn test_fix_without_whitelist() {
    let test_env = TestProject::new();
    sample_project(&test_env, "app");

    let output = test_env.run_auditor("app", &["fix"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("init"));
}

#[test]
fn test_broken_whitelist_fails_before_scanning() {
    let test_env = TestProject::new();
    test_env.write("empty/package.json", "{}");
    test_env.write("empty/whitelist.json", "{ not json");

    let output = test_env.run_auditor("empty", &["check", "-w", "whitelist.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("not valid JSON"));
}

#[test]
fn test_prod_only() {
    let test_env = TestProject::new();
    test_env.init_node_project("app", &["left-pad"]);
    test_env.install("app", "left-pad", Some("MIT"));
    test_env.install("app", "dev-tool", Some("GPL-3.0"));

    let output = test_env.run_auditor("app", &["check", "--prod", "--licenses"]);
    assert!(output.status.success());
    let licenses = stdout(&output);
    assert!(licenses.contains("MIT: left-pad"));
    assert!(!licenses.contains("dev-tool"));

    test_env.init_node_project("app", &["left-pad", "not-installed"]);
    let output = test_env.run_auditor("app", &["check", "--prod"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("npm install"));
}

#[test]
fn test_roots_from_stdin_are_merged() {
    let test_env = TestProject::new();
    test_env.init_node_project("one", &["left-pad"]);
    test_env.install("one", "left-pad", Some("MIT"));
    test_env.init_node_project("two", &["left-pad", "right-pad"]);
    test_env.install("two", "left-pad", Some("MIT"));
    test_env.install("two", "right-pad", Some("ISC"));

    let output = test_env.run_auditor_with_stdin("", &["check", "-", "-f", "json"], "one\ntwo\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let packages = report["packages"].as_array().unwrap();
    assert_eq!(packages.len(), 2);
    assert_eq!(packages[0]["name"], "left-pad");
    assert_eq!(packages[0]["parents"], serde_json::json!(["one", "two"]));
    assert_eq!(packages[1]["parents"], serde_json::json!(["two"]));
}

#[test]
fn test_not_a_node_project() {
    let test_env = TestProject::new();
    test_env.write("plain/readme.txt", "hello");

    let output = test_env.run_auditor("plain", &["check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("package.json"));
}

#[test]
fn test_config_subcommand() {
    let test_env = TestProject::new();
    test_env.write("app/.node-license-auditor.toml", "format = \"json\"\nprod = true\n");

    let output = test_env.run_auditor("app", &["config", "--show"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("\"prod\": true"));

    let output = test_env.run_auditor("app", &["config", "--validate"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Configuration is valid"));

    test_env.write("app/.node-license-auditor.toml", "format = \"xml\"\n");
    let output = test_env.run_auditor("app", &["config", "--validate"]);
    assert_eq!(output.status.code(), Some(1));

    let output = test_env.run_auditor("app", &["config"]);
    assert_eq!(output.status.code(), Some(1));
}
