use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn costpilot() -> Command {
    Command::cargo_bin("costpilot").unwrap()
}

fn fixture(name: &str) -> String {
    Path::new("tests/fixtures/plans")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

#[test]
fn detect_chains_through_the_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let detect_path = dir.path().join("detect.json");
    let predict_path = dir.path().join("predict.json");
    let explain_path = dir.path().join("explain.json");
    let fix_path = dir.path().join("fix.tf");

    costpilot()
        .args([
            "detect",
            "--baseline",
            &fixture("mixed_baseline.json"),
            "--pr",
            &fixture("mixed_pr.json"),
            "--output",
        ])
        .arg(&detect_path)
        .args(["--format", "json"])
        .assert()
        .success();

    costpilot()
        .args(["predict", "--input"])
        .arg(&detect_path)
        .arg("--output")
        .arg(&predict_path)
        .args(["--format", "json"])
        .assert()
        .success();

    costpilot()
        .args(["explain", "--input"])
        .arg(&predict_path)
        .arg("--output")
        .arg(&explain_path)
        .args(["--format", "json"])
        .assert()
        .success();

    costpilot()
        .args(["autofix", "--input"])
        .arg(&explain_path)
        .arg("--output")
        .arg(&fix_path)
        .assert()
        .success();

    let detect: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&detect_path).unwrap()).unwrap();
    assert_eq!(detect["summary"]["total_findings"], 4);
    assert_eq!(detect["metadata"]["schema_version"], "1");

    let snippet = fs::read_to_string(&fix_path).unwrap();
    assert!(snippet.contains("instance_type = \"t3.large\""));
    let patch = fs::read_to_string(fix_path.with_extension("patch")).unwrap();
    assert!(patch.contains("+++ b/main.tf"));
}

#[test]
fn zero_findings_still_exits_zero() {
    costpilot()
        .args([
            "detect",
            "--baseline",
            &fixture("reference_baseline.json"),
            "--pr",
            &fixture("noop_pr.json"),
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_findings\": 0"));
}

#[test]
fn malformed_plan_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("detect.json");

    costpilot()
        .args([
            "detect",
            "--baseline",
            &fixture("malformed.json"),
            "--pr",
            &fixture("reference_pr.json"),
            "--output",
        ])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed plan"));

    assert!(!output.exists(), "no partial output on malformed input");
}

#[test]
fn fail_on_findings_grades_the_exit_code() {
    costpilot()
        .args([
            "detect",
            "--baseline",
            &fixture("reference_baseline.json"),
            "--pr",
            &fixture("reference_pr.json"),
            "--fail-on-findings",
            "--format",
            "json",
        ])
        .assert()
        .code(1);
}

#[test]
fn detect_output_is_stable_across_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    for path in [&first, &second] {
        costpilot()
            .args([
                "detect",
                "--baseline",
                &fixture("mixed_baseline.json"),
                "--pr",
                &fixture("mixed_pr.json"),
                "--format",
                "json",
                "--output",
            ])
            .arg(path)
            .assert()
            .success();
    }

    assert_eq!(
        fs::read(&first).unwrap(),
        fs::read(&second).unwrap(),
        "reports must be byte-identical"
    );
}

#[test]
fn batch_processes_pairs_and_summarizes() {
    let pairs = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let pair = pairs.path().join("pr-101");
    fs::create_dir_all(&pair).unwrap();
    fs::copy(fixture("mixed_baseline.json"), pair.join("baseline.json")).unwrap();
    fs::copy(fixture("mixed_pr.json"), pair.join("pr.json")).unwrap();

    let clean = pairs.path().join("pr-102");
    fs::create_dir_all(&clean).unwrap();
    fs::copy(fixture("reference_baseline.json"), clean.join("baseline.json")).unwrap();
    fs::copy(fixture("noop_pr.json"), clean.join("pr.json")).unwrap();

    costpilot()
        .args(["batch", "--pairs"])
        .arg(pairs.path())
        .arg("--output")
        .arg(out.path())
        .assert()
        .success();

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.path().join("batch_summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["pairs_processed"], 2);
    assert_eq!(summary["pairs_with_findings"], 1);
    assert!(out.path().join("pr-101/explain.json").exists());
}

#[test]
fn batch_with_a_broken_pair_fails_but_summarizes() {
    let pairs = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let pair = pairs.path().join("pr-broken");
    fs::create_dir_all(&pair).unwrap();
    fs::copy(fixture("malformed.json"), pair.join("baseline.json")).unwrap();
    fs::copy(fixture("reference_pr.json"), pair.join("pr.json")).unwrap();

    costpilot()
        .args(["batch", "--pairs"])
        .arg(pairs.path())
        .arg("--output")
        .arg(out.path())
        .assert()
        .failure();

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.path().join("batch_summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["failures"].as_array().unwrap().len(), 1);
}

#[test]
fn rules_lists_the_table() {
    costpilot()
        .args(["rules", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ec2-instance-type-upgrade"))
        .stdout(predicate::str::contains("s3-lifecycle-disabled"));
}
