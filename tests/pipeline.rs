use std::path::PathBuf;

use costpilot::analyzer::{
    Severity, load_plan_pair, run_autofix, run_detect, run_explain, run_predict,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from("tests/fixtures/plans").join(name)
}

#[test]
fn reference_scenario_end_to_end() {
    let detect = run_detect(
        &fixture("reference_baseline.json"),
        &fixture("reference_pr.json"),
        "us-east-1",
        Severity::Low,
    )
    .unwrap();

    assert_eq!(detect.summary.total_findings, 1);
    let finding = &detect.findings[0];
    assert_eq!(finding.id, "F-001");
    assert_eq!(finding.rule_id, "ec2-instance-type-upgrade");
    assert_eq!(finding.severity, Severity::High);
    assert_eq!(finding.severity_score, 85);
    assert_eq!(finding.resource_address, "aws_launch_template.main");

    let predict = run_predict(&detect).unwrap();
    let prediction = &predict.cost_breakdown[0];
    assert_eq!(prediction.monthly_delta_low.to_string(), "227.76");
    assert_eq!(prediction.monthly_delta_high.to_string(), "455.52");

    let explain = run_explain(&predict).unwrap();
    let explanation = &explain.explanations[0];
    assert!(explanation.delta_justification.contains("$0.1664/hr"));
    assert!(explanation.delta_justification.contains("$0.0104/hr"));
    assert!(explanation.delta_justification.contains("730 h/mo"));

    let autofix = run_autofix(&explain).unwrap();
    assert_eq!(autofix.summary.fixable_findings, 1);
    assert!(
        autofix.fixes[0]
            .after_snippet
            .contains("instance_type = \"t3.large\"")
    );
}

#[test]
fn repeated_runs_are_byte_identical() {
    let run = || {
        let detect = run_detect(
            &fixture("mixed_baseline.json"),
            &fixture("mixed_pr.json"),
            "us-east-1",
            Severity::Low,
        )
        .unwrap();
        let predict = run_predict(&detect).unwrap();
        let explain = run_explain(&predict).unwrap();
        (
            serde_json::to_string_pretty(&detect).unwrap(),
            serde_json::to_string_pretty(&predict).unwrap(),
            serde_json::to_string_pretty(&explain).unwrap(),
        )
    };

    let first = run();
    for _ in 0..5 {
        assert_eq!(run(), first);
    }
}

#[test]
fn formatting_only_differences_yield_zero_findings() {
    // noop_pr.json is reference_baseline.json with resource order,
    // key order, and whitespace shuffled.
    let detect = run_detect(
        &fixture("reference_baseline.json"),
        &fixture("noop_pr.json"),
        "us-east-1",
        Severity::Low,
    )
    .unwrap();
    assert_eq!(detect.summary.total_findings, 0);
    assert_eq!(detect.summary.resource_changes_examined, 0);
}

#[test]
fn mixed_pair_fires_rules_in_table_order() {
    let detect = run_detect(
        &fixture("mixed_baseline.json"),
        &fixture("mixed_pr.json"),
        "us-east-1",
        Severity::Low,
    )
    .unwrap();

    let rule_ids: Vec<&str> = detect
        .findings
        .iter()
        .map(|f| f.rule_id.as_str())
        .collect();
    assert_eq!(
        rule_ids,
        vec![
            "ec2-instance-type-upgrade",
            "nat-gateway-added",
            "s3-lifecycle-disabled",
            "log-retention-disabled",
        ]
    );
    let ids: Vec<&str> = detect.findings.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["F-001", "F-002", "F-003", "F-004"]);
}

#[test]
fn every_finding_references_an_input_change() {
    let changes = load_plan_pair(
        &fixture("mixed_baseline.json"),
        &fixture("mixed_pr.json"),
    )
    .unwrap();
    let detect = run_detect(
        &fixture("mixed_baseline.json"),
        &fixture("mixed_pr.json"),
        "us-east-1",
        Severity::Low,
    )
    .unwrap();

    for finding in &detect.findings {
        assert!(
            changes.iter().any(|c| {
                c.address == finding.resource_address
                    && c.attribute_path == finding.attribute_path
            }),
            "orphan finding {} ({})",
            finding.id,
            finding.resource_address
        );
    }
}

#[test]
fn unknown_resource_types_are_silently_skipped() {
    let detect = run_detect(
        &fixture("mixed_baseline.json"),
        &fixture("mixed_pr.json"),
        "us-east-1",
        Severity::Low,
    )
    .unwrap();
    assert!(
        detect
            .findings
            .iter()
            .all(|f| f.resource_type != "aws_iam_role")
    );
}

#[test]
fn autofix_scope_is_restricted() {
    let detect = run_detect(
        &fixture("mixed_baseline.json"),
        &fixture("mixed_pr.json"),
        "us-east-1",
        Severity::Low,
    )
    .unwrap();
    let predict = run_predict(&detect).unwrap();
    let explain = run_explain(&predict).unwrap();
    let autofix = run_autofix(&explain).unwrap();

    // Of the four findings only the launch template and the lifecycle
    // configuration are patchable.
    assert_eq!(autofix.summary.total_findings, 4);
    assert_eq!(autofix.summary.fixable_findings, 2);
    let fixed: Vec<&str> = autofix
        .fixes
        .iter()
        .map(|f| f.resource_address.as_str())
        .collect();
    assert_eq!(
        fixed,
        vec![
            "aws_launch_template.main",
            "aws_s3_bucket_lifecycle_configuration.logs"
        ]
    );
}

#[test]
fn all_currency_output_has_two_decimals() {
    let detect = run_detect(
        &fixture("mixed_baseline.json"),
        &fixture("mixed_pr.json"),
        "us-east-1",
        Severity::Low,
    )
    .unwrap();
    let predict = run_predict(&detect).unwrap();
    let json = serde_json::to_value(&predict).unwrap();

    let mut checked = 0;
    check_currency_strings(&json, &mut checked);
    assert!(checked > 0, "expected currency fields in the report");
}

fn check_currency_strings(value: &serde_json::Value, checked: &mut usize) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, v) in map {
                if key.contains("delta") || key.contains("savings") || key.contains("cumulative") {
                    if let serde_json::Value::String(s) = v {
                        let (_, frac) = s.split_once('.').expect("currency must have decimals");
                        assert_eq!(frac.len(), 2, "{}: '{}'", key, s);
                        *checked += 1;
                    }
                }
                check_currency_strings(v, checked);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                check_currency_strings(item, checked);
            }
        }
        _ => {}
    }
}

#[test]
fn severity_threshold_drops_low_findings() {
    let all = run_detect(
        &fixture("mixed_baseline.json"),
        &fixture("mixed_pr.json"),
        "us-east-1",
        Severity::Low,
    )
    .unwrap();
    let high_only = run_detect(
        &fixture("mixed_baseline.json"),
        &fixture("mixed_pr.json"),
        "us-east-1",
        Severity::High,
    )
    .unwrap();

    assert!(high_only.summary.total_findings < all.summary.total_findings);
    assert!(
        high_only
            .findings
            .iter()
            .all(|f| f.severity == Severity::High)
    );
}
