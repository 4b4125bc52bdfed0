//! Rule-table walk over the normalized resource-change list.
//!
//! Rules are evaluated in declaration order and changes in loader order,
//! so findings come out in the same order on every run. Multiple rules
//! matching the same resource each produce an independent finding.
//! Resource types with no rule contribute nothing; an incomplete rule
//! table is expected, not an error.

use serde_json::Value;

use crate::analyzer::rules::{self, Predicate, Rule, Trigger};
use crate::analyzer::{Finding, ResourceChange, Severity};

/// Apply the rule table to the change list, dropping findings below
/// `min_severity`. Finding ids are assigned in emission order.
pub fn detect(changes: &[ResourceChange], min_severity: Severity) -> Vec<Finding> {
    let mut findings = Vec::new();
    for rule in rules::rule_table() {
        for change in changes {
            if !rule.resource_types.contains(&change.resource_type.as_str()) {
                continue;
            }
            if !trigger_matches(rule, change) || !predicate_fires(rule, change) {
                continue;
            }
            if rule.severity < min_severity {
                log::debug!(
                    "rule {} fired on {} below the severity threshold",
                    rule.id,
                    change.address
                );
                continue;
            }
            findings.push(new_finding(findings.len() + 1, rule, change));
        }
    }
    findings
}

fn new_finding(sequence: usize, rule: &Rule, change: &ResourceChange) -> Finding {
    Finding {
        id: format!("F-{:03}", sequence),
        rule_id: rule.id.to_string(),
        resource_type: change.resource_type.clone(),
        resource_name: change.name.clone(),
        resource_address: change.address.clone(),
        attribute_path: change.attribute_path.clone(),
        severity: rule.severity,
        severity_score: rule.severity_score,
        change_type: rule.change_type,
        cross_service_dependencies: rules::dependency_path(&change.resource_type)
            .iter()
            .map(|s| s.to_string())
            .collect(),
        before: change.before.clone(),
        after: change.after.clone(),
    }
}

fn trigger_matches(rule: &Rule, change: &ResourceChange) -> bool {
    match rule.trigger {
        Trigger::Attribute(path) => change.attribute_path == path,
        Trigger::ResourceCreated => {
            change.attribute_path.is_empty()
                && change.before.is_none()
                && change.after.is_some()
        }
    }
}

/// A JSON null is treated the same as an absent attribute.
fn present(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

fn predicate_fires(rule: &Rule, change: &ResourceChange) -> bool {
    match rule.predicate {
        Predicate::HourlyRateIncrease(family) => {
            let (Some(before), Some(after)) =
                (present(&change.before), present(&change.after))
            else {
                return false;
            };
            let (Some(before), Some(after)) = (before.as_str(), after.as_str()) else {
                return false;
            };
            if before == after {
                return false;
            }
            match (
                crate::analyzer::pricing::hourly_rate(family, before),
                crate::analyzer::pricing::hourly_rate(family, after),
            ) {
                (Some(rate_before), Some(rate_after)) => rate_after > rate_before,
                // Unknown class: fire conservatively, the predictor
                // downgrades confidence.
                _ => true,
            }
        }
        Predicate::NumericIncreaseAtLeast(factor) => {
            let (Some(before), Some(after)) =
                (present(&change.before), present(&change.after))
            else {
                return false;
            };
            let (Some(before), Some(after)) = (before.as_f64(), after.as_f64()) else {
                return false;
            };
            before > 0.0 && after >= before * factor
        }
        Predicate::StatusNoLongerEnabled => {
            let was_enabled = present(&change.before)
                .and_then(|v| v.as_str())
                .is_some_and(|s| s == "Enabled");
            let still_enabled = present(&change.after)
                .and_then(|v| v.as_str())
                .is_some_and(|s| s == "Enabled");
            was_enabled && !still_enabled
        }
        Predicate::RetentionDropsToZero => {
            let had_retention = present(&change.before)
                .and_then(|v| v.as_f64())
                .is_some_and(|n| n > 0.0);
            let dropped = match present(&change.after) {
                None => true,
                Some(v) => v.as_f64() == Some(0.0),
            };
            had_retention && dropped
        }
        Predicate::Always => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(
        address: &str,
        resource_type: &str,
        path: &str,
        before: Option<Value>,
        after: Option<Value>,
    ) -> ResourceChange {
        ResourceChange {
            address: address.to_string(),
            resource_type: resource_type.to_string(),
            name: address.rsplit('.').next().unwrap().to_string(),
            attribute_path: path.to_string(),
            before,
            after,
        }
    }

    #[test]
    fn instance_type_upgrade_fires_the_reference_rule() {
        let changes = vec![change(
            "aws_launch_template.main",
            "aws_launch_template",
            "instance_type",
            Some(json!("t3.micro")),
            Some(json!("t3.xlarge")),
        )];

        let findings = detect(&changes, Severity::Low);
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.id, "F-001");
        assert_eq!(finding.rule_id, "ec2-instance-type-upgrade");
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.severity_score, 85);
        assert_eq!(
            finding.cross_service_dependencies,
            vec!["aws_autoscaling_group", "aws_lb_target_group", "aws_lb"]
        );
    }

    #[test]
    fn instance_type_downgrade_does_not_fire() {
        let changes = vec![change(
            "aws_instance.web",
            "aws_instance",
            "instance_type",
            Some(json!("t3.xlarge")),
            Some(json!("t3.micro")),
        )];
        assert!(detect(&changes, Severity::Low).is_empty());
    }

    #[test]
    fn unknown_instance_class_fires_conservatively() {
        let changes = vec![change(
            "aws_instance.web",
            "aws_instance",
            "instance_type",
            Some(json!("t3.micro")),
            Some(json!("x8g.48xlarge")),
        )];
        assert_eq!(detect(&changes, Severity::Low).len(), 1);
    }

    #[test]
    fn unknown_resource_types_are_skipped() {
        let changes = vec![change(
            "aws_iam_role.deploy",
            "aws_iam_role",
            "name",
            Some(json!("a")),
            Some(json!("b")),
        )];
        assert!(detect(&changes, Severity::Low).is_empty());
    }

    #[test]
    fn multiple_rules_on_one_resource_produce_independent_findings() {
        let changes = vec![
            change(
                "aws_ebs_volume.data",
                "aws_ebs_volume",
                "iops",
                Some(json!(3000)),
                Some(json!(9000)),
            ),
            change(
                "aws_ebs_volume.data",
                "aws_ebs_volume",
                "size",
                Some(json!(100)),
                Some(json!(400)),
            ),
        ];

        let findings = detect(&changes, Severity::Low);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].rule_id, "ebs-iops-overprovisioned");
        assert_eq!(findings[1].rule_id, "ebs-volume-expansion");
        assert_eq!(findings[0].id, "F-001");
        assert_eq!(findings[1].id, "F-002");
    }

    #[test]
    fn capacity_increase_below_2x_does_not_fire() {
        let changes = vec![change(
            "aws_autoscaling_group.web",
            "aws_autoscaling_group",
            "max_size",
            Some(json!(4)),
            Some(json!(6)),
        )];
        assert!(detect(&changes, Severity::Low).is_empty());
    }

    #[test]
    fn retention_lift_fires_only_from_a_finite_baseline() {
        let dropped = change(
            "aws_cloudwatch_log_group.app",
            "aws_cloudwatch_log_group",
            "retention_in_days",
            Some(json!(30)),
            Some(json!(0)),
        );
        let already_infinite = change(
            "aws_cloudwatch_log_group.app",
            "aws_cloudwatch_log_group",
            "retention_in_days",
            Some(json!(0)),
            None,
        );
        assert_eq!(detect(&[dropped], Severity::Low).len(), 1);
        assert!(detect(&[already_infinite], Severity::Low).is_empty());
    }

    #[test]
    fn severity_threshold_filters_and_renumbers() {
        let changes = vec![
            change(
                "aws_ebs_volume.data",
                "aws_ebs_volume",
                "size",
                Some(json!(100)),
                Some(json!(400)),
            ),
            change(
                "aws_launch_template.main",
                "aws_launch_template",
                "instance_type",
                Some(json!("t3.micro")),
                Some(json!("t3.xlarge")),
            ),
        ];

        let findings = detect(&changes, Severity::High);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "ec2-instance-type-upgrade");
        assert_eq!(findings[0].id, "F-001");
    }

    #[test]
    fn nat_gateway_creation_fires() {
        let changes = vec![change(
            "aws_nat_gateway.egress",
            "aws_nat_gateway",
            "",
            None,
            Some(json!({ "connectivity_type": "public" })),
        )];
        let findings = detect(&changes, Severity::Low);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "nat-gateway-added");
    }

    #[test]
    fn lifecycle_status_to_absent_fires() {
        let changes = vec![change(
            "aws_s3_bucket_lifecycle_configuration.logs",
            "aws_s3_bucket_lifecycle_configuration",
            "rule.0.status",
            Some(json!("Enabled")),
            None,
        )];
        let findings = detect(&changes, Severity::Low);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "s3-lifecycle-disabled");
    }
}
