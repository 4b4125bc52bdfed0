//! Monthly cost delta prediction.
//!
//! Every prediction is static-table arithmetic: a unit price from the
//! bundled us-east-1 tables times a per-rule cold-start scaling window.
//! The assumptions behind an estimate are recorded verbatim so a human
//! can audit it, and the calculation inputs are echoed in a
//! [`CalculationBasis`] so the explainer can re-derive the math as a
//! literal trace.

use serde_json::Value;

use crate::analyzer::pricing::{self, FALLBACK_HOURLY_UPLIFT};
use crate::analyzer::rules::{self, CostBasis, HOURS_PER_MONTH, Rule};
use crate::analyzer::{
    BasisModel, CalculationBasis, Confidence, CostPrediction, Finding, Heuristic,
};
use crate::common::Money;
use crate::error::{AnalysisError, Result};

const SOURCE_PRICING_TABLE: &str = "aws-pricing-table";
const SOURCE_ASSUMPTION: &str = "cold-start-assumption";

/// Predict the cost delta for every finding, in finding order.
pub fn predict_all(findings: &[Finding]) -> Result<Vec<CostPrediction>> {
    findings.iter().map(predict).collect()
}

/// Predict the monthly cost delta range for one finding.
pub fn predict(finding: &Finding) -> Result<CostPrediction> {
    let rule = rules::find_rule(&finding.rule_id).ok_or_else(|| {
        AnalysisError::WrongDocument {
            expected: "detect",
            reason: format!("unknown rule id '{}'", finding.rule_id),
        }
    })?;

    let prediction = match rule.cost_basis {
        CostBasis::InstanceHours(family) => instance_hours(finding, rule, family),
        CostBasis::UnitHours { unit_price, unit } => {
            unit_delta(finding, rule, unit_price, unit, true)
        }
        CostBasis::UnitMonthly { unit_price, unit } => {
            unit_delta(finding, rule, unit_price, unit, false)
        }
        CostBasis::GatewayMonthly { hourly, per_gb } => gateway_monthly(finding, rule, hourly, per_gb),
        CostBasis::StorageAccrual { gb_price } => storage_accrual(finding, rule, gb_price),
    };

    debug_assert!(prediction.monthly_delta_low <= prediction.monthly_delta_high);
    Ok(prediction)
}

fn value_display(value: &Option<Value>) -> String {
    match value {
        None => "absent".to_string(),
        Some(Value::Null) => "absent".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn numeric(value: &Option<Value>) -> f64 {
    value.as_ref().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

fn pricing_heuristic(reference: String) -> Heuristic {
    Heuristic {
        source: SOURCE_PRICING_TABLE.to_string(),
        reference,
        confidence: Confidence::High,
    }
}

fn assumption_heuristic(reference: &str) -> Heuristic {
    Heuristic {
        source: SOURCE_ASSUMPTION.to_string(),
        reference: reference.to_string(),
        confidence: Confidence::Moderate,
    }
}

fn instance_hours(finding: &Finding, rule: &Rule, family: rules::PriceFamily) -> CostPrediction {
    let before_class = value_display(&finding.before);
    let after_class = value_display(&finding.after);
    let rate_before = pricing::hourly_rate(family, &before_class);
    let rate_after = pricing::hourly_rate(family, &after_class);

    let mut heuristics = Vec::new();
    let mut assumptions = vec![rule.scaling.assumption.to_string()];

    let (delta_rate, rate_before_s, rate_after_s) = match (rate_before, rate_after) {
        (Some(before), Some(after)) => {
            heuristics.push(pricing_heuristic(format!(
                "us-east-1 on-demand {}: ${}/hr",
                before_class,
                pricing::fmt_rate(before)
            )));
            heuristics.push(pricing_heuristic(format!(
                "us-east-1 on-demand {}: ${}/hr",
                after_class,
                pricing::fmt_rate(after)
            )));
            (
                (after - before).max(0.0),
                pricing::fmt_rate(before),
                pricing::fmt_rate(after),
            )
        }
        _ => {
            let note = format!(
                "instance class not in the bundled pricing table; assumed +${}/hr uplift",
                pricing::fmt_rate(FALLBACK_HOURLY_UPLIFT)
            );
            heuristics.push(assumption_heuristic(&note));
            assumptions.push(note);
            (
                FALLBACK_HOURLY_UPLIFT,
                "n/a".to_string(),
                "n/a".to_string(),
            )
        }
    };
    heuristics.push(assumption_heuristic(rule.scaling.assumption));

    let monthly_per_unit = delta_rate * f64::from(HOURS_PER_MONTH);
    CostPrediction {
        finding_id: finding.id.clone(),
        rule_id: finding.rule_id.clone(),
        monthly_delta_low: Money::from_dollars(monthly_per_unit * rule.scaling.min),
        monthly_delta_high: Money::from_dollars(monthly_per_unit * rule.scaling.max),
        heuristics,
        cold_start_assumptions: assumptions,
        basis: CalculationBasis {
            model: BasisModel::InstanceHours,
            before_value: before_class,
            after_value: after_class,
            rate_before: rate_before_s,
            rate_after: rate_after_s,
            unit_price: "n/a".to_string(),
            unit: "instance".to_string(),
            hours_per_month: HOURS_PER_MONTH,
            scaling_min: rule.scaling.min,
            scaling_max: rule.scaling.max,
        },
    }
}

fn unit_delta(
    finding: &Finding,
    rule: &Rule,
    unit_price: f64,
    unit: &str,
    hourly: bool,
) -> CostPrediction {
    let before = numeric(&finding.before);
    let after = numeric(&finding.after);
    let diff = (after - before).max(0.0);

    let per_month = if hourly {
        diff * unit_price * f64::from(HOURS_PER_MONTH)
    } else {
        diff * unit_price
    };

    let price_label = if hourly {
        format!(
            "us-east-1 on-demand: ${}/{} per hour",
            pricing::fmt_rate(unit_price),
            unit
        )
    } else {
        format!(
            "us-east-1: ${}/{} per month",
            pricing::fmt_rate(unit_price),
            unit
        )
    };

    CostPrediction {
        finding_id: finding.id.clone(),
        rule_id: finding.rule_id.clone(),
        monthly_delta_low: Money::from_dollars(per_month * rule.scaling.min),
        monthly_delta_high: Money::from_dollars(per_month * rule.scaling.max),
        heuristics: vec![
            pricing_heuristic(price_label),
            assumption_heuristic(rule.scaling.assumption),
        ],
        cold_start_assumptions: vec![rule.scaling.assumption.to_string()],
        basis: CalculationBasis {
            model: if hourly {
                BasisModel::UnitHours
            } else {
                BasisModel::UnitMonthly
            },
            before_value: value_display(&finding.before),
            after_value: value_display(&finding.after),
            rate_before: "n/a".to_string(),
            rate_after: "n/a".to_string(),
            unit_price: pricing::fmt_rate(unit_price),
            unit: unit.to_string(),
            hours_per_month: if hourly { HOURS_PER_MONTH } else { 0 },
            scaling_min: rule.scaling.min,
            scaling_max: rule.scaling.max,
        },
    }
}

fn gateway_monthly(finding: &Finding, rule: &Rule, hourly: f64, per_gb: f64) -> CostPrediction {
    let fixed = hourly * f64::from(HOURS_PER_MONTH);
    CostPrediction {
        finding_id: finding.id.clone(),
        rule_id: finding.rule_id.clone(),
        monthly_delta_low: Money::from_dollars(fixed + per_gb * rule.scaling.min),
        monthly_delta_high: Money::from_dollars(fixed + per_gb * rule.scaling.max),
        heuristics: vec![
            pricing_heuristic(format!(
                "us-east-1 NAT gateway: ${}/hr plus ${}/GB processed",
                pricing::fmt_rate(hourly),
                pricing::fmt_rate(per_gb)
            )),
            assumption_heuristic(rule.scaling.assumption),
        ],
        cold_start_assumptions: vec![rule.scaling.assumption.to_string()],
        basis: CalculationBasis {
            model: BasisModel::GatewayMonthly,
            before_value: "absent".to_string(),
            after_value: "created".to_string(),
            rate_before: "0".to_string(),
            rate_after: pricing::fmt_rate(hourly),
            unit_price: pricing::fmt_rate(per_gb),
            unit: "GB".to_string(),
            hours_per_month: HOURS_PER_MONTH,
            scaling_min: rule.scaling.min,
            scaling_max: rule.scaling.max,
        },
    }
}

fn storage_accrual(finding: &Finding, rule: &Rule, gb_price: f64) -> CostPrediction {
    CostPrediction {
        finding_id: finding.id.clone(),
        rule_id: finding.rule_id.clone(),
        monthly_delta_low: Money::from_dollars(gb_price * rule.scaling.min),
        monthly_delta_high: Money::from_dollars(gb_price * rule.scaling.max),
        heuristics: vec![
            pricing_heuristic(format!(
                "us-east-1 storage: ${}/GB-month",
                pricing::fmt_rate(gb_price)
            )),
            assumption_heuristic(rule.scaling.assumption),
        ],
        cold_start_assumptions: vec![rule.scaling.assumption.to_string()],
        basis: CalculationBasis {
            model: BasisModel::StorageAccrual,
            before_value: value_display(&finding.before),
            after_value: value_display(&finding.after),
            rate_before: "n/a".to_string(),
            rate_after: "n/a".to_string(),
            unit_price: pricing::fmt_rate(gb_price),
            unit: "GB".to_string(),
            hours_per_month: 0,
            scaling_min: rule.scaling.min,
            scaling_max: rule.scaling.max,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::detector::detect;
    use crate::analyzer::{ResourceChange, Severity};
    use serde_json::json;

    fn findings_for(changes: Vec<ResourceChange>) -> Vec<Finding> {
        detect(&changes, Severity::Low)
    }

    fn change(
        address: &str,
        resource_type: &str,
        path: &str,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
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
    fn reference_scenario_delta_window() {
        let findings = findings_for(vec![change(
            "aws_launch_template.main",
            "aws_launch_template",
            "instance_type",
            Some(json!("t3.micro")),
            Some(json!("t3.xlarge")),
        )]);
        let prediction = predict(&findings[0]).unwrap();

        // (0.1664 - 0.0104) * 730 * 2..4
        assert_eq!(prediction.monthly_delta_low.to_string(), "227.76");
        assert_eq!(prediction.monthly_delta_high.to_string(), "455.52");
        assert_eq!(
            prediction.cold_start_assumptions,
            vec!["2-4 instances running this instance type (autoscaling group average)"]
        );
        assert_eq!(prediction.basis.rate_before, "0.0104");
        assert_eq!(prediction.basis.rate_after, "0.1664");
    }

    #[test]
    fn pricing_sources_are_high_confidence_and_assumptions_moderate() {
        let findings = findings_for(vec![change(
            "aws_launch_template.main",
            "aws_launch_template",
            "instance_type",
            Some(json!("t3.micro")),
            Some(json!("t3.xlarge")),
        )]);
        let prediction = predict(&findings[0]).unwrap();

        let confidences: Vec<_> = prediction
            .heuristics
            .iter()
            .map(|h| (h.source.as_str(), h.confidence))
            .collect();
        assert_eq!(
            confidences,
            vec![
                ("aws-pricing-table", Confidence::High),
                ("aws-pricing-table", Confidence::High),
                ("cold-start-assumption", Confidence::Moderate),
            ]
        );
    }

    #[test]
    fn unknown_class_falls_back_to_uplift() {
        let findings = findings_for(vec![change(
            "aws_instance.web",
            "aws_instance",
            "instance_type",
            Some(json!("t3.micro")),
            Some(json!("x8g.48xlarge")),
        )]);
        let prediction = predict(&findings[0]).unwrap();

        // 0.05 * 730 * 2..4
        assert_eq!(prediction.monthly_delta_low.to_string(), "73.00");
        assert_eq!(prediction.monthly_delta_high.to_string(), "146.00");
        assert_eq!(prediction.basis.rate_before, "n/a");
        assert_eq!(prediction.cold_start_assumptions.len(), 2);
    }

    #[test]
    fn nat_gateway_burn_includes_fixed_and_processed() {
        let findings = findings_for(vec![change(
            "aws_nat_gateway.egress",
            "aws_nat_gateway",
            "",
            None,
            Some(json!({ "connectivity_type": "public" })),
        )]);
        let prediction = predict(&findings[0]).unwrap();

        // 0.045 * 730 + 0.045 * 100..500
        assert_eq!(prediction.monthly_delta_low.to_string(), "37.35");
        assert_eq!(prediction.monthly_delta_high.to_string(), "55.35");
    }

    #[test]
    fn low_is_never_above_high() {
        let cases = vec![
            change(
                "aws_autoscaling_group.web",
                "aws_autoscaling_group",
                "max_size",
                Some(json!(4)),
                Some(json!(12)),
            ),
            change(
                "aws_cloudwatch_log_group.app",
                "aws_cloudwatch_log_group",
                "retention_in_days",
                Some(json!(30)),
                Some(json!(0)),
            ),
            change(
                "aws_ebs_volume.data",
                "aws_ebs_volume",
                "size",
                Some(json!(100)),
                Some(json!(500)),
            ),
        ];
        for finding in findings_for(cases) {
            let prediction = predict(&finding).unwrap();
            assert!(prediction.monthly_delta_low <= prediction.monthly_delta_high);
        }
    }

    #[test]
    fn unknown_rule_id_is_a_wrong_document() {
        let mut finding = findings_for(vec![change(
            "aws_instance.web",
            "aws_instance",
            "instance_type",
            Some(json!("t3.micro")),
            Some(json!("t3.large")),
        )])
        .remove(0);
        finding.rule_id = "made-up-rule".to_string();
        assert!(predict(&finding).is_err());
    }
}
