//! Root-cause narratives.
//!
//! Each explanation is rendered from the firing rule's fixed templates:
//! a root-cause label and detail, a severity rationale, the cost
//! propagation path from the adjacency table, and ranked
//! recommendations. The delta justification re-derives the predictor's
//! arithmetic as a literal string so the estimate can be audited
//! without re-running the tool.

use tera::{Context, Tera};

use crate::analyzer::autofix;
use crate::analyzer::pricing::{self, FALLBACK_HOURLY_UPLIFT};
use crate::analyzer::rules::{self, Rule};
use crate::analyzer::{
    BasisModel, CalculationBasis, CostPrediction, Explanation, Finding, Recommendation,
};
use crate::common::Money;
use crate::error::{AnalysisError, Result};

/// Explain every finding, in finding order. Findings and predictions
/// are matched by finding id.
pub fn explain_all(
    findings: &[Finding],
    predictions: &[CostPrediction],
) -> Result<Vec<Explanation>> {
    findings
        .iter()
        .map(|finding| {
            let prediction = predictions
                .iter()
                .find(|p| p.finding_id == finding.id)
                .ok_or_else(|| AnalysisError::WrongDocument {
                    expected: "predict",
                    reason: format!("finding {} has no cost prediction", finding.id),
                })?;
            explain(finding, prediction)
        })
        .collect()
}

/// Build the explanation for one finding/prediction pair.
pub fn explain(finding: &Finding, prediction: &CostPrediction) -> Result<Explanation> {
    let rule = rules::find_rule(&finding.rule_id).ok_or_else(|| {
        AnalysisError::WrongDocument {
            expected: "predict",
            reason: format!("unknown rule id '{}'", finding.rule_id),
        }
    })?;

    let context = template_context(finding, rule);
    let detail = Tera::one_off(rule.narrative.root_cause_detail, &context, false)?;
    let severity_rationale = Tera::one_off(rule.narrative.severity_rationale, &context, false)?;

    let midpoint = Money::midpoint(prediction.monthly_delta_low, prediction.monthly_delta_high);
    let recommendations = rule
        .narrative
        .recommendations
        .iter()
        .map(|template| {
            Ok(Recommendation {
                priority: template.priority,
                action: Tera::one_off(template.action, &context, false)?,
                potential_savings: midpoint.scale(template.savings_fraction),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut propagation = vec![finding.resource_address.clone()];
    propagation.extend(
        rules::dependency_path(&finding.resource_type)
            .iter()
            .map(|s| s.to_string()),
    );

    Ok(Explanation {
        finding_id: finding.id.clone(),
        rule_id: finding.rule_id.clone(),
        root_cause: format!("{}: {}", rule.narrative.root_cause_label, detail),
        regression_type: finding.change_type,
        severity_rationale,
        delta_justification: delta_trace(
            &prediction.basis,
            prediction.monthly_delta_low,
            prediction.monthly_delta_high,
        ),
        cost_propagation_path: propagation,
        recommendations,
    })
}

/// Deduplicate recommendations across explanations: same action sums
/// its savings and keeps its highest priority. Ordered by priority,
/// then first occurrence.
pub fn aggregate_recommendations(explanations: &[Explanation]) -> Vec<Recommendation> {
    let mut merged: Vec<Recommendation> = Vec::new();
    for explanation in explanations {
        for rec in &explanation.recommendations {
            match merged.iter_mut().find(|m| m.action == rec.action) {
                Some(existing) => {
                    existing.potential_savings += rec.potential_savings;
                    existing.priority = existing.priority.min(rec.priority);
                }
                None => merged.push(rec.clone()),
            }
        }
    }
    merged.sort_by_key(|rec| rec.priority);
    merged
}

fn template_context(finding: &Finding, rule: &Rule) -> Context {
    let before = display_value(&finding.before);
    let after = display_value(&finding.after);
    let recommended = autofix::right_size_target(&after).unwrap_or_else(|| before.clone());

    let mut context = Context::new();
    context.insert("address", &finding.resource_address);
    context.insert("before", &before);
    context.insert("after", &after);
    context.insert("score", &rule.severity_score);
    context.insert("recommended", &recommended);
    context
}

fn display_value(value: &Option<serde_json::Value>) -> String {
    match value {
        None => "absent".to_string(),
        Some(serde_json::Value::Null) => "absent".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn fmt_window(min: f64, max: f64) -> String {
    if min == max {
        format!("{}", min)
    } else {
        format!("{}-{}", min, max)
    }
}

fn fmt_money_range(low: Money, high: Money) -> String {
    if low == high {
        format!("${}/mo", low)
    } else {
        format!("${}-${}/mo", low, high)
    }
}

/// Re-derive the predictor's arithmetic as a literal trace string.
fn delta_trace(basis: &CalculationBasis, low: Money, high: Money) -> String {
    let window = fmt_window(basis.scaling_min, basis.scaling_max);
    let range = fmt_money_range(low, high);
    match basis.model {
        BasisModel::InstanceHours => {
            if basis.rate_before == "n/a" {
                format!(
                    "assumed +${}/hr uplift × {} h/mo × {} instances = {}",
                    pricing::fmt_rate(FALLBACK_HOURLY_UPLIFT),
                    basis.hours_per_month,
                    window,
                    range
                )
            } else {
                format!(
                    "(${}/hr - ${}/hr) × {} h/mo × {} instances = {}",
                    basis.rate_after, basis.rate_before, basis.hours_per_month, window, range
                )
            }
        }
        BasisModel::UnitHours => {
            let utilization = if basis.scaling_min == 1.0 && basis.scaling_max == 1.0 {
                String::new()
            } else {
                format!(" × {} utilization", window)
            };
            format!(
                "({} - {}) {}s × ${}/{}-hr × {} h/mo{} = {}",
                basis.after_value,
                basis.before_value,
                basis.unit,
                basis.unit_price,
                basis.unit,
                basis.hours_per_month,
                utilization,
                range
            )
        }
        BasisModel::UnitMonthly => format!(
            "({} - {}) {} × ${}/{}-month = {}",
            basis.after_value, basis.before_value, basis.unit, basis.unit_price, basis.unit, range
        ),
        BasisModel::GatewayMonthly => format!(
            "${}/hr × {} h/mo + ${}/GB × {} GB/mo = {}",
            basis.rate_after, basis.hours_per_month, basis.unit_price, window, range
        ),
        BasisModel::StorageAccrual => format!(
            "{} GB/mo retained × ${}/GB-month = {}",
            window, basis.unit_price, range
        ),
    }
}
