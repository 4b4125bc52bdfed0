//! # Analyzer Module
//!
//! This module provides the cost-regression analysis pipeline:
//! - Plan loading: normalizing a baseline/PR pair of Terraform plan JSON
//!   documents into a resource-change list
//! - Detection: walking the change list with a fixed, ordered rule table
//! - Prediction: attaching a monthly cost delta range per finding
//! - Explanation: root-cause narratives and auditable delta arithmetic
//! - Autofix: Terraform patches for the supported resource subset
//!
//! The pipeline is a single linear pass per run. Every stage is a pure
//! function of its input, and repeated runs over identical input produce
//! byte-identical reports.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::common::Money;
use crate::error::Result;

pub mod autofix;
pub mod detector;
pub mod display;
pub mod explainer;
pub mod plan_loader;
pub mod predictor;
pub mod pricing;
pub mod rules;

// Re-export the stage entry points
pub use autofix::generate_autofixes;
pub use detector::detect;
pub use explainer::explain_all;
pub use plan_loader::load_plan_pair;
pub use predictor::predict_all;
pub use rules::{RULE_SET_REVISION, Rule, rule_table};

/// Severity of a detected cost regression.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Whether a regression is visible in a one-line diff or hides behind a
/// non-obvious cost lever (retention periods, lifecycle policies, ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Obvious,
    Subtle,
}

/// One Terraform resource attribute transition between the baseline plan
/// and the PR plan. `attribute_path` is empty for whole-resource
/// create/destroy markers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceChange {
    pub address: String,
    pub resource_type: String,
    pub name: String,
    pub attribute_path: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

/// A single detected cost regression, produced by the detector and
/// consumed read-only by the predictor and explainer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub id: String,
    pub rule_id: String,
    pub resource_type: String,
    pub resource_name: String,
    pub resource_address: String,
    pub attribute_path: String,
    pub severity: Severity,
    pub severity_score: u8,
    pub change_type: ChangeType,
    pub cross_service_dependencies: Vec<String>,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

/// Confidence grade attached to a prediction heuristic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Moderate,
}

/// One input into a cost estimate: a pricing-table entry (high
/// confidence) or a cold-start usage assumption (moderate).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Heuristic {
    pub source: String,
    pub reference: String,
    pub confidence: Confidence,
}

/// The arithmetic shape a prediction was computed with. Echoed in the
/// report so the explainer can re-derive the delta as a literal trace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BasisModel {
    InstanceHours,
    UnitHours,
    UnitMonthly,
    GatewayMonthly,
    StorageAccrual,
}

/// Inputs of the delta calculation, recorded verbatim for auditability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationBasis {
    pub model: BasisModel,
    pub before_value: String,
    pub after_value: String,
    pub rate_before: String,
    pub rate_after: String,
    pub unit_price: String,
    pub unit: String,
    pub hours_per_month: u32,
    pub scaling_min: f64,
    pub scaling_max: f64,
}

/// Monthly cost delta range for one finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostPrediction {
    pub finding_id: String,
    pub rule_id: String,
    pub monthly_delta_low: Money,
    pub monthly_delta_high: Money,
    pub heuristics: Vec<Heuristic>,
    pub cold_start_assumptions: Vec<String>,
    pub basis: CalculationBasis,
}

/// Recommendation priority, ordered highest first.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub priority: Priority,
    pub action: String,
    pub potential_savings: Money,
}

/// Root-cause narrative for one finding/prediction pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Explanation {
    pub finding_id: String,
    pub rule_id: String,
    pub root_cause: String,
    pub regression_type: ChangeType,
    pub severity_rationale: String,
    pub delta_justification: String,
    pub cost_propagation_path: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

/// Terraform patch for a finding in the supported autofix subset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutofixSnippet {
    pub finding_id: String,
    pub resource_address: String,
    pub before_snippet: String,
    pub after_snippet: String,
    pub patch: String,
    pub estimated_monthly_savings: Money,
}

/// Provenance block stamped into every report. Deliberately carries no
/// timestamp: reports are hashed in CI to detect drift, so identical
/// input must produce identical bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub rule_set_revision: String,
    pub pricing_region: String,
}

impl ReportMetadata {
    pub fn new(pricing_region: &str) -> Self {
        Self {
            tool: "costpilot".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            schema_version: "1".to_string(),
            rule_set_revision: RULE_SET_REVISION.to_string(),
            pricing_region: pricing_region.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeTypeBreakdown {
    pub obvious: usize,
    pub subtle: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectSummary {
    pub resource_changes_examined: usize,
    pub total_findings: usize,
    pub by_severity: SeverityBreakdown,
    pub by_change_type: ChangeTypeBreakdown,
}

/// Output document of `costpilot detect`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectReport {
    pub summary: DetectSummary,
    pub findings: Vec<Finding>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictSummary {
    pub total_findings: usize,
    pub total_monthly_delta_low: Money,
    pub total_monthly_delta_high: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub months: u32,
    pub cumulative_low: Money,
    pub cumulative_high: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendProjection {
    pub basis: String,
    pub points: Vec<TrendPoint>,
}

/// Output document of `costpilot predict`. Findings are carried forward
/// so the explain stage is a pure function of this document alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictReport {
    pub summary: PredictSummary,
    pub findings: Vec<Finding>,
    pub cost_breakdown: Vec<CostPrediction>,
    pub trend_projection: TrendProjection,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainSummary {
    pub total_findings: usize,
    pub total_monthly_delta_low: Money,
    pub total_monthly_delta_high: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_severity: Option<Severity>,
}

/// Output document of `costpilot explain`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainReport {
    pub summary: ExplainSummary,
    pub findings: Vec<Finding>,
    pub cost_breakdown: Vec<CostPrediction>,
    pub explanations: Vec<Explanation>,
    pub aggregate_recommendations: Vec<Recommendation>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutofixSummary {
    pub total_findings: usize,
    pub fixable_findings: usize,
    pub total_estimated_monthly_savings: Money,
}

/// Output document of `costpilot autofix`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutofixReport {
    pub summary: AutofixSummary,
    pub fixes: Vec<AutofixSnippet>,
    pub metadata: ReportMetadata,
}

/// Load a plan pair and run detection.
pub fn run_detect(
    baseline: &Path,
    pr: &Path,
    pricing_region: &str,
    min_severity: Severity,
) -> Result<DetectReport> {
    let changes = load_plan_pair(baseline, pr)?;
    log::info!(
        "loaded {} resource change(s) from plan pair",
        changes.len()
    );
    let findings = detect(&changes, min_severity);

    let mut by_severity = SeverityBreakdown::default();
    let mut by_change_type = ChangeTypeBreakdown::default();
    for finding in &findings {
        match finding.severity {
            Severity::High => by_severity.high += 1,
            Severity::Medium => by_severity.medium += 1,
            Severity::Low => by_severity.low += 1,
        }
        match finding.change_type {
            ChangeType::Obvious => by_change_type.obvious += 1,
            ChangeType::Subtle => by_change_type.subtle += 1,
        }
    }

    Ok(DetectReport {
        summary: DetectSummary {
            resource_changes_examined: changes.len(),
            total_findings: findings.len(),
            by_severity,
            by_change_type,
        },
        findings,
        metadata: ReportMetadata::new(pricing_region),
    })
}

/// Attach cost predictions and a trend projection to a detection report.
pub fn run_predict(report: &DetectReport) -> Result<PredictReport> {
    let cost_breakdown = predict_all(&report.findings)?;

    let mut total_low = Money::ZERO;
    let mut total_high = Money::ZERO;
    for prediction in &cost_breakdown {
        total_low += prediction.monthly_delta_low;
        total_high += prediction.monthly_delta_high;
    }

    let points = [1u32, 3, 6, 12]
        .iter()
        .map(|&months| TrendPoint {
            months,
            cumulative_low: total_low.scale(months as f64),
            cumulative_high: total_high.scale(months as f64),
        })
        .collect();

    Ok(PredictReport {
        summary: PredictSummary {
            total_findings: report.findings.len(),
            total_monthly_delta_low: total_low,
            total_monthly_delta_high: total_high,
        },
        findings: report.findings.clone(),
        cost_breakdown,
        trend_projection: TrendProjection {
            basis: "linear extrapolation of the predicted monthly delta".to_string(),
            points,
        },
        metadata: report.metadata.clone(),
    })
}

/// Attach explanations and aggregate recommendations to a prediction
/// report.
pub fn run_explain(report: &PredictReport) -> Result<ExplainReport> {
    let explanations = explain_all(&report.findings, &report.cost_breakdown)?;
    let aggregate_recommendations = explainer::aggregate_recommendations(&explanations);
    let highest_severity = report.findings.iter().map(|f| f.severity).max();

    Ok(ExplainReport {
        summary: ExplainSummary {
            total_findings: report.findings.len(),
            total_monthly_delta_low: report.summary.total_monthly_delta_low,
            total_monthly_delta_high: report.summary.total_monthly_delta_high,
            highest_severity,
        },
        findings: report.findings.clone(),
        cost_breakdown: report.cost_breakdown.clone(),
        explanations,
        aggregate_recommendations,
        metadata: report.metadata.clone(),
    })
}

/// Generate autofix patches for the supported findings of an
/// explanation report.
pub fn run_autofix(report: &ExplainReport) -> Result<AutofixReport> {
    let fixes = generate_autofixes(report)?;
    let mut total_savings = Money::ZERO;
    for fix in &fixes {
        total_savings += fix.estimated_monthly_savings;
    }

    Ok(AutofixReport {
        summary: AutofixSummary {
            total_findings: report.findings.len(),
            fixable_findings: fixes.len(),
            total_estimated_monthly_savings: total_savings,
        },
        fixes,
        metadata: report.metadata.clone(),
    })
}
