//! Terraform autofix generation.
//!
//! Patches are generated only for the supported subset: EC2 instance
//! types (aws_instance, aws_launch_template) and S3 lifecycle
//! configurations. Everything else yields no patch rather than an
//! error; broader infrastructure changes need context the tool does not
//! have in snippet mode.
//!
//! Instance types are right-sized one step down the family size ladder
//! from the upgraded type rather than reverted to the baseline: a
//! t3.micro to t3.xlarge jump is usually a real capacity need that
//! t3.large can meet.

use similar::TextDiff;
use tera::{Context, Tera};

use crate::analyzer::{AutofixSnippet, ExplainReport, Finding};
use crate::common::Money;
use crate::error::{AnalysisError, Result};

/// Rule ids the generator can patch.
const SUPPORTED_RULES: &[&str] = &["ec2-instance-type-upgrade", "s3-lifecycle-disabled"];

/// Family size ladder, smallest first. The suffix after the last dot of
/// an instance class ("t3.xlarge", "cache.m5.large") indexes into this.
const SIZE_LADDER: &[&str] = &[
    "nano", "micro", "small", "medium", "large", "xlarge", "2xlarge", "4xlarge", "8xlarge",
    "12xlarge", "16xlarge", "24xlarge",
];

const INSTANCE_TEMPLATE: &str = r#"resource "{{ resource_type }}" "{{ name }}" {
  instance_type = "{{ instance_type }}"
}
"#;

const LIFECYCLE_TEMPLATE: &str = r#"resource "aws_s3_bucket_lifecycle_configuration" "{{ name }}" {
  rule {
    id     = "{{ rule_name }}"
    status = "{{ status }}"
  }
}
"#;

/// Whether a finding falls inside the supported autofix subset.
pub fn supports(finding: &Finding) -> bool {
    SUPPORTED_RULES.contains(&finding.rule_id.as_str())
}

/// One size-step down from an instance class, staying in its family.
/// Returns `None` when the class has no recognizable size suffix or is
/// already the smallest.
pub fn right_size_target(class: &str) -> Option<String> {
    let (family, size) = class.rsplit_once('.')?;
    let index = SIZE_LADDER.iter().position(|s| *s == size)?;
    if index == 0 {
        return None;
    }
    Some(format!("{}.{}", family, SIZE_LADDER[index - 1]))
}

/// Generate patches for every supported finding of an explanation
/// report, in finding order. Unsupported findings are skipped.
pub fn generate_autofixes(report: &ExplainReport) -> Result<Vec<AutofixSnippet>> {
    let mut fixes = Vec::new();
    for finding in &report.findings {
        if !supports(finding) {
            log::debug!("no autofix for {} ({})", finding.id, finding.rule_id);
            continue;
        }
        let prediction = report
            .cost_breakdown
            .iter()
            .find(|p| p.finding_id == finding.id)
            .ok_or_else(|| AnalysisError::WrongDocument {
                expected: "explain",
                reason: format!("finding {} has no cost prediction", finding.id),
            })?;
        let midpoint =
            Money::midpoint(prediction.monthly_delta_low, prediction.monthly_delta_high);

        let fix = match finding.rule_id.as_str() {
            "ec2-instance-type-upgrade" => instance_fix(finding, midpoint)?,
            "s3-lifecycle-disabled" => lifecycle_fix(finding, midpoint)?,
            _ => unreachable!("rule {} is not in SUPPORTED_RULES", finding.rule_id),
        };
        fixes.push(fix);
    }
    Ok(fixes)
}

fn display_value(value: &Option<serde_json::Value>) -> String {
    match value {
        None => "absent".to_string(),
        Some(serde_json::Value::Null) => "absent".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn instance_fix(finding: &Finding, delta_midpoint: Money) -> Result<AutofixSnippet> {
    let current = display_value(&finding.after);
    let baseline = display_value(&finding.before);
    let recommended = right_size_target(&current).unwrap_or(baseline);

    let before_snippet = render_instance(finding, &current)?;
    let after_snippet = render_instance(finding, &recommended)?;
    let patch = unified_patch(finding, &before_snippet, &after_snippet);

    Ok(AutofixSnippet {
        finding_id: finding.id.clone(),
        resource_address: finding.resource_address.clone(),
        before_snippet,
        after_snippet,
        patch,
        // Right-sizing recovers about half the predicted delta.
        estimated_monthly_savings: delta_midpoint.scale(0.5),
    })
}

fn render_instance(finding: &Finding, instance_type: &str) -> Result<String> {
    let mut context = Context::new();
    context.insert("resource_type", &finding.resource_type);
    context.insert("name", &finding.resource_name);
    context.insert("instance_type", instance_type);
    Ok(Tera::one_off(INSTANCE_TEMPLATE, &context, false)?)
}

fn lifecycle_fix(finding: &Finding, delta_midpoint: Money) -> Result<AutofixSnippet> {
    let current = match &finding.after {
        Some(serde_json::Value::String(s)) => s.clone(),
        _ => "Disabled".to_string(),
    };

    let before_snippet = render_lifecycle(finding, &current)?;
    let after_snippet = render_lifecycle(finding, "Enabled")?;
    let patch = unified_patch(finding, &before_snippet, &after_snippet);

    Ok(AutofixSnippet {
        finding_id: finding.id.clone(),
        resource_address: finding.resource_address.clone(),
        before_snippet,
        after_snippet,
        patch,
        // Re-enabling the rule stops the accrual entirely.
        estimated_monthly_savings: delta_midpoint,
    })
}

fn render_lifecycle(finding: &Finding, status: &str) -> Result<String> {
    let mut context = Context::new();
    context.insert("name", &finding.resource_name);
    context.insert("rule_name", &finding.resource_name);
    context.insert("status", status);
    Ok(Tera::one_off(LIFECYCLE_TEMPLATE, &context, false)?)
}

fn unified_patch(finding: &Finding, before: &str, after: &str) -> String {
    let diff = TextDiff::from_lines(before, after);
    diff.unified_diff()
        .context_radius(3)
        .header(
            &format!("a/{}.tf", finding.resource_name),
            &format!("b/{}.tf", finding.resource_name),
        )
        .to_string()
}
