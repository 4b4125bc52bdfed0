use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use crate::analyzer::display::BoxDrawer;
use crate::analyzer::{self, DetectReport};
use crate::cli::{OutputFormat, SeverityThreshold};
use crate::config::types::Config;
use crate::handlers::utils;

#[allow(clippy::too_many_arguments)]
pub fn handle_detect(
    baseline: PathBuf,
    pr: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
    severity: Option<SeverityThreshold>,
    fail_on_findings: bool,
    config: &Config,
) -> crate::Result<()> {
    let region = utils::effective_region(config);
    let min_severity = severity
        .map(utils::threshold_to_severity)
        .unwrap_or(config.analysis.min_severity);

    let report = analyzer::run_detect(&baseline, &pr, &region, min_severity)?;
    let json = utils::canonical_json(&report)?;

    if format == OutputFormat::Table {
        print!("{}", format_detect_table(&report));
    }
    if let Some(path) = &output {
        fs::write(path, &json)?;
        println!("Detection report saved to: {}", path.display());
    } else if format == OutputFormat::Json {
        print!("{}", json);
    }

    if fail_on_findings && report.summary.total_findings > 0 {
        exit_for_findings(&report);
    }
    Ok(())
}

fn format_detect_table(report: &DetectReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n{}\n",
        "🔍 Cost Regression Detection".bright_white().bold(),
        "═".repeat(80).bright_blue()
    ));

    let mut summary_box = BoxDrawer::new("Detection Summary");
    summary_box.add_line(
        "Changes examined:",
        &report.summary.resource_changes_examined.to_string(),
    );
    summary_box.add_line(
        "Findings:",
        &report.summary.total_findings.to_string(),
    );
    summary_box.add_line(
        "By severity:",
        &format!(
            "{} high / {} medium / {} low",
            report.summary.by_severity.high,
            report.summary.by_severity.medium,
            report.summary.by_severity.low
        ),
    );
    summary_box.add_line(
        "By change type:",
        &format!(
            "{} obvious / {} subtle",
            report.summary.by_change_type.obvious, report.summary.by_change_type.subtle
        ),
    );
    output.push_str(&format!("\n{}", summary_box.draw()));

    if report.findings.is_empty() {
        let mut clean_box = BoxDrawer::new("Status");
        clean_box.add_value_only(&format!("{}", "✅ No cost regressions detected".green()));
        output.push_str(&format!("\n{}", clean_box.draw()));
        return output;
    }

    let mut findings_box = BoxDrawer::new("Findings");
    for (i, finding) in report.findings.iter().enumerate() {
        findings_box.add_value_only(&format!(
            "{}. {}",
            i + 1,
            finding.resource_address.cyan().bold()
        ));
        findings_box.add_value_only(&format!(
            "   Rule: {}  Severity: {} ({})  Type: {:?}",
            finding.rule_id.yellow(),
            utils::severity_colored(finding.severity),
            finding.severity_score,
            finding.change_type
        ));
        if i < report.findings.len() - 1 {
            findings_box.add_value_only("");
        }
    }
    output.push_str(&format!("\n{}", findings_box.draw()));
    output
}

fn exit_for_findings(report: &DetectReport) -> ! {
    if report.summary.by_severity.high > 0 {
        eprintln!("❌ High-severity cost regressions found. Review before merging.");
        std::process::exit(1);
    } else if report.summary.by_severity.medium > 0 {
        eprintln!("⚠️  Medium-severity cost regressions found. Review recommended.");
        std::process::exit(2);
    } else {
        eprintln!("ℹ️  Cost regressions found, none above low severity.");
        std::process::exit(3);
    }
}
