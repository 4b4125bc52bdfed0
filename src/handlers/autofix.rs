use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use crate::analyzer::display::BoxDrawer;
use crate::analyzer::{self, AutofixReport, ExplainReport};
use crate::handlers::utils;

pub fn handle_autofix(input: PathBuf, output: Option<PathBuf>) -> crate::Result<()> {
    let explain_report: ExplainReport = utils::read_report(&input, "explain")?;
    let report = analyzer::run_autofix(&explain_report)?;

    print!("{}", format_autofix_summary(&report));

    match &output {
        Some(path) if path.extension().is_some_and(|ext| ext == "json") => {
            fs::write(path, utils::canonical_json(&report)?)?;
            println!("Autofix report saved to: {}", path.display());
        }
        Some(path) => {
            fs::write(path, snippet_file(&report))?;
            println!("Terraform snippets saved to: {}", path.display());
            let patch_path = path.with_extension("patch");
            fs::write(&patch_path, patch_file(&report))?;
            println!("Unified diff saved to: {}", patch_path.display());
        }
        None => {
            if !report.fixes.is_empty() {
                print!("{}", snippet_file(&report));
            }
        }
    }
    Ok(())
}

fn format_autofix_summary(report: &AutofixReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n{}\n",
        "🔧 Terraform Autofix".bright_white().bold(),
        "═".repeat(80).bright_blue()
    ));

    let mut summary_box = BoxDrawer::new("Autofix Summary");
    summary_box.add_line("Findings:", &report.summary.total_findings.to_string());
    summary_box.add_line("Patched:", &report.summary.fixable_findings.to_string());
    summary_box.add_line(
        "Estimated savings:",
        &format!("${}/mo", report.summary.total_estimated_monthly_savings)
            .green()
            .to_string(),
    );
    if report.summary.fixable_findings < report.summary.total_findings {
        summary_box.add_value_only(
            "Unpatched findings are outside the supported set (EC2 instance type, S3 lifecycle).",
        );
    }
    output.push_str(&format!("\n{}", summary_box.draw()));
    output
}

/// A Terraform-loadable snippet file: the costly block as a comment,
/// the right-sized replacement live.
fn snippet_file(report: &AutofixReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# CostPilot autofix — {} of {} finding(s) patched\n# Estimated monthly savings: ${}\n",
        report.summary.fixable_findings,
        report.summary.total_findings,
        report.summary.total_estimated_monthly_savings
    ));
    for fix in &report.fixes {
        out.push('\n');
        out.push_str(&format!(
            "# {} {} (saves ~${}/mo)\n# before:\n",
            fix.finding_id, fix.resource_address, fix.estimated_monthly_savings
        ));
        for line in fix.before_snippet.lines() {
            out.push_str(&format!("#   {}\n", line));
        }
        out.push_str(&fix.after_snippet);
    }
    out
}

fn patch_file(report: &AutofixReport) -> String {
    report
        .fixes
        .iter()
        .map(|fix| fix.patch.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
