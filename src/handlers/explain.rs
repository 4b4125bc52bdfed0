use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use crate::analyzer::display::BoxDrawer;
use crate::analyzer::{self, ExplainReport, PredictReport};
use crate::cli::OutputFormat;
use crate::handlers::utils;

pub fn handle_explain(
    input: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> crate::Result<()> {
    let predict_report: PredictReport = utils::read_report(&input, "predict")?;
    let report = analyzer::run_explain(&predict_report)?;
    let json = utils::canonical_json(&report)?;

    if format == OutputFormat::Table {
        print!("{}", format_explain_table(&report));
    }
    if let Some(path) = &output {
        fs::write(path, &json)?;
        println!("Explanation report saved to: {}", path.display());
    } else if format == OutputFormat::Json {
        print!("{}", json);
    }
    Ok(())
}

fn format_explain_table(report: &ExplainReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n{}\n",
        "📖 Root-Cause Explanations".bright_white().bold(),
        "═".repeat(80).bright_blue()
    ));

    for explanation in &report.explanations {
        let mut finding_box = BoxDrawer::new(&explanation.finding_id);
        finding_box.add_value_only(&explanation.root_cause.bold().to_string());
        finding_box.add_value_only(&format!("   {}", explanation.severity_rationale));
        finding_box.add_value_only(&format!(
            "   delta: {}",
            explanation.delta_justification.bright_yellow()
        ));
        finding_box.add_value_only(&format!(
            "   ripples through: {}",
            explanation.cost_propagation_path.join(" → ").dimmed()
        ));
        finding_box.add_separator();
        for rec in &explanation.recommendations {
            finding_box.add_value_only(&format!(
                "[{:?}] {} (saves ~${}/mo)",
                rec.priority, rec.action, rec.potential_savings
            ));
        }
        output.push_str(&format!("\n{}", finding_box.draw()));
    }

    if !report.aggregate_recommendations.is_empty() {
        let mut agg_box = BoxDrawer::new("Aggregate Recommendations");
        for (i, rec) in report.aggregate_recommendations.iter().take(5).enumerate() {
            agg_box.add_value_only(&format!(
                "{}. {} (saves ~${}/mo)",
                i + 1,
                rec.action,
                rec.potential_savings
            ));
        }
        let hidden = report.aggregate_recommendations.len().saturating_sub(5);
        if hidden > 0 {
            agg_box.add_value_only(&format!("... and {} more", hidden).dimmed().to_string());
        }
        output.push_str(&format!("\n{}", agg_box.draw()));
    }

    output
}
