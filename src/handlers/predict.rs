use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use crate::analyzer::display::BoxDrawer;
use crate::analyzer::{self, DetectReport, PredictReport};
use crate::cli::OutputFormat;
use crate::handlers::utils;

pub fn handle_predict(
    input: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> crate::Result<()> {
    let detect_report: DetectReport = utils::read_report(&input, "detect")?;
    let report = analyzer::run_predict(&detect_report)?;
    let json = utils::canonical_json(&report)?;

    if format == OutputFormat::Table {
        print!("{}", format_predict_table(&report));
    }
    if let Some(path) = &output {
        fs::write(path, &json)?;
        println!("Prediction report saved to: {}", path.display());
    } else if format == OutputFormat::Json {
        print!("{}", json);
    }
    Ok(())
}

fn format_predict_table(report: &PredictReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n{}\n",
        "💸 Monthly Cost Delta Prediction".bright_white().bold(),
        "═".repeat(80).bright_blue()
    ));

    let mut summary_box = BoxDrawer::new("Prediction Summary");
    summary_box.add_line("Findings priced:", &report.summary.total_findings.to_string());
    summary_box.add_line(
        "Monthly delta:",
        &format!(
            "${} - ${}",
            report.summary.total_monthly_delta_low, report.summary.total_monthly_delta_high
        )
        .bright_yellow()
        .to_string(),
    );
    output.push_str(&format!("\n{}", summary_box.draw()));

    if !report.cost_breakdown.is_empty() {
        let mut breakdown_box = BoxDrawer::new("Cost Breakdown");
        for (i, prediction) in report.cost_breakdown.iter().enumerate() {
            breakdown_box.add_value_only(&format!(
                "{} {}  ${} - ${}/mo",
                prediction.finding_id.cyan(),
                prediction.rule_id.yellow(),
                prediction.monthly_delta_low,
                prediction.monthly_delta_high
            ));
            for assumption in &prediction.cold_start_assumptions {
                breakdown_box.add_value_only(&format!("   assumes: {}", assumption.dimmed()));
            }
            if i < report.cost_breakdown.len() - 1 {
                breakdown_box.add_value_only("");
            }
        }
        output.push_str(&format!("\n{}", breakdown_box.draw()));
    }

    let mut trend_box = BoxDrawer::new("Trend Projection");
    for point in &report.trend_projection.points {
        trend_box.add_line(
            &format!("{} month(s):", point.months),
            &format!("${} - ${}", point.cumulative_low, point.cumulative_high),
        );
    }
    output.push_str(&format!("\n{}", trend_box.draw()));
    output
}
