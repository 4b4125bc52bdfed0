//! Batch mode: the full pipeline over many plan pairs.
//!
//! Each pair runs end-to-end on its own rayon worker with no
//! cross-worker state; results are aggregated after all workers finish.
//! A malformed pair fails that pair only.

use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyzer::{self, display::BoxDrawer};
use crate::config::types::Config;
use crate::error::AnalysisError;
use crate::handlers::utils;

#[derive(Debug, Serialize)]
struct BatchSummary {
    pairs_processed: usize,
    pairs_with_findings: usize,
    total_findings: usize,
    failures: Vec<BatchFailure>,
}

#[derive(Debug, Serialize)]
struct BatchFailure {
    pair: String,
    error: String,
}

pub fn handle_batch(pairs: PathBuf, output: PathBuf, config: &Config) -> crate::Result<()> {
    let pair_dirs = discover_pairs(&pairs)?;
    if pair_dirs.is_empty() {
        log::warn!(
            "no pair directories (baseline.json + pr.json) found under '{}'",
            pairs.display()
        );
    }
    fs::create_dir_all(&output)?;

    let region = utils::effective_region(config);
    let min_severity = config.analysis.min_severity;

    let results: Vec<(String, Result<usize, String>)> = pair_dirs
        .par_iter()
        .map(|dir| {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.display().to_string());
            let outcome = run_pair(dir, &output.join(&name), &region, min_severity)
                .map_err(|e| e.to_string());
            (name, outcome)
        })
        .collect();

    let mut summary = BatchSummary {
        pairs_processed: results.len(),
        pairs_with_findings: 0,
        total_findings: 0,
        failures: Vec::new(),
    };
    for (pair, outcome) in results {
        match outcome {
            Ok(findings) => {
                if findings > 0 {
                    summary.pairs_with_findings += 1;
                }
                summary.total_findings += findings;
            }
            Err(error) => summary.failures.push(BatchFailure { pair, error }),
        }
    }

    fs::write(
        output.join("batch_summary.json"),
        utils::canonical_json(&summary)?,
    )?;

    print!("{}", format_batch_table(&summary));
    println!(
        "Batch summary saved to: {}",
        output.join("batch_summary.json").display()
    );

    if !summary.failures.is_empty() {
        return Err(AnalysisError::BatchFailures {
            failed: summary.failures.len(),
            total: summary.pairs_processed,
        }
        .into());
    }
    Ok(())
}

/// Subdirectories containing both plan files, in name order.
fn discover_pairs(pairs: &Path) -> crate::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(pairs)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir()
            && path.join("baseline.json").is_file()
            && path.join("pr.json").is_file()
        {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn run_pair(
    dir: &Path,
    out_dir: &Path,
    region: &str,
    min_severity: crate::analyzer::Severity,
) -> crate::Result<usize> {
    let detect = analyzer::run_detect(
        &dir.join("baseline.json"),
        &dir.join("pr.json"),
        region,
        min_severity,
    )?;
    let predict = analyzer::run_predict(&detect)?;
    let explain = analyzer::run_explain(&predict)?;

    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join("detect.json"), utils::canonical_json(&detect)?)?;
    fs::write(out_dir.join("predict.json"), utils::canonical_json(&predict)?)?;
    fs::write(out_dir.join("explain.json"), utils::canonical_json(&explain)?)?;

    Ok(detect.summary.total_findings)
}

fn format_batch_table(summary: &BatchSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n{}\n",
        "📦 Batch Analysis".bright_white().bold(),
        "═".repeat(80).bright_blue()
    ));

    let mut summary_box = BoxDrawer::new("Batch Summary");
    summary_box.add_line("Pairs processed:", &summary.pairs_processed.to_string());
    summary_box.add_line(
        "Pairs with findings:",
        &summary.pairs_with_findings.to_string(),
    );
    summary_box.add_line("Total findings:", &summary.total_findings.to_string());
    summary_box.add_line(
        "Failures:",
        &if summary.failures.is_empty() {
            "0".green().to_string()
        } else {
            summary.failures.len().to_string().red().to_string()
        },
    );
    for failure in &summary.failures {
        summary_box.add_value_only(&format!("   {}: {}", failure.pair, failure.error));
    }
    output.push_str(&format!("\n{}", summary_box.draw()));
    output
}
