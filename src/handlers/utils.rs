//! Shared handler plumbing: report IO and severity rendering.

use colored::{ColoredString, Colorize};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::analyzer::{Severity, pricing};
use crate::cli::SeverityThreshold;
use crate::config::types::Config;
use crate::error::{AnalysisError, Result};

/// Canonical report serialization: pretty JSON plus a trailing newline.
/// Struct field order is declaration order, so bytes are stable across
/// runs.
pub fn canonical_json<T: Serialize>(report: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// Read a pipeline document, mapping parse failures to a stage-aware
/// error ("input is not a detect document: ...").
pub fn read_report<T: DeserializeOwned>(path: &Path, expected: &'static str) -> Result<T> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        AnalysisError::WrongDocument {
            expected,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Resolve the pricing region, degrading gracefully: an unsupported
/// configured region warns and falls back to the bundled table's
/// region instead of aborting.
pub fn effective_region(config: &Config) -> String {
    if pricing::region_supported(&config.pricing.region) {
        config.pricing.region.clone()
    } else {
        log::warn!(
            "region '{}' is not covered by the bundled price tables; using {}",
            config.pricing.region,
            pricing::DEFAULT_REGION
        );
        pricing::DEFAULT_REGION.to_string()
    }
}

pub fn threshold_to_severity(threshold: SeverityThreshold) -> Severity {
    match threshold {
        SeverityThreshold::Low => Severity::Low,
        SeverityThreshold::Medium => Severity::Medium,
        SeverityThreshold::High => Severity::High,
    }
}

pub fn severity_colored(severity: Severity) -> ColoredString {
    match severity {
        Severity::High => "high".red().bold(),
        Severity::Medium => "medium".yellow(),
        Severity::Low => "low".blue(),
    }
}
