//! Error types for the CostPilot CLI.
//!
//! All fallible paths funnel into [`CostPilotError`], with per-domain
//! sub-enums for plan loading, analysis, and configuration. Malformed
//! input aborts the run before any output file is written.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CostPilotError>;

/// Top-level error type for all CLI operations.
#[derive(Debug, Error)]
pub enum CostPilotError {
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

/// Errors raised while loading Terraform plan JSON.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Input is unparsable or missing required top-level keys
    /// (`format_version`, `resource_changes`).
    #[error("malformed plan '{path}': {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// A directory input contained no recognizable plan JSON file.
    #[error("no Terraform plan JSON found under '{0}'")]
    NotFound(PathBuf),
}

/// Errors raised while chaining pipeline stages.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The `--input` document is not the report the stage expects.
    #[error("input is not a {expected} document: {reason}")]
    WrongDocument {
        expected: &'static str,
        reason: String,
    },

    /// One or more plan pairs in a batch run failed.
    #[error("{failed} of {total} plan pair(s) failed; see batch_summary.json")]
    BatchFailures { failed: usize, total: usize },
}

/// Errors raised while loading `.costpilot.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to parse config '{path}': {reason}")]
    ParsingFailed { path: PathBuf, reason: String },
}
