//! # CostPilot
//!
//! A Rust-based command-line application that detects Terraform cost
//! regressions between a baseline plan and a PR plan, predicts their
//! monthly cost impact, explains the root cause, and generates autofix
//! patches for a supported resource subset.
//!
//! ## Features
//!
//! - **Detection**: A fixed, ordered rule table over the resource-change
//!   diff of two Terraform plan JSON documents
//! - **Prediction**: Monthly cost delta ranges from static unit-price
//!   tables and auditable cold-start assumptions
//! - **Explanation**: Root-cause narratives with a literal arithmetic
//!   trace of every estimate
//! - **Autofix**: Terraform patches (snippet + unified diff) for EC2
//!   instance types and S3 lifecycle configurations
//! - **Deterministic output**: identical input plans produce
//!   byte-identical reports, suitable for hash-based CI drift detection
//!
//! ## Example
//!
//! ```rust,no_run
//! use costpilot::analyzer::{run_detect, run_predict, Severity};
//! use std::path::Path;
//!
//! # fn main() -> costpilot::Result<()> {
//! let detect = run_detect(
//!     Path::new("baseline/plan.json"),
//!     Path::new("pr/plan.json"),
//!     "us-east-1",
//!     Severity::Low,
//! )?;
//! let predict = run_predict(&detect)?;
//! println!("monthly delta: ${}", predict.summary.total_monthly_delta_high);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod handlers;

// Re-export commonly used types and functions
pub use analyzer::{
    AutofixReport, DetectReport, ExplainReport, Finding, PredictReport, Severity,
    run_autofix, run_detect, run_explain, run_predict,
};
pub use common::Money;
pub use error::{CostPilotError, Result};
pub use handlers::*;
use cli::Commands;
use config::types::Config;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Detect {
            baseline,
            pr,
            output,
            format,
            severity,
            fail_on_findings,
        } => handlers::handle_detect(
            baseline,
            pr,
            output,
            format,
            severity,
            fail_on_findings,
            config,
        ),
        Commands::Predict {
            input,
            output,
            format,
        } => handlers::handle_predict(input, output, format),
        Commands::Explain {
            input,
            output,
            format,
        } => handlers::handle_explain(input, output, format),
        Commands::Autofix { input, output } => handlers::handle_autofix(input, output),
        Commands::Batch { pairs, output } => handlers::handle_batch(pairs, output, config),
        Commands::Rules { detailed } => handlers::handle_rules(detailed),
    }
}
