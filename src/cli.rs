use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "costpilot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detect Terraform cost regressions before they merge")]
#[command(
    long_about = "CostPilot compares a baseline Terraform plan against a PR plan, detects cost-relevant regressions with a fixed rule table, predicts the monthly cost delta, explains the root cause, and can generate Terraform autofix patches for supported resource types."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect cost regressions between a baseline plan and a PR plan
    Detect {
        /// Baseline Terraform plan JSON (file, or directory containing plan.json)
        #[arg(long, value_name = "PATH")]
        baseline: PathBuf,

        /// PR Terraform plan JSON (file, or directory containing plan.json)
        #[arg(long, value_name = "PATH")]
        pr: PathBuf,

        /// Write the detection report JSON to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format for stdout
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Only report findings with severity >= threshold
        #[arg(long, value_enum)]
        severity: Option<SeverityThreshold>,

        /// Exit non-zero when findings exist (graded by severity)
        #[arg(long)]
        fail_on_findings: bool,
    },

    /// Predict the monthly cost delta for a detection report
    Predict {
        /// Detection report produced by `costpilot detect`
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Write the prediction report JSON to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format for stdout
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Explain the root cause and cost math behind a prediction report
    Explain {
        /// Prediction report produced by `costpilot predict`
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Write the explanation report JSON to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format for stdout
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Generate Terraform patches for findings that support autofix
    Autofix {
        /// Explanation report produced by `costpilot explain`
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output file: `.json` for a report, anything else for Terraform
        /// snippets plus a sibling `.patch` unified diff
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Run the full pipeline over many plan pairs in parallel
    Batch {
        /// Directory of pair subdirectories, each with baseline.json + pr.json
        #[arg(long, value_name = "DIR")]
        pairs: PathBuf,

        /// Directory to write per-pair reports and the batch summary into
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
    },

    /// List the built-in detection rules
    Rules {
        /// Show predicates, scores, and dependency paths per rule
        #[arg(short, long)]
        detailed: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityThreshold {
    Low,
    Medium,
    High,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
