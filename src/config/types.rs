use serde::{Deserialize, Serialize};

use crate::analyzer::Severity;
use crate::analyzer::pricing;

/// Main configuration structure (`.costpilot.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub pricing: PricingConfig,
    pub output: OutputConfig,
}

/// Analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Findings below this severity are dropped from reports.
    pub min_severity: Severity,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Low,
        }
    }
}

/// Pricing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Region the unit-price tables are read for. Unsupported regions
    /// fall back to the bundled default with a warning.
    pub region: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            region: pricing::DEFAULT_REGION.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Disable to strip ANSI colors from table output.
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_an_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.analysis.min_severity, Severity::Low);
        assert_eq!(config.pricing.region, "us-east-1");
        assert!(config.output.color);
    }

    #[test]
    fn partial_sections_fill_from_defaults() {
        let config: Config = toml::from_str(
            "[analysis]\nmin_severity = \"medium\"\n",
        )
        .unwrap();
        assert_eq!(config.analysis.min_severity, Severity::Medium);
        assert_eq!(config.pricing.region, "us-east-1");
    }
}
