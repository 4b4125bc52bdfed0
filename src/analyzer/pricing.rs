//! Static unit-price tables.
//!
//! All rates are us-east-1 on-demand list prices. The tables are
//! intentionally incomplete: a class missing from its table downgrades
//! the prediction to a flat-uplift assumption rather than failing the
//! run. Rates changing means bumping [`crate::analyzer::rules::RULE_SET_REVISION`].

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::analyzer::rules::PriceFamily;

/// The only region the bundled price tables cover.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Hourly uplift assumed when an instance class is not in its table.
pub const FALLBACK_HOURLY_UPLIFT: f64 = 0.05;

static EC2_HOURLY: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("t2.micro", 0.0116),
        ("t2.small", 0.023),
        ("t2.medium", 0.0464),
        ("t3.nano", 0.0052),
        ("t3.micro", 0.0104),
        ("t3.small", 0.0208),
        ("t3.medium", 0.0416),
        ("t3.large", 0.0832),
        ("t3.xlarge", 0.1664),
        ("t3.2xlarge", 0.3328),
        ("m5.large", 0.096),
        ("m5.xlarge", 0.192),
        ("m5.2xlarge", 0.384),
        ("m5.4xlarge", 0.768),
        ("c5.large", 0.085),
        ("c5.xlarge", 0.17),
        ("c5.2xlarge", 0.34),
        ("r5.large", 0.126),
        ("r5.xlarge", 0.252),
    ])
});

static RDS_HOURLY: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("db.t3.micro", 0.017),
        ("db.t3.small", 0.034),
        ("db.t3.medium", 0.068),
        ("db.t3.large", 0.136),
        ("db.m5.large", 0.171),
        ("db.m5.xlarge", 0.342),
        ("db.r5.large", 0.24),
        ("db.r5.xlarge", 0.48),
    ])
});

static ELASTICACHE_HOURLY: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("cache.t3.micro", 0.017),
        ("cache.t3.small", 0.034),
        ("cache.t3.medium", 0.068),
        ("cache.m5.large", 0.156),
        ("cache.m5.xlarge", 0.311),
        ("cache.r5.large", 0.216),
    ])
});

/// On-demand hourly rate for an instance class, if the table knows it.
pub fn hourly_rate(family: PriceFamily, class: &str) -> Option<f64> {
    let table = match family {
        PriceFamily::Ec2 => &EC2_HOURLY,
        PriceFamily::Rds => &RDS_HOURLY,
        PriceFamily::ElastiCache => &ELASTICACHE_HOURLY,
    };
    table.get(class).copied()
}

/// Whether the bundled tables cover a region.
pub fn region_supported(region: &str) -> bool {
    region == DEFAULT_REGION
}

/// Shortest-round-trip decimal formatting for rates ("0.0104",
/// "0.00065"). Deterministic across runs and platforms.
pub fn fmt_rate(rate: f64) -> String {
    format!("{}", rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_rates_match_the_published_table() {
        assert_eq!(hourly_rate(PriceFamily::Ec2, "t3.micro"), Some(0.0104));
        assert_eq!(hourly_rate(PriceFamily::Ec2, "t3.xlarge"), Some(0.1664));
        assert_eq!(hourly_rate(PriceFamily::Rds, "db.m5.large"), Some(0.171));
    }

    #[test]
    fn unknown_classes_are_not_guessed() {
        assert_eq!(hourly_rate(PriceFamily::Ec2, "u7in-32tb.224xlarge"), None);
        assert_eq!(hourly_rate(PriceFamily::Rds, "t3.micro"), None);
    }

    #[test]
    fn rate_formatting_is_shortest_round_trip() {
        assert_eq!(fmt_rate(0.0104), "0.0104");
        assert_eq!(fmt_rate(0.00065), "0.00065");
        assert_eq!(fmt_rate(0.045), "0.045");
    }
}
