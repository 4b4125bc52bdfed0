//! Fixed detection rule table.
//!
//! Each rule matches one `(resource_type, attribute_path)` transition
//! with a before/after predicate and carries static severity, scoring,
//! cost-basis, and narrative constants. Rules are declared in a stable
//! order and findings are always emitted in that order, so report output
//! is deterministic across runs.

use crate::analyzer::{ChangeType, Priority, Severity};

/// Bumped whenever a rule, price, or assumption changes; stamped into
/// every report's metadata block.
pub const RULE_SET_REVISION: &str = "2025.07";

/// Billable hours per month used across hourly cost bases.
pub const HOURS_PER_MONTH: u32 = 730;

/// What a rule listens for on a resource change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A tracked attribute transition at this dotted path.
    Attribute(&'static str),
    /// The resource exists in the PR plan but not the baseline.
    ResourceCreated,
}

/// Before/after predicate deciding whether a matched change fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// Both values are instance classes and the hourly rate strictly
    /// increases (fires conservatively when a class is not in the
    /// pricing table and the value changed).
    HourlyRateIncrease(PriceFamily),
    /// Both values are numeric and `after >= before * factor`.
    NumericIncreaseAtLeast(f64),
    /// Value was `"Enabled"` and no longer is (changed or absent).
    StatusNoLongerEnabled,
    /// Value was a positive number and is now zero or absent
    /// (CloudWatch semantics: retention 0 means never expire).
    RetentionDropsToZero,
    /// Fires on any change matching the trigger.
    Always,
}

/// Which static unit-price table an instance class belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFamily {
    Ec2,
    Rds,
    ElastiCache,
}

/// The arithmetic shape the predictor applies to a firing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostBasis {
    /// `(rate_after - rate_before) × 730 h/mo × scaling` instances.
    InstanceHours(PriceFamily),
    /// `(after - before) units × unit_price × 730 h/mo × scaling`.
    UnitHours { unit_price: f64, unit: &'static str },
    /// `(after - before) units × unit_price per month × scaling`.
    UnitMonthly { unit_price: f64, unit: &'static str },
    /// `hourly × 730 h/mo + per_gb × scaling` GB processed per month.
    GatewayMonthly { hourly: f64, per_gb: f64 },
    /// `gb_price × scaling` GB newly retained per month.
    StorageAccrual { gb_price: f64 },
}

/// Cold-start usage window applied by the cost basis. The assumption
/// string is recorded verbatim in every prediction so a human can audit
/// the estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub min: f64,
    pub max: f64,
    pub assumption: &'static str,
}

/// A ranked recommendation template; savings are a fraction of the
/// predicted delta midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationTemplate {
    pub priority: Priority,
    pub action: &'static str,
    pub savings_fraction: f64,
}

/// Per-rule narrative constants rendered by the explainer. Templates
/// may reference `{{ address }}`, `{{ before }}`, `{{ after }}`,
/// `{{ score }}`, and `{{ recommended }}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Narrative {
    pub root_cause_label: &'static str,
    pub root_cause_detail: &'static str,
    pub severity_rationale: &'static str,
    pub recommendations: &'static [RecommendationTemplate],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub id: &'static str,
    pub resource_types: &'static [&'static str],
    pub trigger: Trigger,
    pub predicate: Predicate,
    pub severity: Severity,
    pub severity_score: u8,
    pub change_type: ChangeType,
    pub cost_basis: CostBasis,
    pub scaling: Scaling,
    pub narrative: Narrative,
}

/// The rule table, in declaration order. Severity scores are static
/// per-rule constants; they do not vary with the magnitude of the
/// change.
pub fn rule_table() -> &'static [Rule] {
    RULES
}

/// Look up a rule by id (used when re-hydrating findings from a report).
pub fn find_rule(rule_id: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.id == rule_id)
}

/// Attribute paths the plan loader tracks for a resource type.
pub fn tracked_attribute_paths(resource_type: &str) -> Vec<&'static str> {
    let mut paths = Vec::new();
    for rule in RULES {
        if let Trigger::Attribute(path) = rule.trigger {
            if rule.resource_types.contains(&resource_type) && !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}

/// Fixed cross-service adjacency: the typical downstream neighbors a
/// cost change ripples through. A lookup table, not a traversal of the
/// plan's real reference graph.
pub fn dependency_path(resource_type: &str) -> &'static [&'static str] {
    match resource_type {
        "aws_launch_template" => &["aws_autoscaling_group", "aws_lb_target_group", "aws_lb"],
        "aws_instance" => &["aws_ebs_volume", "aws_eip"],
        "aws_autoscaling_group" => &["aws_lb_target_group", "aws_lb"],
        "aws_db_instance" => &["aws_db_subnet_group", "aws_security_group"],
        "aws_elasticache_cluster" => &["aws_elasticache_subnet_group", "aws_security_group"],
        "aws_nat_gateway" => &["aws_eip", "aws_route_table", "aws_subnet"],
        "aws_s3_bucket_lifecycle_configuration" => &["aws_s3_bucket"],
        "aws_ebs_volume" => &["aws_instance"],
        _ => &[],
    }
}

static RULES: &[Rule] = &[
    Rule {
        id: "ec2-instance-type-upgrade",
        resource_types: &["aws_instance", "aws_launch_template"],
        trigger: Trigger::Attribute("instance_type"),
        predicate: Predicate::HourlyRateIncrease(PriceFamily::Ec2),
        severity: Severity::High,
        severity_score: 85,
        change_type: ChangeType::Obvious,
        cost_basis: CostBasis::InstanceHours(PriceFamily::Ec2),
        scaling: Scaling {
            min: 2.0,
            max: 4.0,
            assumption: "2-4 instances running this instance type (autoscaling group average)",
        },
        narrative: Narrative {
            root_cause_label: "EC2 Instance Type Upgrade (Compute Scaling)",
            root_cause_detail: "{{ address }} moves from {{ before }} to {{ after }}, repricing every running hour of the fleet behind it.",
            severity_rationale: "Instance class changes reprice the largest line item on a compute-heavy bill; scored {{ score }}/100 regardless of magnitude.",
            recommendations: &[
                RecommendationTemplate {
                    priority: Priority::High,
                    action: "Right-size to {{ recommended }} instead of {{ after }} and re-evaluate after a week of CPU metrics",
                    savings_fraction: 0.5,
                },
                RecommendationTemplate {
                    priority: Priority::Medium,
                    action: "Cover the steady-state fleet with a 1-year Compute Savings Plan",
                    savings_fraction: 0.3,
                },
                RecommendationTemplate {
                    priority: Priority::Low,
                    action: "Add a scheduled scale-in for non-business hours",
                    savings_fraction: 0.15,
                },
            ],
        },
    },
    Rule {
        id: "rds-instance-class-upgrade",
        resource_types: &["aws_db_instance"],
        trigger: Trigger::Attribute("instance_class"),
        predicate: Predicate::HourlyRateIncrease(PriceFamily::Rds),
        severity: Severity::High,
        severity_score: 80,
        change_type: ChangeType::Obvious,
        cost_basis: CostBasis::InstanceHours(PriceFamily::Rds),
        scaling: Scaling {
            min: 1.0,
            max: 2.0,
            assumption: "1-2 database instances (primary plus optional Multi-AZ standby)",
        },
        narrative: Narrative {
            root_cause_label: "RDS Instance Class Upgrade (Database Scaling)",
            root_cause_detail: "{{ address }} moves from {{ before }} to {{ after }}; database instances bill for every provisioned hour, standby replicas included.",
            severity_rationale: "Database class upgrades double-bill when a Multi-AZ standby mirrors the primary; scored {{ score }}/100.",
            recommendations: &[
                RecommendationTemplate {
                    priority: Priority::High,
                    action: "Verify the workload is CPU-bound before keeping {{ after }}; storage and IOPS scale independently of instance class",
                    savings_fraction: 0.4,
                },
                RecommendationTemplate {
                    priority: Priority::Medium,
                    action: "Consider Aurora Serverless v2 for spiky workloads",
                    savings_fraction: 0.25,
                },
            ],
        },
    },
    Rule {
        id: "elasticache-node-type-upgrade",
        resource_types: &["aws_elasticache_cluster"],
        trigger: Trigger::Attribute("node_type"),
        predicate: Predicate::HourlyRateIncrease(PriceFamily::ElastiCache),
        severity: Severity::Medium,
        severity_score: 75,
        change_type: ChangeType::Obvious,
        cost_basis: CostBasis::InstanceHours(PriceFamily::ElastiCache),
        scaling: Scaling {
            min: 1.0,
            max: 3.0,
            assumption: "1-3 cache nodes in the cluster",
        },
        narrative: Narrative {
            root_cause_label: "ElastiCache Node Type Upgrade (Cache Scaling)",
            root_cause_detail: "{{ address }} moves from {{ before }} to {{ after }} across every node in the cluster.",
            severity_rationale: "Cache node upgrades multiply by the cluster's node count; scored {{ score }}/100.",
            recommendations: &[
                RecommendationTemplate {
                    priority: Priority::High,
                    action: "Right-size to {{ recommended }} and add a memory-pressure alarm before upgrading again",
                    savings_fraction: 0.5,
                },
                RecommendationTemplate {
                    priority: Priority::Low,
                    action: "Review key TTLs; longer TTLs often substitute for larger nodes",
                    savings_fraction: 0.1,
                },
            ],
        },
    },
    Rule {
        id: "asg-capacity-expansion",
        resource_types: &["aws_autoscaling_group"],
        trigger: Trigger::Attribute("max_size"),
        predicate: Predicate::NumericIncreaseAtLeast(2.0),
        severity: Severity::Medium,
        severity_score: 70,
        change_type: ChangeType::Obvious,
        cost_basis: CostBasis::UnitHours {
            unit_price: 0.096,
            unit: "instance",
        },
        scaling: Scaling {
            min: 0.5,
            max: 1.0,
            assumption: "new headroom is 50-100% utilized at steady state; m5.large on-demand assumed per added instance",
        },
        narrative: Narrative {
            root_cause_label: "Auto Scaling Group Capacity Expansion (Fleet Growth)",
            root_cause_detail: "{{ address }} raises max_size from {{ before }} to {{ after }}, at least doubling the fleet ceiling.",
            severity_rationale: "Capacity ceilings gate the worst-case bill, not the average; scored {{ score }}/100.",
            recommendations: &[
                RecommendationTemplate {
                    priority: Priority::High,
                    action: "Confirm the new ceiling with a load test; scale-out policies rarely need a 2x headroom jump",
                    savings_fraction: 0.4,
                },
                RecommendationTemplate {
                    priority: Priority::Medium,
                    action: "Use target-tracking on request latency instead of a static ceiling",
                    savings_fraction: 0.2,
                },
            ],
        },
    },
    Rule {
        id: "nat-gateway-added",
        resource_types: &["aws_nat_gateway"],
        trigger: Trigger::ResourceCreated,
        predicate: Predicate::Always,
        severity: Severity::Medium,
        severity_score: 65,
        change_type: ChangeType::Subtle,
        cost_basis: CostBasis::GatewayMonthly {
            hourly: 0.045,
            per_gb: 0.045,
        },
        scaling: Scaling {
            min: 100.0,
            max: 500.0,
            assumption: "100-500 GB/month of egress processed through the new NAT gateway",
        },
        narrative: Narrative {
            root_cause_label: "NAT Gateway Added (Network Egress)",
            root_cause_detail: "{{ address }} introduces a NAT gateway; it bills hourly from creation plus a per-GB charge on all processed traffic.",
            severity_rationale: "NAT gateways are a fixed hourly burn that is invisible in compute reviews; scored {{ score }}/100.",
            recommendations: &[
                RecommendationTemplate {
                    priority: Priority::High,
                    action: "Route S3 and DynamoDB traffic through VPC gateway endpoints; they bypass NAT processing charges entirely",
                    savings_fraction: 0.4,
                },
                RecommendationTemplate {
                    priority: Priority::Medium,
                    action: "Share one NAT gateway across private subnets in the same availability zone",
                    savings_fraction: 0.3,
                },
            ],
        },
    },
    Rule {
        id: "s3-lifecycle-disabled",
        resource_types: &["aws_s3_bucket_lifecycle_configuration"],
        trigger: Trigger::Attribute("rule.0.status"),
        predicate: Predicate::StatusNoLongerEnabled,
        severity: Severity::Medium,
        severity_score: 60,
        change_type: ChangeType::Subtle,
        cost_basis: CostBasis::StorageAccrual { gb_price: 0.023 },
        scaling: Scaling {
            min: 100.0,
            max: 500.0,
            assumption: "100-500 GB/month continue accruing in STANDARD storage with no lifecycle transition",
        },
        narrative: Narrative {
            root_cause_label: "S3 Lifecycle Rule Disabled (Storage Accrual)",
            root_cause_detail: "{{ address }} no longer transitions or expires objects; storage accrues at the STANDARD rate indefinitely.",
            severity_rationale: "Disabled lifecycle rules compound monthly as unexpired objects accumulate; scored {{ score }}/100.",
            recommendations: &[
                RecommendationTemplate {
                    priority: Priority::High,
                    action: "Re-enable the lifecycle rule; transition to STANDARD_IA at 30 days and expire at 365",
                    savings_fraction: 1.0,
                },
                RecommendationTemplate {
                    priority: Priority::Low,
                    action: "Enable storage-class analysis to validate the transition window",
                    savings_fraction: 0.0,
                },
            ],
        },
    },
    Rule {
        id: "log-retention-disabled",
        resource_types: &["aws_cloudwatch_log_group"],
        trigger: Trigger::Attribute("retention_in_days"),
        predicate: Predicate::RetentionDropsToZero,
        severity: Severity::Medium,
        severity_score: 55,
        change_type: ChangeType::Subtle,
        cost_basis: CostBasis::StorageAccrual { gb_price: 0.03 },
        scaling: Scaling {
            min: 300.0,
            max: 1500.0,
            assumption: "10-50 GB/day of log ingest retained indefinitely (300-1500 GB/month)",
        },
        narrative: Narrative {
            root_cause_label: "CloudWatch Log Retention Disabled (Log Accrual)",
            root_cause_detail: "{{ address }} drops retention from {{ before }} days to never-expire; ingested logs are stored forever.",
            severity_rationale: "Log storage grows linearly with ingest once retention is lifted; scored {{ score }}/100.",
            recommendations: &[
                RecommendationTemplate {
                    priority: Priority::High,
                    action: "Restore a finite retention_in_days; 30-90 days covers most audit requirements",
                    savings_fraction: 1.0,
                },
                RecommendationTemplate {
                    priority: Priority::Medium,
                    action: "Export long-term archives to S3 with a Glacier lifecycle instead",
                    savings_fraction: 0.5,
                },
            ],
        },
    },
    Rule {
        id: "ebs-iops-overprovisioned",
        resource_types: &["aws_ebs_volume"],
        trigger: Trigger::Attribute("iops"),
        predicate: Predicate::NumericIncreaseAtLeast(2.0),
        severity: Severity::Low,
        severity_score: 50,
        change_type: ChangeType::Subtle,
        cost_basis: CostBasis::UnitMonthly {
            unit_price: 0.005,
            unit: "IOPS",
        },
        scaling: Scaling {
            min: 1.0,
            max: 1.0,
            assumption: "provisioned IOPS above the gp3 baseline are billed on allocation, not consumption",
        },
        narrative: Narrative {
            root_cause_label: "EBS Provisioned IOPS Increase (Storage Performance)",
            root_cause_detail: "{{ address }} raises provisioned IOPS from {{ before }} to {{ after }}; provisioned IOPS bill whether consumed or not.",
            severity_rationale: "Provisioned performance is billed on allocation, not use; scored {{ score }}/100.",
            recommendations: &[
                RecommendationTemplate {
                    priority: Priority::Medium,
                    action: "Benchmark actual IOPS consumption; the gp3 baseline covers 3000 IOPS at no extra charge",
                    savings_fraction: 0.6,
                },
            ],
        },
    },
    Rule {
        id: "ebs-volume-expansion",
        resource_types: &["aws_ebs_volume"],
        trigger: Trigger::Attribute("size"),
        predicate: Predicate::NumericIncreaseAtLeast(2.0),
        severity: Severity::Low,
        severity_score: 45,
        change_type: ChangeType::Obvious,
        cost_basis: CostBasis::UnitMonthly {
            unit_price: 0.08,
            unit: "GB",
        },
        scaling: Scaling {
            min: 1.0,
            max: 1.0,
            assumption: "gp3 storage billed per GB-month on the full provisioned size",
        },
        narrative: Narrative {
            root_cause_label: "EBS Volume Expansion (Storage Growth)",
            root_cause_detail: "{{ address }} grows from {{ before }} GB to {{ after }} GB.",
            severity_rationale: "Volume growth is a small but permanent addition to the monthly bill; scored {{ score }}/100.",
            recommendations: &[
                RecommendationTemplate {
                    priority: Priority::Low,
                    action: "Confirm the filesystem actually needs the headroom; EBS volumes cannot shrink",
                    savings_fraction: 0.0,
                },
            ],
        },
    },
    Rule {
        id: "dynamodb-provisioned-spike",
        resource_types: &["aws_dynamodb_table"],
        trigger: Trigger::Attribute("write_capacity"),
        predicate: Predicate::NumericIncreaseAtLeast(2.0),
        severity: Severity::Low,
        severity_score: 40,
        change_type: ChangeType::Subtle,
        cost_basis: CostBasis::UnitHours {
            unit_price: 0.00065,
            unit: "WCU",
        },
        scaling: Scaling {
            min: 1.0,
            max: 1.0,
            assumption: "provisioned write capacity is billed hourly whether consumed or not",
        },
        narrative: Narrative {
            root_cause_label: "DynamoDB Provisioned Capacity Spike (Throughput)",
            root_cause_detail: "{{ address }} raises write_capacity from {{ before }} to {{ after }} units, billed hourly regardless of consumption.",
            severity_rationale: "Provisioned throughput bills around the clock even when idle; scored {{ score }}/100.",
            recommendations: &[
                RecommendationTemplate {
                    priority: Priority::High,
                    action: "Switch to on-demand billing if traffic is spiky or unpredictable",
                    savings_fraction: 0.5,
                },
                RecommendationTemplate {
                    priority: Priority::Medium,
                    action: "Enable auto scaling with a 70% target utilization",
                    savings_fraction: 0.3,
                },
            ],
        },
    },
];
