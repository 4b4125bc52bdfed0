use colored::Colorize;

use crate::analyzer::display::BoxDrawer;
use crate::analyzer::rules::{self, CostBasis, Predicate, Trigger};
use crate::handlers::utils;

pub fn handle_rules(detailed: bool) -> crate::Result<()> {
    println!(
        "\n{}\n{}",
        format!(
            "📋 Detection Rules (revision {})",
            rules::RULE_SET_REVISION
        )
        .bright_white()
        .bold(),
        "═".repeat(80).bright_blue()
    );

    let mut rules_box = BoxDrawer::new("Rule Table");
    let table = rules::rule_table();
    for (i, rule) in table.iter().enumerate() {
        rules_box.add_value_only(&format!(
            "{}  severity: {} ({})",
            rule.id.yellow().bold(),
            utils::severity_colored(rule.severity),
            rule.severity_score
        ));
        rules_box.add_value_only(&format!(
            "   resources: {}",
            rule.resource_types.join(", ").cyan()
        ));
        if detailed {
            rules_box.add_value_only(&format!("   fires when: {}", describe_rule(rule)));
            rules_box.add_value_only(&format!("   cost model: {}", describe_basis(&rule.cost_basis)));
            rules_box.add_value_only(&format!("   assumes: {}", rule.scaling.assumption.dimmed()));
            let path = rules::dependency_path(rule.resource_types[0]);
            if !path.is_empty() {
                rules_box.add_value_only(&format!(
                    "   ripples through: {}",
                    path.join(" → ").dimmed()
                ));
            }
        }
        if i < table.len() - 1 {
            rules_box.add_value_only("");
        }
    }
    print!("\n{}", rules_box.draw());
    Ok(())
}

fn describe_rule(rule: &rules::Rule) -> String {
    let subject = match rule.trigger {
        Trigger::Attribute(path) => path,
        Trigger::ResourceCreated => "resource",
    };
    match rule.predicate {
        Predicate::HourlyRateIncrease(_) => {
            format!("{} moves to a class with a higher hourly rate", subject)
        }
        Predicate::NumericIncreaseAtLeast(factor) => {
            format!("{} increases by at least {}x", subject, factor)
        }
        Predicate::StatusNoLongerEnabled => {
            format!("{} leaves \"Enabled\" (changed or removed)", subject)
        }
        Predicate::RetentionDropsToZero => {
            format!("{} drops from a finite value to 0/absent", subject)
        }
        Predicate::Always => format!("{} is created", subject),
    }
}

fn describe_basis(basis: &CostBasis) -> String {
    match basis {
        CostBasis::InstanceHours(_) => "hourly rate delta × 730 h/mo × instance window".to_string(),
        CostBasis::UnitHours { unit_price, unit } => {
            format!("added {}s × ${}/{}-hr × 730 h/mo", unit, unit_price, unit)
        }
        CostBasis::UnitMonthly { unit_price, unit } => {
            format!("added {} × ${}/{}-month", unit, unit_price, unit)
        }
        CostBasis::GatewayMonthly { hourly, per_gb } => {
            format!("${}/hr × 730 h/mo + ${}/GB processed", hourly, per_gb)
        }
        CostBasis::StorageAccrual { gb_price } => {
            format!("assumed GB window × ${}/GB-month", gb_price)
        }
    }
}
