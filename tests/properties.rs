use proptest::prelude::*;
use serde_json::json;

use costpilot::Money;
use costpilot::analyzer::{ResourceChange, Severity, detector::detect, predictor::predict_all};

fn change(resource_type: &str, path: &str, before: serde_json::Value, after: serde_json::Value) -> ResourceChange {
    ResourceChange {
        address: format!("{}.subject", resource_type),
        resource_type: resource_type.to_string(),
        name: "subject".to_string(),
        attribute_path: path.to_string(),
        before: Some(before),
        after: Some(after),
    }
}

proptest! {
    #[test]
    fn money_always_renders_two_decimals(dollars in -1_000_000.0f64..1_000_000.0) {
        let rendered = Money::from_dollars(dollars).to_string();
        let (_, frac) = rendered.split_once('.').expect("missing decimal point");
        prop_assert_eq!(frac.len(), 2);
    }

    #[test]
    fn money_round_trips_through_its_string_form(cents in -100_000_000i64..100_000_000) {
        let money = Money::from_cents(cents);
        let parsed: Money = money.to_string().parse().unwrap();
        prop_assert_eq!(parsed, money);
    }

    #[test]
    fn predictions_keep_low_at_or_below_high(
        before in 1u64..1_000,
        factor in 2u64..10,
    ) {
        let after = before * factor;
        let changes = vec![
            change("aws_autoscaling_group", "max_size", json!(before), json!(after)),
            change("aws_ebs_volume", "size", json!(before), json!(after)),
            change("aws_ebs_volume", "iops", json!(before), json!(after)),
            change("aws_dynamodb_table", "write_capacity", json!(before), json!(after)),
        ];
        let findings = detect(&changes, Severity::Low);
        prop_assert!(!findings.is_empty());
        for prediction in predict_all(&findings).unwrap() {
            prop_assert!(prediction.monthly_delta_low <= prediction.monthly_delta_high);
        }
    }

    #[test]
    fn sub_threshold_increases_never_fire(
        before in 1u64..1_000,
        // Strictly below the 2x predicate threshold.
        percent in 1u64..100,
    ) {
        let after = before + (before * percent).div_ceil(100).saturating_sub(1);
        let changes = vec![change("aws_autoscaling_group", "max_size", json!(before), json!(after))];
        prop_assert!(detect(&changes, Severity::Low).is_empty());
    }

    #[test]
    fn detection_is_deterministic_for_any_instance_type_pair(
        before_idx in 0usize..6,
        after_idx in 0usize..6,
    ) {
        let ladder = ["t3.nano", "t3.micro", "t3.small", "t3.medium", "t3.large", "t3.xlarge"];
        let changes = vec![change(
            "aws_instance",
            "instance_type",
            json!(ladder[before_idx]),
            json!(ladder[after_idx]),
        )];

        let first = detect(&changes, Severity::Low);
        let second = detect(&changes, Severity::Low);
        prop_assert_eq!(&first, &second);

        // Fires exactly when the hourly rate increases.
        prop_assert_eq!(first.len(), usize::from(after_idx > before_idx));
    }
}
