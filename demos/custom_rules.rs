//! Register custom rules: one process-wide, one scoped to a single marker.
//!
//! Run with: `cargo run --example custom_rules`

use sample_check_core::{Extra, Marker, Sample, register_rule, validate};
use serde_json::{Value, json};

fn main() {
    // Visible to every marker in the process.
    register_rule("nonEmptyString", |data: &Value, prop: &str, _: &Extra| {
        data.get(prop).and_then(Value::as_str).is_some_and(|s| !s.is_empty())
    });

    let marker = Marker::new(true);

    // Visible only through this marker's nodes.
    marker.add_rule("withinLimit", |data: &Value, prop: &str, extra: &Extra| {
        let Extra::Value(Value::Number(limit)) = extra else {
            return false;
        };
        data.get(prop)
            .and_then(Value::as_f64)
            .zip(limit.as_f64())
            .is_some_and(|(value, limit)| value <= limit)
    });

    let sample = Sample::map([
        ("label", marker.mark("nonEmptyString", "", Extra::None)),
        ("retries", marker.mark("withinLimit", 0, json!(5))),
    ]);

    for data in [
        json!({"label": "deploy", "retries": 3}),
        json!({"label": "", "retries": 3}),
        json!({"label": "deploy", "retries": 9}),
    ] {
        match validate(&data, &sample).expect("rules are registered").failure() {
            Some(failure) => println!("{data}: {failure}"),
            None => println!("{data}: ok"),
        }
    }
}
