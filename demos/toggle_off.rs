//! Define a schema once and disable every check by flipping the marker's
//! launch flag, leaving the schema definition untouched.
//!
//! Run with: `cargo run --example toggle_off`

use sample_check_core::{Marker, Sample, validate};
use serde_json::json;

fn order_sample(marker: &Marker) -> Sample {
    Sample::map([
        ("order_id", marker.um(marker.ian(0))),
        ("items", marker.iaa(Sample::seq([Sample::map([
            ("sku", marker.um("")),
            ("qty", marker.ian(0)),
        ])]))),
    ])
}

fn main() {
    let data = json!({"order_id": "not-a-number", "items": "not-an-array"});

    let launched = order_sample(&Marker::new(true));
    let outcome = validate(&data, &launched).expect("sample is well-formed");
    println!("launched: passed = {}", outcome.passed());

    // Same schema definition, inert marker: every application was the
    // identity, so nothing is checked.
    let inert = order_sample(&Marker::new(false));
    let outcome = validate(&data, &inert).expect("sample is well-formed");
    println!("inert:    passed = {}", outcome.passed());
}
