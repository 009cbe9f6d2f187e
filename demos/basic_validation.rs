//! Build a marked sample for a user payload and validate two instances.
//!
//! Run with: `cargo run --example basic_validation`

use regex::Regex;
use sample_check_core::{Marker, Sample, validate};
use serde_json::json;

fn main() {
    let marker = Marker::new(true);

    let sample = Sample::map([
        ("name", marker.um("")),
        ("age", marker.um(marker.ian(0))),
        ("email", marker.im("", Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap())),
        ("role", marker.ioo("", ["admin", "editor", "viewer"])),
        ("tags", marker.iaa(Sample::seq([""]))),
    ]);

    let good = json!({
        "name": "ada",
        "age": 36,
        "email": "ada@example.com",
        "role": "admin",
        "tags": ["ops", "billing"],
    });
    let outcome = validate(&good, &sample).expect("sample is well-formed");
    println!("good payload passed: {}", outcome.passed());

    let bad = json!({
        "name": "grace",
        "age": "36",
        "email": "grace@example.com",
        "role": "admin",
        "tags": [],
    });
    let outcome = validate(&bad, &sample).expect("sample is well-formed");
    match outcome.failure() {
        Some(failure) => println!("bad payload rejected: {failure}"),
        None => println!("bad payload unexpectedly passed"),
    }
}
