//! Declarative marked-sample validation for JSON trees.
//!
//! A marked sample is a template that mirrors the shape of expected data,
//! with selected positions annotated with validation rules. This crate
//! provides the two halves of that mechanism:
//!
//! - [`Marker`] — a builder that attaches rules to values, composing
//!   multiple rules onto one position and supporting a launch flag that
//!   turns a whole schema inert without rewriting it.
//! - [`validate`] — a recursive validator that walks data and sample in
//!   lock-step, runs the attached rules at each marked position, and stops
//!   at the first failure.
//!
//! Rules resolve through two tables: a process-wide registry
//! ([`register_rule`], [`register_rule_map`]) seeded with the built-in rule
//! set, and per-marker instance rules ([`Marker::add_rule`]) that shadow
//! global names. Both tables are meant to be populated at setup time;
//! registering rules while validations run on other threads is a
//! precondition violation.
//!
//! Validation outcomes are values, never panics: [`Outcome`] reports pass or
//! the first failure with its position. `Err` is reserved for contract
//! violations (unknown rule names, pathological nesting depth).
//!
//! # Example
//!
//! ```
//! use sample_check_core::{Marker, Sample, validate};
//! use serde_json::json;
//!
//! let marker = Marker::new(true);
//! let sample = Sample::map([
//!     ("name", marker.um("")),
//!     ("age", marker.um(marker.ian(0))),
//!     ("status", marker.ioo("", ["active", "disabled"])),
//! ]);
//!
//! assert!(validate(&json!({"name": "ada", "age": 36, "status": "active"}), &sample)
//!     .unwrap()
//!     .passed());
//!
//! let data = json!({"name": "ada", "age": "36"});
//! let outcome = validate(&data, &sample).unwrap();
//! let failure = outcome.failure().unwrap();
//! assert_eq!(failure.rule, "isNumber");
//! assert_eq!(failure.position.prop, "age");
//! ```

mod marker;
mod registry;
mod rules;
mod sample;
mod validate;

pub use marker::Marker;
pub use registry::{Rule, register_rule, register_rule_map, rule_fn};
pub use rules::{
    IS_ARRAY, IS_MATCHING, IS_NOT_NUMBER, IS_NUMBER, IS_ONE_OF, NOT_NULL, REPEAT_KEY, UNMISSING,
};
pub use sample::{AppliedRule, Extra, MarkedNode, Sample};
pub use validate::{
    Failure, FailureReport, MAX_DEPTH, Outcome, Position, ValidateError, validate,
};
