//! Recursive marked-sample validation.
//!
//! [`validate`] walks concrete data and a [`Sample`] in lock-step: depth
//! first, pre-order, stopping at the first failing rule. Shape mismatches
//! between data and sample (an object sample against a string, an array
//! sample against a number) pass vacuously — only matching shapes are
//! checked, and obligations are expressed exclusively through marked nodes.
//!
//! Validation outcomes are values: a failing rule produces
//! [`Outcome::Fail`], never an error. `Err` is reserved for contract
//! violations — a sample referencing an unregistered rule name, or nesting
//! beyond [`MAX_DEPTH`]. Owned data and sample trees cannot be cyclic, so
//! the depth guard only bounds pathological nesting.
//!
//! # Examples
//!
//! ```
//! use sample_check_core::{Marker, Sample, validate};
//! use serde_json::json;
//!
//! let marker = Marker::new(true);
//! let sample = Sample::map([("name", marker.um(""))]);
//!
//! let data = json!({});
//! let outcome = validate(&data, &sample).unwrap();
//! let failure = outcome.failure().unwrap();
//! assert_eq!(failure.rule, "unmissing");
//! assert_eq!(failure.position.prop, "name");
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::registry;
use crate::sample::Sample;

/// Maximum recursion depth accepted before validation aborts with
/// [`ValidateError::DepthExceeded`].
pub const MAX_DEPTH: usize = 128;

/// Contract violations surfaced by [`validate`].
///
/// These are programming errors in the sample or its rule setup, distinct
/// from validation failures (which are reported as [`Outcome::Fail`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidateError {
    /// A marked node references a rule name with no registration, neither
    /// instance-scoped nor global.
    #[error("no rule registered under name: {0}")]
    UnknownRule(String),
    /// Data or sample nesting exceeded [`MAX_DEPTH`].
    #[error("nesting exceeds maximum validation depth of {0}")]
    DepthExceeded(usize),
}

/// Result of one validation run. Produced fresh per call, never mutated
/// after return.
#[derive(Debug, Clone)]
pub enum Outcome<'a> {
    /// Every applicable rule passed.
    Pass,
    /// The first rule that failed, with its position.
    Fail(Failure<'a>),
}

impl<'a> Outcome<'a> {
    /// Whether validation passed.
    pub fn passed(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    /// The failure, if validation did not pass.
    pub fn failure(&self) -> Option<&Failure<'a>> {
        match self {
            Outcome::Pass => None,
            Outcome::Fail(failure) => Some(failure),
        }
    }
}

/// The first rule failure encountered, in pre-order, depth-first,
/// first-rule-first order.
#[derive(Debug, Clone)]
pub struct Failure<'a> {
    /// Name of the rule that failed.
    pub rule: &'a str,
    /// Where the failure occurred.
    pub position: Position<'a>,
}

/// Failure position: the container under inspection, the sample mapping
/// that holds the obligation, and the property name.
#[derive(Debug, Clone)]
pub struct Position<'a> {
    /// The data container the rule ran against.
    pub data: &'a Value,
    /// The sample mapping containing the marked property.
    pub sample: &'a Sample,
    /// The property the rule was attached to (for wildcard positions, the
    /// data's own property name).
    pub prop: &'a str,
}

impl Failure<'_> {
    /// Copies the failure into an owned, serializable report that outlives
    /// the borrowed data and sample.
    pub fn to_report(&self) -> FailureReport {
        FailureReport {
            rule: self.rule.to_string(),
            prop: self.position.prop.to_string(),
            data: self.position.data.clone(),
        }
    }
}

impl fmt::Display for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule '{}' failed at property '{}'", self.rule, self.position.prop)
    }
}

/// Owned snapshot of a [`Failure`], suitable for logging or serializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    /// Name of the rule that failed.
    pub rule: String,
    /// Property the rule was attached to.
    pub prop: String,
    /// The data container the rule ran against.
    pub data: Value,
}

/// Validates `data` against a marked sample.
///
/// Returns [`Outcome::Pass`] when every rule at every matching position
/// passes, or [`Outcome::Fail`] describing the first failure. Rule
/// application order and the first-failure short-circuit are part of the
/// contract, not incidental.
///
/// # Examples
///
/// ```
/// use sample_check_core::{Marker, Sample, validate};
/// use serde_json::json;
///
/// let marker = Marker::new(true);
/// let sample = Sample::seq([Sample::map([("id", marker.ian(0))])]);
///
/// // Array data: every element checks against the first element sample.
/// assert!(validate(&json!([{"id": 1}, {"id": 2}]), &sample).unwrap().passed());
/// assert!(!validate(&json!([{"id": 1}, {"id": "2"}]), &sample).unwrap().passed());
///
/// // Non-array data: nothing to check, passes vacuously.
/// assert!(validate(&json!("not an array"), &sample).unwrap().passed());
/// ```
pub fn validate<'a>(data: &'a Value, sample: &'a Sample) -> Result<Outcome<'a>, ValidateError> {
    walk(data, sample, 0)
}

fn walk<'a>(data: &'a Value, sample: &'a Sample, depth: usize) -> Result<Outcome<'a>, ValidateError> {
    if depth > MAX_DEPTH {
        return Err(ValidateError::DepthExceeded(MAX_DEPTH));
    }
    match sample {
        // Unannotated leaves impose no constraint.
        Sample::Leaf(_) => Ok(Outcome::Pass),
        // A marked node outside a container has no (container, property)
        // pair to check rules against; only its inner shape applies.
        Sample::Marked(node) => walk(data, node.inner(), depth + 1),
        Sample::Seq(elems) => {
            let Some(elem_sample) = elems.first() else {
                return Ok(Outcome::Pass);
            };
            let Value::Array(items) = data else {
                return Ok(Outcome::Pass);
            };
            for item in items {
                let outcome = walk(item, elem_sample, depth + 1)?;
                if !outcome.passed() {
                    return Ok(outcome);
                }
            }
            Ok(Outcome::Pass)
        }
        Sample::Map(entries) => {
            let Value::Object(object) = data else {
                return Ok(Outcome::Pass);
            };
            for (prop, prop_sample) in entries {
                let outcome = match prop_sample {
                    Sample::Marked(node) if node.is_repeat_key() => {
                        check_repeated(data, object, sample, node.inner(), depth)?
                    }
                    _ => check_property(data, object, sample, prop, prop_sample, depth)?,
                };
                if !outcome.passed() {
                    return Ok(outcome);
                }
            }
            Ok(Outcome::Pass)
        }
    }
}

/// Applies a wildcard position's inner shape to every property of the data
/// object, in the data's own key order.
fn check_repeated<'a>(
    container: &'a Value,
    object: &'a serde_json::Map<String, Value>,
    map_sample: &'a Sample,
    shape: &'a Sample,
    depth: usize,
) -> Result<Outcome<'a>, ValidateError> {
    for prop in object.keys() {
        let outcome = check_property(container, object, map_sample, prop, shape, depth)?;
        if !outcome.passed() {
            return Ok(outcome);
        }
    }
    Ok(Outcome::Pass)
}

/// Runs a property's attached rules in application order, then recurses one
/// unwrapped level into the property's value. A property absent from the
/// data passes the recursion vacuously (only rules like `unmissing` can
/// reject absence).
fn check_property<'a>(
    container: &'a Value,
    object: &'a serde_json::Map<String, Value>,
    map_sample: &'a Sample,
    prop: &'a str,
    prop_sample: &'a Sample,
    depth: usize,
) -> Result<Outcome<'a>, ValidateError> {
    if let Sample::Marked(node) = prop_sample {
        for applied in node.rules() {
            let rule = registry::resolve(node.rule_set(), &applied.name)
                .ok_or_else(|| ValidateError::UnknownRule(applied.name.clone()))?;
            if !rule.check(container, prop, &applied.extra) {
                debug!(rule = %applied.name, prop = %prop, "Rule check failed");
                return Ok(Outcome::Fail(Failure {
                    rule: &applied.name,
                    position: Position {
                        data: container,
                        sample: map_sample,
                        prop,
                    },
                }));
            }
        }
    }
    match object.get(prop) {
        Some(child) => walk(child, prop_sample.unwrap_marked(), depth + 1),
        None => Ok(Outcome::Pass),
    }
}
