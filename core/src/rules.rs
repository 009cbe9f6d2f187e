//! Built-in rule set.
//!
//! Eight rules ship by default and are installed into the process-wide table
//! on first use:
//!
//! - [`UNMISSING`] — the container has an own property of that name.
//! - [`IS_NUMBER`] / [`IS_NOT_NUMBER`] — the property is / is not numeric.
//! - [`NOT_NULL`] — the property equals null. The name is misleading but the
//!   behavior is load-bearing for existing samples; it is preserved, not
//!   corrected.
//! - [`IS_ARRAY`] — the property is an array.
//! - [`IS_MATCHING`] — a regex argument matches the property's text form.
//! - [`IS_ONE_OF`] — the property loosely equals an element of a sequence
//!   argument.
//! - [`REPEAT_KEY`] — always true; applied only for its structural wildcard
//!   effect on the node it creates.
//!
//! `isMatching` and `isOneOf` fail the check (rather than erroring) when
//! handed a malformed extra argument.

use serde_json::Value;

use crate::registry::RuleMap;
use crate::sample::Extra;

/// Canonical name of the presence rule (`um`).
pub const UNMISSING: &str = "unmissing";
/// Canonical name of the numeric-type rule (`ian`).
pub const IS_NUMBER: &str = "isNumber";
/// Canonical name of the equals-null rule (`nu`).
pub const NOT_NULL: &str = "notNull";
/// Canonical name of the array-type rule (`iaa`).
pub const IS_ARRAY: &str = "isArray";
/// Canonical name of the non-numeric rule (`inan`).
pub const IS_NOT_NUMBER: &str = "isNotNumber";
/// Canonical name of the pattern rule (`im`).
pub const IS_MATCHING: &str = "isMatching";
/// Canonical name of the membership rule (`ioo`).
pub const IS_ONE_OF: &str = "isOneOf";
/// Canonical name of the wildcard-key rule (`rk`).
pub const REPEAT_KEY: &str = "repeatKey";

pub(crate) fn install_builtins(map: &mut RuleMap) {
    let entries: [(&str, fn(&Value, &str, &Extra) -> bool); 8] = [
        (UNMISSING, unmissing),
        (IS_NUMBER, is_number),
        (NOT_NULL, not_null),
        (IS_ARRAY, is_array),
        (IS_NOT_NUMBER, is_not_number),
        (IS_MATCHING, is_matching),
        (IS_ONE_OF, is_one_of),
        (REPEAT_KEY, repeat_key),
    ];
    for (name, check) in entries {
        map.insert(name.to_string(), std::sync::Arc::new(check));
    }
}

fn field<'a>(data: &'a Value, prop: &str) -> Option<&'a Value> {
    data.as_object().and_then(|object| object.get(prop))
}

fn unmissing(data: &Value, prop: &str, _extra: &Extra) -> bool {
    data.as_object().is_some_and(|object| object.contains_key(prop))
}

fn is_number(data: &Value, prop: &str, _extra: &Extra) -> bool {
    matches!(field(data, prop), Some(Value::Number(_)))
}

// Despite the name, passes only when the property is exactly null. Existing
// samples depend on this, so the name stays.
fn not_null(data: &Value, prop: &str, _extra: &Extra) -> bool {
    matches!(field(data, prop), Some(Value::Null))
}

fn is_array(data: &Value, prop: &str, _extra: &Extra) -> bool {
    matches!(field(data, prop), Some(Value::Array(_)))
}

// Negation of is_number, so an absent property counts as not-a-number.
fn is_not_number(data: &Value, prop: &str, extra: &Extra) -> bool {
    !is_number(data, prop, extra)
}

fn is_matching(data: &Value, prop: &str, extra: &Extra) -> bool {
    let Extra::Pattern(pattern) = extra else {
        return false;
    };
    match field(data, prop) {
        Some(value) => pattern.is_match(&text_form(value)),
        None => false,
    }
}

fn is_one_of(data: &Value, prop: &str, extra: &Extra) -> bool {
    let Extra::Value(Value::Array(options)) = extra else {
        return false;
    };
    // An absent property behaves like null here, so null options match it.
    let value = field(data, prop).unwrap_or(&Value::Null);
    options.iter().any(|option| loose_eq(value, option))
}

fn repeat_key(_data: &Value, _prop: &str, _extra: &Extra) -> bool {
    true
}

/// Type-coercing equality used by `isOneOf`.
///
/// Same-type values compare structurally. Numeric text compares to numbers
/// by value, and booleans coerce to 0/1 before comparing. Null equals only
/// null.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        // Numbers compare by value, so 2 and 2.0 are equal.
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ if std::mem::discriminant(a) == std::mem::discriminant(b) => a == b,
        (Value::Number(number), Value::String(text))
        | (Value::String(text), Value::Number(number)) => number_text_eq(number, text),
        (Value::Bool(flag), other) | (other, Value::Bool(flag)) => {
            loose_eq(&Value::from(i64::from(*flag)), other)
        }
        _ => false,
    }
}

fn number_text_eq(number: &serde_json::Number, text: &str) -> bool {
    text.trim()
        .parse::<f64>()
        .is_ok_and(|parsed| number.as_f64() == Some(parsed))
}

/// Text form a pattern is matched against: strings as-is, scalars via their
/// display form, null as `"null"`, composites as compact JSON.
fn text_form(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        composite => composite.to_string(),
    }
}
