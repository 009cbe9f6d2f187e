//! Sample model for marked-sample validation.
//!
//! A [`Sample`] mirrors the shape of expected data: plain scalars, sequences,
//! and mappings, with selected positions wrapped in a [`MarkedNode`] carrying
//! validation rules. Marked positions are their own enum variant rather than
//! tagged objects, so they can never be confused with legitimately-shaped
//! data.

use regex::Regex;
use serde_json::Value;

use crate::registry::RuleSet;

/// Optional argument passed to a rule at application time.
///
/// Rules that need no argument see [`Extra::None`]. `isMatching` expects a
/// [`Extra::Pattern`]; `isOneOf` expects an [`Extra::Value`] holding an
/// array. A rule handed the wrong variant is expected to fail the check, not
/// raise an error.
#[derive(Debug, Clone, Default)]
pub enum Extra {
    /// No argument supplied.
    #[default]
    None,
    /// An arbitrary JSON value.
    Value(Value),
    /// A compiled regular expression.
    Pattern(Regex),
}

impl From<Value> for Extra {
    fn from(value: Value) -> Self {
        Extra::Value(value)
    }
}

impl From<Regex> for Extra {
    fn from(pattern: Regex) -> Self {
        Extra::Pattern(pattern)
    }
}

impl From<Vec<Value>> for Extra {
    fn from(values: Vec<Value>) -> Self {
        Extra::Value(Value::Array(values))
    }
}

/// A single rule application attached to a marked node: the registered rule
/// name plus the extra argument captured at application time.
#[derive(Debug, Clone)]
pub struct AppliedRule {
    /// Name the rule was registered under.
    pub name: String,
    /// Argument captured when the rule was applied.
    pub extra: Extra,
}

/// A sample position annotated with one or more rules.
///
/// Created by [`Marker`](crate::Marker) methods; re-marking an already marked
/// value appends to the same node's rule list instead of nesting wrappers, so
/// application order is preserved and `marker.um(marker.ian(x))` yields one
/// node with two rules.
#[derive(Debug, Clone)]
pub struct MarkedNode {
    inner: Box<Sample>,
    rules: Vec<AppliedRule>,
    repeat_key: bool,
    rule_set: RuleSet,
}

impl MarkedNode {
    pub(crate) fn new(inner: Sample, applied: AppliedRule, repeat_key: bool, rule_set: RuleSet) -> Self {
        Self {
            inner: Box::new(inner),
            rules: vec![applied],
            repeat_key,
            rule_set,
        }
    }

    pub(crate) fn push_rule(&mut self, applied: AppliedRule) {
        self.rules.push(applied);
    }

    /// The wrapped sample.
    pub fn inner(&self) -> &Sample {
        &self.inner
    }

    /// Attached rules, in application order.
    pub fn rules(&self) -> &[AppliedRule] {
        &self.rules
    }

    /// Whether this node's key is a wildcard: its inner shape applies to
    /// every property of the data object at this position.
    pub fn is_repeat_key(&self) -> bool {
        self.repeat_key
    }

    pub(crate) fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }
}

/// A marked sample: the expected shape of data plus validation obligations.
///
/// Unannotated scalars impose no constraint. A [`Sample::Seq`] validates
/// every element of array data against its first element. A [`Sample::Map`]
/// validates data properties in the sample's own authoring order. Marked
/// positions carry the rules to run.
///
/// # Examples
///
/// ```
/// use sample_check_core::{Marker, Sample, validate};
/// use serde_json::json;
///
/// let marker = Marker::new(true);
/// let sample = Sample::map([
///     ("name", marker.um("")),
///     ("age", marker.ian(0)),
/// ]);
///
/// assert!(validate(&json!({"name": "ada", "age": 36}), &sample).unwrap().passed());
/// assert!(!validate(&json!({"age": 36}), &sample).unwrap().passed());
/// ```
#[derive(Debug, Clone)]
pub enum Sample {
    /// A plain scalar; always passes.
    Leaf(Value),
    /// An array sample; the first element is the element sample.
    Seq(Vec<Sample>),
    /// An object sample; entries keep authoring order.
    Map(Vec<(String, Sample)>),
    /// A position annotated with rules.
    Marked(MarkedNode),
}

impl Sample {
    /// Builds an object sample from `(name, sample)` entries, preserving
    /// entry order.
    ///
    /// # Examples
    ///
    /// ```
    /// use sample_check_core::Sample;
    ///
    /// let sample = Sample::map([("id", 0), ("label", 0)]);
    /// assert!(matches!(sample, Sample::Map(ref entries) if entries.len() == 2));
    /// ```
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Sample>,
    {
        Sample::Map(
            entries
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Builds an array sample. Only the first element is consulted during
    /// validation.
    pub fn seq<V: Into<Sample>>(elems: impl IntoIterator<Item = V>) -> Self {
        Sample::Seq(elems.into_iter().map(Into::into).collect())
    }

    /// Whether this position carries rules.
    pub fn is_marked(&self) -> bool {
        matches!(self, Sample::Marked(_))
    }

    /// Strips one level of marking, if any. Deeper accidental nesting is
    /// handled by the validator's normal walk.
    pub(crate) fn unwrap_marked(&self) -> &Sample {
        match self {
            Sample::Marked(node) => node.inner(),
            other => other,
        }
    }
}

impl From<Value> for Sample {
    /// Converts a JSON value into an unannotated sample of the same shape.
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Sample::Seq(items.into_iter().map(Sample::from).collect()),
            Value::Object(entries) => Sample::Map(
                entries
                    .into_iter()
                    .map(|(name, value)| (name, Sample::from(value)))
                    .collect(),
            ),
            scalar => Sample::Leaf(scalar),
        }
    }
}

impl From<&Value> for Sample {
    fn from(value: &Value) -> Self {
        Sample::from(value.clone())
    }
}

impl From<&str> for Sample {
    fn from(value: &str) -> Self {
        Sample::Leaf(Value::from(value))
    }
}

impl From<String> for Sample {
    fn from(value: String) -> Self {
        Sample::Leaf(Value::from(value))
    }
}

impl From<bool> for Sample {
    fn from(value: bool) -> Self {
        Sample::Leaf(Value::from(value))
    }
}

impl From<i64> for Sample {
    fn from(value: i64) -> Self {
        Sample::Leaf(Value::from(value))
    }
}

impl From<i32> for Sample {
    fn from(value: i32) -> Self {
        Sample::Leaf(Value::from(value))
    }
}

impl From<u64> for Sample {
    fn from(value: u64) -> Self {
        Sample::Leaf(Value::from(value))
    }
}

impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Sample::Leaf(Value::from(value))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_value_mirrors_shape() {
        let sample = Sample::from(json!({"a": [1, 2], "b": {"c": null}}));

        let Sample::Map(entries) = sample else {
            panic!("expected map sample");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "a");
        assert!(matches!(entries[0].1, Sample::Seq(ref elems) if elems.len() == 2));
        assert!(matches!(entries[1].1, Sample::Map(_)));
    }

    #[test]
    fn test_map_preserves_entry_order() {
        let sample = Sample::map([("z", 0), ("a", 1), ("m", 2)]);

        let Sample::Map(entries) = sample else {
            panic!("expected map sample");
        };
        let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_scalar_conversions_are_leaves() {
        assert!(matches!(Sample::from("x"), Sample::Leaf(Value::String(_))));
        assert!(matches!(Sample::from(3), Sample::Leaf(Value::Number(_))));
        assert!(matches!(Sample::from(true), Sample::Leaf(Value::Bool(_))));
        assert!(matches!(Sample::from(json!(null)), Sample::Leaf(Value::Null)));
    }

    #[test]
    fn test_unwrap_marked_strips_one_level() {
        let marker = crate::Marker::new(true);
        let sample = marker.um(5);

        assert!(sample.is_marked());
        assert!(matches!(sample.unwrap_marked(), Sample::Leaf(_)));

        let plain = Sample::from(5);
        assert!(matches!(plain.unwrap_marked(), Sample::Leaf(_)));
    }
}
