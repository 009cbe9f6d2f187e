//! Marker builder: attaches rules to sample positions.
//!
//! A [`Marker`] wraps values into marked nodes without touching the caller's
//! value representation. Marking an already marked value merges into the same
//! node, so nesting order never changes the resulting shape — only the order
//! the rules run in. A marker built with the launch flag off turns every
//! application into the identity, which disables a whole schema without
//! rewriting it.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::registry::{Rule, RuleSet};
use crate::rules;
use crate::sample::{AppliedRule, Extra, MarkedNode, Sample};

/// Builder that attaches validation rules to sample positions.
///
/// The built-in rules have shortcut methods carrying the original rule set's
/// names (`um` for `unmissing`, `ian` for `isNumber`, and so on); any
/// registered rule — including instance-scoped ones added via
/// [`add_rule`](Marker::add_rule) — can be applied through
/// [`mark`](Marker::mark).
///
/// # Examples
///
/// ```
/// use sample_check_core::{Marker, Sample, validate};
/// use serde_json::json;
///
/// let marker = Marker::new(true);
///
/// // One node, two rules: must be present and numeric.
/// let sample = Sample::map([("age", marker.um(marker.ian(0)))]);
///
/// assert!(validate(&json!({"age": 30}), &sample).unwrap().passed());
/// assert!(!validate(&json!({"age": "30"}), &sample).unwrap().passed());
/// assert!(!validate(&json!({}), &sample).unwrap().passed());
/// ```
#[derive(Debug, Clone)]
pub struct Marker {
    launched: bool,
    overlay: RuleSet,
}

impl Marker {
    /// Creates a marker. With `launched == false` every rule application
    /// degrades to the identity: no node is created and the value passes
    /// through as a plain sample.
    ///
    /// # Examples
    ///
    /// ```
    /// use sample_check_core::Marker;
    ///
    /// let off = Marker::new(false);
    /// assert!(!off.um(0).is_marked());
    ///
    /// let on = Marker::new(true);
    /// assert!(on.um(0).is_marked());
    /// ```
    pub fn new(launched: bool) -> Self {
        Self {
            launched,
            overlay: RuleSet::new(),
        }
    }

    /// Whether rule applications produce marked nodes.
    pub fn launched(&self) -> bool {
        self.launched
    }

    /// Applies the named rule to `value`.
    ///
    /// If `value` is already a marked node, `(name, extra)` is appended to
    /// its rule list and the same node is returned; otherwise `value` is
    /// wrapped in a new node owned by this marker. The rule name is not
    /// checked here — an unregistered name surfaces as
    /// [`ValidateError::UnknownRule`](crate::ValidateError::UnknownRule)
    /// when the sample is validated.
    pub fn mark(
        &self,
        name: impl Into<String>,
        value: impl Into<Sample>,
        extra: impl Into<Extra>,
    ) -> Sample {
        let sample = value.into();
        if !self.launched {
            return sample;
        }
        let applied = AppliedRule {
            name: name.into(),
            extra: extra.into(),
        };
        match sample {
            Sample::Marked(mut node) => {
                node.push_rule(applied);
                Sample::Marked(node)
            }
            inner => {
                // The wildcard flag is only set when repeatKey creates the
                // node; appending it to an existing node has no structural
                // effect.
                let repeat_key = applied.name == rules::REPEAT_KEY;
                Sample::Marked(MarkedNode::new(inner, applied, repeat_key, self.overlay.clone()))
            }
        }
    }

    /// `unmissing`: the property must be present, whatever its value.
    pub fn um(&self, value: impl Into<Sample>) -> Sample {
        self.mark(rules::UNMISSING, value, Extra::None)
    }

    /// `isNumber`: the property must be numeric.
    pub fn ian(&self, value: impl Into<Sample>) -> Sample {
        self.mark(rules::IS_NUMBER, value, Extra::None)
    }

    /// `notNull`: the property must equal null (historical name, preserved
    /// behavior).
    pub fn nu(&self, value: impl Into<Sample>) -> Sample {
        self.mark(rules::NOT_NULL, value, Extra::None)
    }

    /// `isArray`: the property must be an array.
    pub fn iaa(&self, value: impl Into<Sample>) -> Sample {
        self.mark(rules::IS_ARRAY, value, Extra::None)
    }

    /// `isNotNumber`: the property must not be numeric.
    pub fn inan(&self, value: impl Into<Sample>) -> Sample {
        self.mark(rules::IS_NOT_NUMBER, value, Extra::None)
    }

    /// `isMatching`: the property's text form must match `pattern`.
    ///
    /// # Examples
    ///
    /// ```
    /// use regex::Regex;
    /// use sample_check_core::{Marker, Sample, validate};
    /// use serde_json::json;
    ///
    /// let marker = Marker::new(true);
    /// let sample = Sample::map([
    ///     ("zip", marker.im("", Regex::new(r"^\d{5}$").unwrap())),
    /// ]);
    ///
    /// assert!(validate(&json!({"zip": "02139"}), &sample).unwrap().passed());
    /// assert!(!validate(&json!({"zip": "021"}), &sample).unwrap().passed());
    /// ```
    pub fn im(&self, value: impl Into<Sample>, pattern: Regex) -> Sample {
        self.mark(rules::IS_MATCHING, value, pattern)
    }

    /// `isOneOf`: the property must loosely equal one of `options`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sample_check_core::{Marker, Sample, validate};
    /// use serde_json::json;
    ///
    /// let marker = Marker::new(true);
    /// let sample = Sample::map([("status", marker.ioo(0, ["A", "B"]))]);
    ///
    /// assert!(validate(&json!({"status": "B"}), &sample).unwrap().passed());
    /// assert!(!validate(&json!({"status": "C"}), &sample).unwrap().passed());
    /// ```
    pub fn ioo<V: Into<Value>>(
        &self,
        value: impl Into<Sample>,
        options: impl IntoIterator<Item = V>,
    ) -> Sample {
        let options: Vec<Value> = options.into_iter().map(Into::into).collect();
        self.mark(rules::IS_ONE_OF, value, options)
    }

    /// `repeatKey`: marks this position's key as a wildcard — the wrapped
    /// shape applies to every property of the data object here.
    ///
    /// # Examples
    ///
    /// ```
    /// use sample_check_core::{Marker, Sample, validate};
    /// use serde_json::json;
    ///
    /// let marker = Marker::new(true);
    /// let sample = Sample::map([
    ///     ("*", marker.rk(Sample::map([("id", marker.ian(0))]))),
    /// ]);
    ///
    /// let data = json!({"a": {"id": 1}, "b": {"id": 2}});
    /// assert!(validate(&data, &sample).unwrap().passed());
    ///
    /// let bad = json!({"a": {"id": "x"}});
    /// assert!(!validate(&bad, &sample).unwrap().passed());
    /// ```
    pub fn rk(&self, value: impl Into<Sample>) -> Sample {
        self.mark(rules::REPEAT_KEY, value, Extra::None)
    }

    /// Registers a rule visible only through this marker.
    ///
    /// Instance rules shadow same-named global rules for nodes this marker
    /// created. The table is shared by handle, so samples built before the
    /// call still see the rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use sample_check_core::{Extra, Marker, Sample, validate};
    /// use serde_json::{Value, json};
    ///
    /// let marker = Marker::new(true);
    /// marker.add_rule("positive", |data: &Value, prop: &str, _: &Extra| {
    ///     data.get(prop).and_then(Value::as_f64).is_some_and(|n| n > 0.0)
    /// });
    ///
    /// let sample = Sample::map([("count", marker.mark("positive", 0, Extra::None))]);
    /// assert!(validate(&json!({"count": 3}), &sample).unwrap().passed());
    /// assert!(!validate(&json!({"count": -1}), &sample).unwrap().passed());
    /// ```
    pub fn add_rule(&self, name: impl Into<String>, rule: impl Rule + 'static) {
        let name = name.into();
        debug!(rule = %name, "Adding instance rule");
        self.overlay.insert(name, Arc::new(rule));
    }

    /// Registers every entry of `rules` on this marker; later entries with
    /// colliding names win.
    pub fn add_rule_map<K: Into<String>>(&self, rules: impl IntoIterator<Item = (K, Arc<dyn Rule>)>) {
        for (name, rule) in rules {
            let name = name.into();
            debug!(rule = %name, "Adding instance rule");
            self.overlay.insert(name, rule);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_mark_wraps_plain_value() {
        let marker = Marker::new(true);
        let sample = marker.um("x");

        let Sample::Marked(node) = sample else {
            panic!("expected marked node");
        };
        assert_eq!(node.rules().len(), 1);
        assert_eq!(node.rules()[0].name, rules::UNMISSING);
        assert!(!node.is_repeat_key());
        assert!(matches!(node.inner(), Sample::Leaf(Value::String(_))));
    }

    #[test]
    fn test_nested_marking_merges_into_one_node() {
        let marker = Marker::new(true);

        let sample = marker.um(marker.ian(0));
        let Sample::Marked(node) = sample else {
            panic!("expected marked node");
        };
        let names: Vec<&str> = node.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![rules::IS_NUMBER, rules::UNMISSING]);
        assert!(!node.inner().is_marked());

        // Reversed nesting: same node shape, reversed rule order.
        let sample = marker.ian(marker.um(0));
        let Sample::Marked(node) = sample else {
            panic!("expected marked node");
        };
        let names: Vec<&str> = node.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![rules::UNMISSING, rules::IS_NUMBER]);
    }

    #[test]
    fn test_unlaunched_marker_is_identity() {
        let marker = Marker::new(false);

        assert!(!marker.um(0).is_marked());
        assert!(!marker.ian(marker.um(marker.rk(0))).is_marked());
        assert!(matches!(marker.um("x"), Sample::Leaf(Value::String(_))));
    }

    #[test]
    fn test_repeat_key_flag_set_only_at_creation() {
        let marker = Marker::new(true);

        let Sample::Marked(node) = marker.rk(0) else {
            panic!("expected marked node");
        };
        assert!(node.is_repeat_key());

        // repeatKey appended to an existing node does not set the flag.
        let Sample::Marked(node) = marker.rk(marker.um(0)) else {
            panic!("expected marked node");
        };
        assert!(!node.is_repeat_key());
        assert_eq!(node.rules().len(), 2);
    }

    #[test]
    fn test_ioo_captures_options_in_order() {
        let marker = Marker::new(true);

        let Sample::Marked(node) = marker.ioo(0, ["A", "B"]) else {
            panic!("expected marked node");
        };
        let Extra::Value(Value::Array(options)) = &node.rules()[0].extra else {
            panic!("expected array extra");
        };
        assert_eq!(options, &[json!("A"), json!("B")]);
    }

    #[test]
    fn test_mark_accepts_unregistered_names() {
        // Name resolution is deferred to validation.
        let marker = Marker::new(true);
        let sample = marker.mark("unregistered_yet", 0, Extra::None);
        assert!(sample.is_marked());
    }
}
