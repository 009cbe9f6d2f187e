//! Rule trait and two-level rule resolution.
//!
//! Rules live in two tables: a process-wide table seeded with the built-in
//! rule set, and a per-[`Marker`](crate::Marker) overlay for instance-scoped
//! rules. Resolution consults the overlay first, then the global table, and
//! otherwise fails. The global table is meant to be populated at setup time;
//! registering rules while validations are running on other threads is a
//! precondition violation, not a checked error.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use serde_json::Value;
use tracing::debug;

use crate::rules;
use crate::sample::Extra;

/// A named predicate over one property of concrete data.
///
/// `data` is the container currently under inspection (usually an object),
/// `prop` the property name the rule was attached to, and `extra` the
/// argument captured at application time. Implemented for free by any
/// matching closure or function.
///
/// # Examples
///
/// ```
/// use sample_check_core::{Extra, Rule};
/// use serde_json::{Value, json};
///
/// let even = |data: &Value, prop: &str, _: &Extra| {
///     data.get(prop).and_then(Value::as_i64).is_some_and(|n| n % 2 == 0)
/// };
/// assert!(even.check(&json!({"n": 4}), "n", &Extra::None));
/// assert!(!even.check(&json!({"n": 3}), "n", &Extra::None));
/// ```
pub trait Rule: Send + Sync {
    /// Returns true when the property satisfies this rule.
    fn check(&self, data: &Value, prop: &str, extra: &Extra) -> bool;
}

impl<F> Rule for F
where
    F: Fn(&Value, &str, &Extra) -> bool + Send + Sync,
{
    fn check(&self, data: &Value, prop: &str, extra: &Extra) -> bool {
        self(data, prop, extra)
    }
}

/// Wraps a closure as a shareable [`Rule`] trait object.
///
/// Convenience for building the heterogeneous maps that
/// [`register_rule_map`] and [`Marker::add_rule_map`](crate::Marker::add_rule_map)
/// accept.
pub fn rule_fn(check: impl Fn(&Value, &str, &Extra) -> bool + Send + Sync + 'static) -> Arc<dyn Rule> {
    Arc::new(check)
}

pub(crate) type RuleMap = HashMap<String, Arc<dyn Rule>>;

static GLOBAL: LazyLock<RwLock<RuleMap>> = LazyLock::new(|| {
    let mut map = RuleMap::new();
    rules::install_builtins(&mut map);
    RwLock::new(map)
});

/// Registers a rule in the process-wide table.
///
/// Re-registering an existing name overwrites it; last write wins and no
/// error is raised. Rules registered here resolve for every marker unless an
/// instance-scoped rule of the same name shadows them.
///
/// # Examples
///
/// ```
/// use sample_check_core::{Extra, Marker, Sample, register_rule, validate};
/// use serde_json::{Value, json};
///
/// register_rule("nonEmpty", |data: &Value, prop: &str, _: &Extra| {
///     data.get(prop).and_then(Value::as_str).is_some_and(|s| !s.is_empty())
/// });
///
/// let marker = Marker::new(true);
/// let sample = Sample::map([("tag", marker.mark("nonEmpty", "", Extra::None))]);
/// assert!(validate(&json!({"tag": "x"}), &sample).unwrap().passed());
/// assert!(!validate(&json!({"tag": ""}), &sample).unwrap().passed());
/// ```
pub fn register_rule(name: impl Into<String>, rule: impl Rule + 'static) {
    let name = name.into();
    debug!(rule = %name, "Registering rule");
    GLOBAL
        .write()
        .expect("rule registry lock poisoned")
        .insert(name, Arc::new(rule));
}

/// Registers every entry of `rules` in the process-wide table.
///
/// Entries apply in iteration order, so a later entry with a colliding name
/// wins.
pub fn register_rule_map<K: Into<String>>(rules: impl IntoIterator<Item = (K, Arc<dyn Rule>)>) {
    let mut table = GLOBAL.write().expect("rule registry lock poisoned");
    for (name, rule) in rules {
        let name = name.into();
        debug!(rule = %name, "Registering rule");
        table.insert(name, rule);
    }
}

/// Resolves a rule name through an overlay, then the global table.
pub(crate) fn resolve(overlay: &RuleSet, name: &str) -> Option<Arc<dyn Rule>> {
    overlay.get(name).or_else(|| {
        GLOBAL
            .read()
            .expect("rule registry lock poisoned")
            .get(name)
            .cloned()
    })
}

/// Instance-scoped rule table shared between a marker and the nodes it
/// created.
///
/// The table is shared by handle, so rules added to a marker after a sample
/// was built still resolve when that sample is validated.
#[derive(Clone, Default)]
pub(crate) struct RuleSet {
    rules: Arc<RwLock<RuleMap>>,
}

impl RuleSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, name: String, rule: Arc<dyn Rule>) {
        self.rules
            .write()
            .expect("instance rule table lock poisoned")
            .insert(name, rule);
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<dyn Rule>> {
        self.rules
            .read()
            .expect("instance rule table lock poisoned")
            .get(name)
            .cloned()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.rules.read().map(|rules| rules.len()).unwrap_or(0);
        f.debug_struct("RuleSet").field("rules", &len).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn always(_: &Value, _: &str, _: &Extra) -> bool {
        true
    }

    fn never(_: &Value, _: &str, _: &Extra) -> bool {
        false
    }

    #[test]
    fn test_builtins_resolve_without_setup() {
        let overlay = RuleSet::new();
        for name in [
            rules::UNMISSING,
            rules::IS_NUMBER,
            rules::NOT_NULL,
            rules::IS_ARRAY,
            rules::IS_NOT_NUMBER,
            rules::IS_MATCHING,
            rules::IS_ONE_OF,
            rules::REPEAT_KEY,
        ] {
            assert!(resolve(&overlay, name).is_some(), "missing builtin {name}");
        }
    }

    #[test]
    fn test_register_overwrites_last_write_wins() {
        register_rule("registry_test_rewrite", always);
        register_rule("registry_test_rewrite", never);

        let rule = resolve(&RuleSet::new(), "registry_test_rewrite").unwrap();
        assert!(!rule.check(&json!({}), "x", &Extra::None));
    }

    #[test]
    fn test_register_map_later_entry_wins() {
        register_rule_map([
            ("registry_test_map", rule_fn(always)),
            ("registry_test_map", rule_fn(never)),
        ]);

        let rule = resolve(&RuleSet::new(), "registry_test_map").unwrap();
        assert!(!rule.check(&json!({}), "x", &Extra::None));
    }

    #[test]
    fn test_overlay_shadows_global() {
        register_rule("registry_test_shadow", always);

        let overlay = RuleSet::new();
        overlay.insert("registry_test_shadow".into(), rule_fn(never));

        let rule = resolve(&overlay, "registry_test_shadow").unwrap();
        assert!(!rule.check(&json!({}), "x", &Extra::None));
    }

    #[test]
    fn test_unknown_name_does_not_resolve() {
        assert!(resolve(&RuleSet::new(), "registry_test_absent").is_none());
    }
}
