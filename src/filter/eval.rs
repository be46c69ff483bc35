//! Evaluator for filter trees.

use super::ast::Filter;
use std::collections::HashMap;

/// Attribute name to its ordered values.
///
/// Values are opaque: they only need to compare against the string held by
/// an equality node, so both `String` and `serde_json::Value` work.
pub type Input<V = serde_json::Value> = HashMap<String, Vec<V>>;

impl Filter {
    /// Evaluate the tree against a set of attributes.
    ///
    /// An OR with no children matches everything, same as an empty AND.
    pub fn matches<V>(&self, input: &Input<V>) -> bool
    where
        V: PartialEq<str>,
    {
        match self {
            Filter::And { children } => children.iter().all(|f| f.matches(input)),

            Filter::Or { children } => {
                children.is_empty() || children.iter().any(|f| f.matches(input))
            }

            Filter::Equality { key, value } => match input.get(key) {
                None => false,
                Some(values) => values.iter().any(|v| v.eq(value.as_str())),
            },
        }
    }
}
