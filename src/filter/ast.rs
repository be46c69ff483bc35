//! Filter tree types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the matching tree.
///
/// Composites are only mutated while a tree is being assembled (by the
/// parser, or by hand through [`Filter::append`]). A finished tree is
/// shared by reference and is safe to evaluate from many threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Filter {
    /// Conjunction: `&(a=b)(c=d)`
    And { children: Vec<Filter> },

    /// Disjunction: `|(a=b)(c=d)`
    Or { children: Vec<Filter> },

    /// Attribute equality: `(key=value)`
    Equality { key: String, value: String },
}

impl Filter {
    pub fn new_and() -> Self {
        Filter::And {
            children: Vec::new(),
        }
    }

    pub fn new_or() -> Self {
        Filter::Or {
            children: Vec::new(),
        }
    }

    pub fn equality(key: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Equality {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Append a child to a composite. Appending to an equality node does
    /// nothing.
    pub fn append(&mut self, child: Filter) {
        match self {
            Filter::And { children } | Filter::Or { children } => children.push(child),
            Filter::Equality { .. } => {}
        }
    }

    pub fn children(&self) -> &[Filter] {
        match self {
            Filter::And { children } | Filter::Or { children } => children,
            Filter::Equality { .. } => &[],
        }
    }

    /// Node type name, as used in the serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            Filter::And { .. } => "and",
            Filter::Or { .. } => "or",
            Filter::Equality { .. } => "equality",
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        let op = match self {
            Filter::Equality { key, value } => return write!(f, "({key}={value})"),
            Filter::And { .. } => '&',
            Filter::Or { .. } => '|',
        };

        // Only nested composites carry their own parentheses.
        if nested {
            write!(f, "(")?;
        }
        write!(f, "{op}")?;
        for child in self.children() {
            child.fmt_nested(f, true)?;
        }
        if nested {
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Renders the tree in filter syntax. Output for a tree produced by
/// [`crate::filter::parse`] parses back to an equal tree; hand-built nodes
/// with empty or non-letter keys and values render but do not re-parse.
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_composites() {
        let mut and = Filter::new_and();
        and.append(Filter::equality("foo", "bar"));
        and.append(Filter::new_or());
        assert_eq!(and.children().len(), 2);
        assert_eq!(and.children()[1], Filter::new_or());
    }

    #[test]
    fn test_append_to_equality_is_noop() {
        let mut eq = Filter::equality("foo", "bar");
        eq.append(Filter::equality("x", "y"));
        assert_eq!(eq, Filter::equality("foo", "bar"));
        assert!(eq.children().is_empty());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Filter::new_and().kind(), "and");
        assert_eq!(Filter::new_or().kind(), "or");
        assert_eq!(Filter::equality("a", "b").kind(), "equality");
    }

    #[test]
    fn test_display() {
        let mut inner = Filter::new_and();
        inner.append(Filter::equality("foo", "bar"));
        inner.append(Filter::equality("bar", "baz"));
        let mut root = Filter::new_or();
        root.append(inner);
        root.append(Filter::equality("name", "Jon"));
        assert_eq!(root.to_string(), "|(&(foo=bar)(bar=baz))(name=Jon)");
        assert_eq!(Filter::new_and().to_string(), "&");
        assert_eq!(Filter::equality("", "x").to_string(), "(=x)");
    }

    #[test]
    fn test_serialize_tagged() {
        let mut root = Filter::new_and();
        root.append(Filter::equality("foo", "bar"));
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "and",
                "children": [{"type": "equality", "key": "foo", "value": "bar"}]
            })
        );
        let back: Filter = serde_json::from_value(json).unwrap();
        assert_eq!(back, root);
    }
}
