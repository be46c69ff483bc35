//! Parse LDAP-style search filters and match them against multi-valued
//! attribute maps.
//!
//! ```
//! use ldapfilter::filter::{Input, parse};
//!
//! let filter = parse("|(name=Jon)(alt=Foo)").unwrap();
//! let mut input: Input<String> = std::collections::HashMap::new();
//! input.insert("alt".into(), vec!["Foo".into()]);
//! assert!(filter.matches(&input));
//! ```

pub mod app;
pub mod config;
pub mod filter;
pub mod records;
