use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::filter::{self, Filter};

/// Named filter strings, as written in a YAML (or TOML/JSON) file:
///
/// ```yaml
/// filters:
///   admins: "&(group=admin)(active=yes)"
/// ```
#[derive(Debug, Deserialize, Serialize)]
pub struct FiltersConfig {
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl FiltersConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .with_context(|| format!("Config: Failed to read {:?}", path))?;
        settings
            .try_deserialize()
            .with_context(|| format!("Config: Failed to parse {:?}", path))
    }

    /// Parse every filter up front so a bad entry fails the whole file.
    pub fn compile(&self) -> anyhow::Result<CompiledConfig> {
        let mut filters = BTreeMap::new();
        for (name, expr) in &self.filters {
            let filter = filter::parse(expr)
                .with_context(|| format!("Config: Invalid filter '{}': {:?}", name, expr))?;
            tracing::debug!("Compiled filter '{}' ({})", name, filter.kind());
            filters.insert(name.clone(), filter);
        }
        Ok(CompiledConfig { filters })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub filters: BTreeMap<String, Filter>,
}

impl CompiledConfig {
    pub fn get(&self, name: &str) -> anyhow::Result<&Filter> {
        self.filters.get(name).with_context(|| {
            let known: Vec<&str> = self.filters.keys().map(String::as_str).collect();
            format!(
                "Config: No filter named '{}' (available: {})",
                name,
                known.join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_and_compiles_filters() {
        let file = write_config(
            "filters:\n  admins: \"&(group=admin)(active=yes)\"\n  jon: \"(name=Jon)\"\n",
        );
        let config = FiltersConfig::load(file.path()).unwrap();
        let compiled = config.compile().unwrap();
        assert_eq!(compiled.filters.len(), 2);
        assert_eq!(
            compiled.get("jon").unwrap(),
            &Filter::equality("name", "Jon")
        );
    }

    #[test]
    fn compile_reports_bad_filter() {
        let file = write_config("filters:\n  broken: \"&(foo=)\"\n");
        let config = FiltersConfig::load(file.path()).unwrap();
        let err = config.compile().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn load_reports_malformed_file() {
        let file = write_config("filters:\n  - \"(name=Jon)\"\n");
        let err = FiltersConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Config: Failed to parse"));
    }

    #[test]
    fn unknown_name_lists_available() {
        let file = write_config("filters:\n  jon: \"(name=Jon)\"\n");
        let compiled = FiltersConfig::load(file.path()).unwrap().compile().unwrap();
        let err = compiled.get("nobody").unwrap_err();
        assert!(err.to_string().contains("jon"));
    }
}
