//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only apply to fields that
//! no config file set.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `VITRINE_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "VITRINE_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "VITRINE_LOG_FORMAT",
        field_path: "logging.format",
    },
    EnvMapping {
        var_name: "VITRINE_LOG_SPANS",
        field_path: "logging.span_events",
    },
    EnvMapping {
        var_name: "VITRINE_PRESENTER_SUFFIX",
        field_path: "inference.suffix",
    },
    EnvMapping {
        var_name: "VITRINE_HUMANIZE_LABELS",
        field_path: "labels.humanize",
    },
];

/// Snapshot the process environment, keeping only `VITRINE_*` variables.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("VITRINE_"))
        .collect()
}

/// Apply environment variable fallbacks to fields that were **not** set by
/// any config file layer.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults)
        {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );

            set_field_from_string(merged, mapping.field_path, val);
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Set a field in the TOML tree from a string value, creating intermediate
/// tables as needed.
fn set_field_from_string(root: &mut toml::Value, path: &str, val: &str) {
    let value = coerce_to_toml_value(path, val);
    let (parents, leaf) = path.rsplit_once('.').unwrap_or(("", path));

    let mut current = root;
    for segment in parents.split('.').filter(|s| !s.is_empty()) {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), value);
    }
}

/// Coerce a string env var value to the TOML type of the field it sets.
fn coerce_to_toml_value(path: &str, val: &str) -> toml::Value {
    if matches!(path, "labels.humanize" | "logging.span_events") {
        match val.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => return toml::Value::Boolean(true),
            "0" | "false" | "no" | "off" => return toml::Value::Boolean(false),
            _ => {},
        }
    }
    toml::Value::String(val.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> (toml::Value, FieldSources) {
        let val: toml::Value = toml::from_str(
            r#"
            [logging]
            level = "info"
            [labels]
            humanize = true
        "#,
        )
        .unwrap();
        let mut sources = FieldSources::new();
        crate::merge::record_leaves(&val, "", &ConfigLayer::Defaults, &mut sources);
        (val, sources)
    }

    #[test]
    fn test_env_overrides_defaults() {
        let (mut merged, mut sources) = defaults();
        let env = HashMap::from([
            ("VITRINE_LOG_LEVEL".to_owned(), "debug".to_owned()),
            ("VITRINE_HUMANIZE_LABELS".to_owned(), "off".to_owned()),
        ]);
        assert_eq!(apply_env_fallbacks(&mut merged, &mut sources, &env), 2);
        assert_eq!(merged["logging"]["level"].as_str(), Some("debug"));
        assert_eq!(merged["labels"]["humanize"].as_bool(), Some(false));
        assert_eq!(sources.get("logging.level"), Some(&ConfigLayer::Environment));
    }

    #[test]
    fn test_env_does_not_override_files() {
        let (mut merged, mut sources) = defaults();
        sources.insert("logging.level".to_owned(), ConfigLayer::Project);
        let env = HashMap::from([("VITRINE_LOG_LEVEL".to_owned(), "trace".to_owned())]);
        assert_eq!(apply_env_fallbacks(&mut merged, &mut sources, &env), 0);
        assert_eq!(merged["logging"]["level"].as_str(), Some("info"));
    }

    #[test]
    fn test_env_creates_missing_tables() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut sources = FieldSources::new();
        let env = HashMap::from([("VITRINE_PRESENTER_SUFFIX".to_owned(), "View".to_owned())]);
        apply_env_fallbacks(&mut merged, &mut sources, &env);
        assert_eq!(merged["inference"]["suffix"].as_str(), Some("View"));
    }

    #[test]
    fn test_span_events_from_env() {
        let (mut merged, mut sources) = defaults();
        let env = HashMap::from([("VITRINE_LOG_SPANS".to_owned(), "yes".to_owned())]);
        assert_eq!(apply_env_fallbacks(&mut merged, &mut sources, &env), 1);
        assert_eq!(merged["logging"]["span_events"].as_bool(), Some(true));
    }

    #[test]
    fn test_unparseable_bool_stays_string() {
        assert_eq!(
            coerce_to_toml_value("labels.humanize", "maybe"),
            toml::Value::String("maybe".to_owned())
        );
    }
}
