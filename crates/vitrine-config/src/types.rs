//! Configuration struct definitions.
//!
//! Every struct uses `#[serde(default)]` so a file only needs the keys it
//! changes.

use serde::{Deserialize, Serialize};

/// Top-level Vitrine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Presenter naming conventions.
    pub inference: InferenceSection,
    /// Default field labels.
    pub labels: LabelsSection,
    /// Logging level, format, per-crate directives and span events.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// InferenceSection
// ---------------------------------------------------------------------------

/// Naming conventions used to infer presenter types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSection {
    /// Suffix appended to model names (`Post` is presented by
    /// `PostPresenter`).
    pub suffix: String,
}

impl Default for InferenceSection {
    fn default() -> Self {
        Self {
            suffix: "Presenter".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// LabelsSection
// ---------------------------------------------------------------------------

/// Default labels for fields without a declared one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsSection {
    /// Humanize field names (`author_name` to `Author name`). When off, the
    /// raw field name is the label.
    pub humanize: bool,
}

impl Default for LabelsSection {
    fn default() -> Self {
        Self { humanize: true }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"` (human-friendly), `"compact"` (one-line),
    /// `"json"` (structured), or `"full"` (verbose).
    pub format: String,
    /// Per-crate tracing directives (e.g. `["vitrine_core=debug"]`).
    pub directives: Vec<String>,
    /// Log when render spans open and close, with their timing.
    pub span_events: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            span_events: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [logging]
            level = "debug"
        "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "compact");
        assert!(!config.logging.span_events);
        assert_eq!(config.inference.suffix, "Presenter");
        assert!(config.labels.humanize);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = Config::default();
        config.inference.suffix = "View".to_owned();
        config.logging.directives = vec!["vitrine_core=trace".to_owned()];
        let text = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
