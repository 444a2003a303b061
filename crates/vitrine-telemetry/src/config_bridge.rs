//! Conversion from the `[logging]` config section.

use vitrine_config::Config;

use crate::logging::{LogConfig, LogFormat};

/// Convert config to [`LogConfig`]. Unknown formats fall back to compact.
#[must_use]
pub fn to_log_config(cfg: &Config) -> LogConfig {
    let mut log = cfg.logging.directives.iter().fold(
        LogConfig::new(&cfg.logging.level).with_format(LogFormat::from_name(&cfg.logging.format)),
        |log, directive| log.with_directive(directive),
    );
    log.span_events = cfg.logging.span_events;
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_log_config() {
        let mut cfg = Config::default();
        cfg.logging.level = "debug".to_owned();
        cfg.logging.format = "json".to_owned();
        cfg.logging.directives = vec!["vitrine_core=trace".to_owned()];
        cfg.logging.span_events = true;

        let log = to_log_config(&cfg);
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.directives, vec!["vitrine_core=trace"]);
        assert!(log.span_events);
    }

    #[test]
    fn test_default_format_is_compact() {
        let log = to_log_config(&Config::default());
        assert_eq!(log.format, LogFormat::Compact);
        assert!(!log.span_events);
    }
}
