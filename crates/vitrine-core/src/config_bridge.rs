//! Bridge from `vitrine_config::Config` to inference settings.
//!
//! The config crate has no dependencies on other Vitrine crates, so the
//! conversion lives here.

use vitrine_config::Config;

use crate::inference::Inference;

/// Convert config to [`Inference`] settings with the default inflector.
#[must_use]
pub fn to_inference(cfg: &Config) -> Inference {
    Inference::new()
        .with_suffix(cfg.inference.suffix.clone())
        .with_humanize_labels(cfg.labels.humanize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_inference() {
        let mut cfg = Config::default();
        cfg.inference.suffix = "View".to_owned();
        cfg.labels.humanize = false;
        let inference = to_inference(&cfg);
        assert_eq!(inference.suffix(), "View");
        assert_eq!(inference.presenter_name("Post"), "PostView");
        assert_eq!(inference.label("author_name"), "author_name");
    }

    #[test]
    fn test_default_config_matches_default_inference() {
        let inference = to_inference(&Config::default());
        assert_eq!(inference.suffix(), Inference::new().suffix());
        assert_eq!(inference.label("author_name"), "Author name");
    }
}
