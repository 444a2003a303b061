//! Naming-convention inference between models, presenters and collections.
//!
//! `Post` is presented by `PostPresenter`, whose collection type is
//! `PostsPresenter`. Namespaced names (`Admin::PostPresenter`) keep their
//! namespace; only the last component is checked for the suffix.

use std::fmt;
use std::rc::Rc;

use crate::error::{PresentError, PresentResult};
use crate::inflect::{EnglishInflector, Inflector};

/// Default presenter type suffix.
pub const DEFAULT_SUFFIX: &str = "Presenter";

/// Inference settings: suffix, inflection rules and label humanizing.
#[derive(Clone)]
pub struct Inference {
    suffix: String,
    inflector: Rc<dyn Inflector>,
    humanize_labels: bool,
}

impl Default for Inference {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            inflector: Rc::new(EnglishInflector),
            humanize_labels: true,
        }
    }
}

impl Inference {
    /// Default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different presenter suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Use different inflection rules.
    #[must_use]
    pub fn with_inflector(mut self, inflector: impl Inflector + 'static) -> Self {
        self.inflector = Rc::new(inflector);
        self
    }

    /// Whether unlabeled fields get a humanized label.
    #[must_use]
    pub fn with_humanize_labels(mut self, humanize: bool) -> Self {
        self.humanize_labels = humanize;
        self
    }

    /// The presenter suffix.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The inflection rules in use.
    #[must_use]
    pub fn inflector(&self) -> &dyn Inflector {
        self.inflector.as_ref()
    }

    /// `Post` to `PostPresenter`.
    #[must_use]
    pub fn presenter_name(&self, model_name: &str) -> String {
        format!("{model_name}{}", self.suffix)
    }

    /// `PostPresenter` to `Post`.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::UninferrableSource`] when the name does not
    /// carry the suffix after something else.
    pub fn object_name(&self, presenter_name: &str) -> PresentResult<String> {
        self.strip_suffix(presenter_name)
            .map(str::to_owned)
            .ok_or_else(|| PresentError::UninferrableSource {
                name: presenter_name.to_string(),
            })
    }

    /// `PostPresenter` to `PostsPresenter`.
    ///
    /// `None` when the object name has no distinct plural.
    #[must_use]
    pub fn collection_name(&self, presenter_name: &str) -> Option<String> {
        let object = self.strip_suffix(presenter_name)?;
        let plural = self.inflector.pluralize(object);
        (plural != object).then(|| self.presenter_name(&plural))
    }

    /// `PostsPresenter` to `PostPresenter`.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::UninferrableSource`] when the suffix is
    /// missing or the name has no distinct singular.
    pub fn item_name(&self, collection_name: &str) -> PresentResult<String> {
        let uninferrable = || PresentError::UninferrableSource {
            name: collection_name.to_string(),
        };
        let plural = self.strip_suffix(collection_name).ok_or_else(uninferrable)?;
        let singular = self.inflector.singularize(plural);
        if singular == plural {
            return Err(uninferrable());
        }
        Ok(self.presenter_name(&singular))
    }

    /// `comments` to `CommentPresenter`.
    #[must_use]
    pub fn association_presenter_name(&self, association: &str) -> String {
        let singular = self.inflector.singularize(association);
        self.presenter_name(&self.inflector.camelize(&singular))
    }

    /// Default label for an unlabeled field.
    #[must_use]
    pub fn label(&self, field: &str) -> String {
        if self.humanize_labels {
            self.inflector.humanize(field)
        } else {
            field.to_string()
        }
    }

    fn strip_suffix<'a>(&self, name: &'a str) -> Option<&'a str> {
        let base = name.rsplit("::").next().unwrap_or(name);
        if base.len() <= self.suffix.len() || !base.ends_with(self.suffix.as_str()) {
            return None;
        }
        name.strip_suffix(self.suffix.as_str())
    }
}

impl fmt::Debug for Inference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inference")
            .field("suffix", &self.suffix)
            .field("humanize_labels", &self.humanize_labels)
            .finish_non_exhaustive()
    }
}
