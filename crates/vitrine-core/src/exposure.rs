//! Action-scoped presenter accessors.
//!
//! An [`Exposures`] table declares which raw variables a set of actions
//! presents, and with which presenter type. Declarations for the same
//! variable shadow each other: the latest one whose action filter matches
//! wins. When none matches, a registered fallback answers instead.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, debug_span};

use crate::catalog::Catalog;
use crate::error::{PresentError, PresentResult};
use crate::model::Related;
use crate::present::{Present, Presented};

/// Options for [`Exposures::presents`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExposureOptions {
    /// Presenter type to use instead of the inferred one
    #[serde(default)]
    pub with: Option<String>,
    /// Only apply on these actions
    #[serde(default, deserialize_with = "one_or_many")]
    pub only: Option<Vec<String>>,
    /// Never apply on these actions
    #[serde(default, deserialize_with = "one_or_many")]
    pub except: Option<Vec<String>>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(action) => vec![action],
            OneOrMany::Many(actions) => actions,
        }),
    )
}

impl ExposureOptions {
    /// No options: every action, inferred presenter type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the named presenter type.
    #[must_use]
    pub fn with(mut self, presenter: impl Into<String>) -> Self {
        self.with = Some(presenter.into());
        self
    }

    /// Restrict to `actions`.
    #[must_use]
    pub fn only<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    /// Exclude `actions`.
    #[must_use]
    pub fn except<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    /// Parse options from loosely typed input, rejecting unknown keys.
    /// `only` and `except` take a single action name or a list.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::InvalidOptions`] on unknown keys or wrong
    /// value types.
    pub fn from_value(value: &Value) -> PresentResult<Self> {
        Self::deserialize(value).map_err(|e| PresentError::invalid_options("presents", e))
    }

    /// Whether these options apply on `action`.
    #[must_use]
    pub fn applies_to(&self, action: &str) -> bool {
        let listed = |actions: &Option<Vec<String>>| {
            actions
                .as_ref()
                .map(|actions| actions.iter().any(|a| a == action))
        };
        listed(&self.only).unwrap_or(true) && !listed(&self.except).unwrap_or(false)
    }
}

type Callback = Rc<dyn Fn(&dyn Present)>;
type Fallback = Rc<dyn Fn() -> PresentResult<Presented>>;

struct Exposure {
    variable: String,
    options: ExposureOptions,
    on_present: Option<Callback>,
}

/// Declared presenter accessors for a set of actions.
pub struct Exposures {
    catalog: Rc<Catalog>,
    entries: Vec<Exposure>,
    fallbacks: HashMap<String, Fallback>,
}

impl Exposures {
    /// An empty table wrapping through `catalog`.
    #[must_use]
    pub fn new(catalog: &Rc<Catalog>) -> Self {
        Self {
            catalog: Rc::clone(catalog),
            entries: Vec::new(),
            fallbacks: HashMap::new(),
        }
    }

    /// Declare presenter accessors for `variables`.
    pub fn presents<I, S>(&mut self, variables: I, options: &ExposureOptions) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declare(variables, options, None)
    }

    /// Declare presenter accessors for `variables`, running `callback` on
    /// each presenter once it is built.
    pub fn presents_with<I, S, F>(
        &mut self,
        variables: I,
        options: &ExposureOptions,
        callback: F,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&dyn Present) + 'static,
    {
        self.declare(variables, options, Some(Rc::new(callback)))
    }

    /// Answer for `variable` on actions no declaration applies to.
    pub fn fallback<F>(&mut self, variable: impl Into<String>, fallback: F) -> &mut Self
    where
        F: Fn() -> PresentResult<Presented> + 'static,
    {
        self.fallbacks.insert(variable.into(), Rc::new(fallback));
        self
    }

    /// Start handling `action`.
    #[must_use]
    pub fn for_action(&self, action: impl Into<String>) -> ActionScope<'_> {
        ActionScope {
            exposures: self,
            action: action.into(),
            assigned: HashMap::new(),
            presenters: RefCell::new(HashMap::new()),
        }
    }

    fn declare<I, S>(
        &mut self,
        variables: I,
        options: &ExposureOptions,
        on_present: Option<Callback>,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for variable in variables {
            self.entries.push(Exposure {
                variable: variable.into(),
                options: options.clone(),
                on_present: on_present.clone(),
            });
        }
        self
    }

    fn lookup(&self, variable: &str, action: &str) -> Option<&Exposure> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| entry.variable == variable)
            .find(|entry| entry.options.applies_to(action))
    }
}

impl fmt::Debug for Exposures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exposures")
            .field(
                "variables",
                &self.entries.iter().map(|e| e.variable.as_str()).collect::<Vec<_>>(),
            )
            .field("fallbacks", &self.fallbacks.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// One action's view of an [`Exposures`] table: raw assignments and the
/// presenters memoized from them.
pub struct ActionScope<'a> {
    exposures: &'a Exposures,
    action: String,
    assigned: HashMap<String, Related>,
    presenters: RefCell<HashMap<String, Presented>>,
}

impl ActionScope<'_> {
    /// The action name.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Bind the raw object behind `variable`. Drops a presenter already
    /// built for it.
    pub fn assign(&mut self, variable: impl Into<String>, related: Related) -> &mut Self {
        let variable = variable.into();
        self.presenters.borrow_mut().remove(&variable);
        self.assigned.insert(variable, related);
        self
    }

    /// The presenter for `variable`, built on first call and memoized.
    /// Null when nothing was assigned.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::NoAccessor`] when no declaration applies to
    /// this action and no fallback is registered, or an inference error
    /// when no presenter type fits the assigned object.
    pub fn presenter(&self, variable: &str) -> PresentResult<Presented> {
        let _span = debug_span!("expose", action = %self.action, variable).entered();
        let Some(exposure) = self.exposures.lookup(variable, &self.action) else {
            return match self.exposures.fallbacks.get(variable) {
                Some(fallback) => fallback(),
                None => Err(PresentError::NoAccessor {
                    presenter: format!("action `{}`", self.action),
                    name: variable.to_string(),
                }),
            };
        };
        if let Some(presented) = self.presenters.borrow().get(variable) {
            return Ok(presented.clone());
        }

        let presented = match self.assigned.get(variable) {
            None => Presented::null(),
            Some(related) => {
                let presenter = self
                    .exposures
                    .catalog
                    .wrap(related.clone(), exposure.options.with.as_deref())?;
                if let Some(callback) = &exposure.on_present {
                    callback(presenter.as_ref());
                }
                debug!(
                    action = %self.action,
                    variable,
                    presenter = presenter.type_name(),
                    "exposed presenter"
                );
                Presented::Presenter(presenter)
            },
        };
        self.presenters
            .borrow_mut()
            .insert(variable.to_string(), presented.clone());
        Ok(presented)
    }
}

impl fmt::Debug for ActionScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionScope")
            .field("action", &self.action)
            .field("assigned", &self.assigned.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
