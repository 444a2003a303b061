//! Declared associations between presenter types.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use vitrine_permissions::Segment;

use crate::error::{PresentError, PresentResult};
use crate::model::{AssociationQuery, Model};
use crate::present::Present;
use crate::presenter::Presenter;

/// Options for [`PresenterType::presents_association`](crate::PresenterType::presents_association).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssociationOptions {
    /// Presenter type to use instead of the inferred one
    #[serde(default)]
    pub with: Option<String>,
    /// Named scope forwarded to the association resolver
    #[serde(default)]
    pub scope: Option<String>,
}

impl AssociationOptions {
    /// No options.
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

    /// Forward a named scope to the resolver.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Parse options from loosely typed input, rejecting unknown keys.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::InvalidOptions`] on unknown keys or wrong
    /// value types.
    pub fn from_value(value: &Value) -> PresentResult<Self> {
        Self::deserialize(value)
            .map_err(|e| PresentError::invalid_options("presents_association", e))
    }
}

type Callback<T> = Rc<dyn Fn(&Presenter<T>, &dyn Present)>;

/// A named, lazily resolved relation from a presenter of `T` to a child
/// presenter.
pub struct AssociationLink<T: Model> {
    name: String,
    options: AssociationOptions,
    on_present: Option<Callback<T>>,
}

impl<T: Model> AssociationLink<T> {
    /// Declare association `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, options: AssociationOptions) -> Self {
        Self {
            name: name.into(),
            options,
            on_present: None,
        }
    }

    /// Run `callback` on every child presenter built for this association,
    /// after its permissions are linked. Receives the parent and the child.
    #[must_use]
    pub fn on_present<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Presenter<T>, &dyn Present) + 'static,
    {
        self.on_present = Some(Rc::new(callback));
        self
    }

    /// Association name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared options.
    #[must_use]
    pub fn options(&self) -> &AssociationOptions {
        &self.options
    }

    /// Resolve, wrap and link the child presenter for `parent`.
    ///
    /// `None` when the related object is absent.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::NoAccessor`] when the parent type has no
    /// association resolver, and inference errors when no presenter type
    /// fits.
    pub fn wrap(&self, parent: &Presenter<T>) -> PresentResult<Option<Rc<dyn Present>>> {
        let resolver = parent
            .presenter_type()
            .resolver()
            .ok_or_else(|| PresentError::NoAccessor {
                presenter: parent.presenter_type().name().to_string(),
                name: self.name.clone(),
            })?;
        let query = AssociationQuery {
            name: &self.name,
            scope: self.options.scope.as_deref(),
        };
        let Some(related) = resolver.resolve(parent.object(), &query) else {
            debug!(association = %self.name, "association resolved to nothing");
            return Ok(None);
        };

        let child =
            parent
                .catalog()
                .wrap_association(&self.name, related, self.options.with.as_deref())?;
        child.link_permissions(&parent.permissions(), &[Segment::name(&self.name)]);
        if let Some(callback) = &self.on_present {
            callback(parent, child.as_ref());
        }
        debug!(
            association = %self.name,
            parent = parent.presenter_type().name(),
            presenter = child.type_name(),
            "resolved association"
        );
        Ok(Some(child))
    }
}

impl<T: Model> fmt::Debug for AssociationLink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociationLink")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("on_present", &self.on_present.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionPresenter;
    use crate::fixtures::{Post, blog_catalog, paths, post_type, resolve_post};
    use crate::presenter_type::PresenterType;
    use serde_json::json;
    use vitrine_permissions::AttributePath;

    #[test]
    fn test_options_from_value() {
        let options =
            AssociationOptions::from_value(&json!({ "with": "PersonPresenter", "scope": "recent" }))
                .unwrap();
        assert_eq!(options, AssociationOptions::new().with("PersonPresenter").scope("recent"));
        assert_eq!(AssociationOptions::from_value(&json!({})).unwrap(), AssociationOptions::new());
    }

    #[test]
    fn test_options_reject_unknown_keys() {
        let err = AssociationOptions::from_value(&json!({ "with": "X", "only": "show" })).unwrap_err();
        assert!(matches!(err, PresentError::InvalidOptions { .. }));
        assert!(err.to_string().contains("only"));

        let err = AssociationOptions::from_value(&json!({ "with": 3 })).unwrap_err();
        assert!(matches!(err, PresentError::InvalidOptions { .. }));
    }

    #[test]
    fn test_child_is_linked_under_association_name() {
        let catalog = blog_catalog();
        let presenter = Presenter::new(Rc::new(Post::sample()), &post_type(), &catalog);
        let comments = presenter.association("comments").unwrap().unwrap();
        assert_eq!(comments.type_name(), "CommentsPresenter");
        assert!(comments.permissions().is_reference());
        assert_eq!(
            comments.permissions().effective_prefix(),
            vec![Segment::name("comments")]
        );

        presenter.permit(&paths(&["comments/*"]));
        let collection = comments.downcast_ref::<CollectionPresenter>().unwrap();
        let first = collection.item(0).unwrap().unwrap();
        assert!(first.permitted(&AttributePath::from("body")));
        assert!(!first.permitted(&AttributePath::from(["author", "name"])));
    }

    #[test]
    fn test_callback_runs_on_each_build() {
        use std::cell::Cell;

        let calls = Rc::new(Cell::new(0_u32));
        let seen = Rc::clone(&calls);
        let declared: Rc<PresenterType<Post>> = PresenterType::new("PostPresenter")
            .association(AssociationLink::new("author", AssociationOptions::new()).on_present(
                move |_parent, child| {
                    seen.set(seen.get().saturating_add(1));
                    child.permit(&[AttributePath::from("name")]);
                },
            ))
            .resolve_associations_with(resolve_post)
            .build();

        let catalog = blog_catalog();
        let presenter = Presenter::new(Rc::new(Post::sample()), &declared, &catalog);
        let author = presenter.association("author").unwrap().unwrap();
        assert!(author.permitted(&AttributePath::from("name")));
        // The callback's grant materialized the child, not the parent.
        assert!(!presenter.permitted(&AttributePath::from(["author", "name"])));

        presenter.association("author").unwrap();
        assert_eq!(calls.get(), 1);
        presenter.reload();
        presenter.association("author").unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_explicit_with_is_used() {
        let catalog = blog_catalog();
        let declared: Rc<PresenterType<Post>> = PresenterType::new("PostPresenter")
            .presents_association("author", AssociationOptions::new().with("PersonPresenter"))
            .resolve_associations_with(resolve_post)
            .build();
        let presenter = Presenter::new(Rc::new(Post::sample()), &declared, &catalog);
        let err = presenter.association("author").err().unwrap();
        assert!(matches!(err, PresentError::UninferrablePresenter { name } if name == "PersonPresenter"));
    }

    #[test]
    fn test_missing_resolver() {
        let catalog = blog_catalog();
        let declared: Rc<PresenterType<Post>> = PresenterType::new("PostPresenter")
            .presents_association("author", AssociationOptions::new())
            .build();
        let presenter = Presenter::new(Rc::new(Post::sample()), &declared, &catalog);
        assert!(matches!(
            presenter.association("author"),
            Err(PresentError::NoAccessor { .. })
        ));
    }
}
