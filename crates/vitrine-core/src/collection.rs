//! Presenter around an ordered collection of domain objects.
//!
//! Items are wrapped lazily and share the collection's permission namespace:
//! each item links to the collection's permissions with an empty relative
//! path. A grant on the collection is visible to every item still in
//! reference mode; a grant on one item materializes that item only.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use vitrine_permissions::{AttributePath, Permissions, Segment};

use crate::catalog::Catalog;
use crate::error::{PresentError, PresentResult};
use crate::model::Model;
use crate::present::{Present, Presented};
use crate::presenter_type::PresenterFactory;
use crate::registry::TypeRef;

/// Type name reported by collections without a declared name.
pub const GENERIC_COLLECTION: &str = "CollectionPresenter";

/// A collection presenter type.
///
/// A named type (`PostsPresenter`) infers its item type from its name unless
/// one is given; the generic type infers a presenter per object.
#[derive(Debug, Clone, Default)]
pub struct CollectionType {
    name: Option<String>,
    item: Option<TypeRef>,
}

impl CollectionType {
    /// A named collection type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            item: None,
        }
    }

    /// The generic collection type.
    #[must_use]
    pub fn generic() -> Self {
        Self::default()
    }

    /// A generic collection of a fixed item type.
    #[must_use]
    pub fn of(item: impl Into<TypeRef>) -> Self {
        Self {
            name: None,
            item: Some(item.into()),
        }
    }

    /// Set the item type explicitly.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<TypeRef>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Declared name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared name, or [`GENERIC_COLLECTION`].
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.name().unwrap_or(GENERIC_COLLECTION)
    }

    /// Explicit item type, if any.
    #[must_use]
    pub fn item(&self) -> Option<&TypeRef> {
        self.item.as_ref()
    }
}

/// Options for [`CollectionPresenter::with_options`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionOptions {
    /// Item presenter type to use for every object
    #[serde(default)]
    pub with: Option<String>,
}

impl CollectionOptions {
    /// Parse options from loosely typed input, rejecting unknown keys.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::InvalidOptions`] on unknown keys or wrong
    /// value types.
    pub fn from_value(value: &Value) -> PresentResult<Self> {
        Self::deserialize(value).map_err(|e| PresentError::invalid_options("collection", e))
    }
}

/// Presents an ordered sequence of objects through lazily built items.
pub struct CollectionPresenter {
    objects: Vec<Rc<dyn Model>>,
    collection_type: Rc<CollectionType>,
    catalog: Rc<Catalog>,
    permissions: RefCell<Permissions>,
    items: RefCell<HashMap<usize, Rc<dyn Present>>>,
}

impl CollectionPresenter {
    /// Wrap `objects` with a collection type. No item is built yet.
    #[must_use]
    pub fn new(
        objects: Vec<Rc<dyn Model>>,
        collection_type: Rc<CollectionType>,
        catalog: &Rc<Catalog>,
    ) -> Self {
        Self {
            objects,
            collection_type,
            catalog: Rc::clone(catalog),
            permissions: RefCell::new(Permissions::new()),
            items: RefCell::new(HashMap::new()),
        }
    }

    /// Wrap `objects` in a generic collection, optionally with an explicit
    /// item type.
    #[must_use]
    pub fn with_options(
        objects: Vec<Rc<dyn Model>>,
        options: CollectionOptions,
        catalog: &Rc<Catalog>,
    ) -> Self {
        let collection_type = match options.with {
            Some(with) => CollectionType::of(with.as_str()),
            None => CollectionType::generic(),
        };
        Self::new(objects, Rc::new(collection_type), catalog)
    }

    /// The collection type.
    #[must_use]
    pub fn collection_type(&self) -> &Rc<CollectionType> {
        &self.collection_type
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether there are no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The item presenter at `index`, built and linked on first access.
    /// `None` past the end.
    ///
    /// # Errors
    ///
    /// Returns an inference error when no item presenter type fits.
    pub fn item(&self, index: usize) -> PresentResult<Option<Rc<dyn Present>>> {
        if let Some(item) = self.items.borrow().get(&index) {
            return Ok(Some(Rc::clone(item)));
        }
        let Some(object) = self.objects.get(index) else {
            return Ok(None);
        };
        let item = match self.item_factory()? {
            Some(factory) => factory.build(Rc::clone(object), &self.catalog)?,
            None => self.catalog.present(Rc::clone(object))?,
        };
        item.link_permissions(&self.permissions(), &[]);
        debug!(
            collection = self.type_name(),
            index,
            presenter = item.type_name(),
            "wrapped collection item"
        );
        self.items.borrow_mut().insert(index, Rc::clone(&item));
        Ok(Some(item))
    }

    /// Every item presenter, in order.
    ///
    /// # Errors
    ///
    /// Same as [`CollectionPresenter::item`].
    pub fn items(&self) -> PresentResult<Vec<Rc<dyn Present>>> {
        (0..self.len())
            .filter_map(|index| self.item(index).transpose())
            .collect()
    }

    fn item_factory(&self) -> PresentResult<Option<Rc<dyn PresenterFactory>>> {
        self.catalog.item_type(&self.collection_type)
    }
}

impl Present for CollectionPresenter {
    fn type_name(&self) -> &str {
        self.collection_type.type_name()
    }

    fn permissions(&self) -> Permissions {
        self.permissions.borrow().clone()
    }

    fn link_permissions(&self, parent: &Permissions, relative_path: &[Segment]) {
        let current = self.permissions();
        if !current.is_reference() && !current.is_empty() {
            parent.merge(&current, relative_path);
        }
        *self.permissions.borrow_mut() = Permissions::linked(parent, relative_path);
        // Items built before the relink still point at the old state.
        self.items.borrow_mut().clear();
    }

    fn call(&self, path: &AttributePath) -> PresentResult<Presented> {
        self.items()?
            .iter()
            .map(|item| Ok(item.display(path)?.unwrap_or_else(Presented::null)))
            .collect::<PresentResult<Vec<_>>>()
            .map(Presented::List)
    }

    fn field_names(&self) -> Vec<String> {
        match self.item_factory() {
            Ok(Some(factory)) => factory.field_names(),
            Ok(None) | Err(_) => Vec::new(),
        }
    }

    fn label(&self, path: &AttributePath) -> String {
        let inference = self.catalog.inference();
        match self.item_factory() {
            Ok(Some(factory)) => factory.label(path, inference),
            Ok(None) | Err(_) => path
                .first()
                .map(|head| inference.label(&head.to_string()))
                .unwrap_or_default(),
        }
    }

    fn to_json(&self) -> PresentResult<Value> {
        self.items()?
            .iter()
            .map(|item| item.to_json())
            .collect::<PresentResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn reload(&self) {
        self.items.borrow_mut().clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for CollectionPresenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionPresenter")
            .field("type", &self.type_name())
            .field("len", &self.len())
            .field("cached_items", &self.items.borrow().len())
            .field("permissions", &*self.permissions.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Comment, Post, blog_catalog, paths};
    use serde_json::json;

    fn comments() -> Vec<Rc<dyn Model>> {
        vec![
            Rc::new(Comment::new("one", "Ann")),
            Rc::new(Comment::new("two", "Bob")),
            Rc::new(Comment::new("three", "Cy")),
        ]
    }

    fn named() -> CollectionPresenter {
        CollectionPresenter::new(
            comments(),
            Rc::new(CollectionType::named("CommentsPresenter")),
            &blog_catalog(),
        )
    }

    fn name() -> AttributePath {
        AttributePath::from(["author", "name"])
    }

    #[test]
    fn test_items_are_lazy_and_cached() {
        let collection = named();
        assert_eq!(collection.len(), 3);
        assert!(collection.items.borrow().is_empty());

        let first = collection.item(0).unwrap().unwrap();
        let again = collection.item(0).unwrap().unwrap();
        assert!(Rc::ptr_eq(&first, &again));
        assert_eq!(first.type_name(), "CommentPresenter");
        assert!(collection.item(3).unwrap().is_none());
    }

    #[test]
    fn test_collection_grants_reach_all_items() {
        let collection = named();
        let first = collection.item(0).unwrap().unwrap();
        collection.permit(&[name()]);

        assert!(first.permitted(&name()));
        let later = collection.item(2).unwrap().unwrap();
        assert!(later.permitted(&name()));
    }

    #[test]
    fn test_sibling_isolation() {
        let collection = named();
        let first = collection.item(0).unwrap().unwrap();
        let second = collection.item(1).unwrap().unwrap();
        first.permit(&paths(&["body"]));

        assert!(first.permitted(&AttributePath::from("body")));
        assert!(!second.permitted(&AttributePath::from("body")));
        assert!(!collection.permitted(&AttributePath::from("body")));
    }

    #[test]
    fn test_materialized_item_keeps_earlier_grants_only() {
        let collection = named();
        collection.permit(&paths(&["body"]));
        let first = collection.item(0).unwrap().unwrap();
        first.permit(&[name()]);

        collection.permit(&paths(&["author/email"]));
        assert!(first.permitted(&AttributePath::from("body")));
        assert!(first.permitted(&name()));
        assert!(!first.permitted(&AttributePath::from(["author", "email"])));

        let second = collection.item(1).unwrap().unwrap();
        assert!(second.permitted(&AttributePath::from(["author", "email"])));
    }

    #[test]
    fn test_reload_resets_item_grants() {
        let collection = named();
        collection.item(0).unwrap().unwrap().permit(&paths(&["body"]));
        assert!(collection.item(0).unwrap().unwrap().permitted(&AttributePath::from("body")));

        collection.reload();
        let refetched = collection.item(0).unwrap().unwrap();
        assert!(!refetched.permitted(&AttributePath::from("body")));
    }

    #[test]
    fn test_reload_keeps_collection_grants() {
        let collection = named();
        collection.permit(&paths(&["body"]));
        collection.item(0).unwrap();
        collection.reload();
        assert!(collection.item(0).unwrap().unwrap().permitted(&AttributePath::from("body")));
    }

    #[test]
    fn test_present_yields_per_item_lists() {
        let collection = named();
        collection.permit(&paths(&["body", "author/name"]));
        let presented = collection
            .present(&paths(&["body", "hidden", "author/name"]))
            .unwrap();
        assert_eq!(presented.len(), 2);
        assert_eq!(presented[0].1.to_json().unwrap(), json!(["one", "two", "three"]));
        assert_eq!(presented[1].1.to_json().unwrap(), json!(["Ann", "Bob", "Cy"]));
    }

    #[test]
    fn test_present_nulls_items_that_deny() {
        let collection = named();
        collection.item(0).unwrap().unwrap().permit(&paths(&["body"]));
        collection.permit(&[name()]);

        let presented = collection.present(&[name()]).unwrap();
        assert_eq!(presented.len(), 1);
        assert_eq!(presented[0].1.to_json().unwrap(), json!([null, "Bob", "Cy"]));
    }

    #[test]
    fn test_generic_collection_infers_per_object() {
        let catalog = blog_catalog();
        let mixed: Vec<Rc<dyn Model>> = vec![
            Rc::new(Comment::new("one", "Ann")),
            Rc::new(Post::sample()),
        ];
        let collection = CollectionPresenter::with_options(mixed, CollectionOptions::default(), &catalog);
        assert_eq!(collection.type_name(), GENERIC_COLLECTION);
        let types: Vec<String> = collection
            .items()
            .unwrap()
            .iter()
            .map(|item| item.type_name().to_string())
            .collect();
        assert_eq!(types, vec!["CommentPresenter", "PostPresenter"]);
    }

    #[test]
    fn test_explicit_item_type() {
        let catalog = blog_catalog();
        let options = CollectionOptions::from_value(&json!({ "with": "CommentPresenter" })).unwrap();
        let collection = CollectionPresenter::with_options(comments(), options, &catalog);
        assert_eq!(collection.field_names(), vec!["body"]);
        assert_eq!(collection.item(1).unwrap().unwrap().type_name(), "CommentPresenter");
    }

    #[test]
    fn test_options_reject_unknown_keys() {
        let err = CollectionOptions::from_value(&json!({ "with": "X", "scope": "y" })).unwrap_err();
        assert!(matches!(err, PresentError::InvalidOptions { .. }));
    }

    #[test]
    fn test_uninferrable_item_type() {
        let collection = CollectionPresenter::new(
            comments(),
            Rc::new(CollectionType::named("FeedbackPresenter")),
            &blog_catalog(),
        );
        assert!(matches!(
            collection.item(0),
            Err(PresentError::UninferrableSource { .. })
        ));

        let collection = CollectionPresenter::new(
            comments(),
            Rc::new(CollectionType::named("RemarksPresenter")),
            &blog_catalog(),
        );
        assert!(matches!(
            collection.item(0),
            Err(PresentError::UninferrableSource { .. })
        ));
    }

    #[test]
    fn test_to_json_renders_items() {
        let collection = named();
        collection.permit(&paths(&["body"]));
        assert_eq!(
            collection.to_json().unwrap(),
            json!([{ "body": "one" }, { "body": "two" }, { "body": "three" }])
        );
    }
}
