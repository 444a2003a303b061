//! The per-application set of presenter types.
//!
//! A [`Catalog`] owns the type resolver and the inference settings, and
//! decides which presenter wraps a given object:
//!
//! - an explicit item type wraps a single object, or becomes its collection
//!   type for a sequence;
//! - without one, a single object is presented by `<Model><Suffix>` and a
//!   sequence by the generic collection.
//!
//! Every name lookup, hit or miss, is cached for the catalog's lifetime.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::collection::{CollectionPresenter, CollectionType};
use crate::error::{PresentError, PresentResult};
use crate::inference::Inference;
use crate::model::{Model, Related};
use crate::present::Present;
use crate::presenter_type::PresenterFactory;
use crate::registry::{PresenterKind, TypeRef, TypeResolver};

/// Resolver, inference settings and the item/collection type table.
pub struct Catalog {
    resolver: Box<dyn TypeResolver>,
    inference: Inference,
    resolved: RefCell<HashMap<String, Option<PresenterKind>>>,
    /// Item type name to its collection type.
    collections: RefCell<HashMap<String, Rc<CollectionType>>>,
    /// Collection type name to its item type.
    items: RefCell<HashMap<String, Rc<dyn PresenterFactory>>>,
}

impl Catalog {
    /// Catalog with default inference settings.
    #[must_use]
    pub fn new(resolver: impl TypeResolver + 'static) -> Rc<Self> {
        Self::with_inference(resolver, Inference::default())
    }

    /// Catalog with explicit inference settings.
    #[must_use]
    pub fn with_inference(resolver: impl TypeResolver + 'static, inference: Inference) -> Rc<Self> {
        Rc::new(Self {
            resolver: Box::new(resolver),
            inference,
            resolved: RefCell::new(HashMap::new()),
            collections: RefCell::new(HashMap::new()),
            items: RefCell::new(HashMap::new()),
        })
    }

    /// Inference settings.
    #[must_use]
    pub fn inference(&self) -> &Inference {
        &self.inference
    }

    /// Look up a presenter type by name, caching the answer.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PresenterKind> {
        if let Some(cached) = self.resolved.borrow().get(name) {
            return cached.clone();
        }
        let kind = self.resolver.resolve(name);
        debug!(
            name,
            found = kind.is_some(),
            "resolved presenter type"
        );
        self.resolved
            .borrow_mut()
            .insert(name.to_string(), kind.clone());
        kind
    }

    /// Look up an item presenter type by name.
    #[must_use]
    pub fn resolve_item(&self, name: &str) -> Option<Rc<dyn PresenterFactory>> {
        match self.resolve(name)? {
            PresenterKind::Item(factory) => Some(factory),
            PresenterKind::Collection(_) => None,
        }
    }

    /// Pair an item type with its collection type, both ways.
    pub fn bind_collection(&self, item: &Rc<dyn PresenterFactory>, collection: &Rc<CollectionType>) {
        self.collections
            .borrow_mut()
            .insert(item.name().to_string(), Rc::clone(collection));
        if let Some(name) = collection.name() {
            self.items
                .borrow_mut()
                .insert(name.to_string(), Rc::clone(item));
        }
    }

    /// The collection type for an item type: the bound one, else the
    /// registered plural (`PostsPresenter`), else a generic collection of
    /// the item type. The answer is bound for later lookups.
    #[must_use]
    pub fn collection_for(&self, item: &Rc<dyn PresenterFactory>) -> Rc<CollectionType> {
        if let Some(collection) = self.collections.borrow().get(item.name()) {
            return Rc::clone(collection);
        }
        let registered = self
            .inference
            .collection_name(item.name())
            .and_then(|name| match self.resolve(&name)? {
                PresenterKind::Collection(collection) => Some(collection),
                PresenterKind::Item(_) => None,
            });
        let collection = registered
            .unwrap_or_else(|| Rc::new(CollectionType::of(Rc::clone(item))));
        debug!(
            item = item.name(),
            collection = collection.type_name(),
            "bound collection type"
        );
        self.bind_collection(item, &collection);
        collection
    }

    /// The item type of a collection type: explicit, bound, or inferred from
    /// the collection name. `None` for a generic collection, whose items
    /// are inferred per object.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::UninferrablePresenter`] when an explicit item
    /// type name does not resolve, and [`PresentError::UninferrableSource`]
    /// when a named collection has no resolvable item type.
    pub fn item_type(
        &self,
        collection: &CollectionType,
    ) -> PresentResult<Option<Rc<dyn PresenterFactory>>> {
        match collection.item() {
            Some(TypeRef::Resolved(factory)) => return Ok(Some(Rc::clone(factory))),
            Some(TypeRef::Named(name)) => {
                return self
                    .resolve_item(name)
                    .map(Some)
                    .ok_or_else(|| PresentError::UninferrablePresenter { name: name.clone() });
            },
            None => {},
        }
        let Some(name) = collection.name() else {
            return Ok(None);
        };
        if let Some(item) = self.items.borrow().get(name) {
            return Ok(Some(Rc::clone(item)));
        }
        let item_name = self.inference.item_name(name)?;
        let item = self
            .resolve_item(&item_name)
            .ok_or_else(|| PresentError::UninferrableSource {
                name: name.to_string(),
            })?;
        self.items
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&item));
        Ok(Some(item))
    }

    /// Wrap one object in the presenter inferred from its model name.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::UninferrablePresenter`] when no item
    /// presenter type is registered under the inferred name.
    pub fn present(self: &Rc<Self>, object: Rc<dyn Model>) -> PresentResult<Rc<dyn Present>> {
        let name = self.inference.presenter_name(object.model_name());
        let factory = self
            .resolve_item(&name)
            .ok_or_else(|| PresentError::UninferrablePresenter {
                name: object.model_name().to_string(),
            })?;
        factory.build(object, self)
    }

    /// Wrap a sequence in the generic collection.
    #[must_use]
    pub fn present_all(self: &Rc<Self>, objects: Vec<Rc<dyn Model>>) -> Rc<CollectionPresenter> {
        Rc::new(CollectionPresenter::new(
            objects,
            Rc::new(CollectionType::generic()),
            self,
        ))
    }

    /// Wrap a related object or sequence, with an optional explicit
    /// presenter type name.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::UninferrablePresenter`] when the explicit
    /// name does not resolve or nothing can be inferred, and
    /// [`PresentError::TypeMismatch`] when the explicit item type presents
    /// another model.
    pub fn wrap(self: &Rc<Self>, related: Related, with: Option<&str>) -> PresentResult<Rc<dyn Present>> {
        let Some(with) = with else {
            return match related {
                Related::One(object) => self.present(object),
                Related::Many(objects) => Ok(self.present_all(objects)),
            };
        };
        let kind = self
            .resolve(with)
            .ok_or_else(|| PresentError::UninferrablePresenter {
                name: with.to_string(),
            })?;
        match (kind, related) {
            (PresenterKind::Item(factory), Related::One(object)) => factory.build(object, self),
            (PresenterKind::Item(factory), Related::Many(objects)) => {
                let collection = self.collection_for(&factory);
                Ok(Rc::new(CollectionPresenter::new(objects, collection, self)))
            },
            (PresenterKind::Collection(collection), Related::Many(objects)) => {
                Ok(Rc::new(CollectionPresenter::new(objects, collection, self)))
            },
            (PresenterKind::Collection(collection), Related::One(object)) => Ok(Rc::new(
                CollectionPresenter::new(vec![object], collection, self),
            )),
        }
    }

    /// Wrap the result of resolving association `name`.
    ///
    /// Without an explicit type, a single object is presented by its model's
    /// presenter, falling back to the one named after the association
    /// (`author` to `AuthorPresenter`); a sequence by the collection of the
    /// association's item type (`comments` to `CommentPresenter`), falling
    /// back to the generic collection.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::wrap`].
    pub fn wrap_association(
        self: &Rc<Self>,
        name: &str,
        related: Related,
        with: Option<&str>,
    ) -> PresentResult<Rc<dyn Present>> {
        if with.is_some() {
            return self.wrap(related, with);
        }
        let by_association = self.inference.association_presenter_name(name);
        match related {
            Related::One(object) => {
                let by_model = self.inference.presenter_name(object.model_name());
                let factory = self
                    .resolve_item(&by_model)
                    .or_else(|| self.resolve_item(&by_association))
                    .ok_or_else(|| PresentError::UninferrablePresenter {
                        name: object.model_name().to_string(),
                    })?;
                factory.build(object, self)
            },
            Related::Many(objects) => {
                let collection = match self.resolve_item(&by_association) {
                    Some(item) => self.collection_for(&item),
                    None => Rc::new(CollectionType::generic()),
                };
                Ok(Rc::new(CollectionPresenter::new(objects, collection, self)))
            },
        }
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("inference", &self.inference)
            .field("resolved", &self.resolved.borrow().len())
            .field("collections", &self.collections.borrow().len())
            .finish_non_exhaustive()
    }
}
