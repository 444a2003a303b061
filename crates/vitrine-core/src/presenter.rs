//! Presenter around a single domain object.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::debug;
use vitrine_permissions::{AttributePath, Permissions, Segment};

use crate::catalog::Catalog;
use crate::error::{PresentError, PresentResult};
use crate::model::Model;
use crate::present::{Present, Presented};
use crate::presenter_type::PresenterType;

/// Wraps one object of model `T` behind a permission-gated accessor surface.
///
/// Accessors run on the presenter, not on the object, so a presenter type can
/// declare derived fields next to passthrough ones.
pub struct Presenter<T: Model> {
    object: Rc<T>,
    presenter_type: Rc<PresenterType<T>>,
    catalog: Rc<Catalog>,
    permissions: RefCell<Permissions>,
    /// `None` caches an absent related object.
    associations: RefCell<HashMap<String, Option<Rc<dyn Present>>>>,
}

impl<T: Model> Presenter<T> {
    /// Wrap `object` with fresh, unlinked permissions.
    #[must_use]
    pub fn new(object: Rc<T>, presenter_type: &Rc<PresenterType<T>>, catalog: &Rc<Catalog>) -> Self {
        Self {
            object,
            presenter_type: Rc::clone(presenter_type),
            catalog: Rc::clone(catalog),
            permissions: RefCell::new(Permissions::new()),
            associations: RefCell::new(HashMap::new()),
        }
    }

    /// The wrapped object.
    #[must_use]
    pub fn object(&self) -> &T {
        &self.object
    }

    /// The presenter type.
    #[must_use]
    pub fn presenter_type(&self) -> &Rc<PresenterType<T>> {
        &self.presenter_type
    }

    /// The catalog this presenter was built with.
    #[must_use]
    pub fn catalog(&self) -> &Rc<Catalog> {
        &self.catalog
    }

    /// The presenter for association `name`, resolved on first access and
    /// cached until [`Present::reload`]. `None` when the related object is
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::NoAccessor`] for an undeclared association, or
    /// an inference error when no presenter type fits the related object.
    pub fn association(&self, name: &str) -> PresentResult<Option<Rc<dyn Present>>> {
        if let Some(cached) = self.associations.borrow().get(name) {
            return Ok(cached.clone());
        }
        let link = self
            .presenter_type
            .association_link(name)
            .ok_or_else(|| self.no_accessor(name))?;
        let child = link.wrap(self)?;
        self.associations
            .borrow_mut()
            .insert(name.to_string(), child.clone());
        Ok(child)
    }

    /// Call field accessor `name` directly, without permission checks.
    ///
    /// Meant for derived fields built from other fields.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::NoAccessor`] when no such field is declared,
    /// or whatever the accessor fails with.
    pub fn fetch(&self, name: &str, args: &[Segment]) -> PresentResult<Value> {
        let accessor = self
            .presenter_type
            .field_accessor(name)
            .ok_or_else(|| self.no_accessor(name))?;
        accessor(self, args)
    }

    fn no_accessor(&self, name: &str) -> PresentError {
        PresentError::NoAccessor {
            presenter: self.presenter_type.name().to_string(),
            name: name.to_string(),
        }
    }
}

impl<T: Model> Present for Presenter<T> {
    fn type_name(&self) -> &str {
        self.presenter_type.name()
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
    }

    fn call(&self, path: &AttributePath) -> PresentResult<Presented> {
        let Some((head, rest)) = path.segments().split_first() else {
            return Err(self.no_accessor(""));
        };
        let Some(name) = head.as_name() else {
            return Err(self.no_accessor(&head.to_string()));
        };

        if self.presenter_type.has_association(name) {
            let Some(child) = self.association(name)? else {
                return Ok(Presented::null());
            };
            if rest.is_empty() {
                return Ok(Presented::Presenter(child));
            }
            debug!(
                presenter = self.type_name(),
                association = name,
                "drilling into association"
            );
            // The child answers for its own grants once it has diverged.
            return Ok(child.display(&path.tail())?.unwrap_or_else(Presented::null));
        }

        self.fetch(name, rest).map(Presented::Value)
    }

    fn field_names(&self) -> Vec<String> {
        self.presenter_type
            .field_accessor_names()
            .map(str::to_string)
            .collect()
    }

    fn label(&self, path: &AttributePath) -> String {
        self.presenter_type.label_for(path, self.catalog.inference())
    }

    fn to_json(&self) -> PresentResult<Value> {
        let fields: Vec<AttributePath> = self
            .presenter_type
            .field_accessor_names()
            .map(AttributePath::from)
            .collect();
        let mut object = Map::new();
        for path in self.select_permitted(&fields) {
            let value = self.call(&path)?.to_json()?;
            object.insert(path.to_string(), value);
        }
        Ok(Value::Object(object))
    }

    fn reload(&self) {
        self.associations.borrow_mut().clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Model> fmt::Debug for Presenter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Presenter")
            .field("type", &self.presenter_type.name())
            .field("object", &self.object.model_name())
            .field("permissions", &*self.permissions.borrow())
            .finish_non_exhaustive()
    }
}
