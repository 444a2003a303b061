//! Presenter type declarations.
//!
//! A [`PresenterType`] is the explicit registry that replaces dynamic method
//! dispatch: named field accessors, declared associations, labels and the
//! association resolver for one model type.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use vitrine_permissions::{AttributePath, Segment};

use crate::association::{AssociationLink, AssociationOptions};
use crate::catalog::Catalog;
use crate::error::{PresentError, PresentResult};
use crate::inference::Inference;
use crate::model::{AssociationResolver, Model, downcast};
use crate::present::Present;
use crate::presenter::Presenter;

/// A field accessor. Receives the presenter and the trailing path segments
/// as call arguments.
pub type Accessor<T> = Rc<dyn Fn(&Presenter<T>, &[Segment]) -> PresentResult<Value>>;

/// Declaration of a presenter type for model `T`.
pub struct PresenterType<T: Model> {
    name: String,
    object_name: Option<String>,
    fields: BTreeMap<String, Accessor<T>>,
    associations: BTreeMap<String, AssociationLink<T>>,
    labels: HashMap<String, String>,
    resolver: Option<Rc<dyn AssociationResolver<T>>>,
}

impl<T: Model> PresenterType<T> {
    /// Start declaring a presenter type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_name: None,
            fields: BTreeMap::new(),
            associations: BTreeMap::new(),
            labels: HashMap::new(),
            resolver: None,
        }
    }

    /// Name the presented model explicitly instead of inferring it from the
    /// presenter name.
    #[must_use]
    pub fn presents(mut self, object_name: impl Into<String>) -> Self {
        self.object_name = Some(object_name.into());
        self
    }

    /// Declare a field accessor.
    #[must_use]
    pub fn field<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&Presenter<T>, &[Segment]) -> PresentResult<Value> + 'static,
    {
        self.fields.insert(name.into(), Rc::new(accessor));
        self
    }

    /// Declare an association. A second declaration with the same name is
    /// ignored.
    #[must_use]
    pub fn presents_association(
        self,
        name: impl Into<String>,
        options: AssociationOptions,
    ) -> Self {
        self.association(AssociationLink::new(name, options))
    }

    /// Declare several associations sharing the same options.
    #[must_use]
    pub fn presents_associations<I, S>(mut self, names: I, options: &AssociationOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self = self.presents_association(name, options.clone());
        }
        self
    }

    /// Declare an association from a prepared link (e.g. one with a
    /// callback).
    #[must_use]
    pub fn association(mut self, link: AssociationLink<T>) -> Self {
        self.associations
            .entry(link.name().to_string())
            .or_insert(link);
        self
    }

    /// Set a field label.
    #[must_use]
    pub fn label(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(field.into(), label.into());
        self
    }

    /// Set the data-layer collaborator used to fetch associations.
    #[must_use]
    pub fn resolve_associations_with<R>(mut self, resolver: R) -> Self
    where
        R: AssociationResolver<T> + 'static,
    {
        self.resolver = Some(Rc::new(resolver));
        self
    }

    /// Finish the declaration.
    #[must_use]
    pub fn build(self) -> Rc<Self> {
        Rc::new(self)
    }

    /// The presenter type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field accessor registered under `name`.
    #[must_use]
    pub fn field_accessor(&self, name: &str) -> Option<&Accessor<T>> {
        self.fields.get(name)
    }

    /// Declared field accessor names, sorted.
    pub fn field_accessor_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The association declared under `name`.
    #[must_use]
    pub fn association_link(&self, name: &str) -> Option<&AssociationLink<T>> {
        self.associations.get(name)
    }

    /// Whether `name` is a declared association.
    #[must_use]
    pub fn has_association(&self, name: &str) -> bool {
        self.associations.contains_key(name)
    }

    /// Declared association names, sorted.
    pub fn association_names(&self) -> impl Iterator<Item = &str> {
        self.associations.keys().map(String::as_str)
    }

    /// The association resolver, if one was set.
    #[must_use]
    pub fn resolver(&self) -> Option<&dyn AssociationResolver<T>> {
        self.resolver.as_deref()
    }

    /// Label for `path`: the declared one, else the default for its first
    /// segment.
    #[must_use]
    pub fn label_for(&self, path: &AttributePath, inference: &Inference) -> String {
        if let Some(label) = self.labels.get(&path.to_string()) {
            return label.clone();
        }
        path.first()
            .map(|head| inference.label(&head.to_string()))
            .unwrap_or_default()
    }
}

impl<T: Model> fmt::Debug for PresenterType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresenterType")
            .field("name", &self.name)
            .field("object_name", &self.object_name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("associations", &self.associations.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Type-erased presenter type, as stored by resolvers and catalogs.
pub trait PresenterFactory {
    /// The presenter type name.
    fn name(&self) -> &str;

    /// The presented model name: explicit, or inferred from the presenter
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::UninferrableSource`] when neither works.
    fn object_name(&self, inference: &Inference) -> PresentResult<String>;

    /// Declared field accessor names, sorted.
    fn field_names(&self) -> Vec<String>;

    /// Label for `path`.
    fn label(&self, path: &AttributePath, inference: &Inference) -> String;

    /// Wrap `object` in a new presenter with fresh permissions.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::TypeMismatch`] when `object` is not the model
    /// type this presenter type was declared for.
    fn build(
        self: Rc<Self>,
        object: Rc<dyn Model>,
        catalog: &Rc<Catalog>,
    ) -> PresentResult<Rc<dyn Present>>;
}

impl<T: Model> PresenterFactory for PresenterType<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn object_name(&self, inference: &Inference) -> PresentResult<String> {
        match &self.object_name {
            Some(name) => Ok(name.clone()),
            None => inference.object_name(&self.name),
        }
    }

    fn field_names(&self) -> Vec<String> {
        self.field_accessor_names().map(str::to_string).collect()
    }

    fn label(&self, path: &AttributePath, inference: &Inference) -> String {
        self.label_for(path, inference)
    }

    fn build(
        self: Rc<Self>,
        object: Rc<dyn Model>,
        catalog: &Rc<Catalog>,
    ) -> PresentResult<Rc<dyn Present>> {
        match downcast::<T>(object) {
            Ok(object) => Ok(Rc::new(Presenter::new(object, &self, catalog))),
            Err(object) => Err(PresentError::TypeMismatch {
                presenter: self.name.clone(),
                expected: self
                    .object_name(catalog.inference())
                    .unwrap_or_else(|_| std::any::type_name::<T>().to_string()),
                found: object.model_name().to_string(),
            }),
        }
    }
}
