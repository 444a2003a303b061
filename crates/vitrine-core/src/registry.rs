//! Presenter type lookup by name.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::collection::CollectionType;
use crate::presenter_type::PresenterFactory;

/// A presenter type found by name.
#[derive(Clone)]
pub enum PresenterKind {
    /// Presents a single object.
    Item(Rc<dyn PresenterFactory>),
    /// Presents an ordered collection.
    Collection(Rc<CollectionType>),
}

impl PresenterKind {
    /// The registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Item(factory) => factory.name(),
            Self::Collection(collection) => collection.type_name(),
        }
    }
}

impl fmt::Debug for PresenterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(factory) => f.debug_tuple("Item").field(&factory.name()).finish(),
            Self::Collection(collection) => f.debug_tuple("Collection").field(collection).finish(),
        }
    }
}

/// Reference to a presenter type that may not be declared yet.
#[derive(Clone)]
pub enum TypeRef {
    /// Looked up through the type resolver at first use.
    Named(String),
    /// Already resolved.
    Resolved(Rc<dyn PresenterFactory>),
}

impl TypeRef {
    /// The referenced type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Resolved(factory) => factory.name(),
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<Rc<dyn PresenterFactory>> for TypeRef {
    fn from(factory: Rc<dyn PresenterFactory>) -> Self {
        Self::Resolved(factory)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Resolved(factory) => f.debug_tuple("Resolved").field(&factory.name()).finish(),
        }
    }
}

/// Name to presenter type lookup.
///
/// Returning `None` means "not found"; the catalog turns that into an
/// inference error where one is needed.
pub trait TypeResolver {
    /// Look up a presenter type by name.
    fn resolve(&self, name: &str) -> Option<PresenterKind>;
}

impl<F> TypeResolver for F
where
    F: Fn(&str) -> Option<PresenterKind>,
{
    fn resolve(&self, name: &str) -> Option<PresenterKind> {
        self(name)
    }
}

/// Map-backed [`TypeResolver`].
#[derive(Default, Clone)]
pub struct Registry {
    types: HashMap<String, PresenterKind>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item presenter type under its own name.
    pub fn register(&mut self, factory: Rc<dyn PresenterFactory>) -> &mut Self {
        self.types
            .insert(factory.name().to_string(), PresenterKind::Item(factory));
        self
    }

    /// Register a named collection type.
    pub fn register_collection(&mut self, collection: CollectionType) -> &mut Self {
        let collection = Rc::new(collection);
        self.types.insert(
            collection.type_name().to_string(),
            PresenterKind::Collection(collection),
        );
        self
    }

    /// Builder form of [`Registry::register`].
    #[must_use]
    pub fn with(mut self, factory: Rc<dyn PresenterFactory>) -> Self {
        self.register(factory);
        self
    }

    /// Builder form of [`Registry::register_collection`].
    #[must_use]
    pub fn with_collection(mut self, collection: CollectionType) -> Self {
        self.register_collection(collection);
        self
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeResolver for Registry {
    fn resolve(&self, name: &str) -> Option<PresenterKind> {
        self.types.get(name).cloned()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("types", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::post_type;

    #[test]
    fn test_register_and_resolve() {
        let registry = Registry::new()
            .with(post_type())
            .with_collection(CollectionType::named("PostsPresenter"));
        assert_eq!(registry.len(), 2);

        match registry.resolve("PostPresenter") {
            Some(PresenterKind::Item(factory)) => assert_eq!(factory.name(), "PostPresenter"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            registry.resolve("PostsPresenter"),
            Some(PresenterKind::Collection(_))
        ));
        assert!(registry.resolve("CommentPresenter").is_none());
    }

    #[test]
    fn test_closure_resolver() {
        let factory: Rc<dyn PresenterFactory> = post_type();
        let resolver = move |name: &str| {
            (name == "PostPresenter").then(|| PresenterKind::Item(Rc::clone(&factory)))
        };
        assert!(resolver.resolve("PostPresenter").is_some());
        assert!(resolver.resolve("Post").is_none());
    }

    #[test]
    fn test_type_ref_names() {
        assert_eq!(TypeRef::from("PostPresenter").name(), "PostPresenter");
        let factory: Rc<dyn PresenterFactory> = post_type();
        assert_eq!(TypeRef::from(factory).name(), "PostPresenter");
        assert_eq!(format!("{:?}", TypeRef::from("X")), "Named(\"X\")");
    }
}
