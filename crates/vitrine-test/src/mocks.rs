//! Mock implementations for testing.

use std::cell::RefCell;
use std::rc::Rc;

use vitrine_core::{PresenterKind, Registry, TypeResolver};

/// [`TypeResolver`] over a [`Registry`] that records every lookup.
///
/// Clones share the lookup log, so keep one clone and hand the other to
/// the catalog.
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    registry: Rc<Registry>,
    lookups: Rc<RefCell<Vec<String>>>,
}

impl MockResolver {
    /// Resolve through `registry`.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Rc::new(registry),
            lookups: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Every name looked up so far, in order.
    #[must_use]
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }

    /// How often `name` was looked up.
    #[must_use]
    pub fn lookup_count(&self, name: &str) -> usize {
        self.lookups.borrow().iter().filter(|n| *n == name).count()
    }

    /// Forget recorded lookups.
    pub fn clear(&self) {
        self.lookups.borrow_mut().clear();
    }
}

impl TypeResolver for MockResolver {
    fn resolve(&self, name: &str) -> Option<PresenterKind> {
        self.lookups.borrow_mut().push(name.to_string());
        self.registry.resolve(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog_registry;

    #[test]
    fn test_mock_resolver_records_lookups() {
        let resolver = MockResolver::new(blog_registry());
        let shared = resolver.clone();

        assert!(shared.resolve("PostPresenter").is_some());
        assert!(shared.resolve("TagPresenter").is_none());
        assert!(shared.resolve("PostPresenter").is_some());

        assert_eq!(
            resolver.lookups(),
            vec!["PostPresenter", "TagPresenter", "PostPresenter"]
        );
        assert_eq!(resolver.lookup_count("PostPresenter"), 2);

        resolver.clear();
        assert!(shared.lookups().is_empty());
    }
}
