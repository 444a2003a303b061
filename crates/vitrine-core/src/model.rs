//! Domain objects and the association resolver contract.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A domain object that can be wrapped by a presenter.
///
/// Presenters never mutate the object they wrap.
pub trait Model: Any {
    /// Type name used for presenter inference (`Post` infers `PostPresenter`).
    fn model_name(&self) -> &str;
}

/// The result of resolving an association.
#[derive(Clone)]
pub enum Related {
    /// A to-one relation.
    One(Rc<dyn Model>),
    /// A to-many relation, in order.
    Many(Vec<Rc<dyn Model>>),
}

impl Related {
    /// Wrap a single object.
    pub fn one<M: Model>(object: M) -> Self {
        Self::One(Rc::new(object))
    }

    /// Wrap an ordered sequence of objects.
    pub fn many<M, I>(objects: I) -> Self
    where
        M: Model,
        I: IntoIterator<Item = M>,
    {
        Self::Many(
            objects
                .into_iter()
                .map(|object| Rc::new(object) as Rc<dyn Model>)
                .collect(),
        )
    }

    /// Whether this is a to-many relation.
    #[must_use]
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

impl fmt::Debug for Related {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(object) => f.debug_tuple("One").field(&object.model_name()).finish(),
            Self::Many(objects) => f
                .debug_tuple("Many")
                .field(&objects.iter().map(|o| o.model_name()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// What an association resolver is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationQuery<'a> {
    /// Association name (`author`, `comments`)
    pub name: &'a str,
    /// Named scope to apply when fetching, if declared
    pub scope: Option<&'a str>,
}

/// Data-layer collaborator that fetches related objects.
///
/// Returning `None` means the related object is absent; it presents as null.
pub trait AssociationResolver<T> {
    /// Resolve the association named in `query` for `parent`.
    fn resolve(&self, parent: &T, query: &AssociationQuery<'_>) -> Option<Related>;
}

impl<T, F> AssociationResolver<T> for F
where
    F: Fn(&T, &AssociationQuery<'_>) -> Option<Related>,
{
    fn resolve(&self, parent: &T, query: &AssociationQuery<'_>) -> Option<Related> {
        self(parent, query)
    }
}

/// Downcast a shared model to its concrete type.
pub(crate) fn downcast<T: Model>(object: Rc<dyn Model>) -> Result<Rc<T>, Rc<dyn Model>> {
    let any: Rc<dyn Any> = object.clone();
    Rc::downcast::<T>(any).map_err(|_| object)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Post;

    impl Model for Post {
        fn model_name(&self) -> &str {
            "Post"
        }
    }

    #[derive(Debug)]
    struct Comment;

    impl Model for Comment {
        fn model_name(&self) -> &str {
            "Comment"
        }
    }

    #[test]
    fn test_downcast() {
        let object: Rc<dyn Model> = Rc::new(Post);
        assert!(downcast::<Post>(Rc::clone(&object)).is_ok());
        let back = downcast::<Comment>(object).unwrap_err();
        assert_eq!(back.model_name(), "Post");
    }

    #[test]
    fn test_related_constructors() {
        assert!(!Related::one(Post).is_many());
        let many = Related::many([Comment, Comment]);
        assert!(many.is_many());
        assert_eq!(format!("{many:?}"), "Many([\"Comment\", \"Comment\"])");
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &Post, query: &AssociationQuery<'_>| {
            (query.name == "comments").then(|| Related::many([Comment]))
        };
        let query = AssociationQuery {
            name: "comments",
            scope: None,
        };
        assert!(resolver.resolve(&Post, &query).is_some());
        let query = AssociationQuery {
            name: "author",
            scope: Some("active"),
        };
        assert!(resolver.resolve(&Post, &query).is_none());
    }
}
