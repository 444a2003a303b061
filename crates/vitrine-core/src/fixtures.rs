//! A small blog domain with presenter types.
//!
//! Built for unit tests and, behind the `test-support` feature, for the
//! `vitrine-test` crate.

use std::rc::Rc;

use serde_json::{Value, json};
use vitrine_permissions::AttributePath;

use crate::association::AssociationOptions;
use crate::catalog::Catalog;
use crate::collection::CollectionType;
use crate::error::PresentError;
use crate::model::{AssociationQuery, Model, Related};
use crate::presenter_type::PresenterType;
use crate::registry::Registry;

/// A blog author.
#[derive(Debug, Clone)]
pub struct Author {
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
}

impl Author {
    /// Create an author.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Model for Author {
    fn model_name(&self) -> &str {
        "Author"
    }
}

/// A comment on a post.
#[derive(Debug, Clone)]
pub struct Comment {
    /// Comment text.
    pub body: String,
    /// Who wrote it.
    pub author: Rc<Author>,
}

impl Comment {
    /// Create a comment by `author_name` (`bob@example.com` for `Bob`).
    #[must_use]
    pub fn new(body: impl Into<String>, author_name: &str) -> Self {
        let email = format!("{}@example.com", author_name.to_lowercase());
        Self {
            body: body.into(),
            author: Rc::new(Author::new(author_name, email)),
        }
    }
}

impl Model for Comment {
    fn model_name(&self) -> &str {
        "Comment"
    }
}

/// A blog post.
#[derive(Debug, Clone)]
pub struct Post {
    /// Headline.
    pub title: String,
    /// Post text.
    pub body: String,
    /// Publication date, `YYYY-MM-DD`.
    pub published_at: String,
    /// Absent for anonymous posts.
    pub author: Option<Rc<Author>>,
    /// Comments, oldest first.
    pub comments: Vec<Rc<Comment>>,
}

impl Post {
    /// A post by Ann with two comments (Bob, then Cy).
    #[must_use]
    pub fn sample() -> Self {
        Self {
            title: "Hello world".to_string(),
            body: "Hello from the blog".to_string(),
            published_at: "2024-05-01".to_string(),
            author: Some(Rc::new(Author::new("Ann", "ann@example.com"))),
            comments: vec![
                Rc::new(Comment::new("First!", "Bob")),
                Rc::new(Comment::new("Nice post", "Cy")),
            ],
        }
    }

    /// A post titled `title` with the sample's remaining fields.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::sample()
        }
    }

    /// A post with no author and no comments.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            author: None,
            comments: Vec::new(),
            ..Self::sample()
        }
    }
}

impl Model for Post {
    fn model_name(&self) -> &str {
        "Post"
    }
}

/// Association resolver for [`Post`]: `author`, `comments`, and
/// `latest_comment` under the `latest` scope.
#[must_use]
pub fn resolve_post(post: &Post, query: &AssociationQuery<'_>) -> Option<Related> {
    match (query.name, query.scope) {
        ("author", _) => post
            .author
            .as_ref()
            .map(|author| Related::One(Rc::clone(author) as Rc<dyn Model>)),
        ("latest_comment", Some("latest")) => Some(Related::Many(
            post.comments
                .last()
                .map(|comment| Rc::clone(comment) as Rc<dyn Model>)
                .into_iter()
                .collect(),
        )),
        ("comments", _) => Some(Related::Many(
            post.comments
                .iter()
                .map(|comment| Rc::clone(comment) as Rc<dyn Model>)
                .collect(),
        )),
        _ => None,
    }
}

fn resolve_comment(comment: &Comment, query: &AssociationQuery<'_>) -> Option<Related> {
    (query.name == "author").then(|| Related::One(Rc::clone(&comment.author) as Rc<dyn Model>))
}

/// `PostPresenter`: `title`, `body`, `published_at`, `excerpt/<n>` and
/// `word_count`; associations `author` and `comments`, plus
/// `latest_comment` scoped to the newest comment.
#[must_use]
pub fn post_type() -> Rc<PresenterType<Post>> {
    PresenterType::<Post>::new("PostPresenter")
        .field("title", |p, _| Ok(json!(p.object().title)))
        .field("body", |p, _| Ok(json!(p.object().body)))
        .field("published_at", |p, _| Ok(json!(p.object().published_at)))
        .field("excerpt", |p, args| {
            let length = match args.first() {
                Some(arg) => arg
                    .to_string()
                    .parse::<usize>()
                    .map_err(|e| PresentError::accessor("excerpt", e.to_string()))?,
                None => 20,
            };
            Ok(Value::String(p.object().body.chars().take(length).collect()))
        })
        .field("word_count", |p, _| {
            let body = p.fetch("body", &[])?;
            let words = body.as_str().map_or(0, |text| text.split_whitespace().count());
            Ok(json!(words))
        })
        .label("title", "Headline")
        .presents_associations(["author", "comments"], &AssociationOptions::new())
        .presents_association(
            "latest_comment",
            AssociationOptions::new()
                .with("CommentsPresenter")
                .scope("latest"),
        )
        .resolve_associations_with(resolve_post)
        .build()
}

/// `AuthorPresenter`: `name` and `email`.
#[must_use]
pub fn author_type() -> Rc<PresenterType<Author>> {
    PresenterType::<Author>::new("AuthorPresenter")
        .field("name", |p, _| Ok(json!(p.object().name)))
        .field("email", |p, _| Ok(json!(p.object().email)))
        .label("email", "Contact address")
        .build()
}

/// `CommentPresenter`: `body` and association `author`.
#[must_use]
pub fn comment_type() -> Rc<PresenterType<Comment>> {
    PresenterType::<Comment>::new("CommentPresenter")
        .field("body", |p, _| Ok(json!(p.object().body)))
        .presents_association("author", AssociationOptions::new())
        .resolve_associations_with(resolve_comment)
        .build()
}

/// Registry with the three blog presenter types and the named
/// `PostsPresenter` and `CommentsPresenter` collections.
#[must_use]
pub fn blog_registry() -> Registry {
    Registry::new()
        .with(post_type())
        .with(author_type())
        .with(comment_type())
        .with_collection(CollectionType::named("PostsPresenter"))
        .with_collection(CollectionType::named("CommentsPresenter"))
}

/// Catalog over [`blog_registry`].
#[must_use]
pub fn blog_catalog() -> Rc<Catalog> {
    Catalog::new(blog_registry())
}

/// Parse `/`-separated path texts.
///
/// # Panics
///
/// Panics on an invalid path text.
#[must_use]
#[allow(clippy::expect_used)]
pub fn paths(texts: &[&str]) -> Vec<AttributePath> {
    AttributePath::parse_all(texts.iter().copied()).expect("valid attribute paths")
}
