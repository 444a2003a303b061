//! Prelude module - commonly used test helpers.
//!
//! Use `use vitrine_test::prelude::*;` to import all essential helpers.

// Models
pub use crate::{Author, Comment, Post};

// Presenter types and catalogs
pub use crate::{author_type, blog_catalog, blog_registry, comment_type, post_type};

// Helpers
pub use crate::{init_test_logging, paths};

// Mocks
pub use crate::MockResolver;
