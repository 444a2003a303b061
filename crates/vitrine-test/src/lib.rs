//! Vitrine Test - Shared test utilities for Vitrine presenters.
//!
//! This crate provides a small blog domain (posts, authors, comments) with
//! presenter types, plus mock type resolvers, for use as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! vitrine-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use vitrine_core::Present;
//! use vitrine_test::{Post, blog_catalog, paths};
//!
//! #[test]
//! fn test_title_is_hidden_until_permitted() {
//!     let presenter = blog_catalog().present(Rc::new(Post::sample())).unwrap();
//!     assert!(presenter.present(&paths(&["title"])).unwrap().is_empty());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod mocks;

pub use mocks::*;
pub use vitrine_core::fixtures::*;

/// Route `tracing` output to the test harness's captured stdout.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
