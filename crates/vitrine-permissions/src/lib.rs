//! Vitrine Permissions - attribute-path permission engine.
//!
//! This crate provides:
//! - Attribute paths with trailing `*` / `**` wildcards and a taint flag
//! - A path set with wildcard-aware membership
//! - Shared, prefix-linked permission state with copy-on-write
//!
//! # Matching Model
//!
//! A query path is permitted when:
//! - it was granted exactly, or
//! - the "everything" sentinel was granted, or
//! - it is untainted and a granted `[.., *]` or `[.., **]` covers it
//!
//! Paths built from untrusted input are tainted and only match exact grants.
//!
//! # Example
//!
//! ```
//! use vitrine_permissions::{AttributePath, Permissions, Segment};
//!
//! let root = Permissions::new();
//! root.permit(&[], ["title", "author/name", "comments/*"].map(|p| {
//!     AttributePath::parse(p).unwrap()
//! }));
//!
//! assert!(root.permitted(&[], &AttributePath::parse("comments/body").unwrap()));
//! assert!(!root.permitted(&[], &AttributePath::untrusted(["comments", "body"])));
//!
//! // A child namespace reads through its parent until it is mutated.
//! let author = Permissions::linked(&root, &[Segment::name("author")]);
//! assert!(author.permitted(&[], &AttributePath::from("name")));
//! assert!(author.is_reference());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod path;
mod path_set;
mod permissions;

pub use error::{PathError, PathResult};
pub use path::{AttributePath, DEEP_WILDCARD, SEPARATOR, Segment, WILDCARD};
pub use path_set::PathSet;
pub use permissions::Permissions;
