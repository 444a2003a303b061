//! Vitrine Core - permission-gated presenters.
//!
//! This crate provides:
//! - [`Presenter`]: a filtered view over one domain object, with named field
//!   accessors declared on a [`PresenterType`]
//! - [`CollectionPresenter`]: lazily built item presenters sharing the
//!   collection's permission namespace
//! - Associations: child presenters linked under the association name
//! - [`Catalog`]: presenter type lookup and naming-convention inference
//! - [`Exposures`]: action-scoped presenter accessors
//!
//! Unpermitted paths are never an error. They are left out of results.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use serde_json::json;
//! use vitrine_core::prelude::*;
//!
//! struct Post {
//!     title: String,
//! }
//!
//! impl Model for Post {
//!     fn model_name(&self) -> &str {
//!         "Post"
//!     }
//! }
//!
//! let post_type = PresenterType::<Post>::new("PostPresenter")
//!     .field("title", |p, _| Ok(json!(p.object().title)))
//!     .build();
//! let catalog = Catalog::new(Registry::new().with(post_type));
//!
//! let presenter = catalog
//!     .present(Rc::new(Post { title: "Hello".into() }))
//!     .unwrap();
//! let title = AttributePath::from("title");
//! assert!(presenter.display(&title).unwrap().is_none());
//!
//! presenter.permit(&[title.clone()]);
//! assert_eq!(presenter.to_json().unwrap(), json!({ "title": "Hello" }));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod association;
mod catalog;
mod collection;
mod error;
mod exposure;
mod inference;
mod inflect;
mod model;
mod present;
mod presenter;
mod presenter_type;
mod registry;

/// Bridge from `vitrine_config::Config` to inference settings.
#[cfg(feature = "config")]
pub mod config_bridge;

/// Blog domain fixtures for tests.
#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

pub use association::{AssociationLink, AssociationOptions};
pub use catalog::Catalog;
pub use collection::{CollectionOptions, CollectionPresenter, CollectionType, GENERIC_COLLECTION};
pub use error::{PresentError, PresentResult};
pub use exposure::{ActionScope, ExposureOptions, Exposures};
pub use inference::{DEFAULT_SUFFIX, Inference};
pub use inflect::{EnglishInflector, Inflector};
pub use model::{AssociationQuery, AssociationResolver, Model, Related};
pub use present::{Present, Presented};
pub use presenter::Presenter;
pub use presenter_type::{Accessor, PresenterFactory, PresenterType};
pub use registry::{PresenterKind, Registry, TypeRef, TypeResolver};

pub use vitrine_permissions::{AttributePath, PathError, Permissions, Segment};
