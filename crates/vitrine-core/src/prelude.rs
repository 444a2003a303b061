//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vitrine_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{PresentError, PresentResult};

// Presenting
pub use crate::{Present, Presented, Presenter, PresenterType};

// Collections and associations
pub use crate::{AssociationOptions, CollectionOptions, CollectionPresenter, CollectionType};

// Models
pub use crate::{AssociationQuery, Model, Related};

// Type lookup
pub use crate::{Catalog, Inference, Registry, TypeResolver};

// Exposures
pub use crate::{ExposureOptions, Exposures};

// Paths and permissions
pub use crate::{AttributePath, Permissions, Segment};
