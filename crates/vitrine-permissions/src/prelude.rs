//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vitrine_permissions::prelude::*;` to import all essential types.

// Errors
pub use crate::{PathError, PathResult};

// Paths
pub use crate::{AttributePath, Segment};

// Permission state
pub use crate::{PathSet, Permissions};
