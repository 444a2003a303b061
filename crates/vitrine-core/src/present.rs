//! The presenter surface shared by single and collection presenters.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::debug_span;
use vitrine_permissions::{AttributePath, Permissions, Segment};

use crate::error::PresentResult;

/// What presenting one path produced.
#[derive(Clone)]
pub enum Presented {
    /// A plain value.
    Value(Value),
    /// An association presenter (single-segment association paths).
    Presenter(Rc<dyn Present>),
    /// One result per collection item, in order.
    List(Vec<Presented>),
}

impl Presented {
    /// The null value (absent association).
    #[must_use]
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    /// The plain value, if this is one.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Presenter(_) | Self::List(_) => None,
        }
    }

    /// The presenter, if this is one.
    #[must_use]
    pub fn as_presenter(&self) -> Option<&Rc<dyn Present>> {
        match self {
            Self::Presenter(presenter) => Some(presenter),
            Self::Value(_) | Self::List(_) => None,
        }
    }

    /// The per-item results, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Presented]> {
        match self {
            Self::List(items) => Some(items),
            Self::Value(_) | Self::Presenter(_) => None,
        }
    }

    /// JSON rendering. Presenters render their permitted fields.
    ///
    /// # Errors
    ///
    /// Propagates accessor failures.
    pub fn to_json(&self) -> PresentResult<Value> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Presenter(presenter) => presenter.to_json(),
            Self::List(items) => items
                .iter()
                .map(Self::to_json)
                .collect::<PresentResult<Vec<_>>>()
                .map(Value::Array),
        }
    }
}

impl From<Value> for Presented {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for Presented {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Presenter(presenter) => f
                .debug_tuple("Presenter")
                .field(&presenter.type_name())
                .finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

/// Filtered, permission-gated view over one object or a collection.
///
/// Unpermitted paths are never an error: they are left out of results.
pub trait Present {
    /// Presenter type name.
    fn type_name(&self) -> &str;

    /// Handle to this presenter's permissions (aliases the live state).
    fn permissions(&self) -> Permissions;

    /// Replace this presenter's permissions with a reference link into
    /// `parent` at `relative_path`.
    ///
    /// Grants already made on an owned permission set are merged into
    /// `parent` under `relative_path` first, so they are not lost.
    fn link_permissions(&self, parent: &Permissions, relative_path: &[Segment]);

    /// Invoke the accessor chain for `path` without checking this
    /// presenter's permissions. Nested presenters reached on the way still
    /// check their own and yield null where they deny.
    ///
    /// # Errors
    ///
    /// Fails when no accessor or association matches, or an accessor fails.
    fn call(&self, path: &AttributePath) -> PresentResult<Presented>;

    /// Declared field accessor names.
    fn field_names(&self) -> Vec<String>;

    /// Label for `path`.
    fn label(&self, path: &AttributePath) -> String;

    /// JSON rendering of every permitted declared field.
    ///
    /// # Errors
    ///
    /// Propagates accessor failures.
    fn to_json(&self) -> PresentResult<Value>;

    /// Drop cached association or item presenters. Permissions are kept.
    fn reload(&self);

    /// Downcasting support.
    fn as_any(&self) -> &dyn Any;

    /// Permit `paths`.
    fn permit(&self, paths: &[AttributePath]) {
        self.permissions().permit(&[], paths);
    }

    /// Permit every single-segment call.
    fn permit_all(&self) {
        self.permissions().permit_all();
    }

    /// Permit everything, including association drill-down.
    fn permit_everything(&self) {
        self.permissions().permit_everything();
    }

    /// Whether everything is permitted.
    fn is_complete(&self) -> bool {
        self.permissions().is_complete()
    }

    /// Whether `path` is permitted.
    fn permitted(&self, path: &AttributePath) -> bool {
        self.permissions().permitted(&[], path)
    }

    /// The permitted subset of `paths`, in order.
    fn select_permitted(&self, paths: &[AttributePath]) -> Vec<AttributePath> {
        self.permissions()
            .select_permitted(&[], paths)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The unpermitted subset of `paths`, in order.
    fn reject_permitted(&self, paths: &[AttributePath]) -> Vec<AttributePath> {
        self.permissions()
            .reject_permitted(&[], paths)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Present every permitted path, in order.
    ///
    /// # Errors
    ///
    /// Fails when a permitted path has no accessor, or an accessor fails.
    fn present(&self, paths: &[AttributePath]) -> PresentResult<Vec<(AttributePath, Presented)>> {
        let _span = debug_span!("present", presenter = self.type_name(), requested = paths.len())
            .entered();
        self.select_permitted(paths)
            .into_iter()
            .map(|path| {
                let value = self.call(&path)?;
                Ok((path, value))
            })
            .collect()
    }

    /// Present a single path. `None` when it is not permitted.
    ///
    /// # Errors
    ///
    /// Same as [`Present::present`].
    fn display(&self, path: &AttributePath) -> PresentResult<Option<Presented>> {
        if self.permitted(path) {
            self.call(path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Labels for the permitted subset of `paths`, in order.
    fn labels(&self, paths: &[AttributePath]) -> Vec<(AttributePath, String)> {
        self.select_permitted(paths)
            .into_iter()
            .map(|path| {
                let label = self.label(&path);
                (path, label)
            })
            .collect()
    }

    /// Permitted paths as a JSON object keyed by path text.
    ///
    /// # Errors
    ///
    /// Same as [`Present::present`].
    fn attributes(&self, paths: &[AttributePath]) -> PresentResult<Map<String, Value>> {
        self.present(paths)?
            .into_iter()
            .map(|(path, presented)| Ok((path.to_string(), presented.to_json()?)))
            .collect()
    }
}

impl dyn Present {
    /// Downcast to a concrete presenter.
    #[must_use]
    pub fn downcast_ref<P: Present + 'static>(&self) -> Option<&P> {
        self.as_any().downcast_ref::<P>()
    }
}

impl fmt::Debug for dyn Present {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Present")
            .field("type_name", &self.type_name())
            .field("permissions", &self.permissions())
            .finish()
    }
}
