use std::error::Error as StdError;

use thiserror::Error;

use crate::path::Path;

/// Structural errors: things wrong with a view's shape relative to the root,
/// or with the permission table's own bookkeeping. These are distinct from
/// [`ActionError`], which carries a failure from user action code.
#[derive(Debug, Error)]
pub enum WardenError {
    /// A view slot names a field the root (or an enclosing composite) does
    /// not have.
    #[error("view field `{path}` has no matching field on `{root_type}`")]
    MissingField {
        path: Path,
        root_type: &'static str,
    },

    /// A view slot combines a root field type and an access kind the Shape
    /// Walker does not know how to bind (Shape Walker rule 7).
    #[error("view field `{path}` of kind `{view_kind}` cannot bind to root field of kind `{root_kind}`")]
    UnsupportedShape {
        path: Path,
        view_kind: &'static str,
        root_kind: &'static str,
    },

    /// The data root passed to [`DataSource::new`](crate::handle::DataSource::new)
    /// is not a composite (struct) type.
    #[error("data root `{root_type}` must be a struct with named fields")]
    RootMustBeComposite { root_type: &'static str },

    /// A `#[derive(View)]` type is not a mutable composite (struct with named
    /// fields) suitable for binding.
    #[error("view `{view_type}` must be a struct with named fields")]
    ViewMustBeMutableComposite { view_type: &'static str },

    /// A single command's own permission set conflicts with itself (for
    /// example declaring both a read and a write on the same path, or a
    /// write on a path and a read on one of its ancestors). This is always a
    /// programmer bug in the view's shape; it can never be resolved by
    /// waiting, so it is rejected at walk time rather than queued.
    #[error("view `{view_type}` requests internally conflicting permissions at `{path}`")]
    InternalConflict { view_type: &'static str, path: Path },

    /// A release observed a counter that was already at its resting state
    /// (a write-release with no writer held, or a read-release with a zero
    /// reader count). Always a bug in table bookkeeping.
    #[error("permission underflow releasing `{path}`")]
    PermissionUnderflow { path: Path },

    /// The same acquisition was released twice.
    #[error("permission at `{path}` released twice")]
    PermissionDoubleClear { path: Path },
}

pub type WardenResult<T> = Result<T, WardenError>;

/// A user action's failure, kept separate from [`WardenError`] because it
/// originates in caller-supplied code rather than in warden's own
/// scheduling or binding logic.
pub type ActionError = Box<dyn StdError + Send + Sync + 'static>;

pub type ActionResult<T> = Result<T, ActionError>;
