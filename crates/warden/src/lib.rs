//! A concurrent command scheduler over a single in-memory data root.
//!
//! Clients submit *view commands*: each names a structural view of the root
//! — a subset of its fields, each tagged with whether the command intends to
//! read or write it — plus an action to run once that view is populated.
//! Commands whose declared views do not conflict run concurrently across a
//! worker pool; commands whose views do conflict are serialized against each
//! other, without the caller ever taking out a lock by hand.
//!
//! Five pieces make this work, leaves first:
//!
//! - [`view`] — the `#[derive(View)]`-generated binding and the static
//!   permission set a view type requires (the "Shape Walker").
//! - [`permission`] — the hierarchical reader/writer [`permission::Table`]
//!   deciding, atomically, whether a command's permission set can be
//!   granted right now.
//! - [`queue`] — the bounded submission queue between callers and the
//!   scheduler.
//! - [`scheduler`] — the single thread that walks each command, blocks until
//!   the table grants it, and dispatches it to a worker.
//! - [`worker`] — the pool that binds the view, runs the action, applies any
//!   deferred mutations, and releases the permission, panic-safely.
//!
//! [`handle::DataSource`] ties these together behind the four operations a
//! caller needs: [`handle::DataSource::run`],
//! [`handle::DataSource::run_sequentially`], [`handle::DataSource::wait`],
//! and [`handle::DataSource::close`].

mod barrier;
pub mod command;
pub mod error;
pub mod handle;
pub mod job;
pub mod path;
pub mod permission;
mod queue;
mod report;
pub mod root;
pub mod scheduler;
pub mod view;
mod worker;

pub use command::{AnyCommand, CommandOutcome, ViewCommand};
pub use error::{ActionError, ActionResult, WardenError, WardenResult};
pub use handle::DataSource;
pub use path::Path;
pub use permission::{PermissionIntent, PermissionSet};
pub use view::View;

pub use warden_derive::View;
