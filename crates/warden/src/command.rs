use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use crate::error::ActionResult;
use crate::permission::PermissionSet;
use crate::view::{cached_permission_template, View};

/// Type-erased entry point the scheduler and worker pool deal in. Every
/// `ViewCommand<V, F>` the caller submits implements this for its view's
/// `Source` (the data root type).
///
/// Split into a cheap, root-independent `permission_set` and a root-mutating
/// `execute` so the scheduler (which only ever needs the former) never has
/// to touch the root, and the worker (which calls the latter) only does so
/// once it already holds the matching permission grant.
pub trait AnyCommand<R>: Send {
    /// The static permission set this command's view requires. Cheap: it is
    /// a clone of a cached per-view-type template, computed once per view
    /// type the first time it is needed.
    fn permission_set(&self) -> PermissionSet;

    /// Binds the view against `root`, runs the action, applies deferred
    /// mutations, and returns the action's result. Must only be called while
    /// the caller holds a grant covering `permission_set()`.
    fn execute(self: Box<Self>, root: &mut R) -> ActionResult<()>;
}

/// A one-shot slot the caller can poll for a finished command's result.
#[derive(Clone)]
pub struct CommandOutcome {
    slot: Arc<Mutex<Option<ActionResult<()>>>>,
}

impl CommandOutcome {
    fn new() -> (Self, Arc<Mutex<Option<ActionResult<()>>>>) {
        let slot = Arc::new(Mutex::new(None));
        (CommandOutcome { slot: slot.clone() }, slot)
    }

    /// Takes the result if the command has finished, leaving `None` behind
    /// so a second call never observes the same result twice.
    pub fn try_take(&self) -> Option<ActionResult<()>> {
        self.slot.lock().unwrap_or_else(|poison| poison.into_inner()).take()
    }
}

/// A command built from a view type and an action closure. This is the
/// direct generalization of the original source's `ViewCommand[T]` (a
/// populated view plus an `Action func(*T) error`), parameterized over any
/// `#[derive(View)]` type instead of one reflection-populated struct.
pub struct ViewCommand<V: View, F> {
    params: V::Params,
    action: F,
    outcome: Arc<Mutex<Option<ActionResult<()>>>>,
    _view: PhantomData<fn() -> V>,
}

impl<V, F> ViewCommand<V, F>
where
    V: View + 'static,
    F: FnOnce(&mut V) -> ActionResult<()> + Send + 'static,
{
    /// Builds a command and a handle to read its eventual result back.
    /// `params` is `()` for every view except one with a mapping-bound
    /// field, where it is the map key this command targets.
    pub fn new(params: V::Params, action: F) -> (Self, CommandOutcome) {
        let (outcome, slot) = CommandOutcome::new();

        (
            ViewCommand {
                params,
                action,
                outcome: slot,
                _view: PhantomData,
            },
            outcome,
        )
    }
}

impl<V, F> AnyCommand<V::Source> for ViewCommand<V, F>
where
    V: View + 'static,
    F: FnOnce(&mut V) -> ActionResult<()> + Send + 'static,
{
    fn permission_set(&self) -> PermissionSet {
        cached_permission_template::<V>()
    }

    fn execute(self: Box<Self>, root: &mut V::Source) -> ActionResult<()> {
        let this = *self;

        let plan = match V::bind(root, this.params) {
            Ok(plan) => plan,
            Err(error) => return Err(Box::new(error)),
        };

        let mut view = plan.view;
        let result = (this.action)(&mut view);

        for op in plan.deferred {
            op.apply();
        }

        if let Ok(mut slot) = this.outcome.lock() {
            *slot = Some(clone_action_result(&result));
        }

        result
    }
}

/// `ActionResult<()>` holds `Box<dyn Error + Send + Sync>`, which is not
/// `Clone`; the outcome slot needs its own copy of the error's message
/// rather than the error object itself; the actual caller-facing `Result` is
/// still returned from `execute` for `run_sequentially`'s direct callers.
fn clone_action_result(result: &ActionResult<()>) -> ActionResult<()> {
    match result {
        Ok(()) => Ok(()),
        Err(error) => Err(error.to_string().into()),
    }
}
