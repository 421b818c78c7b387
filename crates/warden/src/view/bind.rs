/// A mutation deferred until after a command's action has returned: today
/// this is only ever "install this freshly allocated sequence into a
/// mapping field under its key" (Shape Walker rule 6, missing-key branch).
/// Applied by the worker while it still holds the write permission that
/// covers the mapping path, strictly before releasing it.
pub struct DeferredApplyOp {
    apply: Box<dyn FnOnce()>,
}

impl DeferredApplyOp {
    pub fn new(apply: impl FnOnce() + 'static) -> Self {
        DeferredApplyOp {
            apply: Box::new(apply),
        }
    }

    pub fn apply(self) {
        (self.apply)()
    }
}

/// The result of binding a view: the populated value, plus whatever
/// deferred mutations must run once the action using it has finished.
pub struct BindPlan<V> {
    pub view: V,
    pub deferred: Vec<DeferredApplyOp>,
}

impl<V> BindPlan<V> {
    pub fn new(view: V, deferred: Vec<DeferredApplyOp>) -> Self {
        BindPlan { view, deferred }
    }

    /// Runs every deferred op in the order they were recorded.
    pub fn apply_deferred(self) -> V {
        for op in self.deferred {
            op.apply();
        }

        self.view
    }
}
