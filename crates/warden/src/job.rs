use std::sync::Arc;

use crate::barrier::CompletionBarrier;
use crate::command::AnyCommand;
use crate::permission::{PermissionSet, Table};
use crate::report::system_panic;

/// An admitted command, already granted its permission set by the
/// scheduler, on its way to a worker.
pub struct Job<R> {
    pub command: Box<dyn AnyCommand<R>>,
    pub permission_set: PermissionSet,
}

/// Releases `permission_set` from `table` and marks one unit of work
/// complete on `barrier` when dropped — unconditionally, including when the
/// worker thread is unwinding from a panic in the action it ran. This is what
/// makes worker panics safe: by the time the panic reaches the thread
/// boundary, the permission has already been returned and the barrier
/// already decremented.
pub struct JobGuard {
    table: Arc<Table>,
    barrier: Arc<CompletionBarrier>,
    permission_set: PermissionSet,
}

impl JobGuard {
    pub fn new(table: Arc<Table>, barrier: Arc<CompletionBarrier>, permission_set: PermissionSet) -> Self {
        JobGuard {
            table,
            barrier,
            permission_set,
        }
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        if let Err(error) = self.table.release(&self.permission_set) {
            system_panic!("permission release failed: {error}");
        }

        self.barrier.complete_one();
    }
}
