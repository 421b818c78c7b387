use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{instrument, warn};

use crate::barrier::CompletionBarrier;
use crate::job::{Job, JobGuard};
use crate::permission::Table;
use crate::root::DataCell;

/// N worker threads sharing one dispatch queue. Each iteration: receive a
/// job, build a [`JobGuard`] (so permissions are released and the
/// completion barrier decremented no matter how the action below returns),
/// run the command against the root, and let the guard's `Drop` do the rest.
pub struct WorkerPool<R> {
    dispatch: Sender<Job<R>>,
    handles: Vec<JoinHandle<()>>,
}

impl<R: Send + 'static> WorkerPool<R> {
    pub fn spawn(size: usize, root: Arc<DataCell<R>>, table: Arc<Table>, barrier: Arc<CompletionBarrier>) -> Self {
        let (dispatch, receiver): (Sender<Job<R>>, Receiver<Job<R>>) = bounded(size.max(1) * 4);

        let handles = (0..size.max(1))
            .map(|index| {
                let receiver = receiver.clone();
                let root = root.clone();
                let table = table.clone();
                let barrier = barrier.clone();

                std::thread::Builder::new()
                    .name(format!("warden-worker-{index}"))
                    .spawn(move || Self::run(receiver, root, table, barrier))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        WorkerPool { dispatch, handles }
    }

    pub fn dispatch_sender(&self) -> Sender<Job<R>> {
        self.dispatch.clone()
    }

    #[instrument(skip_all)]
    fn run(receiver: Receiver<Job<R>>, root: Arc<DataCell<R>>, table: Arc<Table>, barrier: Arc<CompletionBarrier>) {
        while let Ok(job) = receiver.recv() {
            let Job {
                command,
                permission_set,
            } = job;

            // The guard is constructed before the action runs and dropped
            // after, so it releases and decrements even if `execute` panics.
            let guard = JobGuard::new(table.clone(), barrier.clone(), permission_set);

            // Safety: `execute` only touches the paths covered by
            // `guard`'s permission set, which this worker now exclusively
            // holds for the duration of the call.
            let root_ptr = root.get();

            let outcome = catch_unwind(AssertUnwindSafe(|| {
                let root_ref = unsafe { &mut *root_ptr };
                command.execute(root_ref)
            }));

            drop(guard);

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(action_error)) => {
                    warn!(error = %action_error, "command action returned an error");
                }
                Err(panic_payload) => {
                    std::panic::resume_unwind(panic_payload);
                }
            }
        }
    }

    /// Drops this pool's own dispatch sender and joins every worker thread.
    /// Workers exit once every sender clone (this one, and the scheduler's,
    /// which it drops when its own run loop returns) has gone away and the
    /// dispatch queue is drained.
    pub fn close(self) {
        let WorkerPool { dispatch, handles } = self;
        drop(dispatch);

        for handle in handles {
            let _ = handle.join();
        }
    }
}
