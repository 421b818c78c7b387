use std::sync::Arc;

use crate::barrier::CompletionBarrier;
use crate::command::AnyCommand;
use crate::permission::Table;
use crate::queue::{submission_queue, SubmissionSender};
use crate::root::DataCell;
use crate::scheduler::Scheduler;
use crate::worker::WorkerPool;

const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// The public entry point: a data root plus the scheduler and worker pool
/// running against it. Clients submit commands through [`DataSource::run`]
/// (concurrent) or [`DataSource::run_sequentially`] (in place, in order).
pub struct DataSource<R: Send + Sync + 'static> {
    root: Arc<DataCell<R>>,
    barrier: Arc<CompletionBarrier>,
    sender: Option<SubmissionSender<R>>,
    scheduler: Scheduler<R>,
    workers: Option<WorkerPool<R>>,
}

impl<R: Send + Sync + 'static> DataSource<R> {
    /// A pool sized to leave one logical core free for the scheduler thread
    /// itself.
    pub fn new(root: R) -> Self {
        let pool_size = std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1).max(1))
            .unwrap_or(1);

        Self::with_pool_size(root, pool_size)
    }

    pub fn with_pool_size(root: R, pool_size: usize) -> Self {
        let root = Arc::new(DataCell::new(root));
        let table = Arc::new(Table::new());
        let barrier = Arc::new(CompletionBarrier::new());
        let (sender, receiver) = submission_queue(DEFAULT_QUEUE_CAPACITY);

        let workers = WorkerPool::spawn(pool_size, root.clone(), table.clone(), barrier.clone());
        let dispatch = workers.dispatch_sender();

        let scheduler = Scheduler::spawn(receiver, table, barrier.clone(), dispatch);

        DataSource {
            root,
            barrier,
            sender: Some(sender),
            scheduler,
            workers: Some(workers),
        }
    }

    /// Enqueues `commands` for concurrent execution and returns immediately.
    /// Blocks only if the submission queue is momentarily full.
    pub fn run(&self, commands: impl IntoIterator<Item = Box<dyn AnyCommand<R>>>) {
        let sender = self
            .sender
            .as_ref()
            .expect("run called after close");

        for command in commands {
            // Counted before the push, not after the whole batch: `push`
            // blocks once the bounded queue is full, and a worker can drain
            // and complete an already-enqueued command (calling
            // `complete_one`) while this loop is still blocked on a later
            // one. Counting per command as it's enqueued keeps `add` always
            // ahead of any matching `complete_one`.
            self.barrier.add(1);

            if sender.push(command).is_err() {
                self.barrier.complete_one();
                break;
            }
        }
    }

    /// Walks, binds, and runs each command in place, in submission order,
    /// bypassing the permission table and worker pool entirely. Intended
    /// for tests and deterministic pipelines — the direct successor of the
    /// original source's single-threaded `DataSource.Run`.
    pub fn run_sequentially(&self, commands: impl IntoIterator<Item = Box<dyn AnyCommand<R>>>) {
        let root_ptr = self.root.get();

        for command in commands {
            let root_ref = unsafe { &mut *root_ptr };
            let _ = command.execute(root_ref);
        }
    }

    /// Blocks until every command submitted so far via [`Self::run`] has
    /// finished.
    pub fn wait(&self) {
        self.barrier.wait_drained();
    }

    /// Waits for outstanding work, then shuts the scheduler and worker pool
    /// down and returns the root.
    pub fn close(mut self) -> R {
        self.wait();

        // Dropping the one submission sender disconnects the scheduler's
        // receive loop, which then exits once the queue is drained.
        drop(self.sender.take());
        self.scheduler.join();

        if let Some(workers) = self.workers.take() {
            workers.close();
        }

        match Arc::try_unwrap(self.root) {
            Ok(cell) => cell.into_inner(),
            Err(_) => {
                unreachable!("all scheduler and worker threads have been joined by this point")
            }
        }
    }
}
