use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use tracing::{instrument, trace};

use crate::barrier::CompletionBarrier;
use crate::command::AnyCommand;
use crate::job::Job;
use crate::permission::Table;
use crate::queue::SubmissionReceiver;

/// Runs on one dedicated thread. Repeatedly pops a command, derives its
/// permission set, blocks until the table can grant it, and dispatches it to
/// the worker pool. Never holds the table lock while blocked —
/// it loops `try_acquire` / `wait_for_change` instead of polling, so an
/// admitted command's release wakes the scheduler immediately rather than
/// after some fixed delay.
pub struct Scheduler<R> {
    handle: Option<JoinHandle<()>>,
    _marker: std::marker::PhantomData<R>,
}

impl<R: Send + 'static> Scheduler<R> {
    pub fn spawn(
        queue: SubmissionReceiver<R>,
        table: Arc<Table>,
        barrier: Arc<CompletionBarrier>,
        dispatch: Sender<Job<R>>,
    ) -> Self {
        let handle = std::thread::Builder::new()
            .name("warden-scheduler".into())
            .spawn(move || Self::run(queue, table, barrier, dispatch))
            .expect("failed to spawn scheduler thread");

        Scheduler {
            handle: Some(handle),
            _marker: std::marker::PhantomData,
        }
    }

    #[instrument(skip_all)]
    fn run(
        queue: SubmissionReceiver<R>,
        table: Arc<Table>,
        barrier: Arc<CompletionBarrier>,
        dispatch: Sender<Job<R>>,
    ) {
        loop {
            let command: Box<dyn AnyCommand<R>> = match queue.pop() {
                Ok(command) => command,
                Err(_disconnected) => {
                    trace!("submission queue closed and drained, scheduler exiting");
                    return;
                }
            };

            let permission_set = command.permission_set();

            loop {
                let seen_version = table.version();

                if table.try_acquire(&permission_set) {
                    break;
                }

                trace!("command blocked on a conflicting permission, waiting");
                table.wait_for_change(seen_version);
            }

            let job = Job {
                command,
                permission_set,
            };

            if let Err(send_error) = dispatch.send(job) {
                // The worker pool has shut down; give the permission we just
                // acquired back before dropping the job on the floor.
                let Job { permission_set, .. } = send_error.0;
                let _ = table.release(&permission_set);
                barrier.complete_one();
                return;
            }
        }
    }

    /// Blocks until the scheduler thread has drained the submission queue
    /// and exited (called once, from `DataSource::close`).
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
