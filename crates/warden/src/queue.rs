use crossbeam_channel::{bounded, Receiver, SendError, Sender};

use crate::command::AnyCommand;

/// A bounded, single-producer-owned submission queue between the
/// [`DataSource`](crate::handle::DataSource) handle and the scheduler.
/// `push` blocks when the queue is full rather than growing without bound.
/// There is exactly one [`SubmissionSender`] per data source —
/// dropping it is how [`DataSource::close`](crate::handle::DataSource::close)
/// tells the scheduler's receive loop to drain-then-stop.
///
/// Backed by `crossbeam-channel` rather than `std::sync::mpsc`: the *worker*
/// dispatch queue downstream needs a cloneable, `Sync` receiver shared by
/// every worker thread, which `std::sync::mpsc::Receiver` cannot provide.
/// Using the same channel type for both queues keeps the two stages
/// symmetric.
pub struct SubmissionSender<R> {
    sender: Sender<Box<dyn AnyCommand<R>>>,
}

pub struct SubmissionReceiver<R> {
    receiver: Receiver<Box<dyn AnyCommand<R>>>,
}

pub fn submission_queue<R>(capacity: usize) -> (SubmissionSender<R>, SubmissionReceiver<R>) {
    let (sender, receiver) = bounded(capacity.max(1));

    (SubmissionSender { sender }, SubmissionReceiver { receiver })
}

impl<R> SubmissionSender<R> {
    /// Blocks until there is room, then enqueues `command`. Returns the
    /// command back on error if the receiving side has already gone away.
    pub fn push(&self, command: Box<dyn AnyCommand<R>>) -> Result<(), Box<dyn AnyCommand<R>>> {
        self.sender.send(command).map_err(|SendError(command)| command)
    }
}

impl<R> SubmissionReceiver<R> {
    /// Blocks for the next command, or returns `Err` once every sender has
    /// been dropped and the queue is fully drained.
    pub fn pop(&self) -> Result<Box<dyn AnyCommand<R>>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }
}
