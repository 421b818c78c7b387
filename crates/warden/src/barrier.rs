use std::sync::{Condvar, Mutex};

/// Tracks how many submitted commands have not yet finished (released their
/// permissions and been dropped by their worker). `DataSource::wait` blocks
/// on this until it reaches zero — a bulk submission of N commands is
/// exactly this counter going from N to 0.
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    outstanding: Mutex<u64>,
    condvar: Condvar,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        CompletionBarrier {
            outstanding: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }

    pub fn add(&self, count: u64) {
        let mut outstanding = self.outstanding.lock().unwrap_or_else(|poison| poison.into_inner());
        *outstanding += count;
    }

    /// Marks one command finished, waking any waiter if the barrier has
    /// drained to zero.
    pub fn complete_one(&self) {
        let mut outstanding = self.outstanding.lock().unwrap_or_else(|poison| poison.into_inner());

        *outstanding = outstanding.saturating_sub(1);

        if *outstanding == 0 {
            self.condvar.notify_all();
        }
    }

    pub fn wait_drained(&self) {
        let mut outstanding = self.outstanding.lock().unwrap_or_else(|poison| poison.into_inner());

        while *outstanding != 0 {
            outstanding = self
                .condvar
                .wait(outstanding)
                .unwrap_or_else(|poison| poison.into_inner());
        }
    }
}
