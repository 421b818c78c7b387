use std::cell::UnsafeCell;

/// Holds the caller's data root behind an [`UnsafeCell`] with no lock of its
/// own. Access is disciplined entirely by the permission table: by the time
/// a worker dereferences a pointer into the cell, the scheduler has already
/// proven no other live command can observe the same paths with a
/// conflicting intent. `DataCell` itself enforces nothing — it is exactly as
/// safe as the permission table's bookkeeping is correct.
pub struct DataCell<R> {
    data: UnsafeCell<R>,
}

// Safety: every access to `data` is gated by a successful, conflict-free
// `Table::try_acquire` covering the paths that access touches, so concurrent
// `get()` calls never alias in a way the borrow checker would reject if it
// could see across the table.
unsafe impl<R: Send> Sync for DataCell<R> {}

impl<R> DataCell<R> {
    pub fn new(data: R) -> Self {
        DataCell {
            data: UnsafeCell::new(data),
        }
    }

    /// Returns a raw pointer to the root. Callers must already hold a
    /// permission grant covering every path they intend to touch through it.
    pub fn get(&self) -> *mut R {
        self.data.get()
    }

    /// Consumes the cell, returning the root. Only valid once every worker
    /// has been joined (see [`crate::handle::DataSource::close`]).
    pub fn into_inner(self) -> R {
        self.data.into_inner()
    }
}
