use std::collections::HashMap;

use crate::view::bind::DeferredApplyOp;

/// A write-only handle onto a `Vec<T>` field of the root. Generated `bind`
/// code points this directly at the root's own storage (for an ordinary
/// sequence field) or at a freshly allocated, not-yet-installed `Vec<T>`
/// (for a mapping field whose key does not exist yet, paired with a
/// [`DeferredApplyOp`] that installs it after the action runs).
pub struct WriteSeq<T> {
    ptr: *mut Vec<T>,
}

impl<T> WriteSeq<T> {
    /// # Safety
    /// `ptr` must stay valid and exclusively owned by this slot for the
    /// whole lifetime of the view it belongs to — exactly what a successful,
    /// conflict-free permission grant on the corresponding path guarantees.
    pub unsafe fn from_raw(ptr: *mut Vec<T>) -> Self {
        WriteSeq { ptr }
    }

    pub fn push(&mut self, value: T) {
        unsafe { (*self.ptr).push(value) }
    }

    pub fn as_mut_vec(&mut self) -> &mut Vec<T> {
        unsafe { &mut *self.ptr }
    }
}

/// A read handle onto a `Vec<T>` field, snapshotted at bind time (Open
/// Question resolution, Design Notes §9): the slot holds its own clone of
/// the data as of the moment the worker populated the view, so it reads the
/// same value for the whole action even if, hypothetically, something else
/// could touch the source afterwards.
pub struct ReadSeq<T> {
    snapshot: Vec<T>,
}

impl<T> ReadSeq<T> {
    pub fn new(snapshot: Vec<T>) -> Self {
        ReadSeq { snapshot }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.snapshot
    }

    pub fn into_vec(self) -> Vec<T> {
        self.snapshot
    }
}

/// A read handle onto a scalar field, snapshotted at bind time.
pub struct ReadScalar<T> {
    snapshot: T,
}

impl<T> ReadScalar<T> {
    pub fn new(snapshot: T) -> Self {
        ReadScalar { snapshot }
    }

    pub fn get(&self) -> &T {
        &self.snapshot
    }

    pub fn into_inner(self) -> T {
        self.snapshot
    }
}

/// Binds a `WriteSeq<T>` directly onto an ordinary `Vec<T>` field (Shape
/// Walker rules 2/3).
pub fn bind_write_seq<T>(field: &mut Vec<T>) -> WriteSeq<T> {
    unsafe { WriteSeq::from_raw(field as *mut Vec<T>) }
}

/// Binds a `ReadSeq<T>` by cloning an ordinary `Vec<T>` field.
pub fn bind_read_seq<T: Clone>(field: &Vec<T>) -> ReadSeq<T> {
    ReadSeq::new(field.clone())
}

/// Binds a `ReadScalar<T>` by cloning a scalar field.
pub fn bind_read_scalar<T: Clone>(field: &T) -> ReadScalar<T> {
    ReadScalar::new(field.clone())
}

/// Binds a `WriteSeq<T>` onto a mapping field (Shape Walker rule 6). If
/// `key` is already present, the slot points directly at that entry's
/// `Vec<T>`. If it is absent, a fresh `Vec<T>` is allocated for the slot to
/// write into, and a [`DeferredApplyOp`] is returned that installs it into
/// the map under `key` once the action has run, not mid-bind: other
/// concurrent binds must not observe a half-written key before the action
/// that owns it has actually run.
pub fn bind_mapping_write_seq<T>(
    map: &mut HashMap<String, Vec<T>>,
    key: String,
) -> (WriteSeq<T>, Option<DeferredApplyOp>)
where
    T: 'static,
{
    if let Some(existing) = map.get_mut(&key) {
        return (bind_write_seq(existing), None);
    }

    let map_ptr: *mut HashMap<String, Vec<T>> = map;
    let boxed = Box::into_raw(Box::new(Vec::<T>::new()));
    let slot = unsafe { WriteSeq::from_raw(boxed) };

    // Safety: `map_ptr` and `boxed` both stay valid for the remainder of
    // this job — the worker holds the write permission on this mapping
    // path until it releases after applying deferred ops, so nothing else
    // can touch the map in between.
    let deferred = DeferredApplyOp::new(move || unsafe {
        let vec = *Box::from_raw(boxed);
        (*map_ptr).insert(key, vec);
    });

    (slot, Some(deferred))
}

/// Binds a `ReadSeq<T>` onto a mapping field, cloning the entry if present
/// or producing an empty snapshot if the key does not exist (a missing key
/// is not an error for a read: there is simply nothing there yet).
pub fn bind_mapping_read_seq<T: Clone>(map: &HashMap<String, Vec<T>>, key: &str) -> ReadSeq<T> {
    match map.get(key) {
        Some(existing) => bind_read_seq(existing),
        None => ReadSeq::new(Vec::new()),
    }
}
