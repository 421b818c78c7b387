//! Structural views over a data root: the wrapper types a `#[derive(View)]`
//! struct's fields are declared in terms of, and the runtime support the
//! generated `bind`/`permission_template` methods call into.

mod bind;
mod slot;

pub use bind::{BindPlan, DeferredApplyOp};
pub use slot::{
    bind_mapping_read_seq,
    bind_mapping_write_seq,
    bind_read_scalar,
    bind_read_seq,
    bind_write_seq,
    ReadScalar,
    ReadSeq,
    WriteSeq,
};

use crate::error::WardenResult;
use crate::permission::PermissionSet;

/// Implemented by every `#[derive(View)]` type. `Source` is whatever
/// container this view binds against: the data root itself for a top-level
/// view, or an enclosing composite's field type for a nested view.
///
/// `Params` is almost always `()` — it only becomes meaningful when the view
/// (always at the top level; nesting a keyed view inside another is not
/// supported) has a field bound to a mapping entry (Shape Walker rule 6), in
/// which case `Params = String` carries the runtime map key the caller
/// chose when constructing the command. This is the one genuinely dynamic
/// input the Shape Walker needs that a view's Rust type alone cannot supply.
///
/// `permission_template` depends only on the view's declared shape, never on
/// runtime data, so callers compute it once and cache it
/// (see [`crate::view::cached_permission_template`]) rather than call it per
/// command.
pub trait View: Sized {
    type Source;
    type Params;

    fn permission_template() -> PermissionSet;

    fn bind(source: &mut Self::Source, params: Self::Params) -> WardenResult<BindPlan<Self>>;
}

/// Computes `V::permission_template()` once per view type and reuses the
/// cached value on every later call, since the template is a pure function
/// of `V`'s declared shape (Design Notes §9).
///
/// A self-conflicting shape (a write at `a` declared alongside a read or
/// write at `a.b`, Design Notes §9 "Self-conflict in a set") is a property
/// of the view type itself, not of any particular command, so it is checked
/// here, once, rather than per submission. A view with such a shape can
/// never be admitted no matter how it is scheduled, so §7's "fails loudly
/// at shape-walk time" is realized as a panic rather than a per-command
/// error threaded back through [`crate::command::CommandOutcome`].
pub fn cached_permission_template<V: View + 'static>() -> PermissionSet {
    use std::any::TypeId;
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};

    static CACHE: OnceLock<Mutex<HashMap<TypeId, PermissionSet>>> = OnceLock::new();

    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap_or_else(|poison| poison.into_inner());

    cache
        .entry(TypeId::of::<V>())
        .or_insert_with(|| {
            let set = V::permission_template();

            if let Err(error) = set.validate_self_consistent(std::any::type_name::<V>()) {
                crate::report::system_panic!("self-conflicting view shape: {error}");
            }

            set
        })
        .clone()
}
