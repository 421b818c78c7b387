//! Shared root and view types for warden's integration tests: one small
//! in-memory document with a flat sequence, a mapping of sequences, and a
//! nested composite, covering every Shape Walker rule exercised by the
//! seed scenarios.

use std::collections::HashMap;

use warden::view::{ReadScalar, ReadSeq, WriteSeq};
use warden::View;

#[derive(Debug, Default, Clone)]
pub struct Sub {
    pub int_arr: Vec<i64>,
}

#[derive(Debug, Default)]
pub struct Root {
    pub float_arr: Vec<f64>,
    pub label: String,
    pub data: HashMap<String, Vec<i64>>,
    pub sub: Sub,
}

impl Root {
    pub fn seeded() -> Self {
        Root {
            float_arr: vec![1.0, 2.0, 3.0],
            label: "seed".to_string(),
            data: HashMap::from([
                ("Test".to_string(), vec![1, 2, 3]),
                ("Other".to_string(), vec![4, 5, 6]),
            ]),
            sub: Sub { int_arr: vec![10, 20, 30] },
        }
    }
}

/// Scenario 1/2: read and write views over the flat `float_arr` sequence.
#[derive(View)]
#[view(root = Root)]
pub struct FloatArrRead {
    pub float_arr: ReadSeq<f64>,
}

#[derive(View)]
#[view(root = Root)]
pub struct FloatArrWrite {
    pub float_arr: WriteSeq<f64>,
}

/// Scenario 3: a renamed read slot.
#[derive(View)]
#[view(root = Root)]
pub struct RenamedSum {
    #[view(source = "float_arr")]
    pub data_to_sum: ReadSeq<f64>,
}

/// A scalar read slot, exercised by the laws tests.
#[derive(View)]
#[view(root = Root)]
pub struct LabelRead {
    pub label: ReadScalar<String>,
}

/// Scenario 4: a mapping-bound write/read slot, keyed at runtime by
/// `Params`.
#[derive(View)]
#[view(root = Root)]
pub struct MappingWrite {
    #[view(mapping)]
    pub data: WriteSeq<i64>,
}

#[derive(View)]
#[view(root = Root)]
pub struct MappingRead {
    #[view(mapping)]
    pub data: ReadSeq<i64>,
}

/// Scenario 5: nested composite recursion (Shape Walker rule 5), used for
/// the half of the hierarchical conflict scenario that does bind through
/// the derive macro. `write(Sub)` itself (the coarse parent grab) is built
/// directly against `warden::AnyCommand` in `tests/scenarios.rs`, since no
/// view slot wrapper stands for "the whole nested composite, opaquely".
#[derive(View)]
#[view(root = Sub)]
pub struct SubIntArrWrite {
    pub int_arr: WriteSeq<i64>,
}

#[derive(View)]
#[view(root = Sub)]
pub struct SubIntArrRead {
    pub int_arr: ReadSeq<i64>,
}

#[derive(View)]
#[view(root = Root)]
pub struct SubWrite {
    pub sub: SubIntArrWrite,
}

#[derive(View)]
#[view(root = Root)]
pub struct SubRead {
    pub sub: SubIntArrRead,
}
