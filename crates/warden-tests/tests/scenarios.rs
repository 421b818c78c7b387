//! The six concrete seed scenarios named in the design notes, one test
//! each, run against the shared root and view types in `src/lib.rs`.

use std::sync::{Arc, Mutex};
use std::sync::mpsc::sync_channel;
use std::time::Duration;

use warden::{ActionResult, AnyCommand, DataSource, Path, PermissionIntent, PermissionSet, ViewCommand};

use warden_tests::{FloatArrRead, FloatArrWrite, LabelRead, MappingRead, MappingWrite, RenamedSum, Root, Sub, SubRead, SubWrite};

fn sum_of(values: &[f64]) -> f64 {
    values.iter().sum()
}

#[test]
fn scenario_1_single_read_sums_to_six() {
    let source = DataSource::with_pool_size(Root::seeded(), 1);
    let sum = Arc::new(Mutex::new(0.0));
    let sum_clone = sum.clone();

    let (command, outcome) = ViewCommand::<FloatArrRead, _>::new((), move |view: &mut FloatArrRead| {
        *sum_clone.lock().unwrap() = sum_of(view.float_arr.as_slice());
        Ok(())
    });

    source.run_sequentially(vec![Box::new(command) as Box<dyn AnyCommand<Root>>]);

    assert!(outcome.try_take().unwrap().is_ok());
    assert_eq!(*sum.lock().unwrap(), 6.0);

    source.close();
}

#[test]
fn scenario_2_write_then_read_doubles_before_summing() {
    let source = DataSource::with_pool_size(Root::seeded(), 1);

    let (write_command, _) = ViewCommand::<FloatArrWrite, _>::new((), |view: &mut FloatArrWrite| {
        for value in view.float_arr.as_mut_vec().iter_mut() {
            *value *= 2.0;
        }
        Ok(())
    });

    let sum = Arc::new(Mutex::new(0.0));
    let sum_clone = sum.clone();
    let (read_command, _) = ViewCommand::<FloatArrRead, _>::new((), move |view: &mut FloatArrRead| {
        *sum_clone.lock().unwrap() = sum_of(view.float_arr.as_slice());
        Ok(())
    });

    source.run_sequentially(vec![
        Box::new(write_command) as Box<dyn AnyCommand<Root>>,
        Box::new(read_command) as Box<dyn AnyCommand<Root>>,
    ]);

    assert_eq!(*sum.lock().unwrap(), 12.0);

    source.close();
}

#[test]
fn scenario_3_renamed_slot_resolves_to_its_source_field() {
    let source = DataSource::with_pool_size(Root::seeded(), 1);
    let sum = Arc::new(Mutex::new(0.0));
    let sum_clone = sum.clone();

    let (command, _) = ViewCommand::<RenamedSum, _>::new((), move |view: &mut RenamedSum| {
        *sum_clone.lock().unwrap() = sum_of(view.data_to_sum.as_slice());
        Ok(())
    });

    source.run_sequentially(vec![Box::new(command) as Box<dyn AnyCommand<Root>>]);

    assert_eq!(*sum.lock().unwrap(), 6.0);

    source.close();
}

#[test]
fn scenario_4_mapping_key_write_then_read_doubles_before_summing() {
    let source = DataSource::with_pool_size(Root::seeded(), 1);

    let (write_command, _) = ViewCommand::<MappingWrite, _>::new("Test".to_string(), |view: &mut MappingWrite| {
        for value in view.data.as_mut_vec().iter_mut() {
            *value *= 2;
        }
        Ok(())
    });

    let sum = Arc::new(Mutex::new(0i64));
    let sum_clone = sum.clone();
    let (read_command, _) = ViewCommand::<MappingRead, _>::new("Test".to_string(), move |view: &mut MappingRead| {
        *sum_clone.lock().unwrap() = view.data.as_slice().iter().sum();
        Ok(())
    });

    source.run_sequentially(vec![
        Box::new(write_command) as Box<dyn AnyCommand<Root>>,
        Box::new(read_command) as Box<dyn AnyCommand<Root>>,
    ]);

    assert_eq!(*sum.lock().unwrap(), 12);

    source.close();
}

/// A hand-rolled `AnyCommand` requesting a coarse write on the whole `sub`
/// path. No derived view slot stands for "the entire nested composite,
/// opaquely" — the derive macro only ever recurses into a nested
/// composite's own fields (rule 5) — so this scenario is the one place the
/// tests reach for `AnyCommand` directly instead of `#[derive(View)]`.
struct WriteWholeSub<F> {
    action: Option<F>,
}

impl<F> WriteWholeSub<F>
where
    F: FnOnce(&mut Sub) + Send + 'static,
{
    fn new(action: F) -> Self {
        WriteWholeSub { action: Some(action) }
    }
}

impl<F> AnyCommand<Root> for WriteWholeSub<F>
where
    F: FnOnce(&mut Sub) + Send + 'static,
{
    fn permission_set(&self) -> PermissionSet {
        let mut set = PermissionSet::new();
        set.insert(Path::from("sub"), PermissionIntent::Write);
        set
    }

    fn execute(self: Box<Self>, root: &mut Root) -> ActionResult<()> {
        let mut this = *self;
        if let Some(action) = this.action.take() {
            action(&mut root.sub);
        }
        Ok(())
    }
}

#[test]
fn scenario_5_hierarchical_conflict_serializes_on_the_ancestor_path() {
    let source = DataSource::with_pool_size(Root::seeded(), 4);
    let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    // Rendezvous: the write is only submitted once the read has actually
    // started (and so, by O2, already holds its permission), which is what
    // makes the subsequent sleep-based overlap window deterministic rather
    // than a timing guess.
    let (started_tx, started_rx) = sync_channel::<()>(0);

    let events_reader = events.clone();
    let (read_command, _) = ViewCommand::<SubRead, _>::new((), move |view: &mut SubRead| {
        events_reader.lock().unwrap().push("read-start");
        let _ = started_tx.send(());
        std::thread::sleep(Duration::from_millis(50));
        let _ = view.sub.int_arr.as_slice();
        events_reader.lock().unwrap().push("read-end");
        Ok(())
    });

    let events_writer = events.clone();
    let write_command = WriteWholeSub::new(move |sub: &mut Sub| {
        events_writer.lock().unwrap().push("write-start");
        sub.int_arr.push(99);
        events_writer.lock().unwrap().push("write-end");
    });

    source.run(vec![Box::new(read_command) as Box<dyn AnyCommand<Root>>]);
    started_rx.recv().expect("read command to signal it started");

    source.run(vec![Box::new(write_command) as Box<dyn AnyCommand<Root>>]);
    source.wait();

    let recorded = events.lock().unwrap().clone();
    assert_eq!(recorded, vec!["read-start", "read-end", "write-start", "write-end"]);

    let root = source.close();
    assert_eq!(root.sub.int_arr, vec![10, 20, 30, 99]);
}

/// The mirror image of `WriteWholeSub`: a coarse read on the whole `sub`
/// path. Used to exercise the permission table against a write already
/// held further down the same subtree (`sub.int_arr`), where a read at `sub`
/// itself must not conflict — only a writer at or above the read's own path
/// does.
struct ReadWholeSub<F> {
    action: Option<F>,
}

impl<F> ReadWholeSub<F>
where
    F: FnOnce(&Sub) + Send + 'static,
{
    fn new(action: F) -> Self {
        ReadWholeSub { action: Some(action) }
    }
}

impl<F> AnyCommand<Root> for ReadWholeSub<F>
where
    F: FnOnce(&Sub) + Send + 'static,
{
    fn permission_set(&self) -> PermissionSet {
        let mut set = PermissionSet::new();
        set.insert(Path::from("sub"), PermissionIntent::Read);
        set
    }

    fn execute(self: Box<Self>, root: &mut Root) -> ActionResult<()> {
        let mut this = *self;
        if let Some(action) = this.action.take() {
            action(&root.sub);
        }
        Ok(())
    }
}

#[test]
fn scenario_7_coarse_read_does_not_conflict_with_descendant_write() {
    let source = DataSource::with_pool_size(Root::seeded(), 4);
    let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    // Rendezvous: the read is only submitted once the write has actually
    // started (and so, by O2, already holds its permission on
    // `sub.int_arr`), which is what makes the subsequent sleep-based
    // overlap window deterministic rather than a timing guess.
    let (started_tx, started_rx) = sync_channel::<()>(0);

    let events_writer = events.clone();
    let (write_command, _) = ViewCommand::<SubWrite, _>::new((), move |view: &mut SubWrite| {
        events_writer.lock().unwrap().push("write-start");
        let _ = started_tx.send(());
        std::thread::sleep(Duration::from_millis(50));
        view.sub.int_arr.as_mut_vec().push(99);
        events_writer.lock().unwrap().push("write-end");
        Ok(())
    });

    let events_reader = events.clone();
    let read_command = ReadWholeSub::new(move |sub: &Sub| {
        events_reader.lock().unwrap().push("read-start");
        let _ = sub.int_arr.len();
        events_reader.lock().unwrap().push("read-end");
    });

    source.run(vec![Box::new(write_command) as Box<dyn AnyCommand<Root>>]);
    started_rx.recv().expect("write command to signal it started");

    source.run(vec![Box::new(read_command) as Box<dyn AnyCommand<Root>>]);
    source.wait();

    let recorded = events.lock().unwrap().clone();
    assert_eq!(
        recorded,
        vec!["write-start", "read-start", "read-end", "write-end"],
        "a coarse read on `sub` must run concurrently with a write held on `sub.int_arr`, not serialize behind it"
    );

    source.close();
}

#[test]
fn scalar_scenario_label_read_snapshot() {
    let source = DataSource::with_pool_size(Root::seeded(), 1);

    let label = Arc::new(Mutex::new(String::new()));
    let label_clone = label.clone();
    let (command, _) = ViewCommand::<LabelRead, _>::new((), move |view: &mut LabelRead| {
        *label_clone.lock().unwrap() = view.label.get().clone();
        Ok(())
    });

    source.run_sequentially(vec![Box::new(command) as Box<dyn AnyCommand<Root>>]);

    assert_eq!(*label.lock().unwrap(), "seed");

    source.close();
}
