//! Scenario 6: 1000 non-conflicting read commands over the same sequence
//! must all complete, and `wait` must return exactly once the last one has.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use warden::{AnyCommand, DataSource, ViewCommand};
use warden_tests::{FloatArrRead, Root};

const COMMAND_COUNT: u64 = 1000;

#[test]
fn bulk_submission_barrier_waits_for_every_command() {
    let source = DataSource::with_pool_size(Root::seeded(), 8);
    let completed = Arc::new(AtomicU64::new(0));

    let mut commands: Vec<Box<dyn AnyCommand<Root>>> = Vec::with_capacity(COMMAND_COUNT as usize);

    for _ in 0..COMMAND_COUNT {
        let completed = completed.clone();
        let (command, _) = ViewCommand::<FloatArrRead, _>::new((), move |view: &mut FloatArrRead| {
            let _: f64 = view.float_arr.as_slice().iter().sum();
            completed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        commands.push(Box::new(command));
    }

    source.run(commands);
    source.wait();

    assert_eq!(completed.load(Ordering::SeqCst), COMMAND_COUNT);

    source.close();
}
