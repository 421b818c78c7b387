use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex};

use crate::error::WardenError;
use crate::path::Path;
use crate::permission::intent::PermissionIntent;
use crate::permission::set::PermissionSet;

/// One field in the permission tree.
///
/// `state == 0` is free, `state == -1` is write-held, and `state > 0` counts
/// concurrent readers. Children are keyed by field-name segment and created
/// lazily the first time a command touches that path.
#[derive(Debug, Default)]
struct Node {
    state: i64,
    children: HashMap<&'static str, Node>,
}

const FREE: i64 = 0;
const WRITE_HELD: i64 = -1;

impl Node {
    /// Conditions (a)-(d): walks from `self` down to the node named by
    /// `segments`, treating every node strictly above the target as an
    /// ancestor (conflicts only if it would block the incoming intent) and
    /// the target itself plus its whole subtree as requiring a full
    /// descendant scan (a write anywhere below blocks everything; a read
    /// below only blocks an incoming write).
    fn path_conflicts(&self, segments: &[&'static str], intent: PermissionIntent) -> bool {
        match segments.split_first() {
            None => self.subtree_conflicts(intent.is_write()),
            Some((head, tail)) => {
                Table::ancestor_would_conflict(self, intent)
                    || self
                        .children
                        .get(head)
                        .map(|child| child.path_conflicts(tail, intent))
                        .unwrap_or(false)
            }
        }
    }

    fn child_at<'a>(&'a self, segments: &[&'static str]) -> Option<&'a Node> {
        match segments.split_first() {
            None => Some(self),
            Some((head, tail)) => self.children.get(head)?.child_at(tail),
        }
    }

    fn child_at_mut<'a>(&'a mut self, segments: &[&'static str]) -> Option<&'a mut Node> {
        match segments.split_first() {
            None => Some(self),
            Some((head, tail)) => self.children.get_mut(head)?.child_at_mut(tail),
        }
    }

    fn child_at_or_create<'a>(&'a mut self, segments: &[&'static str]) -> &'a mut Node {
        match segments.split_first() {
            None => self,
            Some((head, tail)) => self.children.entry(head).or_default().child_at_or_create(tail),
        }
    }

    /// True if this node or any node in its subtree holds a write, or (when
    /// `write_incoming` is set) holds anything at all.
    ///
    /// A read only ever conflicts with a write held at or above the target
    /// path, never with one held by a descendant, so a read request stops
    /// here instead of scanning down into `children`.
    fn subtree_conflicts(&self, write_incoming: bool) -> bool {
        let blocks_here = self.state == WRITE_HELD || (write_incoming && self.state > FREE);

        if !write_incoming {
            return blocks_here;
        }

        blocks_here
            || self
                .children
                .values()
                .any(|child| child.subtree_conflicts(write_incoming))
    }
}

/// The hierarchical reader/writer permission table.
///
/// A single coarse [`Mutex`] guards the whole tree; a [`Condvar`] wakes
/// waiters on every successful acquire or release so the scheduler can block
/// without polling (Design Notes, §9). This mirrors a plain
/// `Mutex`-plus-`Condvar` admission gate rather than a sharded lock table —
/// the whole point of the design is a single atomic all-or-nothing decision
/// per command, which a sharded structure would only complicate.
#[derive(Debug, Default)]
pub struct Table {
    root: Mutex<Node>,
    condvar: Condvar,
    version: AtomicU64,
}

impl Table {
    pub fn new() -> Self {
        Table {
            root: Mutex::new(Node::default()),
            condvar: Condvar::new(),
            version: AtomicU64::new(0),
        }
    }

    /// The current version. Bumped on every successful acquire and release.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Blocks until the version differs from `seen`, i.e. until some other
    /// acquire or release has happened since the caller last checked.
    pub fn wait_for_change(&self, seen: u64) {
        let mut guard = self.root.lock().unwrap_or_else(|poison| poison.into_inner());

        while self.version.load(Ordering::SeqCst) == seen {
            guard = self
                .condvar
                .wait(guard)
                .unwrap_or_else(|poison| poison.into_inner());
        }
    }

    /// Attempts to atomically acquire every path in `set`. Either every path
    /// is granted, or none are (I2): a request that would block on even one
    /// path takes nothing.
    pub fn try_acquire(&self, set: &PermissionSet) -> bool {
        let mut root = self.root.lock().unwrap_or_else(|poison| poison.into_inner());

        if set
            .iter()
            .any(|(path, intent)| root.path_conflicts(path.segments(), intent))
        {
            return false;
        }

        for (path, intent) in set.iter() {
            let node = root.child_at_or_create(path.segments());

            match intent {
                PermissionIntent::Write => node.state = WRITE_HELD,
                PermissionIntent::Read => node.state += 1,
            }
        }

        self.version.fetch_add(1, Ordering::SeqCst);
        self.condvar.notify_all();

        true
    }

    /// Releases every path in `set`, previously granted together by
    /// [`Self::try_acquire`].
    ///
    /// Validates every path before mutating any of them, so a bad release
    /// call (double release, or releasing a read nobody holds) leaves the
    /// table untouched rather than partially unwound.
    pub fn release(&self, set: &PermissionSet) -> Result<(), WardenError> {
        let mut root = self.root.lock().unwrap_or_else(|poison| poison.into_inner());

        for (path, intent) in set.iter() {
            let state = root.child_at(path.segments()).map(|node| node.state).unwrap_or(FREE);

            match intent {
                PermissionIntent::Write if state != WRITE_HELD => {
                    return Err(WardenError::PermissionDoubleClear { path: path.clone() });
                }
                PermissionIntent::Read if state <= FREE => {
                    return Err(WardenError::PermissionUnderflow { path: path.clone() });
                }
                _ => {}
            }
        }

        for (path, intent) in set.iter() {
            let node = root
                .child_at_mut(path.segments())
                .expect("path existence was just validated above");

            match intent {
                PermissionIntent::Write => node.state = FREE,
                PermissionIntent::Read => node.state -= 1,
            }
        }

        self.version.fetch_add(1, Ordering::SeqCst);
        self.condvar.notify_all();

        Ok(())
    }

    /// A strict ancestor of the target path conflicts with an incoming write
    /// whenever it holds anything at all, and with an incoming read only
    /// when it holds a write.
    fn ancestor_would_conflict(node: &Node, intent: PermissionIntent) -> bool {
        match intent {
            PermissionIntent::Write => node.state != FREE,
            PermissionIntent::Read => node.state == WRITE_HELD,
        }
    }
}
