use std::collections::HashMap;

use crate::error::WardenError;
use crate::path::Path;
use crate::permission::intent::PermissionIntent;

/// The static permission requirement of a view: every path it touches, and
/// whether it reads or writes there. Computed once per view type (Design
/// Notes, §9 — it depends only on the view's declared shape, never on the
/// root's runtime data) and cloned per command from a cached template.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    entries: HashMap<Path, PermissionIntent>,
}

impl PermissionSet {
    pub fn new() -> Self {
        PermissionSet {
            entries: HashMap::new(),
        }
    }

    /// Declares a read or write at `path`. Declaring the same path twice with
    /// different intents is a self-conflict caught by
    /// [`validate_self_consistent`](Self::validate_self_consistent), not
    /// here — building the set must never panic on shapes that are merely
    /// unusual, only on ones the walker has finished resolving as invalid.
    pub fn insert(&mut self, path: Path, intent: PermissionIntent) {
        self.entries
            .entry(path)
            .and_modify(|existing| {
                if intent.is_write() {
                    *existing = PermissionIntent::Write;
                }
            })
            .or_insert(intent);
    }

    /// Merges a nested view's own template into `self`, reparenting every
    /// entry under `segment` (Shape Walker rule 5). Generated `bind` code
    /// calls this once per nested-composite field.
    pub fn insert_nested(&mut self, segment: &'static str, nested: &PermissionSet) {
        for (path, intent) in nested.iter() {
            self.insert(path.nested_under(segment), intent);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, PermissionIntent)> {
        self.entries.iter().map(|(path, intent)| (path, *intent))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rejects a set that conflicts with itself: a write at a path that is
    /// also read or written at an ancestor or descendant path within the
    /// *same* set. Self-conflict is always a programmer error in the view's
    /// shape (it can never be resolved by waiting, unlike a conflict between
    /// two different commands), so it surfaces as
    /// [`WardenError::InternalConflict`] rather than being queued.
    pub fn validate_self_consistent(&self, view_type: &'static str) -> Result<(), WardenError> {
        for (path, intent) in self.entries.iter() {
            for (other_path, other_intent) in self.entries.iter() {
                if path == other_path {
                    continue;
                }

                let related = path.is_ancestor_of(other_path) || other_path.is_ancestor_of(path);

                if related && (intent.is_write() || other_intent.is_write()) {
                    return Err(WardenError::InternalConflict {
                        view_type,
                        path: path.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_conflict_detected_between_ancestor_and_descendant() {
        let mut set = PermissionSet::new();
        set.insert(Path::root().child("something"), PermissionIntent::Read);
        set.insert(
            Path::root().child("something").child("else"),
            PermissionIntent::Write,
        );

        assert!(matches!(
            set.validate_self_consistent("Example"),
            Err(WardenError::InternalConflict { .. })
        ));
    }

    #[test]
    fn disjoint_paths_are_self_consistent() {
        let mut set = PermissionSet::new();
        set.insert(Path::root().child("base_write"), PermissionIntent::Write);
        set.insert(Path::root().child("base_read"), PermissionIntent::Read);
        set.insert(
            Path::root().child("something").child("else"),
            PermissionIntent::Read,
        );

        assert!(set.validate_self_consistent("Example").is_ok());
    }

    #[test]
    fn insert_nested_reparents_every_entry() {
        let mut nested = PermissionSet::new();
        nested.insert(Path::root().child("int_arr"), PermissionIntent::Write);
        nested.insert(Path::root().child("label"), PermissionIntent::Read);

        let mut outer = PermissionSet::new();
        outer.insert_nested("sub", &nested);

        let paths: Vec<String> = outer.iter().map(|(path, _)| path.to_string()).collect();
        assert!(paths.contains(&"sub.int_arr".to_string()));
        assert!(paths.contains(&"sub.label".to_string()));
    }

    #[test]
    fn same_path_read_twice_is_consistent() {
        let mut set = PermissionSet::new();
        set.insert(
            Path::root().child("something").child("else"),
            PermissionIntent::Read,
        );
        set.insert(
            Path::root().child("something").child("else"),
            PermissionIntent::Read,
        );

        assert!(set.validate_self_consistent("Example").is_ok());
    }
}
