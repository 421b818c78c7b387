use std::fmt;

use smallvec::SmallVec;

/// A hierarchical permission key: an ordered list of field-name segments from
/// the data root down to the exact slot a view binds.
///
/// Most views bind two or three levels deep, so segments live inline in a
/// [`SmallVec`] rather than behind a heap allocation in the common case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: SmallVec<[&'static str; 4]>,
}

impl Path {
    /// The path identifying the root itself, with no segments.
    pub fn root() -> Self {
        Path {
            segments: SmallVec::new(),
        }
    }

    /// Appends one segment, returning the extended path.
    #[must_use]
    pub fn child(&self, segment: &'static str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Path { segments }
    }

    /// Prepends `segment` ahead of every segment `self` already has (Shape
    /// Walker rule 5: a nested composite's own paths extend by `.slotName`
    /// when merged into its parent's permission set).
    #[must_use]
    pub fn nested_under(&self, segment: &'static str) -> Self {
        let mut segments = SmallVec::from_slice(&[segment]);
        segments.extend(self.segments.iter().copied());
        Path { segments }
    }

    /// The path with its final segment removed, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }

        let mut segments = self.segments.clone();
        segments.pop();

        Some(Path { segments })
    }

    /// True if `self` is `other`, or an ancestor of `other` in the field
    /// hierarchy (every segment of `self` is a matching prefix of `other`).
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }

    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }

        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, ".")?;
            }

            write!(f, "{segment}")?;
        }

        Ok(())
    }
}

impl From<&'static str> for Path {
    fn from(segment: &'static str) -> Self {
        Path::root().child(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestor_relation_is_prefix_based() {
        let root = Path::root();
        let a = root.child("sub");
        let a_b = a.child("int_arr");
        let sibling = root.child("other");

        assert!(root.is_ancestor_of(&a));
        assert!(root.is_ancestor_of(&a_b));
        assert!(a.is_ancestor_of(&a_b));
        assert!(!a_b.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&sibling));
        assert!(a_b.is_ancestor_of(&a_b));
    }

    #[test]
    fn display_joins_with_dots() {
        let path = Path::root().child("sub").child("int_arr");
        assert_eq!(path.to_string(), "sub.int_arr");
        assert_eq!(Path::root().to_string(), "<root>");
    }

    #[test]
    fn nested_under_prepends_the_parent_segment() {
        let child = Path::root().child("int_arr");
        let reparented = child.nested_under("sub");

        assert_eq!(reparented.to_string(), "sub.int_arr");
        assert_eq!(reparented.segments(), &["sub", "int_arr"]);
    }
}
