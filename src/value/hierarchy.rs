use super::{ValueKind, kinds};
use std::collections::{HashMap, HashSet, VecDeque};

/// Explicit supertype relation between value kinds
///
/// Replaces runtime type inspection: every kind lists its direct parents
/// once, and assignability is answered from this table.
#[derive(Debug, Clone, Default)]
pub struct KindHierarchy {
    parents: HashMap<ValueKind, Vec<ValueKind>>,
}

impl KindHierarchy {
    /// Create an empty hierarchy (only [`kinds::ANY`] is implicitly known)
    pub fn new() -> Self {
        Self::default()
    }

    /// Hierarchy of the built-in kinds
    pub fn builtin() -> Self {
        let mut hierarchy = Self::new();
        hierarchy
            .declare(kinds::FILE, &[kinds::ENTITY])
            .declare(kinds::DIRECTORY, &[kinds::ENTITY])
            .declare(kinds::ZIP_ARCHIVE, &[kinds::ARCHIVE])
            .declare(kinds::PNG_IMAGE, &[kinds::IMAGE])
            .declare(kinds::SVG_IMAGE, &[kinds::IMAGE]);
        hierarchy
    }

    /// Declare the direct parents of a kind
    ///
    /// Declaring the same kind twice adds to its parent list.
    pub fn declare(&mut self, kind: ValueKind, parents: &[ValueKind]) -> &mut Self {
        let entry = self.parents.entry(kind).or_default();
        for parent in parents {
            if *parent != kind && !entry.contains(parent) {
                entry.push(*parent);
            }
        }
        self
    }

    /// All transitive supertypes of `kind`, nearest first, without `kind` itself
    pub fn ancestors(&self, kind: ValueKind) -> Vec<ValueKind> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<ValueKind> = VecDeque::new();
        let mut out = Vec::new();

        seen.insert(kind);
        queue.push_back(kind);
        while let Some(current) = queue.pop_front() {
            if let Some(parents) = self.parents.get(&current) {
                for parent in parents {
                    if seen.insert(*parent) {
                        out.push(*parent);
                        queue.push_back(*parent);
                    }
                }
            }
        }
        out
    }

    /// Whether `ancestor` is a proper supertype of `kind`
    pub fn is_strict_ancestor(&self, ancestor: ValueKind, kind: ValueKind) -> bool {
        if ancestor == kind {
            return false;
        }
        ancestor == kinds::ANY || self.ancestors(kind).contains(&ancestor)
    }

    /// Whether a value of kind `actual` may be handed to something declared for `declared`
    pub fn is_assignable(&self, declared: ValueKind, actual: ValueKind) -> bool {
        declared == actual || self.is_strict_ancestor(declared, actual)
    }
}
