//! Test utilities and reflected fixtures for Tessera development.
//!
//! Provides sample reflected types in [`fixtures`] ([`Hero`],
//! [`Targeting`], [`Squad`]), a [`registry`] with all of them registered,
//! and [`TreeBuilder`] for growing plain scope trees of a given shape.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{Hero, Squad, Targeting};

use tessera_core::{ScopeError, ScopeId};
use tessera_runtime::{ScopeArena, TypeManager};

/// Registry with every fixture type registered.
///
/// # Panics
///
/// Panics if a fixture's signature list is rejected.
pub fn registry() -> TypeManager {
    let mut types = TypeManager::new();
    Hero::register(&mut types).expect("Hero signatures are valid");
    Targeting::register(&mut types).expect("Targeting signatures are valid");
    Squad::register(&mut types).expect("Squad signatures are valid");
    types
}

/// Builds uniform scope trees in an arena.
///
/// Every scope gets `attributes` integer attributes named `a0`, `a1`, …
/// and `breadth` children under the table key `"Children"`, down to
/// `depth` levels below the root.
#[derive(Clone, Debug)]
pub struct TreeBuilder {
    depth: usize,
    breadth: usize,
    attributes: usize,
}

impl TreeBuilder {
    pub const CHILD_KEY: &'static str = "Children";

    pub fn new() -> Self {
        Self {
            depth: 1,
            breadth: 2,
            attributes: 2,
        }
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn breadth(mut self, breadth: usize) -> Self {
        self.breadth = breadth;
        self
    }

    pub fn attributes(mut self, attributes: usize) -> Self {
        self.attributes = attributes;
        self
    }

    /// Number of scopes a built tree holds.
    pub fn node_count(&self) -> usize {
        (0..=self.depth).map(|level| self.breadth.pow(level as u32)).sum()
    }

    /// Build the tree and return its root.
    pub fn build(&self, arena: &mut ScopeArena) -> Result<ScopeId, ScopeError> {
        let root = arena.create_scope();
        let mut level = vec![root];
        for _ in 0..self.depth {
            let mut next = Vec::with_capacity(level.len() * self.breadth);
            for &parent in &level {
                self.fill(arena, parent)?;
                for _ in 0..self.breadth {
                    next.push(arena.append_scope(parent, Self::CHILD_KEY)?);
                }
            }
            level = next;
        }
        for &leaf in &level {
            self.fill(arena, leaf)?;
        }
        Ok(root)
    }

    fn fill(&self, arena: &mut ScopeArena, id: ScopeId) -> Result<(), ScopeError> {
        for i in 0..self.attributes {
            arena.append(id, &format!("a{i}"))?.push_back(i as i32)?;
        }
        Ok(())
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_holds_every_fixture() {
        let types = registry();
        assert_eq!(types.len(), 3);
        for key in [Hero::TYPE_KEY, Targeting::TYPE_KEY, Squad::TYPE_KEY] {
            assert!(types.contains(key));
        }
    }

    #[test]
    fn tree_builder_shape() {
        let mut arena = ScopeArena::new();
        let builder = TreeBuilder::new().depth(2).breadth(3).attributes(1);
        let root = builder.build(&mut arena).unwrap();
        assert_eq!(arena.len(), builder.node_count());
        assert_eq!(builder.node_count(), 13);
        let kids = arena.find(root, TreeBuilder::CHILD_KEY).unwrap().unwrap();
        assert_eq!(kids.len(), 3);
        assert_eq!(*arena.find(root, "a0").unwrap().unwrap(), 0);
    }
}
