//! Benchmark profiles and utilities for the Tessera runtime.
//!
//! Provides pre-built tree shapes for benchmarking:
//!
//! - [`reference_tree`]: 3 levels of 4 children (85 scopes), 8 attributes each
//! - [`stress_tree`]: 5 levels of 6 children (~9.3K scopes), 16 attributes each
//! - [`attribute_names`]: deterministic attribute keys for lookup benches

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessera_core::{ScopeError, ScopeId};
use tessera_runtime::{Scope, ScopeArena};
use tessera_test_utils::TreeBuilder;

/// Build the reference tree: depth 3, breadth 4, 8 attributes per scope.
pub fn reference_tree(arena: &mut ScopeArena) -> Result<ScopeId, ScopeError> {
    TreeBuilder::new()
        .depth(3)
        .breadth(4)
        .attributes(8)
        .build(arena)
}

/// Build the stress tree: depth 5, breadth 6, 16 attributes per scope.
pub fn stress_tree(arena: &mut ScopeArena) -> Result<ScopeId, ScopeError> {
    TreeBuilder::new()
        .depth(5)
        .breadth(6)
        .attributes(16)
        .build(arena)
}

/// `count` distinct attribute names, `attr_0000` upwards.
pub fn attribute_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("attr_{i:04}")).collect()
}

/// A scope holding one integer attribute per name in `names`.
pub fn flat_scope(names: &[String]) -> Result<Scope, ScopeError> {
    let mut scope = Scope::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        scope.append(name)?.push_back(i as i32)?;
    }
    Ok(scope)
}
