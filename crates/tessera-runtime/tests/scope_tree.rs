//! Integration test: scope trees, ownership transfer and datum storage modes.
//!
//! Exercises the arena the way a loader does: appending attributes and
//! child scopes, moving children between tables, cloning and destroying
//! subtrees.

use proptest::prelude::*;
use tessera_runtime::{
    Datum, DatumError, DatumType, NativeField, Scope, ScopeArena, ScopeConfig, ScopeError,
};
use tessera_test_utils::TreeBuilder;

// ── Scope basics ─────────────────────────────────────────────────────

#[test]
fn hp_and_name_scenario() {
    let mut s = Scope::new();
    s.append("hp").unwrap().assign(20).unwrap();
    s.append("name").unwrap().assign(String::from("hero1")).unwrap();

    assert_eq!(s["hp"].get::<i32>(0).unwrap(), 20);
    assert_eq!(s["name"], "hero1");
    assert!(s.find("mana").is_none());
}

#[test]
fn append_is_idempotent() {
    let mut arena = ScopeArena::new();
    let root = arena.create_scope();
    arena.append(root, "k").unwrap().push_back(1).unwrap();
    let len = arena.scope(root).unwrap().len();

    let again = arena.append(root, "k").unwrap();
    assert_eq!(*again, 1);
    assert_eq!(arena.scope(root).unwrap().len(), len);
}

// ── External storage ─────────────────────────────────────────────────

#[test]
fn external_integers_reject_reserve() {
    let field = NativeField::new(vec![4, 5, 6]);
    let mut d = Datum::new();
    d.set_type(DatumType::Integer).unwrap();
    d.set_storage(&field).unwrap();

    assert_eq!(
        d.reserve(10),
        Err(DatumError::ExternalStorage {
            operation: "reserve"
        })
    );
    assert_eq!(d.get::<i32>(1).unwrap(), field.get(1).unwrap());
    assert_eq!(d.capacity(), 3);
}

// ── Ownership ────────────────────────────────────────────────────────

#[test]
fn children_are_destroyed_with_the_root() {
    let mut arena = ScopeArena::new();
    let root = arena.create_scope();
    let a = arena.append_scope(root, "Children").unwrap();
    let b = arena.append_scope(root, "Children").unwrap();

    assert_eq!(arena.find(root, "Children").unwrap().unwrap().len(), 2);
    assert_eq!(arena.parent(a).unwrap(), Some(root));
    assert_eq!(arena.parent(b).unwrap(), Some(root));

    arena.destroy(root).unwrap();
    assert!(!arena.contains(a));
    assert!(!arena.contains(b));
    assert!(matches!(arena.scope(a), Err(ScopeError::StaleHandle { .. })));
}

#[test]
fn adopt_moves_child_between_tables() {
    let mut arena = ScopeArena::new();
    let old_parent = arena.create_scope();
    let new_parent = arena.create_scope();
    let child = arena.append_scope(old_parent, "items").unwrap();
    arena.append_scope(old_parent, "items").unwrap();
    arena.append_scope(new_parent, "items").unwrap();

    arena.adopt(new_parent, child, "items").unwrap();
    assert_eq!(arena.find(old_parent, "items").unwrap().unwrap().len(), 1);
    assert_eq!(arena.find(new_parent, "items").unwrap().unwrap().len(), 2);
    assert_eq!(arena.parent(child).unwrap(), Some(new_parent));

    arena.destroy(old_parent).unwrap();
    assert!(arena.contains(child));
}

#[test]
fn clone_of_nested_tree_is_equal_and_independent() {
    let mut arena = ScopeArena::new();
    let root = TreeBuilder::new().depth(2).breadth(2).build(&mut arena).unwrap();
    let copy = arena.clone_scope(root).unwrap();
    assert!(arena.scopes_equal(root, copy).unwrap());

    let child_of = |arena: &ScopeArena, id| {
        arena.find(id, TreeBuilder::CHILD_KEY).unwrap().unwrap().children()[0]
    };
    let original_leaf = child_of(&arena, child_of(&arena, root));
    let copied_leaf = child_of(&arena, child_of(&arena, copy));

    arena.append(original_leaf, "a0").unwrap().set(50, 0).unwrap();
    assert_eq!(*arena.find(copied_leaf, "a0").unwrap().unwrap(), 0);
    assert!(!arena.scopes_equal(root, copy).unwrap());

    arena.append(copied_leaf, "a0").unwrap().set(50, 0).unwrap();
    assert!(arena.scopes_equal(root, copy).unwrap());
}

#[test]
fn arena_config_reaches_new_scopes() {
    let config = ScopeConfig::new().with_initial_capacity(32);
    let mut arena = ScopeArena::with_config(config);
    let root = arena.create_scope();
    let child = arena.append_scope(root, "kids").unwrap();
    assert!(arena.scope(child).unwrap().capacity() >= 32);
}

// ── Properties ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn attributes_keep_first_insertion_order(keys in prop::collection::vec("[a-e]{1,2}", 1..40)) {
        let mut scope = Scope::new();
        let mut expected: Vec<String> = Vec::new();
        for key in &keys {
            scope.append(key).unwrap();
            if !expected.contains(key) {
                expected.push(key.clone());
            }
        }
        let expected_keys: Vec<&str> = expected.iter().map(String::as_str).collect();
        prop_assert_eq!(scope.keys().collect::<Vec<_>>(), expected_keys);
        for (ordinal, key) in expected.iter().enumerate() {
            prop_assert_eq!(scope.position(key), Some(ordinal));
        }
    }

    #[test]
    fn destroying_a_tree_empties_the_arena(depth in 0usize..4, breadth in 1usize..4) {
        let mut arena = ScopeArena::new();
        let builder = TreeBuilder::new().depth(depth).breadth(breadth).attributes(1);
        let root = builder.build(&mut arena).unwrap();
        prop_assert_eq!(arena.len(), builder.node_count());
        arena.destroy(root).unwrap();
        prop_assert!(arena.is_empty());
    }
}
