//! The [`Reflect`] trait: native types exposed as scope nodes.
//!
//! A reflected type owns an [`Attributed`] plus the [`NativeField`]s its
//! signatures name. Implementing [`Reflect`] makes the type a [`Node`], so
//! it can live in a [`ScopeArena`] next to plain scopes.
//!
//! Every copy must re-bind its prescribed attributes to its own fields.
//! The arena does this when cloning subtrees; a hand-written [`Clone`]
//! does it with [`rebind_clone`].
//!
//! [`NativeField`]: crate::NativeField
//! [`ScopeArena`]: crate::ScopeArena

use std::any::Any;
use std::fmt;

use tessera_core::{ReflectError, ScopeError, ScopeId};
use tracing::warn;

use crate::attributed::Attributed;
use crate::node::Node;
use crate::scope::Scope;

/// A native type whose fields are exposed as prescribed attributes.
///
/// Write [`Clone`] by hand with [`rebind_clone`]. A derived `Clone`
/// compiles, but its copies keep their prescribed scalars empty until
/// [`bind`](Self::bind) runs; only arena clones bind them automatically.
///
/// ```
/// # use tessera_runtime::{rebind_clone, Attributed, NativeField, Reflect, Signature, TypeKey, TypeManager};
/// #[derive(Debug)]
/// struct Torch {
///     attributed: Attributed,
///     lit: NativeField<i32>,
/// }
///
/// impl Clone for Torch {
///     fn clone(&self) -> Self {
///         rebind_clone(Torch {
///             attributed: self.attributed.clone(),
///             lit: self.lit.clone(),
///         })
///     }
/// }
///
/// impl Reflect for Torch {
///     fn attributed(&self) -> &Attributed {
///         &self.attributed
///     }
///     fn attributed_mut(&mut self) -> &mut Attributed {
///         &mut self.attributed
///     }
/// }
///
/// let mut types = TypeManager::new();
/// types
///     .register_type(TypeKey(1), vec![Signature::external("lit", 1, |t: &Torch| &t.lit)])
///     .unwrap();
///
/// let torch = Torch {
///     attributed: Attributed::new(&types, TypeKey(1)).unwrap(),
///     lit: NativeField::single(1),
/// }
/// .bound()
/// .unwrap();
/// torch.lit.set_value(0);
/// assert_eq!(torch.attributed().scope()["lit"], 0);
/// ```
pub trait Reflect: Any + Clone + fmt::Debug {
    /// The attribute list.
    fn attributed(&self) -> &Attributed;

    /// Mutable access to the attribute list.
    fn attributed_mut(&mut self) -> &mut Attributed;

    /// Point every scalar prescribed attribute at this object's own field.
    ///
    /// # Errors
    ///
    /// Fails without modifying anything if a prescribed attribute is
    /// missing, an accessor does not recognise `self`, or a field's type
    /// or length disagrees with its signature.
    fn bind(&mut self) -> Result<(), ReflectError> {
        let bindings = self.attributed().resolve_bindings(self as &dyn Any)?;
        self.attributed_mut().apply_bindings(bindings)
    }

    /// `self` after [`bind`](Self::bind).
    fn bound(mut self) -> Result<Self, ReflectError> {
        self.bind()?;
        Ok(self)
    }
}

/// Bind a freshly copied reflected value, for use inside [`Clone`] impls.
///
/// # Panics
///
/// Panics if the copy cannot be bound. The copy carries the source's
/// attribute list, so a failure means that list was corrupted.
pub fn rebind_clone<T: Reflect>(copy: T) -> T {
    match copy.bound() {
        Ok(copy) => copy,
        Err(err) => panic!("reflected copy could not be re-bound: {err}"),
    }
}

impl Reflect for Attributed {
    fn attributed(&self) -> &Attributed {
        self
    }

    fn attributed_mut(&mut self) -> &mut Attributed {
        self
    }
}

impl<T: Reflect> Node for T {
    fn scope(&self) -> &Scope {
        self.attributed().scope()
    }

    fn scope_mut(&mut self) -> &mut Scope {
        self.attributed_mut().scope_mut()
    }

    fn clone_node(&self) -> Result<Box<dyn Node>, ScopeError> {
        let copy = self.clone().bound()?;
        Ok(Box::new(copy))
    }

    fn attached(&mut self, id: ScopeId) {
        self.attributed_mut().set_self_ref(id);
    }

    fn cleared(&mut self, id: ScopeId) -> Result<(), ScopeError> {
        let attributed = self.attributed_mut();
        attributed.repopulate()?;
        attributed.set_self_ref(id);
        if let Err(err) = self.bind() {
            warn!(%id, %err, "cleared node could not re-bind its fields");
            return Err(err.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{DatumType, NodeRef, TypeKey};

    use crate::arena::ScopeArena;
    use crate::datum::NativeField;
    use crate::registry::TypeManager;
    use crate::signature::Signature;

    const GOBLIN: TypeKey = TypeKey(3);

    #[derive(Debug)]
    struct Goblin {
        attributed: Attributed,
        hp: NativeField<i32>,
        name: NativeField<String>,
    }

    impl Goblin {
        fn new(types: &TypeManager) -> Result<Self, ReflectError> {
            Goblin {
                attributed: Attributed::new(types, GOBLIN)?,
                hp: NativeField::single(10),
                name: NativeField::single(String::new()),
            }
            .bound()
        }
    }

    impl Clone for Goblin {
        fn clone(&self) -> Self {
            rebind_clone(Goblin {
                attributed: self.attributed.clone(),
                hp: self.hp.clone(),
                name: self.name.clone(),
            })
        }
    }

    impl Reflect for Goblin {
        fn attributed(&self) -> &Attributed {
            &self.attributed
        }

        fn attributed_mut(&mut self) -> &mut Attributed {
            &mut self.attributed
        }
    }

    fn types() -> TypeManager {
        let mut types = TypeManager::new();
        types
            .register_type(
                GOBLIN,
                vec![
                    Signature::external("hp", 1, |g: &Goblin| &g.hp),
                    Signature::external("name", 1, |g: &Goblin| &g.name),
                    Signature::table("minions", 0),
                ],
            )
            .unwrap();
        types
    }

    #[test]
    fn fields_and_attributes_alias() {
        let goblin = Goblin::new(&types()).unwrap();
        assert_eq!(goblin.scope()["hp"], 10);
        goblin.hp.set_value(4);
        assert_eq!(goblin.scope()["hp"], 4);
    }

    #[test]
    fn writes_through_attributes_reach_fields() {
        let mut goblin = Goblin::new(&types()).unwrap();
        goblin.scope_mut()["name"].set(String::from("snik"), 0).unwrap();
        assert_eq!(goblin.name.value(), "snik");
    }

    #[test]
    fn clone_binds_to_its_own_fields() {
        let original = Goblin::new(&types()).unwrap();
        let copy = original.clone();
        assert_eq!(copy.scope()["hp"], 10);
        original.hp.set_value(1);
        assert_eq!(copy.scope()["hp"], 10);
        copy.hp.set_value(2);
        assert_eq!(copy.scope()["hp"], 2);
        assert_eq!(original.scope()["hp"], 1);
    }

    #[test]
    fn moves_keep_aliases() {
        let goblin = Goblin::new(&types()).unwrap();
        let moved = Box::new(goblin);
        moved.hp.set_value(8);
        assert_eq!(moved.scope()["hp"], 8);
    }

    #[test]
    fn arena_sets_self_ref() {
        let mut arena = ScopeArena::new();
        let id = arena.insert(Goblin::new(&types()).unwrap());
        let goblin = arena.get::<Goblin>(id).unwrap();
        assert_eq!(goblin.attributed().self_ref(), NodeRef::new(id));
        assert_eq!(goblin.scope()["this"], NodeRef::new(id));
    }

    #[test]
    fn clone_node_rebinds() {
        let goblin = Goblin::new(&types()).unwrap();
        let copy = goblin.clone_node().unwrap();
        let copy = copy.downcast_ref::<Goblin>().unwrap();
        goblin.hp.set_value(0);
        assert_eq!(copy.scope()["hp"], 10);
        copy.hp.set_value(6);
        assert_eq!(copy.scope()["hp"], 6);
    }

    #[test]
    fn arena_clone_is_equal_and_independent() {
        let types = types();
        let mut arena = ScopeArena::new();
        let id = arena.insert(Goblin::new(&types).unwrap());
        arena.append_scope(id, "minions").unwrap();

        let copy = arena.clone_scope(id).unwrap();
        assert!(arena.scopes_equal(id, copy).unwrap());
        assert_eq!(arena.get::<Goblin>(copy).unwrap().attributed().self_ref(), NodeRef::new(copy));

        arena.get::<Goblin>(copy).unwrap().hp.set_value(99);
        assert_eq!(*arena.find(id, "hp").unwrap().unwrap(), 10);
        assert!(!arena.scopes_equal(id, copy).unwrap());
    }

    #[test]
    fn clear_repopulates_prescribed_attributes() {
        let types = types();
        let mut arena = ScopeArena::new();
        let id = arena.insert(Goblin::new(&types).unwrap());
        let minion = arena.append_scope(id, "minions").unwrap();
        arena.append(id, "note").unwrap().push_back(1).unwrap();

        arena.clear(id).unwrap();
        assert!(!arena.contains(minion));
        let goblin = arena.get::<Goblin>(id).unwrap();
        let names: Vec<_> = goblin.scope().keys().collect();
        assert_eq!(names, vec!["this", "hp", "name", "minions"]);
        assert_eq!(goblin.attributed().self_ref(), NodeRef::new(id));
        goblin.hp.set_value(3);
        assert_eq!(goblin.scope()["hp"], 3);
    }

    #[test]
    fn plain_attributed_nodes_bind_tables_only() {
        let mut types = TypeManager::new();
        types
            .register_type(TypeKey(4), vec![Signature::table("members", 2)])
            .unwrap();
        let squad = Attributed::new(&types, TypeKey(4)).unwrap().bound().unwrap();
        let mut arena = ScopeArena::new();
        let id = arena.insert(squad);
        arena.append_scope(id, "members").unwrap();
        assert_eq!(arena.scope(id).unwrap()["members"].len(), 1);

        let host_bound = Attributed::new(&self::types(), GOBLIN).unwrap().bound();
        assert!(matches!(host_bound, Err(ReflectError::HostMismatch { .. })));
    }

    /// Derived `Clone`, and a field accessor that can be switched to a
    /// field of the wrong length.
    #[derive(Clone, Debug)]
    struct Lantern {
        attributed: Attributed,
        fuel: NativeField<i32>,
        spare: NativeField<i32>,
        broken: bool,
    }

    impl Reflect for Lantern {
        fn attributed(&self) -> &Attributed {
            &self.attributed
        }

        fn attributed_mut(&mut self) -> &mut Attributed {
            &mut self.attributed
        }
    }

    const LANTERN: TypeKey = TypeKey(5);

    fn lantern() -> Lantern {
        let mut types = TypeManager::new();
        types
            .register_type(
                LANTERN,
                vec![Signature::external("fuel", 1, |l: &Lantern| {
                    if l.broken {
                        &l.spare
                    } else {
                        &l.fuel
                    }
                })],
            )
            .unwrap();
        Lantern {
            attributed: Attributed::new(&types, LANTERN).unwrap(),
            fuel: NativeField::single(7),
            spare: NativeField::new(vec![0, 0]),
            broken: false,
        }
        .bound()
        .unwrap()
    }

    #[test]
    fn derived_clone_never_aliases_the_source() {
        let source = lantern();
        let mut copy = source.clone();
        assert!(copy.scope()["fuel"].is_empty());
        source.fuel.set_value(1);
        assert!(copy.scope()["fuel"].is_empty());

        copy.bind().unwrap();
        assert_eq!(copy.scope()["fuel"], 7);
        copy.fuel.set_value(2);
        assert_eq!(source.scope()["fuel"], 1);
    }

    #[test]
    fn derived_clone_is_bound_by_clone_node() {
        let source = lantern();
        let copy = source.clone_node().unwrap();
        let copy = copy.downcast_ref::<Lantern>().unwrap();
        assert_eq!(copy.scope()["fuel"], 7);
        source.fuel.set_value(3);
        assert_eq!(copy.scope()["fuel"], 7);
    }

    #[test]
    fn failed_rebind_after_clear_is_reported() {
        let mut arena = ScopeArena::new();
        let id = arena.insert(lantern());
        arena.get_mut::<Lantern>(id).unwrap().broken = true;

        assert_eq!(
            arena.clear(id).unwrap_err(),
            ScopeError::Reflect(ReflectError::BindingMismatch {
                name: "fuel".into(),
                expected_type: DatumType::Integer,
                expected_len: 1,
                found_type: DatumType::Integer,
                found_len: 2,
            })
        );
        assert!(arena.contains(id));
        let scope = arena.scope(id).unwrap();
        assert_eq!(scope.keys().collect::<Vec<_>>(), vec!["this", "fuel"]);
        assert!(scope["fuel"].is_empty());
        assert_eq!(scope["this"], NodeRef::new(id));
    }

    #[test]
    #[should_panic(expected = "could not be re-bound")]
    fn rebind_clone_panics_on_corruption() {
        let mut goblin = Goblin::new(&types()).unwrap();
        goblin.attributed.scope_mut().drain();
        let _ = goblin.clone();
    }
}
