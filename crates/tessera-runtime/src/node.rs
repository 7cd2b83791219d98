//! The [`Node`] trait: anything a scope arena can own.

use std::any::Any;
use std::fmt;

use tessera_core::{ScopeError, ScopeId};

use crate::scope::Scope;

/// A polymorphic tree node built around a [`Scope`].
///
/// Plain scopes and reflected types (through [`Reflect`](crate::Reflect))
/// are nodes. The arena calls the hooks below at the points where a node
/// may need to refresh state that depends on its own identity.
pub trait Node: Any + fmt::Debug {
    /// The node's attribute table.
    fn scope(&self) -> &Scope;

    /// Mutable access to the node's attribute table.
    fn scope_mut(&mut self) -> &mut Scope;

    /// Copy of this node with detached tables.
    ///
    /// Scalar attributes are copied, table datums come back empty and the
    /// copy has no parent. [`ScopeArena::clone_scope`](crate::ScopeArena::clone_scope)
    /// re-populates the tables with deep copies of the children.
    fn clone_node(&self) -> Result<Box<dyn Node>, ScopeError>;

    /// Called after the arena places the node under handle `id`.
    fn attached(&mut self, id: ScopeId) {
        let _ = id;
    }

    /// Called after the arena clears the node's attribute table.
    fn cleared(&mut self, id: ScopeId) -> Result<(), ScopeError> {
        let _ = id;
        Ok(())
    }
}

impl dyn Node {
    /// Whether the concrete node type is `T`.
    pub fn is<T: Node>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Downcast to a concrete node type.
    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Mutable downcast to a concrete node type.
    pub fn downcast_mut<T: Node>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}

impl Node for Scope {
    fn scope(&self) -> &Scope {
        self
    }

    fn scope_mut(&mut self) -> &mut Scope {
        self
    }

    fn clone_node(&self) -> Result<Box<dyn Node>, ScopeError> {
        Ok(Box::new(self.clone()))
    }
}
