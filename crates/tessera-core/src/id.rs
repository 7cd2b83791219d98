//! Strongly-typed handles and registry keys.

use std::fmt;

/// Generational handle to a node owned by a scope arena.
///
/// The `index` addresses an arena slot; the `generation` distinguishes
/// successive occupants of that slot. A handle whose generation no longer
/// matches its slot refers to a destroyed node and is reported as stale
/// rather than silently resolving to whatever lives there now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId {
    index: u32,
    generation: u32,
}

impl ScopeId {
    /// Build a handle from its raw parts.
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the arena.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot occupant this handle was issued for.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Non-owning, nullable reference to a node.
///
/// This is the element type of pointer datums. Unlike a table element, a
/// `NodeRef` never owns its target: destroying the datum leaves the target
/// alive, and destroying the target leaves a stale reference behind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeRef(Option<ScopeId>);

impl NodeRef {
    /// The null reference.
    pub const NULL: NodeRef = NodeRef(None);

    /// Reference to `id`.
    pub const fn new(id: ScopeId) -> Self {
        Self(Some(id))
    }

    /// The referenced handle, if any.
    pub const fn get(self) -> Option<ScopeId> {
        self.0
    }

    /// Whether this is the null reference.
    pub const fn is_null(self) -> bool {
        self.0.is_none()
    }
}

impl From<ScopeId> for NodeRef {
    fn from(id: ScopeId) -> Self {
        Self::new(id)
    }
}

impl From<Option<ScopeId>> for NodeRef {
    fn from(id: Option<ScopeId>) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("null"),
        }
    }
}

/// Identifies a reflected type in a type registry.
///
/// Keys are chosen by the registering code; the registry only requires
/// them to be unique among the types it holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(pub u64);

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TypeKey {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_id_accessors_and_display() {
        let id = ScopeId::new(7, 3);
        assert_eq!(id.index(), 7);
        assert_eq!(id.generation(), 3);
        assert_eq!(id.to_string(), "#7v3");
    }

    #[test]
    fn node_ref_null_and_target() {
        assert!(NodeRef::NULL.is_null());
        assert_eq!(NodeRef::default(), NodeRef::NULL);
        let id = ScopeId::new(1, 0);
        let r = NodeRef::from(id);
        assert_eq!(r.get(), Some(id));
        assert_eq!(r.to_string(), "#1v0");
        assert_eq!(NodeRef::NULL.to_string(), "null");
    }

    #[test]
    fn type_key_from_and_display() {
        assert_eq!(TypeKey::from(42), TypeKey(42));
        assert_eq!(TypeKey(42).to_string(), "42");
    }
}
