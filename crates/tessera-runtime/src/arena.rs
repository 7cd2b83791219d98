//! The [`ScopeArena`]: owner of every node in a scope forest.
//!
//! Nodes live in generational slots. A [`ScopeId`] names a slot plus the
//! generation of its occupant, so a handle to a destroyed node is reported
//! as stale instead of resolving to a later occupant of the same slot.
//!
//! Ownership follows the table datums: a node with a parent is owned by
//! that parent, and a root is owned by whoever holds its handle. Each slot
//! also records the children its node owns, so freeing a node frees its
//! whole subtree even if its scope was replaced through `scope_mut`.

use smallvec::SmallVec;
use tessera_core::{DatumType, ScopeError, ScopeId};
use tracing::{debug, trace};

use crate::config::ScopeConfig;
use crate::datum::Datum;
use crate::node::Node;
use crate::scope::Scope;

/// Traversal stack. Most subtrees fit without spilling.
type Stack = SmallVec<[ScopeId; 16]>;

struct Slot {
    generation: u32,
    node: Option<Box<dyn Node>>,
    /// Children linked into the node's tables by the arena.
    owned: Vec<ScopeId>,
}

/// Generational arena that owns a forest of scope nodes.
pub struct ScopeArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
    config: ScopeConfig,
}

impl ScopeArena {
    /// Empty arena with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ScopeConfig::default())
    }

    /// Empty arena whose scopes are created with `config`.
    pub fn with_config(config: ScopeConfig) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            config,
        }
    }

    /// Configuration used for scopes the arena creates.
    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Whether `id` names a live node.
    pub fn contains(&self, id: ScopeId) -> bool {
        self.slot(id).is_some()
    }

    /// Handles of every live node, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node
                .as_ref()
                .map(|_| ScopeId::new(index as u32, slot.generation))
        })
    }

    /// Handles of every live node without a parent.
    pub fn roots(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.ids().filter(|id| {
            self.slot(*id)
                .is_some_and(|node| node.scope().parent().is_none())
        })
    }

    // ── Insertion ───────────────────────────────────────────────

    /// Take ownership of `node` as a new root.
    pub fn insert<N: Node>(&mut self, node: N) -> ScopeId {
        self.insert_boxed(Box::new(node))
    }

    /// Take ownership of a boxed node as a new root.
    pub fn insert_boxed(&mut self, node: Box<dyn Node>) -> ScopeId {
        self.alloc(node)
    }

    /// Create an empty root scope.
    pub fn create_scope(&mut self) -> ScopeId {
        let scope = Scope::with_config(&self.config);
        self.alloc(Box::new(scope))
    }

    // ── Access ──────────────────────────────────────────────────

    /// The node behind `id`.
    pub fn node(&self, id: ScopeId) -> Result<&(dyn Node + 'static), ScopeError> {
        self.slot(id).ok_or(ScopeError::StaleHandle { id })
    }

    /// Mutable access to the node behind `id`.
    pub fn node_mut(&mut self, id: ScopeId) -> Result<&mut (dyn Node + 'static), ScopeError> {
        self.slot_mut(id).ok_or(ScopeError::StaleHandle { id })
    }

    /// The node behind `id` as concrete type `T`.
    pub fn get<T: Node>(&self, id: ScopeId) -> Option<&T> {
        self.slot(id)?.downcast_ref::<T>()
    }

    /// Mutable access to the node behind `id` as concrete type `T`.
    pub fn get_mut<T: Node>(&mut self, id: ScopeId) -> Option<&mut T> {
        self.slot_mut(id)?.downcast_mut::<T>()
    }

    /// The attribute table of `id`.
    pub fn scope(&self, id: ScopeId) -> Result<&Scope, ScopeError> {
        Ok(self.node(id)?.scope())
    }

    /// Mutable access to the attribute table of `id`.
    pub fn scope_mut(&mut self, id: ScopeId) -> Result<&mut Scope, ScopeError> {
        Ok(self.node_mut(id)?.scope_mut())
    }

    /// Owner of `id`, `None` for a root.
    pub fn parent(&self, id: ScopeId) -> Result<Option<ScopeId>, ScopeError> {
        Ok(self.scope(id)?.parent())
    }

    // ── Attributes ──────────────────────────────────────────────

    /// The datum named `key` in `id`, appending an empty one if absent.
    ///
    /// Fails with [`ScopeError::OwnsChildren`] if `key` is a table that
    /// holds children.
    pub fn append(&mut self, id: ScopeId, key: &str) -> Result<&mut Datum, ScopeError> {
        self.scope_mut(id)?.append(key)
    }

    /// The datum named `key` in `id` itself.
    pub fn find(&self, id: ScopeId, key: &str) -> Result<Option<&Datum>, ScopeError> {
        Ok(self.scope(id)?.find(key))
    }

    /// The datum named `key` in `id` or its nearest ancestor that has one,
    /// together with the handle of the scope it was found in.
    pub fn search(&self, id: ScopeId, key: &str) -> Result<Option<(ScopeId, &Datum)>, ScopeError> {
        let mut current = id;
        loop {
            let scope = self.scope(current)?;
            if let Some(datum) = scope.find(key) {
                return Ok(Some((current, datum)));
            }
            match scope.parent() {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
    }

    // ── Ownership ───────────────────────────────────────────────

    /// Create an empty child scope of `parent` under `key`.
    ///
    /// The datum at `key` becomes a table if it was untyped.
    pub fn append_scope(&mut self, parent: ScopeId, key: &str) -> Result<ScopeId, ScopeError> {
        check_table_key(self.scope(parent)?, key)?;
        let child = Scope::with_config(&self.config);
        let id = self.alloc(Box::new(child));
        self.scope_mut(id)?.set_parent(Some(parent));
        self.link(parent, key, id)?;
        trace!(%parent, child = %id, key, "child scope appended");
        Ok(id)
    }

    /// Move `child` under `parent` at `key`.
    ///
    /// `child` leaves its former parent's table (if any) and is appended
    /// to the table at `key`, which is created if absent.
    pub fn adopt(&mut self, parent: ScopeId, child: ScopeId, key: &str) -> Result<(), ScopeError> {
        if parent == child {
            return Err(ScopeError::SelfAdoption { id: child });
        }
        self.node(child)?;
        check_table_key(self.scope(parent)?, key)?;

        let previous = self.detach(child)?;
        self.scope_mut(child)?.set_parent(Some(parent));
        self.link(parent, key, child)?;
        debug!(%parent, %child, key, previous = ?previous, "scope adopted");
        Ok(())
    }

    /// Remove `id` from its parent's table, making it a root.
    ///
    /// The caller becomes responsible for the node; it stays in the arena
    /// until [`destroy`](Self::destroy)ed. A root is left untouched.
    pub fn orphan(&mut self, id: ScopeId) -> Result<(), ScopeError> {
        if let Some(parent) = self.detach(id)? {
            debug!(%id, %parent, "scope orphaned");
        }
        Ok(())
    }

    /// Where `id` sits in its parent: `(attribute ordinal, element index)`.
    pub fn find_contained_scope(&self, id: ScopeId) -> Result<(usize, usize), ScopeError> {
        let parent = self.parent(id)?.ok_or(ScopeError::NoParent { id })?;
        self.scope(parent)?
            .locate_child(id)
            .ok_or(ScopeError::Detached { id, parent })
    }

    /// Deep copy of the subtree rooted at `id`, as a new root.
    ///
    /// Children are cloned recursively, scalar attributes are copied and
    /// pointer attributes keep their targets. A table entry holding the
    /// node being copied is skipped.
    pub fn clone_scope(&mut self, id: ScopeId) -> Result<ScopeId, ScopeError> {
        let copy = self.clone_subtree(id)?;
        debug!(source = %id, %copy, "subtree cloned");
        Ok(copy)
    }

    /// Destroy every descendant of `id` and empty its attribute table.
    ///
    /// `id` keeps its own parent.
    pub fn clear(&mut self, id: ScopeId) -> Result<(), ScopeError> {
        self.scope_mut(id)?.drain();
        let owned = self.owned_mut(id).map(std::mem::take).unwrap_or_default();
        let mut freed = 0;
        for child in owned {
            if child != id {
                freed += self.free_subtree(child);
            }
        }
        self.node_mut(id)?.cleared(id)?;
        debug!(%id, nodes = freed, "scope cleared");
        Ok(())
    }

    /// Detach `id` from its parent and free it with all its descendants.
    pub fn destroy(&mut self, id: ScopeId) -> Result<(), ScopeError> {
        self.detach(id)?;
        let freed = self.free_subtree(id);
        debug!(%id, nodes = freed, "subtree destroyed");
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────

    fn slot(&self, id: ScopeId) -> Option<&(dyn Node + 'static)> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_deref()
    }

    fn slot_mut(&mut self, id: ScopeId) -> Option<&mut (dyn Node + 'static)> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        match &mut slot.node {
            Some(node) => Some(node.as_mut()),
            None => None,
        }
    }

    fn alloc(&mut self, mut node: Box<dyn Node>) -> ScopeId {
        node.scope_mut().set_parent(None);
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: None,
                    owned: Vec::new(),
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.owned.clear();
        let id = ScopeId::new(index, slot.generation);
        node.attached(id);
        slot.node = Some(node);
        self.live += 1;
        trace!(%id, "node allocated");
        id
    }

    fn owned_mut(&mut self, id: ScopeId) -> Option<&mut Vec<ScopeId>> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() || slot.node.is_none() {
            return None;
        }
        Some(&mut slot.owned)
    }

    /// Empties the slot of `id` and retires its generation. Returns the
    /// children the node owned.
    fn take(&mut self, id: ScopeId) -> Option<Vec<ScopeId>> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        let owned = std::mem::take(&mut slot.owned);
        self.free_list.push(id.index());
        self.live -= 1;
        Some(owned)
    }

    /// Frees `root` and everything it owns. Returns the node count.
    fn free_subtree(&mut self, root: ScopeId) -> usize {
        let mut stack: Stack = SmallVec::new();
        stack.push(root);
        let mut freed = 0;
        while let Some(id) = stack.pop() {
            if let Some(owned) = self.take(id) {
                stack.extend(owned);
                freed += 1;
            }
        }
        freed
    }

    /// Appends `child` to the table at `key` of `parent` and records it as owned.
    fn link(&mut self, parent: ScopeId, key: &str, child: ScopeId) -> Result<(), ScopeError> {
        self.scope_mut(parent)?.entry(key).push_child(child)?;
        self.own(parent, child);
        Ok(())
    }

    /// Like [`link`](Self::link), addressing the table by ordinal.
    pub(crate) fn link_at(&mut self, parent: ScopeId, ordinal: usize, child: ScopeId) -> Result<(), ScopeError> {
        self.scope_mut(parent)?.link_child_at(ordinal, child)?;
        self.own(parent, child);
        Ok(())
    }

    fn own(&mut self, parent: ScopeId, child: ScopeId) {
        if let Some(owned) = self.owned_mut(parent) {
            owned.push(child);
        }
    }

    /// Unlinks `id` from its parent. Returns the former parent.
    fn detach(&mut self, id: ScopeId) -> Result<Option<ScopeId>, ScopeError> {
        let Some(parent) = self.parent(id)? else {
            return Ok(None);
        };
        if let Some(node) = self.slot_mut(parent) {
            node.scope_mut().unlink_child(id);
        }
        if let Some(owned) = self.owned_mut(parent) {
            owned.retain(|c| *c != id);
        }
        self.scope_mut(id)?.set_parent(None);
        Ok(Some(parent))
    }

    fn clone_subtree(&mut self, source: ScopeId) -> Result<ScopeId, ScopeError> {
        let node = self.node(source)?;
        let copy = node.clone_node()?;
        let tables: SmallVec<[(usize, Stack); 4]> = node
            .scope()
            .iter()
            .enumerate()
            .filter(|(_, (_, datum))| !datum.children().is_empty())
            .map(|(ordinal, (_, datum))| (ordinal, datum.children().iter().copied().collect()))
            .collect();

        let copy_id = self.alloc(copy);
        for (ordinal, children) in tables {
            for child in children {
                if child == source {
                    continue;
                }
                if let Err(err) = self.clone_child(copy_id, ordinal, child) {
                    self.free_subtree(copy_id);
                    return Err(err);
                }
            }
        }
        Ok(copy_id)
    }

    fn clone_child(&mut self, parent: ScopeId, ordinal: usize, child: ScopeId) -> Result<(), ScopeError> {
        let child_copy = self.clone_subtree(child)?;
        self.scope_mut(child_copy)?.set_parent(Some(parent));
        if let Err(err) = self.link_at(parent, ordinal, child_copy) {
            self.free_subtree(child_copy);
            return Err(err);
        }
        Ok(())
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScopeArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeArena")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .field("config", &self.config)
            .finish()
    }
}

/// `key` must be absent, untyped or already a table.
fn check_table_key(scope: &Scope, key: &str) -> Result<(), ScopeError> {
    match scope.find(key).map(Datum::datum_type) {
        None | Some(DatumType::Unknown) | Some(DatumType::Table) => Ok(()),
        Some(found) => Err(ScopeError::IncompatibleKey {
            key: key.to_owned(),
            found,
        }),
    }
}
