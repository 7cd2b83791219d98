//! The [`Scope`] attribute table.
//!
//! A scope is an ordered map from attribute name to [`Datum`]. Lookup by
//! name is O(1) and iteration follows insertion order. Each scope records
//! the handle of its parent, if any.
//!
//! Operations here touch a single scope. Anything that creates, moves or
//! destroys child scopes goes through [`ScopeArena`](crate::ScopeArena),
//! so a table datum that owns children is never handed out mutably.

use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use tessera_core::{DatumError, DatumType, ScopeError, ScopeId};
use tracing::trace;

use crate::config::ScopeConfig;
use crate::datum::{Datum, GrowthPolicy};

/// Ordered, named attribute table.
#[derive(Debug)]
pub struct Scope {
    entries: IndexMap<String, Datum>,
    parent: Option<ScopeId>,
    growth: GrowthPolicy,
}

impl Scope {
    /// Empty root scope with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&ScopeConfig::default())
    }

    /// Empty root scope with room for `capacity` attributes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(&ScopeConfig::new().with_initial_capacity(capacity))
    }

    /// Empty root scope configured by `config`.
    pub fn with_config(config: &ScopeConfig) -> Self {
        Self {
            entries: IndexMap::with_capacity(config.initial_capacity),
            parent: None,
            growth: config.growth,
        }
    }

    // ── Appending ───────────────────────────────────────────────

    /// The datum named `key`, appending an empty one if absent.
    ///
    /// Appending an existing key returns the existing datum untouched.
    ///
    /// # Errors
    ///
    /// [`ScopeError::OwnsChildren`] if `key` is a table holding children.
    pub fn append(&mut self, key: &str) -> Result<&mut Datum, ScopeError> {
        writable(key, self.entry(key))
    }

    /// The datum named `key`, inserting `datum` if absent.
    ///
    /// When `key` already exists the given datum is dropped. A table
    /// datum that holds children is rejected: children are only placed
    /// through the arena.
    pub fn append_datum(&mut self, key: &str, datum: Datum) -> Result<&mut Datum, ScopeError> {
        if datum.datum_type() == DatumType::Table && !datum.is_empty() {
            return Err(ScopeError::ForeignChildren {
                key: key.to_owned(),
            });
        }
        Ok(self.entries.entry(key.to_owned()).or_insert(datum))
    }

    // ── Lookup ──────────────────────────────────────────────────

    /// The datum named `key`.
    pub fn find(&self, key: &str) -> Option<&Datum> {
        self.entries.get(key)
    }

    /// Mutable access to the datum named `key`.
    ///
    /// # Errors
    ///
    /// [`ScopeError::OwnsChildren`] if `key` is a table holding children.
    pub fn find_mut(&mut self, key: &str) -> Result<Option<&mut Datum>, ScopeError> {
        self.entries
            .get_mut(key)
            .map(|datum| writable(key, datum))
            .transpose()
    }

    /// Name and datum at ordinal `index`.
    pub fn get_index(&self, index: usize) -> Option<(&str, &Datum)> {
        self.entries.get_index(index).map(|(k, d)| (k.as_str(), d))
    }

    /// Mutable datum at ordinal `index`.
    ///
    /// # Errors
    ///
    /// [`ScopeError::OwnsChildren`] if the datum is a table holding children.
    pub fn get_index_mut(&mut self, index: usize) -> Result<Option<(&str, &mut Datum)>, ScopeError> {
        match self.entries.get_index_mut(index) {
            Some((key, datum)) => Ok(Some((key.as_str(), writable(key, datum)?))),
            None => Ok(None),
        }
    }

    /// Ordinal position of `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.get_index_of(key)
    }

    /// Whether an attribute named `key` exists.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the scope has no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of attributes the scope can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> + '_ {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }

    /// Attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Handle of the owning scope, `None` for a root.
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Every child handle held by this scope's table datums, in order.
    pub fn children(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.entries
            .values()
            .flat_map(|d| d.children().iter().copied())
    }

    /// Locates `child` among the table datums: `(attribute ordinal, element index)`.
    pub fn locate_child(&self, child: ScopeId) -> Option<(usize, usize)> {
        self.entries.values().enumerate().find_map(|(ordinal, d)| {
            d.children()
                .iter()
                .position(|c| *c == child)
                .map(|index| (ordinal, index))
        })
    }

    // ── Arena internals ─────────────────────────────────────────

    /// [`append`](Self::append) without the ownership check.
    pub(crate) fn entry(&mut self, key: &str) -> &mut Datum {
        if !self.entries.contains_key(key) {
            trace!(key, ordinal = self.entries.len(), "attribute appended");
        }
        let growth = self.growth;
        self.entries
            .entry(key.to_owned())
            .or_insert_with(|| Datum::new().with_growth(growth))
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ScopeId>) {
        self.parent = parent;
    }

    /// Removes `child` from whichever table datum holds it.
    pub(crate) fn unlink_child(&mut self, child: ScopeId) -> bool {
        self.entries
            .values_mut()
            .any(|d| d.remove_child(child).is_some())
    }

    /// Empties the attribute list, returning the children it held.
    pub(crate) fn drain(&mut self) -> Vec<ScopeId> {
        let children = self
            .entries
            .values_mut()
            .flat_map(|d| d.take_children())
            .collect();
        self.entries.clear();
        children
    }

    /// Appends `child` to the table datum at `ordinal`.
    pub(crate) fn link_child_at(&mut self, ordinal: usize, child: ScopeId) -> Result<(), ScopeError> {
        let len = self.entries.len();
        let (_, datum) = self
            .entries
            .get_index_mut(ordinal)
            .ok_or(DatumError::OutOfRange {
                index: ordinal,
                len,
            })?;
        datum.push_child(child)?;
        Ok(())
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

/// A detached copy: attribute values are cloned, table datums come back
/// empty and the copy has no parent. Deep copies of a subtree are made
/// by [`ScopeArena::clone_scope`](crate::ScopeArena::clone_scope).
impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            parent: None,
            growth: self.growth,
        }
    }
}

impl Index<usize> for Scope {
    type Output = Datum;

    fn index(&self, index: usize) -> &Datum {
        &self.entries[index]
    }
}

/// # Panics
///
/// If `index` is out of range or names a table that owns children.
impl IndexMut<usize> for Scope {
    fn index_mut(&mut self, index: usize) -> &mut Datum {
        match self.get_index_mut(index) {
            Ok(Some((_, d))) => d,
            Ok(None) => panic!("no attribute at ordinal {index}"),
            Err(err) => panic!("{err}"),
        }
    }
}

impl Index<&str> for Scope {
    type Output = Datum;

    fn index(&self, key: &str) -> &Datum {
        match self.entries.get(key) {
            Some(d) => d,
            None => panic!("no attribute named {key:?}"),
        }
    }
}

/// # Panics
///
/// If `key` is absent or names a table that owns children.
impl IndexMut<&str> for Scope {
    fn index_mut(&mut self, key: &str) -> &mut Datum {
        match self.find_mut(key) {
            Ok(Some(d)) => d,
            Ok(None) => panic!("no attribute named {key:?}"),
            Err(err) => panic!("{err}"),
        }
    }
}

fn writable<'a>(key: &str, datum: &'a mut Datum) -> Result<&'a mut Datum, ScopeError> {
    match datum.children().len() {
        0 => Ok(datum),
        count => Err(ScopeError::OwnsChildren {
            key: key.to_owned(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_is_idempotent() {
        let mut s = Scope::new();
        s.append("hp").unwrap().push_back(10).unwrap();
        let again = s.append("hp").unwrap();
        assert_eq!(*again, 10);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut s = Scope::new();
        for key in ["c", "a", "b"] {
            s.append(key).unwrap();
        }
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(s.position("a"), Some(1));
        assert_eq!(s.get_index(2).map(|(k, _)| k), Some("b"));
    }

    #[test]
    fn index_by_ordinal_and_name() {
        let mut s = Scope::new();
        s.append("hp").unwrap().push_back(20).unwrap();
        s.append("name").unwrap().push_back(String::from("hero1")).unwrap();
        assert_eq!(s["hp"].get::<i32>(0).unwrap(), 20);
        assert_eq!(s[1], "hero1");
        s["hp"].set(25, 0).unwrap();
        assert_eq!(s[0], 25);
    }

    #[test]
    #[should_panic(expected = "no attribute named")]
    fn index_by_missing_name_panics() {
        let s = Scope::new();
        let _ = &s["missing"];
    }

    #[test]
    fn append_datum_keeps_existing_entry() {
        let mut s = Scope::new();
        s.append_datum("x", Datum::from(1)).unwrap();
        let d = s.append_datum("x", Datum::from(2)).unwrap();
        assert_eq!(*d, 1);
    }

    #[test]
    fn append_datum_rejects_populated_tables() {
        let mut table = Datum::new();
        table.push_child(ScopeId::new(3, 0)).unwrap();
        let mut s = Scope::new();
        assert_eq!(
            s.append_datum("kids", table).unwrap_err(),
            ScopeError::ForeignChildren { key: "kids".into() }
        );
        assert!(s.append_datum("empty", Datum::with_type(DatumType::Table)).is_ok());
    }

    #[test]
    fn appended_datums_inherit_growth_policy() {
        let config = ScopeConfig::new().with_growth(GrowthPolicy::Linear(16));
        let mut s = Scope::with_config(&config);
        let d = s.append("values").unwrap();
        d.push_back(1).unwrap();
        assert_eq!(d.capacity(), 16);
    }

    #[test]
    fn clone_is_detached() {
        let mut s = Scope::new();
        s.set_parent(Some(ScopeId::new(0, 0)));
        s.append("n").unwrap().push_back(1).unwrap();
        s.entry("kids").push_child(ScopeId::new(5, 0)).unwrap();
        let copy = s.clone();
        assert_eq!(copy.parent(), None);
        assert_eq!(copy["n"], 1);
        assert!(copy["kids"].is_empty());
        assert_eq!(copy["kids"].datum_type(), DatumType::Table);
    }

    #[test]
    fn tables_owning_children_are_not_writable() {
        let mut s = Scope::new();
        s.entry("kids").push_child(ScopeId::new(1, 0)).unwrap();
        s.entry("empty").set_type(DatumType::Table).unwrap();
        let owns = ScopeError::OwnsChildren {
            key: "kids".into(),
            count: 1,
        };

        assert_eq!(s.append("kids").unwrap_err(), owns);
        assert_eq!(s.find_mut("kids").unwrap_err(), owns);
        assert_eq!(s.get_index_mut(0).unwrap_err(), owns);
        assert!(s.find_mut("empty").unwrap().is_some());
        assert!(s.find_mut("missing").unwrap().is_none());
        assert_eq!(s["kids"].children(), &[ScopeId::new(1, 0)]);
    }

    #[test]
    #[should_panic(expected = "owns 1 child scope")]
    fn index_mut_on_owning_table_panics() {
        let mut s = Scope::new();
        s.entry("kids").push_child(ScopeId::new(1, 0)).unwrap();
        s["kids"] = Datum::from(7);
    }

    #[test]
    fn child_bookkeeping() {
        let mut s = Scope::new();
        s.entry("a").push_child(ScopeId::new(1, 0)).unwrap();
        s.entry("b").push_child(ScopeId::new(2, 0)).unwrap();
        s.entry("b").push_child(ScopeId::new(3, 0)).unwrap();
        assert_eq!(s.locate_child(ScopeId::new(3, 0)), Some((1, 1)));
        assert_eq!(s.children().count(), 3);
        assert!(s.unlink_child(ScopeId::new(2, 0)));
        assert!(!s.unlink_child(ScopeId::new(2, 0)));
        let drained = s.drain();
        assert_eq!(drained, vec![ScopeId::new(1, 0), ScopeId::new(3, 0)]);
        assert!(s.is_empty());
    }
}
