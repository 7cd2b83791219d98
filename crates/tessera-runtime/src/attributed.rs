//! [`Attributed`]: a scope laid out by a registered signature list.
//!
//! The attribute list always starts with `"this"`, a pointer to the node's
//! own handle, followed by one datum per signature in declaration order.
//! These are the prescribed attributes. Anything appended afterwards is
//! auxiliary.
//!
//! ```text
//! ordinal  0       1 ..= |S|          |S|+1 ..
//!          "this"  prescribed[S]      auxiliary
//! ```
//!
//! Scalar prescribed attributes start out typed and empty. The host
//! object binds them to its native fields through
//! [`Reflect::bind`](crate::Reflect::bind).

use std::any::Any;
use std::rc::Rc;

use tessera_core::{NodeRef, ReflectError, ScopeError, ScopeId, TypeKey};
use tracing::trace;

use crate::config::ScopeConfig;
use crate::datum::{Datum, ExternalStorage};
use crate::registry::TypeManager;
use crate::scope::Scope;
use crate::signature::Signature;

/// Name of the self-pointer attribute at ordinal 0.
pub const SELF_KEY: &str = "this";

/// Resolved field handles, by attribute ordinal.
pub(crate) type Bindings = Vec<(usize, ExternalStorage)>;

/// A [`Scope`] whose leading attributes follow a registered type layout.
#[derive(Debug)]
pub struct Attributed {
    scope: Scope,
    type_key: TypeKey,
    signatures: Rc<[Signature]>,
}

impl Attributed {
    /// Attribute list for `type_key`, populated from its registered signatures.
    ///
    /// # Errors
    ///
    /// [`ReflectError::UnregisteredType`] if `types` has no entry for `type_key`.
    pub fn new(types: &TypeManager, type_key: TypeKey) -> Result<Self, ReflectError> {
        Self::with_config(types, type_key, &ScopeConfig::default())
    }

    /// Like [`new`](Self::new), with the scope built from `config`.
    pub fn with_config(
        types: &TypeManager,
        type_key: TypeKey,
        config: &ScopeConfig,
    ) -> Result<Self, ReflectError> {
        let mut attributed = Self {
            scope: Scope::with_config(config),
            type_key,
            signatures: types.signatures(type_key)?,
        };
        attributed.populate()?;
        Ok(attributed)
    }

    // ── Layout ──────────────────────────────────────────────────

    /// Key the signatures were fetched under.
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// The signatures this instance was populated from.
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Number of prescribed attributes, `"this"` included.
    pub fn prescribed_len(&self) -> usize {
        self.signatures.len() + 1
    }

    /// The underlying attribute table.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Mutable access to the underlying attribute table.
    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    /// Handle stored in `"this"`; null until the node is placed in an arena.
    pub fn self_ref(&self) -> NodeRef {
        self.scope
            .find(SELF_KEY)
            .and_then(|d| d.get::<NodeRef>(0).ok())
            .unwrap_or(NodeRef::NULL)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Whether an attribute named `name` exists.
    pub fn is_attribute(&self, name: &str) -> bool {
        self.scope.contains(name)
    }

    /// Whether `name` is `"this"` or one of the type's signature names.
    pub fn is_prescribed_attribute(&self, name: &str) -> bool {
        name == SELF_KEY || self.signatures.iter().any(|sig| sig.name() == name)
    }

    /// Whether `name` exists and is not prescribed.
    pub fn is_auxiliary_attribute(&self, name: &str) -> bool {
        self.is_attribute(name) && !self.is_prescribed_attribute(name)
    }

    /// Every attribute in order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Datum)> + '_ {
        self.scope.iter()
    }

    /// `"this"` followed by one attribute per signature.
    pub fn prescribed_attributes(&self) -> impl Iterator<Item = (&str, &Datum)> + '_ {
        self.scope.iter().take(self.prescribed_len())
    }

    /// Attributes positioned after the prescribed ones.
    pub fn auxiliary_attributes(&self) -> impl Iterator<Item = (&str, &Datum)> + '_ {
        self.scope.iter().skip(self.prescribed_len())
    }

    /// Call `f` once per auxiliary attribute, in order.
    pub fn for_each_auxiliary_attribute<F>(&self, mut f: F)
    where
        F: FnMut(&str, &Datum),
    {
        for (name, datum) in self.auxiliary_attributes() {
            f(name, datum);
        }
    }

    // ── Auxiliary attributes ────────────────────────────────────

    /// Append an auxiliary attribute, or return the existing one.
    ///
    /// # Errors
    ///
    /// [`ReflectError::PrescribedCollision`] if `name` is prescribed, and
    /// [`ScopeError::OwnsChildren`] if it is a table holding children.
    pub fn append_auxiliary_attribute(&mut self, name: &str) -> Result<&mut Datum, ScopeError> {
        self.check_auxiliary(name)?;
        self.scope.append(name)
    }

    /// Append an auxiliary attribute seeded with `datum`.
    pub fn append_auxiliary_datum(&mut self, name: &str, datum: Datum) -> Result<&mut Datum, ScopeError> {
        self.check_auxiliary(name)?;
        self.scope.append_datum(name, datum)
    }

    // ── Binding ─────────────────────────────────────────────────

    /// Point `"this"` at `id`.
    pub fn set_self_ref(&mut self, id: ScopeId) {
        write_self_ref(&mut self.scope, NodeRef::new(id));
    }

    /// Field handles for every scalar prescribed attribute on `host`.
    ///
    /// Nothing is modified; a failure leaves the attribute list untouched.
    pub(crate) fn resolve_bindings(&self, host: &dyn Any) -> Result<Bindings, ReflectError> {
        self.signatures
            .iter()
            .filter(|sig| !sig.is_table())
            .map(|sig| {
                let ordinal = self.scope.position(sig.name()).ok_or_else(|| {
                    ReflectError::MissingAttribute {
                        type_key: self.type_key,
                        name: sig.name().to_owned(),
                    }
                })?;
                let storage = sig.resolve(host).ok_or_else(|| ReflectError::HostMismatch {
                    type_key: self.type_key,
                    name: sig.name().to_owned(),
                })?;
                if storage.datum_type() != sig.datum_type() || storage.len() != sig.array_length() {
                    return Err(ReflectError::BindingMismatch {
                        name: sig.name().to_owned(),
                        expected_type: sig.datum_type(),
                        expected_len: sig.array_length(),
                        found_type: storage.datum_type(),
                        found_len: storage.len(),
                    });
                }
                Ok((ordinal, storage))
            })
            .collect()
    }

    pub(crate) fn apply_bindings(&mut self, bindings: Bindings) -> Result<(), ReflectError> {
        for (ordinal, storage) in bindings {
            let datum = &mut self.scope[ordinal];
            datum.set_storage(storage)?;
            trace!(type_key = %self.type_key, ordinal, len = datum.len(), "attribute bound");
        }
        Ok(())
    }

    /// Re-append the prescribed attributes after the list was emptied.
    pub(crate) fn repopulate(&mut self) -> Result<(), ReflectError> {
        self.populate()
    }

    // ── Internals ───────────────────────────────────────────────

    fn populate(&mut self) -> Result<(), ReflectError> {
        write_self_ref(&mut self.scope, NodeRef::NULL);
        for sig in self.signatures.iter() {
            let datum = self.scope.entry(sig.name());
            datum.set_type(sig.datum_type())?;
            if sig.is_table() {
                datum.reserve(sig.array_length())?;
            }
        }
        Ok(())
    }

    fn check_auxiliary(&self, name: &str) -> Result<(), ReflectError> {
        if self.is_prescribed_attribute(name) {
            return Err(ReflectError::PrescribedCollision {
                name: name.to_owned(),
            });
        }
        Ok(())
    }
}

/// Copies every attribute with `"this"` reset to null.
///
/// Prescribed scalars come back typed and empty rather than aliasing the
/// source's fields; the copy's host binds them to its own (see
/// [`rebind_clone`](crate::rebind_clone)). Table attributes come back
/// empty.
impl Clone for Attributed {
    fn clone(&self) -> Self {
        let mut scope = self.scope.clone();
        write_self_ref(&mut scope, NodeRef::NULL);
        for sig in self.signatures.iter().filter(|sig| !sig.is_table()) {
            if let Ok(Some(datum)) = scope.find_mut(sig.name()) {
                *datum = Datum::with_type(sig.datum_type()).with_growth(datum.growth_policy());
            }
        }
        Self {
            scope,
            type_key: self.type_key,
            signatures: Rc::clone(&self.signatures),
        }
    }
}

/// Same type key and attribute list. `"this"` always matches, since each
/// side points at itself.
impl PartialEq for Attributed {
    fn eq(&self, other: &Self) -> bool {
        self.type_key == other.type_key
            && self.scope.len() == other.scope.len()
            && self
                .scope
                .iter()
                .zip(other.scope.iter())
                .all(|((ka, da), (kb, db))| ka == kb && (ka == SELF_KEY || da == db))
    }
}

fn write_self_ref(scope: &mut Scope, target: NodeRef) {
    *scope.entry(SELF_KEY) = Datum::from(target);
}
