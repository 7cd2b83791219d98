//! The [`TypeManager`] signature registry.
//!
//! Maps a [`TypeKey`] to the ordered signatures of a reflected type. The
//! registry is an ordinary value: build one at startup, pass it by
//! reference to whatever constructs reflected objects, and call
//! [`clear`](TypeManager::clear) to isolate independent runs.

use std::rc::Rc;

use indexmap::IndexMap;
use tessera_core::{DatumError, ReflectError, TypeKey};
use tracing::debug;

use crate::attributed::SELF_KEY;
use crate::signature::Signature;

/// Registry of reflected type layouts.
#[derive(Clone, Debug, Default)]
pub struct TypeManager {
    types: IndexMap<TypeKey, Rc<[Signature]>>,
}

impl TypeManager {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `signatures` under `key`, replacing any previous list.
    ///
    /// # Errors
    ///
    /// Rejects the list, leaving the registry unchanged, if a signature
    /// uses the reserved name `"this"`, repeats a name, has an untyped
    /// element type, or disagrees with its kind about carrying an
    /// accessor (scalars need one, tables must not have one).
    pub fn register_type(&mut self, key: TypeKey, signatures: Vec<Signature>) -> Result<(), ReflectError> {
        validate(&signatures)?;
        let count = signatures.len();
        let replaced = self.types.insert(key, signatures.into()).is_some();
        debug!(%key, signatures = count, replaced, "type registered");
        Ok(())
    }

    /// Register `key` as the signatures of `base` followed by `extra`.
    ///
    /// Base signatures are resolved on hosts of type `D` through `upcast`,
    /// which returns the embedded base object.
    pub fn register_derived<D, B>(
        &mut self,
        key: TypeKey,
        base: TypeKey,
        upcast: fn(&D) -> &B,
        extra: Vec<Signature>,
    ) -> Result<(), ReflectError>
    where
        D: std::any::Any,
        B: std::any::Any,
    {
        let signatures = self
            .signatures(base)?
            .iter()
            .map(|sig| sig.projected(upcast))
            .chain(extra)
            .collect();
        self.register_type(key, signatures)
    }

    /// Drop the registration for `key`. Returns whether one existed.
    pub fn remove_type(&mut self, key: TypeKey) -> bool {
        let removed = self.types.shift_remove(&key).is_some();
        if removed {
            debug!(%key, "type removed");
        }
        removed
    }

    /// Signatures registered under `key`.
    pub fn signatures(&self, key: TypeKey) -> Result<Rc<[Signature]>, ReflectError> {
        self.types
            .get(&key)
            .cloned()
            .ok_or(ReflectError::UnregisteredType(key))
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: TypeKey) -> bool {
        self.types.contains_key(&key)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.types.keys().copied()
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        let dropped = self.types.len();
        self.types.clear();
        debug!(types = dropped, "type registry cleared");
    }
}

fn validate(signatures: &[Signature]) -> Result<(), ReflectError> {
    for (i, sig) in signatures.iter().enumerate() {
        let name = sig.name();
        if name == SELF_KEY {
            return Err(ReflectError::ReservedName { name: name.to_owned() });
        }
        if signatures[..i].iter().any(|s| s.name() == name) {
            return Err(ReflectError::DuplicateSignature { name: name.to_owned() });
        }
        if !sig.datum_type().is_known() {
            return Err(DatumError::UnsetType.into());
        }
        match (sig.is_table(), sig.accessor().is_some()) {
            (true, true) => {
                return Err(ReflectError::UnexpectedAccessor { name: name.to_owned() });
            }
            (false, false) => {
                return Err(ReflectError::MissingAccessor { name: name.to_owned() });
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::NativeField;
    use tessera_core::DatumType;

    struct Base {
        hp: NativeField<i32>,
    }

    struct Derived {
        base: Base,
        name: NativeField<String>,
    }

    const BASE: TypeKey = TypeKey(1);
    const DERIVED: TypeKey = TypeKey(2);

    fn hp() -> Signature {
        Signature::external("hp", 1, |b: &Base| &b.hp)
    }

    #[test]
    fn register_and_lookup() {
        let mut types = TypeManager::new();
        types.register_type(BASE, vec![hp(), Signature::table("kids", 2)]).unwrap();
        assert!(types.contains(BASE));
        let sigs = types.signatures(BASE).unwrap();
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[1].name(), "kids");
    }

    #[test]
    fn unregistered_type_fails() {
        let types = TypeManager::new();
        assert_eq!(
            types.signatures(TypeKey(9)).unwrap_err(),
            ReflectError::UnregisteredType(TypeKey(9))
        );
    }

    #[test]
    fn reregistering_overwrites() {
        let mut types = TypeManager::new();
        types.register_type(BASE, vec![hp()]).unwrap();
        types.register_type(BASE, vec![]).unwrap();
        assert_eq!(types.len(), 1);
        assert!(types.signatures(BASE).unwrap().is_empty());
    }

    #[test]
    fn remove_and_clear() {
        let mut types = TypeManager::new();
        types.register_type(BASE, vec![hp()]).unwrap();
        types.register_type(DERIVED, vec![]).unwrap();
        assert!(types.remove_type(BASE));
        assert!(!types.remove_type(BASE));
        assert_eq!(types.keys().collect::<Vec<_>>(), vec![DERIVED]);
        types.clear();
        assert!(types.is_empty());
    }

    #[test]
    fn invalid_lists_are_rejected() {
        let mut types = TypeManager::new();
        let cases = [
            (
                vec![Signature::table(SELF_KEY, 0)],
                ReflectError::ReservedName { name: "this".into() },
            ),
            (
                vec![hp(), hp()],
                ReflectError::DuplicateSignature { name: "hp".into() },
            ),
            (
                vec![Signature::new("hp", DatumType::Integer, 1)],
                ReflectError::MissingAccessor { name: "hp".into() },
            ),
            (
                vec![Signature::table("kids", 0).with_accessor(hp().accessor().unwrap().clone())],
                ReflectError::UnexpectedAccessor { name: "kids".into() },
            ),
            (
                vec![Signature::new("x", DatumType::Unknown, 0)],
                ReflectError::Datum(DatumError::UnsetType),
            ),
        ];
        for (signatures, expected) in cases {
            assert_eq!(types.register_type(BASE, signatures), Err(expected));
        }
        assert!(types.is_empty());
    }

    #[test]
    fn derived_appends_to_base() {
        let mut types = TypeManager::new();
        types.register_type(BASE, vec![hp()]).unwrap();
        types
            .register_derived(
                DERIVED,
                BASE,
                |d: &Derived| &d.base,
                vec![Signature::external("name", 1, |d: &Derived| &d.name)],
            )
            .unwrap();

        let sigs = types.signatures(DERIVED).unwrap();
        let names: Vec<_> = sigs.iter().map(Signature::name).collect();
        assert_eq!(names, vec!["hp", "name"]);

        let derived = Derived {
            base: Base {
                hp: NativeField::single(3),
            },
            name: NativeField::single(String::new()),
        };
        assert!(sigs.iter().all(|sig| sig.resolve(&derived).is_some()));
    }

    #[test]
    fn derived_from_unregistered_base_fails() {
        let mut types = TypeManager::new();
        let result = types.register_derived(DERIVED, BASE, |d: &Derived| &d.base, vec![]);
        assert_eq!(result, Err(ReflectError::UnregisteredType(BASE)));
    }
}
