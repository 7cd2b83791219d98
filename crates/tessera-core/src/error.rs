//! Error types for every layer of the runtime.
//!
//! The datum, scope and reflection layers each report their own enum;
//! higher layers wrap the lower ones so `?` composes across the stack.

use thiserror::Error;

use crate::{DatumType, ScopeId, TypeKey};

/// Errors from typed datum access and storage management.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DatumError {
    /// The datum already holds a different element type.
    #[error("type mismatch: datum holds {held}, operation requires {requested}")]
    TypeMismatch {
        /// Type the datum is fixed to.
        held: DatumType,
        /// Type the operation asked for.
        requested: DatumType,
    },
    /// The operation needs a concrete element type but none is set.
    #[error("datum type is not set")]
    UnsetType,
    /// The datum aliases caller-owned storage whose length is fixed.
    #[error("cannot {operation} a datum that aliases external storage")]
    ExternalStorage {
        /// The rejected operation.
        operation: &'static str,
    },
    /// External storage was offered to a datum that already owns elements.
    #[error("datum owns {len} element(s) and cannot alias external storage")]
    OwnedData {
        /// Number of owned elements.
        len: usize,
    },
    /// Table elements are added and removed only through the scope tree.
    #[error("cannot {operation} a table datum; its elements are managed by the scope tree")]
    ManagedTable {
        /// The rejected operation.
        operation: &'static str,
    },
    /// Index past the end of the datum.
    #[error("index {index} out of range for datum of length {len}")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Current length.
        len: usize,
    },
    /// Removal from a datum with no elements.
    #[error("datum is empty")]
    Empty,
    /// Text could not be parsed as an element of the datum's type.
    #[error("cannot parse {input:?} as {datum_type}")]
    Parse {
        /// The rejected text.
        input: String,
        /// The type it was parsed as.
        datum_type: DatumType,
    },
    /// The element type has no textual form.
    #[error("{0} datums have no textual form")]
    NoTextForm(DatumType),
}

/// Errors from scope tree operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The handle refers to a destroyed node or was never issued.
    #[error("scope {id} is not live")]
    StaleHandle {
        /// The stale handle.
        id: ScopeId,
    },
    /// Children can only be placed under a table (or unset) datum.
    #[error("attribute {key:?} holds {found} and cannot contain child scopes")]
    IncompatibleKey {
        /// Attribute name.
        key: String,
        /// Type already held under that name.
        found: DatumType,
    },
    /// A scope cannot be made its own child.
    #[error("scope {id} cannot adopt itself")]
    SelfAdoption {
        /// The scope.
        id: ScopeId,
    },
    /// The operation requires a parent but the scope is a root.
    #[error("scope {id} has no parent")]
    NoParent {
        /// The root scope.
        id: ScopeId,
    },
    /// A datum carrying child handles was offered from outside the tree.
    #[error("datum for {key:?} carries child scopes owned elsewhere")]
    ForeignChildren {
        /// Attribute name.
        key: String,
    },
    /// A table datum that owns child scopes was requested for writing.
    #[error("attribute {key:?} owns {count} child scope(s); only the arena may modify it")]
    OwnsChildren {
        /// Attribute name.
        key: String,
        /// Number of children it holds.
        count: usize,
    },
    /// A child names a parent whose tables do not contain it.
    #[error("scope {id} is not contained by its parent {parent}")]
    Detached {
        /// The child.
        id: ScopeId,
        /// The parent it names.
        parent: ScopeId,
    },
    /// A datum operation failed.
    #[error(transparent)]
    Datum(#[from] DatumError),
    /// A reflected node failed to rebind after a copy or clear.
    #[error(transparent)]
    Reflect(#[from] ReflectError),
}

/// Errors from type registration and attribute binding.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReflectError {
    /// No signatures are registered under the key.
    #[error("type {0} is not registered")]
    UnregisteredType(TypeKey),
    /// A prescribed attribute disappeared from the attribute list.
    #[error("prescribed attribute {name:?} of type {type_key} is missing")]
    MissingAttribute {
        /// Owning type.
        type_key: TypeKey,
        /// Signature name.
        name: String,
    },
    /// A field accessor did not recognise the host object.
    #[error("signature {name:?} of type {type_key} does not match its host object")]
    HostMismatch {
        /// Owning type.
        type_key: TypeKey,
        /// Signature name.
        name: String,
    },
    /// The native field disagrees with its signature.
    #[error(
        "field for {name:?} holds {found_len} {found_type} element(s), signature declares {expected_len} {expected_type}"
    )]
    BindingMismatch {
        /// Signature name.
        name: String,
        /// Declared type.
        expected_type: DatumType,
        /// Declared length.
        expected_len: usize,
        /// Type of the native field.
        found_type: DatumType,
        /// Length of the native field.
        found_len: usize,
    },
    /// A scalar signature has no field accessor.
    #[error("signature {name:?} needs a field accessor")]
    MissingAccessor {
        /// Signature name.
        name: String,
    },
    /// A table signature carries a field accessor.
    #[error("table signature {name:?} cannot alias a native field")]
    UnexpectedAccessor {
        /// Signature name.
        name: String,
    },
    /// A signature uses a name reserved by the runtime.
    #[error("signature name {name:?} is reserved")]
    ReservedName {
        /// The reserved name.
        name: String,
    },
    /// Two signatures of one type share a name.
    #[error("signature name {name:?} is declared twice")]
    DuplicateSignature {
        /// The repeated name.
        name: String,
    },
    /// An auxiliary attribute would shadow a prescribed one.
    #[error("{name:?} is a prescribed attribute")]
    PrescribedCollision {
        /// The prescribed name.
        name: String,
    },
    /// A datum operation failed.
    #[error(transparent)]
    Datum(#[from] DatumError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = DatumError::TypeMismatch {
            held: DatumType::Integer,
            requested: DatumType::String,
        };
        assert_eq!(
            err.to_string(),
            "type mismatch: datum holds integer, operation requires string"
        );

        let err = ScopeError::StaleHandle {
            id: ScopeId::new(4, 2),
        };
        assert_eq!(err.to_string(), "scope #4v2 is not live");

        let err = ReflectError::UnregisteredType(TypeKey(9));
        assert_eq!(err.to_string(), "type 9 is not registered");
    }

    #[test]
    fn lower_layers_convert_upwards() {
        let scope: ScopeError = DatumError::Empty.into();
        assert_eq!(scope, ScopeError::Datum(DatumError::Empty));
        assert_eq!(scope.to_string(), "datum is empty");

        let reflect: ReflectError = DatumError::UnsetType.into();
        let scope: ScopeError = reflect.into();
        assert_eq!(
            scope,
            ScopeError::Reflect(ReflectError::Datum(DatumError::UnsetType))
        );
    }
}
