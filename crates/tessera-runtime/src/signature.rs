//! Attribute signatures: the declared layout of a reflected type.
//!
//! A [`Signature`] names one prescribed attribute and fixes its element
//! type and length. Scalar signatures also carry a [`FieldAccessor`] that
//! finds the native field the attribute aliases on a given host object.
//! Table signatures describe child slots and never alias anything.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use tessera_core::DatumType;

use crate::datum::{DatumElement, ExternalStorage, NativeField};

/// Looks up the native field behind an attribute on a host object.
///
/// Returns `None` when the host is not the type the accessor was built
/// for.
pub type FieldAccessor = Rc<dyn Fn(&dyn Any) -> Option<ExternalStorage>>;

/// One declared attribute of a reflected type.
#[derive(Clone)]
pub struct Signature {
    name: String,
    datum_type: DatumType,
    array_length: usize,
    accessor: Option<FieldAccessor>,
}

impl Signature {
    /// Signature without an accessor.
    ///
    /// Only table signatures are valid this way; attach an accessor with
    /// [`with_accessor`](Self::with_accessor) for anything else.
    pub fn new(name: impl Into<String>, datum_type: DatumType, array_length: usize) -> Self {
        Self {
            name: name.into(),
            datum_type,
            array_length,
            accessor: None,
        }
    }

    /// Scalar signature aliasing the field `field` selects on hosts of type `H`.
    ///
    /// ```
    /// # use tessera_runtime::{NativeField, Signature};
    /// struct Monster {
    ///     hp: NativeField<i32>,
    /// }
    ///
    /// let sig = Signature::external("hp", 1, |m: &Monster| &m.hp);
    /// assert_eq!(sig.name(), "hp");
    /// ```
    pub fn external<H, T>(
        name: impl Into<String>,
        array_length: usize,
        field: fn(&H) -> &NativeField<T>,
    ) -> Self
    where
        H: Any,
        T: DatumElement,
        for<'a> ExternalStorage: From<&'a NativeField<T>>,
    {
        let accessor: FieldAccessor = Rc::new(move |host: &dyn Any| {
            host.downcast_ref::<H>()
                .map(|h| ExternalStorage::from(field(h)))
        });
        Self::new(name, T::TYPE, array_length).with_accessor(accessor)
    }

    /// Table signature pre-reserving `reserve` child slots.
    pub fn table(name: impl Into<String>, reserve: usize) -> Self {
        Self::new(name, DatumType::Table, reserve)
    }

    /// Replace the field accessor.
    pub fn with_accessor(mut self, accessor: FieldAccessor) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// The same signature, resolved on hosts of type `D` through `upcast`.
    ///
    /// Used when a derived type embeds the base type whose fields the
    /// signature was written against.
    pub fn projected<D, B>(&self, upcast: fn(&D) -> &B) -> Self
    where
        D: Any,
        B: Any,
    {
        let mut sig = self.clone();
        if let Some(inner) = self.accessor.clone() {
            sig.accessor = Some(Rc::new(move |host: &dyn Any| {
                host.downcast_ref::<D>()
                    .and_then(|d| inner(upcast(d) as &dyn Any))
            }));
        }
        sig
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type.
    pub fn datum_type(&self) -> DatumType {
        self.datum_type
    }

    /// Element count for scalars, reserved child slots for tables.
    pub fn array_length(&self) -> usize {
        self.array_length
    }

    /// Whether this signature declares a table of child scopes.
    pub fn is_table(&self) -> bool {
        self.datum_type == DatumType::Table
    }

    /// The field accessor, if any.
    pub fn accessor(&self) -> Option<&FieldAccessor> {
        self.accessor.as_ref()
    }

    /// The native field behind this attribute on `host`.
    pub fn resolve(&self, host: &dyn Any) -> Option<ExternalStorage> {
        self.accessor.as_ref().and_then(|access| access(host))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("name", &self.name)
            .field("datum_type", &self.datum_type)
            .field("array_length", &self.array_length)
            .field("accessor", &self.accessor.is_some())
            .finish()
    }
}

/// Accessors are compared by presence only.
impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.datum_type == other.datum_type
            && self.array_length == other.array_length
            && self.accessor.is_some() == other.accessor.is_some()
    }
}
