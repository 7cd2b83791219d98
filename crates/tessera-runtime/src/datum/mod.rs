//! The [`Datum`] tagged-value container.
//!
//! A datum holds zero or more homogeneous elements of one [`DatumType`].
//! The type is fixed by an explicit [`Datum::set_type`] or by the first
//! typed write, and never changes afterwards.
//!
//! Storage is either owned (a growable buffer) or external (an alias of a
//! fixed-length [`NativeField`]). External datums can be read and written
//! in place, but their length never changes.
//!
//! Table datums hold the handles of child scopes. Their elements are
//! added and removed only by the scope arena, which keeps the parent
//! links of the children consistent.

mod element;
mod growth;
mod native;
mod storage;
pub(crate) mod text;

use std::fmt;

use tessera_core::{DatumError, DatumType, Mat4, NodeRef, ScopeId, Vec4};

pub use element::DatumElement;
pub use growth::GrowthPolicy;
pub use native::{ExternalBuffer, ExternalStorage, NativeField};

use element::Element;
use storage::{Buffer, Storage};

/// Heterogeneous, homogeneously-typed value slot.
pub struct Datum {
    storage: Storage,
    /// Logical capacity. Equals the length for external storage.
    capacity: usize,
    growth: GrowthPolicy,
}

impl Datum {
    /// Untyped, empty datum.
    pub fn new() -> Self {
        Self {
            storage: Storage::Unset,
            capacity: 0,
            growth: GrowthPolicy::default(),
        }
    }

    /// Empty datum fixed to `datum_type`.
    pub fn with_type(datum_type: DatumType) -> Self {
        Self {
            storage: Storage::new(datum_type),
            ..Self::new()
        }
    }

    /// Empty datum fixed to `datum_type` with room for `capacity` elements.
    ///
    /// # Errors
    ///
    /// [`DatumError::UnsetType`] if `capacity > 0` and `datum_type` is
    /// [`DatumType::Unknown`].
    pub fn with_capacity(datum_type: DatumType, capacity: usize) -> Result<Self, DatumError> {
        let mut datum = Self::with_type(datum_type);
        datum.reserve(capacity)?;
        Ok(datum)
    }

    /// Replace the growth policy used by [`push_back`](Self::push_back).
    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    // ── Inspection ──────────────────────────────────────────────

    /// The element type.
    pub fn datum_type(&self) -> DatumType {
        self.storage.datum_type()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the datum has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements the datum can hold before growing.
    pub fn capacity(&self) -> usize {
        if self.is_external() {
            self.len()
        } else {
            self.capacity
        }
    }

    /// Whether the datum aliases external storage.
    pub fn is_external(&self) -> bool {
        self.storage.is_external()
    }

    /// The policy applied when a full datum grows.
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    // ── Type and capacity ───────────────────────────────────────

    /// Fix the element type.
    ///
    /// Succeeds if the datum is untyped or already holds `datum_type`.
    pub fn set_type(&mut self, datum_type: DatumType) -> Result<(), DatumError> {
        let held = self.datum_type();
        if held == datum_type {
            return Ok(());
        }
        if held.is_known() {
            return Err(DatumError::TypeMismatch {
                held,
                requested: datum_type,
            });
        }
        self.storage = Storage::new(datum_type);
        self.capacity = 0;
        Ok(())
    }

    /// Grow owned capacity to at least `capacity`. Never shrinks.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), DatumError> {
        if self.is_external() {
            return Err(DatumError::ExternalStorage {
                operation: "reserve",
            });
        }
        if !self.datum_type().is_known() {
            return if capacity == 0 {
                Ok(())
            } else {
                Err(DatumError::UnsetType)
            };
        }
        if capacity > self.capacity {
            self.storage.reserve_exact(capacity);
            self.capacity = capacity;
        }
        Ok(())
    }

    /// Set the length to exactly `len`, default-filling new elements.
    ///
    /// Capacity becomes `len`. Table datums cannot be resized.
    pub fn resize(&mut self, len: usize) -> Result<(), DatumError> {
        self.storage.resize(len)?;
        self.capacity = len;
        Ok(())
    }

    /// Remove every element, keeping the type and capacity.
    pub fn clear(&mut self) -> Result<(), DatumError> {
        self.check_length_mutable("clear")?;
        self.storage.clear();
        Ok(())
    }

    // ── Typed access ────────────────────────────────────────────

    /// Element `index`.
    pub fn get<T: DatumElement>(&self, index: usize) -> Result<T, DatumError> {
        self.buffer::<T>()?
            .get(index)
            .ok_or(DatumError::OutOfRange {
                index,
                len: self.len(),
            })
    }

    /// First element.
    pub fn front<T: DatumElement>(&self) -> Result<T, DatumError> {
        self.get(0)
    }

    /// Last element.
    pub fn back<T: DatumElement>(&self) -> Result<T, DatumError> {
        let buffer = self.buffer::<T>()?;
        let len = buffer.len();
        match len.checked_sub(1) {
            Some(last) => self.get(last),
            None => Err(DatumError::OutOfRange { index: 0, len }),
        }
    }

    /// Copy of every element. An untyped datum has none.
    pub fn to_vec<T: DatumElement>(&self) -> Result<Vec<T>, DatumError> {
        if !self.datum_type().is_known() {
            return Ok(Vec::new());
        }
        Ok(self.buffer::<T>()?.with_slice(<[T]>::to_vec))
    }

    /// Overwrite element `index`.
    ///
    /// Writing past the end of owned storage grows the datum to
    /// `index + 1` elements, default-filling the gap. External storage
    /// cannot grow. An untyped datum takes the type of `value`.
    pub fn set<T: DatumElement>(&mut self, value: T, index: usize) -> Result<(), DatumError> {
        Self::reject_table::<T>("set")?;
        self.check_type(T::TYPE)?;
        let len = self.len();
        if index >= len {
            if self.is_external() {
                return Err(DatumError::ExternalStorage { operation: "grow" });
            }
            self.set_type(T::TYPE)?;
            self.storage.resize(index)?;
            self.capacity = self.capacity.max(index);
            return self.push_unchecked(value);
        }
        let buffer = T::buffer_mut(&mut self.storage).ok_or(DatumError::UnsetType)?;
        buffer.set(index, value);
        Ok(())
    }

    /// Set element 0 and make it the only element.
    pub fn assign<T: DatumElement>(&mut self, value: T) -> Result<(), DatumError> {
        Self::reject_table::<T>("assign")?;
        if self.is_external() && self.len() != 1 {
            return Err(DatumError::ExternalStorage {
                operation: "resize",
            });
        }
        self.set(value, 0)?;
        if self.len() != 1 {
            self.resize(1)?;
        }
        Ok(())
    }

    /// Append `value`, growing capacity by the growth policy when full.
    pub fn push_back<T: DatumElement>(&mut self, value: T) -> Result<(), DatumError> {
        Self::reject_table::<T>("push onto")?;
        self.push_unchecked(value)
    }

    /// Remove the last element.
    pub fn pop_back(&mut self) -> Result<(), DatumError> {
        if !self.datum_type().is_known() {
            return Err(DatumError::UnsetType);
        }
        self.check_length_mutable("pop from")?;
        if self.storage.pop() {
            Ok(())
        } else {
            Err(DatumError::Empty)
        }
    }

    /// Index of the first element equal to `value`.
    pub fn find<T: DatumElement>(&self, value: &T) -> Result<Option<usize>, DatumError> {
        if !self.datum_type().is_known() {
            return Ok(None);
        }
        Ok(self.buffer::<T>()?.position(value))
    }

    /// Remove the first element equal to `value`. Returns whether one was found.
    pub fn remove<T: DatumElement>(&mut self, value: &T) -> Result<bool, DatumError> {
        Self::reject_table::<T>("remove from")?;
        match self.find(value)? {
            Some(index) => {
                self.remove_at(index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove element `index`, shifting later elements down.
    pub fn remove_at(&mut self, index: usize) -> Result<(), DatumError> {
        self.check_length_mutable("remove from")?;
        let len = self.len();
        if index >= len {
            return Err(DatumError::OutOfRange { index, len });
        }
        self.storage.remove_at(index);
        Ok(())
    }

    // ── External storage ────────────────────────────────────────

    /// Alias `external` instead of owning elements.
    ///
    /// An untyped datum takes the buffer's type. A datum that already
    /// aliases a buffer is re-pointed at the new one.
    pub fn set_storage(&mut self, external: impl Into<ExternalStorage>) -> Result<(), DatumError> {
        let external = external.into();
        let held = self.datum_type();
        if held == DatumType::Table {
            return Err(DatumError::ManagedTable { operation: "alias" });
        }
        if held.is_known() && held != external.datum_type() {
            return Err(DatumError::TypeMismatch {
                held,
                requested: external.datum_type(),
            });
        }
        if !self.is_external() && !self.is_empty() {
            return Err(DatumError::OwnedData { len: self.len() });
        }
        self.capacity = external.len();
        self.storage = Storage::from(external);
        Ok(())
    }

    // ── Text ────────────────────────────────────────────────────

    /// Parse `input` as an element of the datum's type and store it at `index`.
    pub fn set_from_string(&mut self, input: &str, index: usize) -> Result<(), DatumError> {
        match self.datum_type() {
            DatumType::Integer => self.set(text::parse_integer(input)?, index),
            DatumType::Float => self.set(text::parse_float(input)?, index),
            DatumType::Vector => self.set(text::parse_vector(input)?, index),
            DatumType::Matrix => self.set(text::parse_matrix(input)?, index),
            DatumType::String => self.set(input.to_owned(), index),
            DatumType::Unknown => Err(DatumError::UnsetType),
            other => Err(DatumError::NoTextForm(other)),
        }
    }

    /// Textual form of element `index`.
    pub fn to_string_at(&self, index: usize) -> Result<String, DatumError> {
        match self.datum_type() {
            DatumType::Integer => Ok(self.get::<i32>(index)?.to_string()),
            DatumType::Float => Ok(text::format_float(self.get(index)?)),
            DatumType::Vector => Ok(text::format_vector(&self.get(index)?)),
            DatumType::Matrix => Ok(text::format_matrix(&self.get(index)?)),
            DatumType::String => self.get(index),
            DatumType::Unknown => Err(DatumError::UnsetType),
            other => Err(DatumError::NoTextForm(other)),
        }
    }

    // ── Table elements (arena only) ─────────────────────────────

    /// Child handles of a table datum; empty for other types.
    pub fn children(&self) -> &[ScopeId] {
        match &self.storage {
            Storage::Table(Buffer::Owned(ids)) => ids,
            _ => &[],
        }
    }

    pub(crate) fn push_child(&mut self, id: ScopeId) -> Result<(), DatumError> {
        self.push_unchecked(id)
    }

    /// Removes `id` from a table datum, returning its former position.
    pub(crate) fn remove_child(&mut self, id: ScopeId) -> Option<usize> {
        let index = self.children().iter().position(|c| *c == id)?;
        self.storage.remove_at(index);
        Some(index)
    }

    pub(crate) fn take_children(&mut self) -> Vec<ScopeId> {
        match &mut self.storage {
            Storage::Table(Buffer::Owned(ids)) => ids.drain(..).collect(),
            _ => Vec::new(),
        }
    }

    // ── Internals ───────────────────────────────────────────────

    fn buffer<T: DatumElement>(&self) -> Result<&Buffer<T>, DatumError> {
        T::buffer(&self.storage).ok_or_else(|| match self.datum_type() {
            DatumType::Unknown => DatumError::UnsetType,
            held => DatumError::TypeMismatch {
                held,
                requested: T::TYPE,
            },
        })
    }

    fn check_type(&self, requested: DatumType) -> Result<(), DatumError> {
        match self.datum_type() {
            DatumType::Unknown => Ok(()),
            held if held == requested => Ok(()),
            held => Err(DatumError::TypeMismatch { held, requested }),
        }
    }

    fn check_length_mutable(&self, operation: &'static str) -> Result<(), DatumError> {
        if self.is_external() {
            return Err(DatumError::ExternalStorage { operation });
        }
        if self.datum_type() == DatumType::Table {
            return Err(DatumError::ManagedTable { operation });
        }
        Ok(())
    }

    fn reject_table<T: DatumElement>(operation: &'static str) -> Result<(), DatumError> {
        if T::TYPE == DatumType::Table {
            Err(DatumError::ManagedTable { operation })
        } else {
            Ok(())
        }
    }

    fn push_unchecked<T: DatumElement>(&mut self, value: T) -> Result<(), DatumError> {
        self.check_type(T::TYPE)?;
        if self.is_external() {
            return Err(DatumError::ExternalStorage {
                operation: "push onto",
            });
        }
        self.set_type(T::TYPE)?;
        let len = self.len();
        if len >= self.capacity {
            let grown = self.capacity + self.growth.increment(len, self.capacity);
            self.storage.reserve_exact(grown);
            self.capacity = grown;
        }
        let owned = T::buffer_mut(&mut self.storage)
            .and_then(Buffer::owned_mut)
            .ok_or(DatumError::UnsetType)?;
        owned.push(value);
        Ok(())
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned elements are copied and external datums keep aliasing the same
/// buffer. Table datums come back empty, since a child scope has exactly
/// one owner.
impl Clone for Datum {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.duplicate(self.capacity()),
            capacity: self.capacity(),
            growth: self.growth,
        }
    }
}

impl fmt::Debug for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datum")
            .field("storage", &self.storage)
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Same type, same length, equal elements. Table and pointer elements
/// compare by handle.
impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        self.storage.elements_eq(&other.storage)
    }
}

macro_rules! scalar_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Datum {
                fn from(value: $ty) -> Self {
                    let mut datum = Self::with_type(<$ty as Element>::TYPE);
                    if let Some(v) = <$ty as Element>::buffer_mut(&mut datum.storage)
                        .and_then(Buffer::owned_mut)
                    {
                        v.push(value);
                    }
                    datum.capacity = 1;
                    datum
                }
            }

            /// Compares element 0.
            impl PartialEq<$ty> for Datum {
                fn eq(&self, other: &$ty) -> bool {
                    self.get::<$ty>(0).is_ok_and(|v| v == *other)
                }
            }
        )*
    };
}

scalar_conversions!(i32, f32, Vec4, Mat4, String, NodeRef);

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

/// Compares element 0.
impl PartialEq<str> for Datum {
    fn eq(&self, other: &str) -> bool {
        <String as Element>::buffer(&self.storage)
            .is_some_and(|b| b.with_slice(|s| s.first().is_some_and(|v| v == other)))
    }
}

/// Compares element 0.
impl PartialEq<&str> for Datum {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
