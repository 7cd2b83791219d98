//! Element buffers behind a datum.

use tessera_core::{DatumError, DatumType, Mat4, NodeRef, ScopeId, Vec4};

use super::native::{ExternalBuffer, ExternalStorage};

/// Owned or aliased element buffer.
#[derive(Clone, Debug)]
pub enum Buffer<T> {
    /// Growable buffer owned by the datum.
    Owned(Vec<T>),
    /// Fixed-length cells owned by a native field.
    External(ExternalBuffer<T>),
}

impl<T: Clone> Buffer<T> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Owned(v) => v.len(),
            Self::External(e) => e.len(),
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<T> {
        match self {
            Self::Owned(v) => v.get(index).cloned(),
            Self::External(e) => e.get(index),
        }
    }

    /// Overwrites an in-range element.
    pub(crate) fn set(&mut self, index: usize, value: T) -> bool {
        match self {
            Self::Owned(v) => match v.get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            Self::External(e) => e.set(index, value),
        }
    }

    pub(crate) fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        match self {
            Self::Owned(v) => f(v),
            Self::External(e) => e.with_slice(f),
        }
    }

    pub(crate) fn owned_mut(&mut self) -> Option<&mut Vec<T>> {
        match self {
            Self::Owned(v) => Some(v),
            Self::External(_) => None,
        }
    }

    fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }
}

impl<T: Clone + PartialEq> Buffer<T> {
    pub(crate) fn position(&self, value: &T) -> Option<usize> {
        self.with_slice(|s| s.iter().position(|v| v == value))
    }

    fn elements_eq(&self, other: &Self) -> bool {
        self.with_slice(|a| other.with_slice(|b| a == b))
    }
}

/// Type-tagged element storage. `Unset` is the only untyped state.
#[derive(Clone, Debug)]
pub enum Storage {
    /// No type assigned.
    Unset,
    /// Integer elements.
    Integer(Buffer<i32>),
    /// Float elements.
    Float(Buffer<f32>),
    /// Vector elements.
    Vector(Buffer<Vec4>),
    /// Matrix elements.
    Matrix(Buffer<Mat4>),
    /// String elements.
    String(Buffer<String>),
    /// Owned child handles. Always [`Buffer::Owned`].
    Table(Buffer<ScopeId>),
    /// Non-owning node references.
    Pointer(Buffer<NodeRef>),
}

/// Runs `$body` with `$b` bound to whichever typed buffer is present.
macro_rules! with_buffer {
    ($storage:expr, $b:ident => $body:expr, unset => $unset:expr) => {
        match $storage {
            Storage::Unset => $unset,
            Storage::Integer($b) => $body,
            Storage::Float($b) => $body,
            Storage::Vector($b) => $body,
            Storage::Matrix($b) => $body,
            Storage::String($b) => $body,
            Storage::Table($b) => $body,
            Storage::Pointer($b) => $body,
        }
    };
}

impl Storage {
    /// Empty owned storage of type `t`.
    pub(crate) fn new(t: DatumType) -> Self {
        match t {
            DatumType::Unknown => Self::Unset,
            DatumType::Integer => Self::Integer(Buffer::Owned(Vec::new())),
            DatumType::Float => Self::Float(Buffer::Owned(Vec::new())),
            DatumType::Vector => Self::Vector(Buffer::Owned(Vec::new())),
            DatumType::Matrix => Self::Matrix(Buffer::Owned(Vec::new())),
            DatumType::Table => Self::Table(Buffer::Owned(Vec::new())),
            DatumType::String => Self::String(Buffer::Owned(Vec::new())),
            DatumType::Pointer => Self::Pointer(Buffer::Owned(Vec::new())),
        }
    }

    pub(crate) fn datum_type(&self) -> DatumType {
        match self {
            Self::Unset => DatumType::Unknown,
            Self::Integer(_) => DatumType::Integer,
            Self::Float(_) => DatumType::Float,
            Self::Vector(_) => DatumType::Vector,
            Self::Matrix(_) => DatumType::Matrix,
            Self::Table(_) => DatumType::Table,
            Self::String(_) => DatumType::String,
            Self::Pointer(_) => DatumType::Pointer,
        }
    }

    pub(crate) fn len(&self) -> usize {
        with_buffer!(self, b => b.len(), unset => 0)
    }

    pub(crate) fn is_external(&self) -> bool {
        with_buffer!(self, b => b.is_external(), unset => false)
    }

    /// Grows the owned allocation so it can hold `capacity` elements.
    pub(crate) fn reserve_exact(&mut self, capacity: usize) {
        with_buffer!(self, b => {
            if let Some(v) = b.owned_mut() {
                v.reserve_exact(capacity.saturating_sub(v.len()));
            }
        }, unset => ())
    }

    /// Sets the owned length to `len`, default-filling new elements.
    pub(crate) fn resize(&mut self, len: usize) -> Result<(), DatumError> {
        fn fill<T: Clone>(b: &mut Buffer<T>, len: usize, value: T) -> Result<(), DatumError> {
            let v = b.owned_mut().ok_or(DatumError::ExternalStorage {
                operation: "resize",
            })?;
            v.resize(len, value);
            v.shrink_to(len);
            Ok(())
        }

        match self {
            Self::Unset => Err(DatumError::UnsetType),
            Self::Integer(b) => fill(b, len, 0),
            Self::Float(b) => fill(b, len, 0.0),
            Self::Vector(b) => fill(b, len, Vec4::ZERO),
            Self::Matrix(b) => fill(b, len, Mat4::ZERO),
            Self::String(b) => fill(b, len, String::new()),
            Self::Pointer(b) => fill(b, len, NodeRef::NULL),
            Self::Table(_) => Err(DatumError::ManagedTable {
                operation: "resize",
            }),
        }
    }

    /// Removes the last owned element. Returns `false` when already empty.
    pub(crate) fn pop(&mut self) -> bool {
        with_buffer!(self, b => b.owned_mut().is_some_and(|v| v.pop().is_some()), unset => false)
    }

    pub(crate) fn remove_at(&mut self, index: usize) {
        with_buffer!(self, b => {
            if let Some(v) = b.owned_mut() {
                v.remove(index);
            }
        }, unset => ())
    }

    pub(crate) fn clear(&mut self) {
        with_buffer!(self, b => {
            if let Some(v) = b.owned_mut() {
                v.clear();
            }
        }, unset => ())
    }

    /// Copy for a cloned datum: owned elements are copied, external
    /// buffers stay aliased and table handles are dropped.
    pub(crate) fn duplicate(&self, capacity: usize) -> Self {
        let mut copy = match self {
            Self::Table(_) => Self::new(DatumType::Table),
            other => other.clone(),
        };
        copy.reserve_exact(capacity);
        copy
    }

    pub(crate) fn elements_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unset, Self::Unset) => true,
            (Self::Integer(a), Self::Integer(b)) => a.elements_eq(b),
            (Self::Float(a), Self::Float(b)) => a.elements_eq(b),
            (Self::Vector(a), Self::Vector(b)) => a.elements_eq(b),
            (Self::Matrix(a), Self::Matrix(b)) => a.elements_eq(b),
            (Self::String(a), Self::String(b)) => a.elements_eq(b),
            (Self::Table(a), Self::Table(b)) => a.elements_eq(b),
            (Self::Pointer(a), Self::Pointer(b)) => a.elements_eq(b),
            _ => false,
        }
    }
}

impl From<ExternalStorage> for Storage {
    fn from(external: ExternalStorage) -> Self {
        match external {
            ExternalStorage::Integer(e) => Self::Integer(Buffer::External(e)),
            ExternalStorage::Float(e) => Self::Float(Buffer::External(e)),
            ExternalStorage::Vector(e) => Self::Vector(Buffer::External(e)),
            ExternalStorage::Matrix(e) => Self::Matrix(Buffer::External(e)),
            ExternalStorage::String(e) => Self::String(Buffer::External(e)),
            ExternalStorage::Pointer(e) => Self::Pointer(Buffer::External(e)),
        }
    }
}
