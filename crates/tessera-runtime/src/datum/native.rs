//! Native fields and the external storage handles that alias them.
//!
//! A reflected type keeps its data in [`NativeField`]s. A datum bound to
//! such a field holds an [`ExternalBuffer`] over the same cells, so writes
//! through either side are visible through the other. The length of a
//! native field is fixed at construction.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tessera_core::{DatumType, Mat4, NodeRef, Vec4};

type Cells<T> = Rc<RefCell<Box<[T]>>>;

/// Fixed-length value storage owned by a reflected object.
///
/// Cloning a `NativeField` copies its values into fresh cells: the clone
/// is never aliased by datums bound to the original.
pub struct NativeField<T> {
    cells: Cells<T>,
}

impl<T: Clone> NativeField<T> {
    /// Field holding `values`.
    pub fn new(values: impl Into<Vec<T>>) -> Self {
        Self {
            cells: Rc::new(RefCell::new(values.into().into_boxed_slice())),
        }
    }

    /// Single-element field.
    pub fn single(value: T) -> Self {
        Self::new(vec![value])
    }

    /// Field of `len` copies of `value`.
    pub fn filled(len: usize, value: T) -> Self {
        Self::new(vec![value; len])
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    /// Whether the field has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index`, if in range.
    pub fn get(&self, index: usize) -> Option<T> {
        self.cells.borrow().get(index).cloned()
    }

    /// Overwrite element `index`. Returns `false` if out of range.
    pub fn set(&self, index: usize, value: T) -> bool {
        match self.cells.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Element 0.
    ///
    /// # Panics
    ///
    /// Panics if the field is empty.
    pub fn value(&self) -> T {
        self.cells.borrow()[0].clone()
    }

    /// Overwrite element 0.
    ///
    /// # Panics
    ///
    /// Panics if the field is empty.
    pub fn set_value(&self, value: T) {
        self.cells.borrow_mut()[0] = value;
    }

    /// Copy of every element.
    pub fn to_vec(&self) -> Vec<T> {
        self.cells.borrow().to_vec()
    }

    /// Handle that aliases this field's cells.
    pub fn external(&self) -> ExternalBuffer<T> {
        ExternalBuffer {
            cells: Rc::clone(&self.cells),
        }
    }
}

impl<T: Clone> Clone for NativeField<T> {
    fn clone(&self) -> Self {
        Self::new(self.to_vec())
    }
}

impl<T: fmt::Debug> fmt::Debug for NativeField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeField")
            .field(&self.cells.borrow())
            .finish()
    }
}

/// Shared handle over the cells of a [`NativeField`].
///
/// Cloning the handle aliases the same cells.
pub struct ExternalBuffer<T> {
    cells: Cells<T>,
}

impl<T: Clone> ExternalBuffer<T> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    /// Whether the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index`, if in range.
    pub fn get(&self, index: usize) -> Option<T> {
        self.cells.borrow().get(index).cloned()
    }

    /// Overwrite element `index`. Returns `false` if out of range.
    pub fn set(&self, index: usize, value: T) -> bool {
        match self.cells.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copy of every element.
    pub fn to_vec(&self) -> Vec<T> {
        self.cells.borrow().to_vec()
    }

    /// Whether both handles alias the same cells.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells)
    }

    /// Whether this handle aliases `field`.
    pub fn aliases(&self, field: &NativeField<T>) -> bool {
        Rc::ptr_eq(&self.cells, &field.cells)
    }
}

impl<T> ExternalBuffer<T> {
    pub(crate) fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.cells.borrow())
    }
}

impl<T> Clone for ExternalBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            cells: Rc::clone(&self.cells),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ExternalBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExternalBuffer")
            .field(&self.cells.borrow())
            .finish()
    }
}

/// Type-erased external buffer, as produced by a field accessor.
#[derive(Clone, Debug)]
pub enum ExternalStorage {
    /// Integer cells.
    Integer(ExternalBuffer<i32>),
    /// Float cells.
    Float(ExternalBuffer<f32>),
    /// Vector cells.
    Vector(ExternalBuffer<Vec4>),
    /// Matrix cells.
    Matrix(ExternalBuffer<Mat4>),
    /// String cells.
    String(ExternalBuffer<String>),
    /// Node reference cells.
    Pointer(ExternalBuffer<NodeRef>),
}

impl ExternalStorage {
    /// Element type of the buffer.
    pub fn datum_type(&self) -> DatumType {
        match self {
            Self::Integer(_) => DatumType::Integer,
            Self::Float(_) => DatumType::Float,
            Self::Vector(_) => DatumType::Vector,
            Self::Matrix(_) => DatumType::Matrix,
            Self::String(_) => DatumType::String,
            Self::Pointer(_) => DatumType::Pointer,
        }
    }

    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            Self::Integer(b) => b.len(),
            Self::Float(b) => b.len(),
            Self::Vector(b) => b.len(),
            Self::Matrix(b) => b.len(),
            Self::String(b) => b.len(),
            Self::Pointer(b) => b.len(),
        }
    }

    /// Whether the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! external_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<ExternalBuffer<$ty>> for ExternalStorage {
                fn from(buffer: ExternalBuffer<$ty>) -> Self {
                    Self::$variant(buffer)
                }
            }

            impl From<&NativeField<$ty>> for ExternalStorage {
                fn from(field: &NativeField<$ty>) -> Self {
                    Self::$variant(field.external())
                }
            }
        )*
    };
}

external_from! {
    Integer => i32,
    Float => f32,
    Vector => Vec4,
    Matrix => Mat4,
    String => String,
    Pointer => NodeRef,
}
