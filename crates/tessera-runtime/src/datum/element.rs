//! Rust types that can be stored as datum elements.

use std::fmt;

use tessera_core::{DatumType, Mat4, NodeRef, ScopeId, Vec4};

use super::storage::{Buffer, Storage};

/// An element type a [`Datum`](super::Datum) can hold.
///
/// Implemented for `i32`, `f32`, [`Vec4`], [`Mat4`], `String`,
/// [`NodeRef`] (pointer datums) and [`ScopeId`] (table datums). The trait
/// is sealed; the set of element types is closed.
pub trait DatumElement: sealed::Element {}

mod sealed {
    use super::*;

    pub trait Element: Clone + PartialEq + fmt::Debug + 'static {
        const TYPE: DatumType;

        fn buffer(storage: &Storage) -> Option<&Buffer<Self>>;

        fn buffer_mut(storage: &mut Storage) -> Option<&mut Buffer<Self>>;
    }
}

pub(crate) use sealed::Element;

macro_rules! datum_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl sealed::Element for $ty {
                const TYPE: DatumType = DatumType::$variant;

                fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
                    match storage {
                        Storage::$variant(b) => Some(b),
                        _ => None,
                    }
                }

                fn buffer_mut(storage: &mut Storage) -> Option<&mut Buffer<Self>> {
                    match storage {
                        Storage::$variant(b) => Some(b),
                        _ => None,
                    }
                }
            }

            impl DatumElement for $ty {}
        )*
    };
}

datum_element! {
    i32 => Integer,
    f32 => Float,
    Vec4 => Vector,
    Mat4 => Matrix,
    String => String,
    ScopeId => Table,
    NodeRef => Pointer,
}
