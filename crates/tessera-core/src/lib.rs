//! Core types for the Tessera reflected property runtime.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the rest of the workspace: node handles and type
//! keys, the vector and matrix element types, the [`DatumType`] tag, and
//! the error enums every layer reports.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod datum_type;
pub mod error;
pub mod id;
pub mod math;

pub use datum_type::{DatumType, UnknownDatumType};
pub use error::{DatumError, ReflectError, ScopeError};
pub use id::{NodeRef, ScopeId, TypeKey};
pub use math::{Mat4, Vec4};
