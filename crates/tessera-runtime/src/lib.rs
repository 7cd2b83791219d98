//! Datum containers, scope trees and reflected attributes for Tessera.
//!
//! # Architecture
//!
//! ```text
//! ScopeArena (owner of every node)
//! ├── Slot × N (generation + Box<dyn Node>)
//! │   └── Node: Scope | T: Reflect
//! │       └── Scope (IndexMap<String, Datum>, parent handle)
//! │           └── Datum (owned Vec<T> | ExternalBuffer<T> | child handles)
//! └── ScopeConfig (initial capacity, growth policy)
//!
//! TypeManager (TypeKey → [Signature]) ──▶ Attributed::new ──▶ Reflect::bind
//! ```
//!
//! # Ownership
//!
//! A node with a parent is owned by that parent through one element of a
//! table datum. Roots are owned by the caller holding their handle.
//! [`ScopeArena::adopt`] and [`ScopeArena::orphan`] are the only operations
//! that move ownership, and destroying a node destroys its subtree.
//!
//! # Reflection
//!
//! A reflected type keeps its state in [`NativeField`]s and registers a
//! [`Signature`] per field with a [`TypeManager`]. Its [`Attributed`] list
//! exposes those fields as prescribed attributes whose datums alias the
//! fields, so writes through either side are seen by the other.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod attributed;
mod compare;
pub mod config;
pub mod datum;
pub mod node;
pub mod reflect;
pub mod registry;
pub mod scope;
pub mod signature;

// Public re-exports for the primary API surface.
pub use arena::ScopeArena;
pub use attributed::{Attributed, SELF_KEY};
pub use config::ScopeConfig;
pub use datum::{Datum, DatumElement, ExternalBuffer, ExternalStorage, GrowthPolicy, NativeField};
pub use node::Node;
pub use reflect::{rebind_clone, Reflect};
pub use registry::TypeManager;
pub use scope::Scope;
pub use signature::{FieldAccessor, Signature};

pub use tessera_core::{
    DatumError, DatumType, Mat4, NodeRef, ReflectError, ScopeError, ScopeId, TypeKey, Vec4,
};
