//! Tessera: a reflected property runtime.
//!
//! Native objects expose their fields as named, typed, ordered attributes
//! that loaders and tools can inspect and mutate at run time. This is the
//! facade crate that re-exports the public API of the Tessera sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! let mut arena = ScopeArena::new();
//! let root = arena.create_scope();
//! arena.append(root, "hp").unwrap().assign(20).unwrap();
//! arena.append(root, "name").unwrap().assign(String::from("hero1")).unwrap();
//!
//! let child = arena.append_scope(root, "Children").unwrap();
//! let (owner, hp) = arena.search(child, "hp").unwrap().unwrap();
//! assert_eq!(owner, root);
//! assert_eq!(hp.get::<i32>(0).unwrap(), 20);
//!
//! arena.destroy(root).unwrap();
//! assert!(!arena.contains(child));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessera-core` | Handles, type keys, math types, errors |
//! | [`runtime`] | `tessera-runtime` | Datum, Scope, ScopeArena, reflection |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Handles, type keys, vector and matrix types, and errors (`tessera-core`).
pub use tessera_core as types;

/// Datums, scope trees and reflection (`tessera-runtime`).
///
/// [`runtime::ScopeArena`] owns every node; [`runtime::TypeManager`] and
/// [`runtime::Reflect`] expose native fields as attributes.
pub use tessera_runtime as runtime;

/// Common imports for typical Tessera usage.
///
/// ```rust
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tessera_core::{DatumType, Mat4, NodeRef, ScopeId, TypeKey, Vec4};

    // Errors
    pub use tessera_core::{DatumError, ReflectError, ScopeError};

    // Tree
    pub use tessera_runtime::{Datum, GrowthPolicy, Node, Scope, ScopeArena, ScopeConfig};

    // Reflection
    pub use tessera_runtime::{
        rebind_clone, Attributed, NativeField, Reflect, Signature, TypeManager,
    };
}
