#![forbid(unsafe_code)]

//! Meta-attribute element graph with generic save/load/diff (headless).
//!
//! Design goals:
//! - schema-driven generic operations (save, load, diff, traverse) with no
//!   per-type serialization code
//! - graceful degradation: malformed documents produce structured warnings
//!   and partial graphs, never errors
//! - handle-based storage: elements refer to each other by [`Id`], the
//!   [`Repository`] owns everything, interior mutability is per element

pub mod document;
pub mod element;
pub mod error;
pub mod id;
pub mod memento;
pub mod meta;
pub mod models;
pub mod repository;

pub use document::{
    Diagnostics, DocWarning, Reader, load_element, resolve_references, save_element,
};
pub use element::{AttrValue, Element, ElementCore, ExtensibleCore, ModelCore};
pub use error::{Error, Result};
pub use id::Id;
pub use memento::{FieldDelta, Memento, assign_from, assign_to, diff};
pub use meta::{AttrDefault, AttrKind, AttrSpec, PrimKind, Registry, TypeInfo};
pub use models::{
    DirectedRelationship, Model, Project, RelationshipEnd, Tag, TagKind, UndirectedRelationship,
    register_model_types,
};
pub use repository::Repository;

#[cfg(test)]
mod tests;
