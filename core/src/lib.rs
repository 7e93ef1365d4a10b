//! Statebook — declarative saved-state persistence.
//!
//! Application state objects declare which of their fields persist; the
//! engine writes every declared field of every live instance into one
//! saved-state document, and pours the document back into fresh instances
//! on the next launch. Values travel as text, converted by a small
//! per-type parser registry, so the document stays human-readable and
//! diffable.
//!
//! # Modules
//!
//! - [`value`] — Field types, typed values, text parsers
//! - [`parsers`] — Per-(type, property) parser resolution with caching
//! - [`document`] — The serializable saved-state document
//! - [`store`] — Document file location, load, and hardened save
//! - [`holder`] — The `StateHolder` trait and property descriptors
//! - [`registry`] — The set of live holder instances
//! - [`save`] — Snapshot all holders into a document
//! - [`load`] — Pour a document back into a holder
//! - [`engine`] — The facade tying everything together

pub mod document;
pub mod engine;
pub mod error;
pub mod holder;
pub mod load;
pub mod parsers;
pub mod registry;
pub mod save;
pub mod store;
pub mod value;

pub use document::{ListRecord, PropertyRecord, SavedDocument, TupleListRecord};
pub use engine::Engine;
pub use error::PersistError;
pub use holder::{
    split_path, FieldAccess, FieldRead, PropertyDescriptor, PropertyKind, SharedHolder,
    StateHolder, WriteOutcome,
};
pub use parsers::ParserRegistry;
pub use registry::InstanceRegistry;
pub use store::{DocumentStore, StoreConfig};
pub use value::{FieldType, FieldValue, ParseFn};
