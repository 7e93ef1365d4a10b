//! The state-holder surface — what an object must expose for its tagged
//! fields to be saved and restored.
//!
//! Holders declare their persistable fields as an explicit descriptor
//! list and serve reads/writes by dotted path. There is no reflection:
//! each holder type knows its own fields at compile time, and a field the
//! holder does not answer for is simply skipped by the engine.
//!
//! Dotted paths (`Device.Name`) are forwarded one segment at a time:
//! a holder that embeds a sub-object answers `read_field("Device.Name")`
//! by delegating `"Name"` to the embedded object. This gives the load side
//! arbitrary navigation depth; the save side only ever asks for one level
//! below a descriptor's own property (see [`PropertyKind::SubProperty`]).

use std::sync::{Arc, Mutex};

use crate::value::{FieldType, FieldValue};

// ---------------------------------------------------------------------------
// PropertyDescriptor
// ---------------------------------------------------------------------------

/// How one tagged scalar field participates in persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    /// Persist the field's own value.
    Scalar,
    /// Persist the named sub-property of the object this field holds,
    /// recorded as `Class.Property.Sub`.
    ///
    /// One level only: descriptors carry a single sub-property name, so a
    /// save can never emit a deeper path. Loading is not so limited —
    /// documents may contain paths of any depth and [`FieldAccess`]
    /// forwarding resolves them.
    SubProperty(&'static str),
}

/// Declares one persistable scalar field: its name, declared type, and
/// kind. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub ty: FieldType,
    pub kind: PropertyKind,
}

impl PropertyDescriptor {
    /// Descriptor for a plain scalar field.
    pub fn scalar(name: &'static str, ty: FieldType) -> Self {
        PropertyDescriptor {
            name,
            ty,
            kind: PropertyKind::Scalar,
        }
    }

    /// Descriptor persisting `sub` of the object held by `name`. `ty` is
    /// the sub-property's type.
    pub fn sub_property(name: &'static str, sub: &'static str, ty: FieldType) -> Self {
        PropertyDescriptor {
            name,
            ty,
            kind: PropertyKind::SubProperty(sub),
        }
    }

    /// The property name as recorded in the document: `Name` for scalars,
    /// `Name.Sub` for sub-property descriptors.
    pub fn record_name(&self) -> String {
        match self.kind {
            PropertyKind::Scalar => self.name.to_string(),
            PropertyKind::SubProperty(sub) => format!("{}.{}", self.name, sub),
        }
    }

    /// The dotted path used to read/write the value.
    pub fn access_path(&self) -> String {
        self.record_name()
    }
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

/// Result of reading a field by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRead {
    /// No such field, or an intermediate object on the path was absent.
    Missing,
    /// The field exists but currently holds no value.
    Nil,
    /// The field's current value, formatted as document text.
    Value(String),
}

/// Result of writing a field by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// No such field, or an intermediate object on the path was absent.
    NoSuchField,
    /// The field exists but the value's shape does not match it.
    Incompatible,
}

/// Read/write access to persistable scalar fields by dotted path.
///
/// Implementors handle the first path segment themselves and forward the
/// remainder into the matching sub-object (which typically implements
/// `FieldAccess` too). Unknown segments answer `Missing` / `NoSuchField`;
/// the engine treats those as "leave the field alone".
pub trait FieldAccess {
    /// The declared type of the field at `path`, if the path resolves.
    fn field_type(&self, path: &str) -> Option<FieldType>;

    /// Read the current value at `path` as document text.
    fn read_field(&self, path: &str) -> FieldRead;

    /// Assign a parsed value to the field at `path`.
    fn write_field(&mut self, path: &str, value: FieldValue) -> WriteOutcome;
}

/// Split a dotted path into its first segment and the remainder.
///
/// `split_path("Device.Name")` is `("Device", Some("Name"))`;
/// `split_path("Port")` is `("Port", None)`.
pub fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

// ---------------------------------------------------------------------------
// StateHolder
// ---------------------------------------------------------------------------

/// A live object whose tagged state is saved and restored.
///
/// `instance_name` is a class-scoped identity: instances of the same type
/// normally share it, and the document keys records by it. The list
/// methods have no-op defaults — most holders carry only scalars.
pub trait StateHolder: FieldAccess {
    /// Class-scoped identity used as the record key.
    fn instance_name(&self) -> String;

    /// The ordered descriptors of all tagged scalar fields.
    fn descriptors(&self) -> Vec<PropertyDescriptor>;

    /// Names of tagged string-list fields.
    fn string_lists(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Current items of a tagged string list, or `None` if unknown.
    fn list_items(&self, _list: &str) -> Option<Vec<String>> {
        None
    }

    /// Append one restored item onto a tagged string list.
    fn append_list_item(&mut self, _list: &str, _item: String) {}

    /// Names of tagged tuple-list fields.
    fn tuple_lists(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// The element types of a tagged tuple list's pairs.
    fn tuple_item_types(&self, _list: &str) -> Option<(FieldType, FieldType)> {
        None
    }

    /// Current pairs of a tagged tuple list, both elements formatted as
    /// document text, or `None` if unknown.
    fn tuple_items(&self, _list: &str) -> Option<Vec<(String, String)>> {
        None
    }

    /// Append one restored pair onto a tagged tuple list.
    fn append_tuple_item(&mut self, _list: &str, _first: FieldValue, _second: FieldValue) {}
}

/// How collaborators share a holder with the engine: the engine tracks
/// membership, the collaborator keeps ownership of the instance lifetime.
pub type SharedHolder = Arc<Mutex<dyn StateHolder + Send>>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
