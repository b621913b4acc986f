//! Declared types and record metadata.
//!
//! Targets are addressed structurally, so the engine needs a runtime
//! description of what a location is allowed to hold: [`TypeDesc`] plays the
//! role a static type plays in languages with reflection, and
//! [`RecordSchema`] is the per-model metadata table (member name → field
//! descriptor) that fixed-schema records are patched through. Schemas are
//! built once at registration time and shared via `Arc`.

use std::sync::Arc;

use thiserror::Error;

use crate::node::{Node, Sequence};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("record type '{0}' has no member '{1}'")]
    UnknownMember(String, String),
}

/// The declared type of a graph location.
///
/// Scalars (`Bool`, `Int`, `Float`, `String`) are value types: they reject
/// null and carry a zero-value default (`false`, `0`, `0.0`, `""`). Every
/// other type accepts null. `Optional` wraps a scalar to make it nullable.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDesc {
    /// Accepts any value; wire JSON entering an `Any` slot takes its
    /// untyped shape (objects become mappings, arrays become sequences).
    Any,
    Bool,
    Int,
    Float,
    String,
    Optional(Box<TypeDesc>),
    /// Ordered sequence with a declared item type.
    Seq(Box<TypeDesc>),
    /// Keyed mapping with declared key and value types.
    Map(Box<TypeDesc>, Box<TypeDesc>),
    /// Dynamic property bag.
    Bag,
    /// Fixed-schema record.
    Record(Arc<RecordSchema>),
}

impl TypeDesc {
    pub fn optional(inner: TypeDesc) -> Self {
        TypeDesc::Optional(Box::new(inner))
    }

    pub fn seq(item: TypeDesc) -> Self {
        TypeDesc::Seq(Box::new(item))
    }

    pub fn map(key: TypeDesc, value: TypeDesc) -> Self {
        TypeDesc::Map(Box::new(key), Box::new(value))
    }

    pub fn record(schema: Arc<RecordSchema>) -> Self {
        TypeDesc::Record(schema)
    }

    /// True when a null value may be stored at a location of this type.
    pub fn is_nullable(&self) -> bool {
        !matches!(
            self,
            TypeDesc::Bool | TypeDesc::Int | TypeDesc::Float | TypeDesc::String
        )
    }

    /// The value a `remove` writes into a location of this type.
    pub fn default_value(&self) -> Node {
        match self {
            TypeDesc::Bool => Node::Bool(false),
            TypeDesc::Int => Node::Int(0),
            TypeDesc::Float => Node::Float(0.0),
            TypeDesc::String => Node::String(String::new()),
            _ => Node::Null,
        }
    }

    /// Construct an empty value of this type, used when materializing
    /// record instances. Nullable types start as null.
    pub(crate) fn empty_value(&self) -> Node {
        match self {
            TypeDesc::Seq(item) => Node::Seq(Sequence::of((**item).clone(), Vec::new())),
            other => other.default_value(),
        }
    }
}

/// A single member of a [`RecordSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    name: String,
    wire_name: Option<String>,
    ty: TypeDesc,
    read_only: bool,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            wire_name: None,
            ty,
            read_only: false,
        }
    }

    /// The serialization name this member is matched and written under.
    pub fn with_wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = Some(wire_name.into());
        self
    }

    /// Read-only members fail add/remove/replace.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name this member takes on the wire: the declared wire name when
    /// present, the canonical name otherwise.
    pub fn wire_name(&self) -> &str {
        self.wire_name.as_deref().unwrap_or(&self.name)
    }

    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Segment match: case-insensitive against the canonical name or the
    /// declared wire name.
    pub(crate) fn matches(&self, segment: &str) -> bool {
        self.name.eq_ignore_ascii_case(segment)
            || self
                .wire_name
                .as_deref()
                .is_some_and(|w| w.eq_ignore_ascii_case(segment))
    }
}

/// Metadata table for a fixed-schema record type.
///
/// Member lookups walk the schema itself first, then its parent chain, so
/// inherited members resolve transparently. Lookups always run against the
/// schema a caller *declares*, never against the instance's own schema:
/// viewing a record through a narrower schema deliberately hides members.
#[derive(Debug, PartialEq)]
pub struct RecordSchema {
    name: String,
    parent: Option<Arc<RecordSchema>>,
    fields: Vec<FieldSchema>,
}

impl RecordSchema {
    pub fn builder(name: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<RecordSchema>> {
        self.parent.as_ref()
    }

    /// Find a member by segment, searching this schema then its parents.
    pub fn find_member(&self, segment: &str) -> Option<&FieldSchema> {
        if let Some(field) = self.fields.iter().find(|f| f.matches(segment)) {
            return Some(field);
        }
        self.parent.as_ref()?.find_member(segment)
    }

    /// All members, parents first, in declaration order.
    pub fn members(&self) -> Vec<&FieldSchema> {
        let mut out = match &self.parent {
            Some(parent) => parent.members(),
            None => Vec::new(),
        };
        out.extend(self.fields.iter());
        out
    }

    /// True when `self` is `other` or descends from it.
    pub(crate) fn extends(self: &Arc<Self>, other: &Arc<RecordSchema>) -> bool {
        let mut current = Some(self);
        while let Some(schema) = current {
            if Arc::ptr_eq(schema, other) {
                return true;
            }
            current = schema.parent.as_ref();
        }
        false
    }
}

pub struct RecordSchemaBuilder {
    name: String,
    parent: Option<Arc<RecordSchema>>,
    fields: Vec<FieldSchema>,
}

impl RecordSchemaBuilder {
    pub fn parent(mut self, parent: Arc<RecordSchema>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn field(self, name: impl Into<String>, ty: TypeDesc) -> Self {
        self.push(FieldSchema::new(name, ty))
    }

    pub fn push(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Arc<RecordSchema> {
        Arc::new(RecordSchema {
            name: self.name,
            parent: self.parent,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_schema() -> Arc<RecordSchema> {
        RecordSchema::builder("Address")
            .field("Street", TypeDesc::String)
            .field("Zip", TypeDesc::optional(TypeDesc::String))
            .build()
    }

    #[test]
    fn member_lookup_is_case_insensitive() {
        let schema = address_schema();
        assert!(schema.find_member("street").is_some());
        assert!(schema.find_member("STREET").is_some());
        assert!(schema.find_member("missing").is_none());
    }

    #[test]
    fn wire_name_matches_too() {
        let schema = RecordSchema::builder("Customer")
            .push(FieldSchema::new("HomeAddress", TypeDesc::record(address_schema())).with_wire_name("home_address"))
            .build();
        assert!(schema.find_member("home_address").is_some());
        assert!(schema.find_member("HomeAddress").is_some());
        assert!(schema.find_member("HOME_ADDRESS").is_some());
    }

    #[test]
    fn parent_members_resolve() {
        let base = RecordSchema::builder("Entity")
            .field("Id", TypeDesc::Int)
            .build();
        let derived = RecordSchema::builder("Customer")
            .parent(base.clone())
            .field("Name", TypeDesc::String)
            .build();

        assert!(derived.find_member("Id").is_some());
        assert!(derived.extends(&base));
        assert!(!base.clone().extends(&derived));

        let names: Vec<_> = derived.members().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["Id", "Name"]);
    }

    #[test]
    fn scalar_defaults_are_zero_values() {
        assert_eq!(TypeDesc::Int.default_value(), Node::Int(0));
        assert_eq!(TypeDesc::String.default_value(), Node::String(String::new()));
        assert_eq!(
            TypeDesc::optional(TypeDesc::Int).default_value(),
            Node::Null
        );
        assert!(!TypeDesc::Int.is_nullable());
        assert!(TypeDesc::seq(TypeDesc::Int).is_nullable());
    }
}
