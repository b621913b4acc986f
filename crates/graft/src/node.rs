//! The runtime object-graph value.
//!
//! A [`Node`] is one vertex of the heterogeneous graph a patch document is
//! applied to. The four container variants correspond to the four shapes
//! the engine dispatches over: ordered sequence, keyed mapping, dynamic
//! property bag, and fixed-schema record. A graph may switch shapes at
//! every level, which is why accessors are re-selected per traversal hop.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::schema::{RecordSchema, SchemaError, TypeDesc};

/// A value in a patchable object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Seq(Sequence),
    Map(Mapping),
    Bag(Bag),
    Record(Record),
}

impl Node {
    /// Untyped sequence (item type `Any`).
    pub fn seq(items: impl IntoIterator<Item = Node>) -> Self {
        Node::Seq(Sequence::of(TypeDesc::Any, items))
    }

    /// Untyped mapping (`String` keys, `Any` values).
    pub fn map(entries: impl IntoIterator<Item = (String, Node)>) -> Self {
        Node::Map(Mapping::of(TypeDesc::String, TypeDesc::Any, entries))
    }

    pub fn bag(members: impl IntoIterator<Item = (String, Node)>) -> Self {
        Node::Bag(Bag {
            members: members.into_iter().collect(),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// The runtime type of this value, used when re-selecting accessors
    /// during traversal and when deep-copying.
    pub fn runtime_type(&self) -> TypeDesc {
        match self {
            Node::Null => TypeDesc::Any,
            Node::Bool(_) => TypeDesc::Bool,
            Node::Int(_) => TypeDesc::Int,
            Node::Float(_) => TypeDesc::Float,
            Node::String(_) => TypeDesc::String,
            Node::Seq(s) => TypeDesc::Seq(Box::new(s.item.clone())),
            Node::Map(m) => TypeDesc::Map(Box::new(m.key.clone()), Box::new(m.value.clone())),
            Node::Bag(_) => TypeDesc::Bag,
            Node::Record(r) => TypeDesc::Record(r.schema.clone()),
        }
    }

    /// Materialize this value as JSON. Records serialize their members
    /// under wire names, parents first, in declaration order.
    pub fn to_json(&self) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Int(i) => Value::from(*i),
            Node::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Node::String(s) => Value::String(s.clone()),
            Node::Seq(s) => Value::Array(s.items.iter().map(Node::to_json).collect()),
            Node::Map(m) => Value::Object(
                m.entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Node::Bag(b) => Value::Object(
                b.members
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Node::Record(r) => {
                let mut out = serde_json::Map::new();
                for field in r.schema.members() {
                    let value = r
                        .values
                        .get(field.name())
                        .map(Node::to_json)
                        .unwrap_or(Value::Null);
                    out.insert(field.wire_name().to_string(), value);
                }
                Value::Object(out)
            }
        }
    }

    /// Take wire JSON into the graph untyped: objects become mappings,
    /// arrays become sequences, integral numbers become `Int`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Node::Int(i),
                None => Node::Float(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => Node::seq(items.iter().map(Node::from_json)),
            Value::Object(members) => Node::map(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), Node::from_json(v))),
            ),
        }
    }
}

/// Displays as the value's serialized JSON text, which is also the equality
/// form the `test` operation compares.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(&self.to_json()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Bool(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Int(v)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Float(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::String(v.to_string())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::String(v)
    }
}

/// Ordered sequence with a declared item type.
///
/// A sequence may be flagged fixed-size, in which case add/remove/replace
/// are rejected while reads and traversal still work.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub(crate) items: Vec<Node>,
    pub(crate) item: TypeDesc,
    pub(crate) fixed: bool,
}

impl Sequence {
    pub fn of(item: TypeDesc, items: impl IntoIterator<Item = Node>) -> Self {
        Self {
            items: items.into_iter().collect(),
            item,
            fixed: false,
        }
    }

    pub fn fixed_of(item: TypeDesc, items: impl IntoIterator<Item = Node>) -> Self {
        Self {
            items: items.into_iter().collect(),
            item,
            fixed: true,
        }
    }

    pub fn items(&self) -> &[Node] {
        &self.items
    }

    pub fn item_type(&self) -> &TypeDesc {
        &self.item
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Keyed mapping with declared key and value types.
///
/// Keys are stored in canonical string form; the declared key type governs
/// which path segments convert to a key. Entries keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub(crate) entries: IndexMap<String, Node>,
    pub(crate) key: TypeDesc,
    pub(crate) value: TypeDesc,
}

impl Mapping {
    pub fn of(
        key: TypeDesc,
        value: TypeDesc,
        entries: impl IntoIterator<Item = (String, Node)>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            key,
            value,
        }
    }

    pub fn entries(&self) -> &IndexMap<String, Node> {
        &self.entries
    }

    pub fn key_type(&self) -> &TypeDesc {
        &self.key
    }

    pub fn value_type(&self) -> &TypeDesc {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Dynamic property bag.
///
/// The backing store has no concept of absence once a member exists:
/// removal writes a type-appropriate default instead of deleting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bag {
    pub(crate) members: IndexMap<String, Node>,
}

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &IndexMap<String, Node> {
        &self.members
    }
}

/// A fixed-schema record instance.
///
/// Values are stored under canonical member names. Which members are
/// *visible* to a patch is decided by the schema the operation is applied
/// through, not by the instance's own schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub(crate) schema: Arc<RecordSchema>,
    pub(crate) values: IndexMap<String, Node>,
}

impl Record {
    /// Instantiate with every member (including inherited ones) at its
    /// declared type's empty value.
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let values = schema
            .members()
            .iter()
            .map(|f| (f.name().to_string(), f.ty().empty_value()))
            .collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Set a member by canonical or wire name.
    pub fn set(&mut self, name: &str, value: Node) -> Result<(), SchemaError> {
        let field = self.schema.find_member(name).ok_or_else(|| {
            SchemaError::UnknownMember(self.schema.name().to_string(), name.to_string())
        })?;
        let canonical = field.name().to_string();
        self.values.insert(canonical, value);
        Ok(())
    }

    /// Builder-style [`set`](Record::set) for literal construction; the
    /// member must exist in the schema.
    pub fn with(mut self, name: &str, value: impl Into<Node>) -> Result<Self, SchemaError> {
        self.set(name, value.into())?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        let field = self.schema.find_member(name)?;
        self.values.get(field.name())
    }

    pub(crate) fn value(&self, canonical: &str) -> Option<&Node> {
        self.values.get(canonical)
    }

    pub(crate) fn value_mut(&mut self, canonical: &str) -> Option<&mut Node> {
        self.values.get_mut(canonical)
    }

    pub(crate) fn set_value(&mut self, canonical: &str, value: Node) {
        self.values.insert(canonical.to_string(), value);
    }
}
