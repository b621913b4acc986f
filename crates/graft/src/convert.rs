//! Value conversion service.
//!
//! Converts values to the declared type of the location they are written
//! into. The policy, in order: null passes iff the target is nullable;
//! values already satisfying the target pass through unchanged; scalars get
//! one coercion attempt; everything else round-trips through the JSON codec
//! and is re-shaped against the target type. A `None` result is never fatal
//! here — callers turn it into an "invalid for target location" failure.

use serde_json::Value;

use crate::node::{Bag, Mapping, Node, Record, Sequence};
use crate::schema::TypeDesc;

/// Convert `value` for storage at a location of type `target`.
///
/// Returns `None` when the value cannot be represented as the target type.
pub fn convert_to(value: &Node, target: &TypeDesc) -> Option<Node> {
    if value.is_null() {
        return target.is_nullable().then_some(Node::Null);
    }
    if satisfies(value, target) {
        return Some(value.clone());
    }
    if let Some(coerced) = coerce_scalar(value, target) {
        return Some(coerced);
    }
    from_json_as(&value.to_json(), target)
}

/// Produce an independent deep copy of `value`.
///
/// Always round-trips through the JSON codec and re-shapes against the
/// value's own runtime type, so the copy shares no state with the source
/// and is never narrowed to a declared type. Used by the `copy` operation.
pub fn copy_to(value: &Node) -> Option<Node> {
    if value.is_null() {
        return Some(Node::Null);
    }
    from_json_as(&value.to_json(), &value.runtime_type())
}

/// True when `value` can be stored at a `target`-typed location as-is.
pub(crate) fn satisfies(value: &Node, target: &TypeDesc) -> bool {
    match target {
        TypeDesc::Any => true,
        TypeDesc::Optional(inner) => value.is_null() || satisfies(value, inner),
        TypeDesc::Bool => matches!(value, Node::Bool(_)),
        TypeDesc::Int => matches!(value, Node::Int(_)),
        TypeDesc::Float => matches!(value, Node::Float(_)),
        TypeDesc::String => matches!(value, Node::String(_)),
        TypeDesc::Seq(item) => matches!(value, Node::Seq(s) if s.item_type() == &**item),
        TypeDesc::Map(key, val) => {
            matches!(value, Node::Map(m) if m.key_type() == &**key && m.value_type() == &**val)
        }
        TypeDesc::Bag => matches!(value, Node::Bag(_)),
        TypeDesc::Record(schema) => {
            matches!(value, Node::Record(r) if r.schema().extends(schema))
        }
    }
}

/// One-step scalar coercion: lossless int/float interchange and
/// string-rendered scalars, the moral equivalent of a primitive
/// change-type call.
fn coerce_scalar(value: &Node, target: &TypeDesc) -> Option<Node> {
    match (value, target) {
        (_, TypeDesc::Optional(inner)) => coerce_scalar(value, inner),
        (Node::Float(f), TypeDesc::Int) if f.fract() == 0.0 && f.is_finite() => {
            Some(Node::Int(*f as i64))
        }
        (Node::String(s), TypeDesc::Int) => s.trim().parse().ok().map(Node::Int),
        (Node::Int(i), TypeDesc::Float) => Some(Node::Float(*i as f64)),
        (Node::String(s), TypeDesc::Float) => s.trim().parse().ok().map(Node::Float),
        (Node::String(s), TypeDesc::Bool) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(Node::Bool(true)),
            "false" => Some(Node::Bool(false)),
            _ => None,
        },
        (Node::Int(i), TypeDesc::String) => Some(Node::String(i.to_string())),
        (Node::Float(f), TypeDesc::String) => Some(Node::String(f.to_string())),
        (Node::Bool(b), TypeDesc::String) => Some(Node::String(b.to_string())),
        _ => None,
    }
}

/// Validate a (policy-transformed) path segment against a mapping's
/// declared key type, producing the canonical stored key.
pub(crate) fn canonical_key(segment: &str, key_type: &TypeDesc) -> Option<String> {
    match key_type {
        TypeDesc::Any | TypeDesc::String => Some(segment.to_string()),
        TypeDesc::Int => segment.trim().parse::<i64>().ok().map(|i| i.to_string()),
        _ => None,
    }
}

/// Re-shape decoded JSON against a declared type.
///
/// Record members match by wire name or case-insensitive canonical name;
/// absent members keep their defaults and unknown JSON members are
/// ignored. A null member value only passes for nullable member types.
pub(crate) fn from_json_as(value: &Value, target: &TypeDesc) -> Option<Node> {
    match target {
        TypeDesc::Any => Some(Node::from_json(value)),
        TypeDesc::Optional(inner) => {
            if value.is_null() {
                Some(Node::Null)
            } else {
                from_json_as(value, inner)
            }
        }
        TypeDesc::Bool => value.as_bool().map(Node::Bool),
        TypeDesc::Int => value.as_i64().map(Node::Int),
        TypeDesc::Float => value.as_f64().map(Node::Float),
        TypeDesc::String => value.as_str().map(|s| Node::String(s.to_string())),
        TypeDesc::Seq(item) => {
            let items = value
                .as_array()?
                .iter()
                .map(|v| typed_or_null(v, item))
                .collect::<Option<Vec<_>>>()?;
            Some(Node::Seq(Sequence::of((**item).clone(), items)))
        }
        TypeDesc::Map(key, val) => {
            let entries = value
                .as_object()?
                .iter()
                .map(|(k, v)| {
                    let canonical = canonical_key(k, key)?;
                    Some((canonical, typed_or_null(v, val)?))
                })
                .collect::<Option<Vec<_>>>()?;
            Some(Node::Map(Mapping::of(
                (**key).clone(),
                (**val).clone(),
                entries,
            )))
        }
        TypeDesc::Bag => {
            let members = value
                .as_object()?
                .iter()
                .map(|(k, v)| (k.clone(), Node::from_json(v)));
            let mut bag = Bag::new();
            bag.members.extend(members);
            Some(Node::Bag(bag))
        }
        TypeDesc::Record(schema) => {
            let object = value.as_object()?;
            let mut record = Record::new(schema.clone());
            for field in schema.members() {
                let found = object
                    .iter()
                    .find(|(k, _)| field.wire_name().eq_ignore_ascii_case(k) || field.name().eq_ignore_ascii_case(k));
                if let Some((_, member_value)) = found {
                    let node = typed_or_null(member_value, field.ty())?;
                    record.set_value(field.name(), node);
                }
            }
            Some(Node::Record(record))
        }
    }
}

fn typed_or_null(value: &Value, ty: &TypeDesc) -> Option<Node> {
    if value.is_null() {
        return ty.is_nullable().then_some(Node::Null);
    }
    from_json_as(value, ty)
}
