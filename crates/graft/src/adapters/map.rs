//! Accessor for keyed mappings.

use crate::convert::{canonical_key, convert_to};
use crate::node::{Mapping, Node};
use crate::options::PatchOptions;
use crate::schema::TypeDesc;

use super::{invalid_value_message, json_text_equal, not_found_message, Adapter, StepFailure, StepResult};

fn as_map(target: &Node) -> StepResult<&Mapping> {
    match target {
        Node::Map(m) => Ok(m),
        _ => Err(StepFailure::msg(
            "The value at the target location is not a mapping.",
        )),
    }
}

fn as_map_mut(target: &mut Node) -> StepResult<&mut Mapping> {
    match target {
        Node::Map(m) => Ok(m),
        _ => Err(StepFailure::msg(
            "The value at the target location is not a mapping.",
        )),
    }
}

/// Run the segment through the key policy and convert it to the mapping's
/// declared key type.
fn convert_key(map: &Mapping, segment: &str, options: &PatchOptions) -> StepResult<String> {
    let name = options.key_name(segment);
    canonical_key(&name, map.key_type()).ok_or_else(|| {
        StepFailure::msg(format!(
            "The provided path segment '{name}' cannot be converted to the target type."
        ))
    })
}

fn convert_value(map: &Mapping, value: &Node) -> StepResult<Node> {
    convert_to(value, map.value_type())
        .ok_or_else(|| StepFailure::msg(invalid_value_message(value)))
}

pub struct MapAdapter;

impl Adapter for MapAdapter {
    fn try_traverse<'a>(
        &self,
        target: &'a mut Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
    ) -> StepResult<&'a mut Node> {
        let map = match target {
            Node::Map(m) => m,
            _ => return Err(StepFailure::silent()),
        };

        let key = convert_key(map, segment, options)?;

        // An absent key is not an error during traversal; the caller may
        // try another shape.
        map.entries.get_mut(&key).ok_or_else(StepFailure::silent)
    }

    fn try_add(
        &self,
        target: &mut Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let map = as_map_mut(target)?;
        // Per RFC 6902, add on an existing key replaces its value.
        let key = convert_key(map, segment, options)?;
        let converted = convert_value(map, value)?;
        map.entries.insert(key, converted);
        Ok(())
    }

    fn try_remove(
        &self,
        target: &mut Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
    ) -> StepResult<()> {
        let map = as_map_mut(target)?;
        let key = convert_key(map, segment, options)?;

        // Per RFC 6902, the target location must exist for remove
        if !map.entries.contains_key(&key) {
            return Err(StepFailure::msg(not_found_message(segment)));
        }
        map.entries.shift_remove(&key);
        Ok(())
    }

    fn try_replace(
        &self,
        target: &mut Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let map = as_map_mut(target)?;
        let key = convert_key(map, segment, options)?;

        if !map.entries.contains_key(&key) {
            return Err(StepFailure::msg(not_found_message(segment)));
        }
        let converted = convert_value(map, value)?;
        map.entries.insert(key, converted);
        Ok(())
    }

    fn try_get(
        &self,
        target: &Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
    ) -> StepResult<Node> {
        let map = as_map(target)?;
        let key = convert_key(map, segment, options)?;
        map.entries()
            .get(&key)
            .cloned()
            .ok_or_else(|| StepFailure::msg(not_found_message(segment)))
    }

    fn try_test(
        &self,
        target: &Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let map = as_map(target)?;
        let key = convert_key(map, segment, options)?;

        let current = map
            .entries()
            .get(&key)
            .ok_or_else(|| StepFailure::msg(not_found_message(segment)))?;
        let converted = convert_value(map, value)?;

        // The target segment has no assigned value to compare against
        if current.is_null() || matches!(current, Node::String(s) if s.is_empty()) {
            return Err(StepFailure::msg(format!(
                "The value at '{segment}' cannot be null or empty to perform the test operation."
            )));
        }

        if !json_text_equal(current, &converted) {
            return Err(StepFailure::msg(format!(
                "The current value '{current}' at path '{segment}' is not equal to the test value '{value}'."
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::NamingPolicy;

    const OPTS: &PatchOptions = &PatchOptions { key_policy: None };

    fn map_node(entries: &[(&str, Node)]) -> Node {
        Node::map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone())),
        )
    }

    #[test]
    fn add_upserts() {
        let mut node = map_node(&[("a", Node::Int(1))]);
        MapAdapter
            .try_add(&mut node, &TypeDesc::Any, "a", OPTS, &Node::Int(2))
            .unwrap();
        MapAdapter
            .try_add(&mut node, &TypeDesc::Any, "b", OPTS, &Node::Int(3))
            .unwrap();
        assert_eq!(
            MapAdapter.try_get(&node, &TypeDesc::Any, "a", OPTS).unwrap(),
            Node::Int(2)
        );
        assert_eq!(
            MapAdapter.try_get(&node, &TypeDesc::Any, "b", OPTS).unwrap(),
            Node::Int(3)
        );
    }

    #[test]
    fn replace_requires_existing_key() {
        let mut node = map_node(&[]);
        let err = MapAdapter
            .try_replace(&mut node, &TypeDesc::Any, "missing", OPTS, &Node::Int(1))
            .unwrap_err();
        assert!(err.message.unwrap().contains("was not found"));
    }

    #[test]
    fn remove_requires_existing_key() {
        let mut node = map_node(&[("a", Node::Int(1))]);
        MapAdapter
            .try_remove(&mut node, &TypeDesc::Any, "a", OPTS)
            .unwrap();
        let err = MapAdapter
            .try_remove(&mut node, &TypeDesc::Any, "a", OPTS)
            .unwrap_err();
        assert!(err.message.unwrap().contains("was not found"));
    }

    #[test]
    fn test_rejects_null_and_empty_current() {
        let node = map_node(&[("a", Node::Null), ("b", Node::from(""))]);
        for key in ["a", "b"] {
            let err = MapAdapter
                .try_test(&node, &TypeDesc::Any, key, OPTS, &Node::from("x"))
                .unwrap_err();
            assert!(err.message.unwrap().contains("cannot be null or empty"));
        }
    }

    #[test]
    fn test_compares_serialized_text() {
        let node = map_node(&[("a", Node::Int(1))]);
        MapAdapter
            .try_test(&node, &TypeDesc::Any, "a", OPTS, &Node::Int(1))
            .unwrap();
        let err = MapAdapter
            .try_test(&node, &TypeDesc::Any, "a", OPTS, &Node::Int(2))
            .unwrap_err();
        assert!(err.message.unwrap().contains("is not equal to the test value"));
    }

    #[test]
    fn traverse_absent_key_is_silent() {
        let mut node = map_node(&[]);
        let err = MapAdapter
            .try_traverse(&mut node, &TypeDesc::Any, "missing", OPTS)
            .unwrap_err();
        assert_eq!(err.message, None);
    }

    #[test]
    fn key_policy_transforms_segment() {
        let options = PatchOptions::new().with_key_policy(NamingPolicy::CamelCase);
        let mut node = map_node(&[]);
        MapAdapter
            .try_add(&mut node, &TypeDesc::Any, "FooBar", &options, &Node::Int(1))
            .unwrap();
        assert_eq!(
            MapAdapter
                .try_get(&node, &TypeDesc::Any, "fooBar", OPTS)
                .unwrap(),
            Node::Int(1)
        );
    }

    #[test]
    fn int_keyed_mapping_validates_segments() {
        let mut node = Node::Map(Mapping::of(TypeDesc::Int, TypeDesc::Any, []));
        MapAdapter
            .try_add(&mut node, &TypeDesc::Any, "7", OPTS, &Node::Int(1))
            .unwrap();
        let err = MapAdapter
            .try_add(&mut node, &TypeDesc::Any, "seven", OPTS, &Node::Int(1))
            .unwrap_err();
        assert!(err.message.unwrap().contains("cannot be converted"));
    }
}
