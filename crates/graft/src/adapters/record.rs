//! Accessor for fixed-schema records.
//!
//! Member lookup runs against the schema the caller *declares*, falling
//! back to the instance's own schema only when the declared type carries no
//! record schema. A record viewed through a narrower declared schema hides
//! the members that schema does not name — typed patch documents rely on
//! this to restrict the patchable surface of a model.

use std::sync::Arc;

use crate::convert::convert_to;
use crate::node::{Node, Record};
use crate::options::PatchOptions;
use crate::schema::{FieldSchema, RecordSchema, TypeDesc};

use super::{invalid_value_message, json_text_equal, not_found_message, Adapter, StepFailure, StepResult};

fn declared_schema<'a>(target: &'a Node, declared: &'a TypeDesc) -> Option<&'a Arc<RecordSchema>> {
    match declared {
        TypeDesc::Record(schema) => Some(schema),
        TypeDesc::Optional(inner) => declared_schema(target, inner),
        _ => match target {
            Node::Record(r) => Some(r.schema()),
            _ => None,
        },
    }
}

fn find_member<'a>(
    target: &'a Node,
    declared: &'a TypeDesc,
    segment: &str,
) -> StepResult<&'a FieldSchema> {
    declared_schema(target, declared)
        .and_then(|schema| schema.find_member(segment))
        .ok_or_else(|| StepFailure::msg(not_found_message(segment)))
}

fn writable_member<'a>(
    target: &'a Node,
    declared: &'a TypeDesc,
    segment: &str,
) -> StepResult<&'a FieldSchema> {
    let field = find_member(target, declared, segment)?;
    if field.is_read_only() {
        return Err(StepFailure::msg(format!(
            "The property at path '{segment}' could not be updated."
        )));
    }
    Ok(field)
}

fn as_record_mut(target: &mut Node) -> StepResult<&mut Record> {
    match target {
        Node::Record(r) => Ok(r),
        _ => Err(StepFailure::msg(
            "The value at the target location is not a record.",
        )),
    }
}

fn current_value<'a>(target: &'a Node, field: &FieldSchema, segment: &str) -> StepResult<&'a Node> {
    match target {
        Node::Record(r) => r
            .value(field.name())
            .ok_or_else(|| StepFailure::msg(not_found_message(segment))),
        _ => Err(StepFailure::msg(not_found_message(segment))),
    }
}

pub struct RecordAdapter;

impl Adapter for RecordAdapter {
    fn try_traverse<'a>(
        &self,
        target: &'a mut Node,
        declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
    ) -> StepResult<&'a mut Node> {
        if target.is_null() {
            return Err(StepFailure::silent());
        }

        let canonical = {
            let field = find_member(target, declared, segment)?;
            field.name().to_string()
        };
        match target {
            Node::Record(r) => r
                .value_mut(&canonical)
                .ok_or_else(|| StepFailure::msg(not_found_message(segment))),
            _ => Err(StepFailure::msg(not_found_message(segment))),
        }
    }

    // Records have no absent members, so add follows replace semantics.
    fn try_add(
        &self,
        target: &mut Node,
        declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        self.try_replace(target, declared, segment, options, value)
    }

    fn try_remove(
        &self,
        target: &mut Node,
        declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
    ) -> StepResult<()> {
        let (canonical, default) = {
            let field = writable_member(target, declared, segment)?;
            (field.name().to_string(), field.ty().default_value())
        };
        let record = as_record_mut(target)?;
        record.set_value(&canonical, default);
        Ok(())
    }

    fn try_replace(
        &self,
        target: &mut Node,
        declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let (canonical, converted) = {
            let field = writable_member(target, declared, segment)?;
            let converted = convert_to(value, field.ty())
                .ok_or_else(|| StepFailure::msg(invalid_value_message(value)))?;
            (field.name().to_string(), converted)
        };
        let record = as_record_mut(target)?;
        record.set_value(&canonical, converted);
        Ok(())
    }

    fn try_get(
        &self,
        target: &Node,
        declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
    ) -> StepResult<Node> {
        let field = find_member(target, declared, segment)?;
        current_value(target, field, segment).cloned()
    }

    fn try_test(
        &self,
        target: &Node,
        declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let field = find_member(target, declared, segment)?;
        let converted = convert_to(value, field.ty())
            .ok_or_else(|| StepFailure::msg(invalid_value_message(value)))?;

        let current = current_value(target, field, segment)?;
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
    use crate::schema::RecordSchema;

    const OPTS: &PatchOptions = &PatchOptions { key_policy: None };

    fn customer_schema() -> Arc<RecordSchema> {
        RecordSchema::builder("Customer")
            .field("Name", TypeDesc::String)
            .field("Age", TypeDesc::Int)
            .push(FieldSchema::new("Id", TypeDesc::Int).read_only())
            .build()
    }

    fn customer() -> Node {
        Node::Record(
            Record::new(customer_schema())
                .with("Name", "Ada")
                .unwrap()
                .with("Age", 30i64)
                .unwrap(),
        )
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let node = customer();
        assert_eq!(
            RecordAdapter.try_get(&node, &TypeDesc::Any, "name", OPTS).unwrap(),
            Node::from("Ada")
        );
    }

    #[test]
    fn add_behaves_like_replace() {
        let mut node = customer();
        RecordAdapter
            .try_add(&mut node, &TypeDesc::Any, "Name", OPTS, &Node::from("Grace"))
            .unwrap();
        assert_eq!(
            RecordAdapter.try_get(&node, &TypeDesc::Any, "Name", OPTS).unwrap(),
            Node::from("Grace")
        );
    }

    #[test]
    fn remove_writes_declared_default() {
        let mut node = customer();
        RecordAdapter
            .try_remove(&mut node, &TypeDesc::Any, "Name", OPTS)
            .unwrap();
        RecordAdapter
            .try_remove(&mut node, &TypeDesc::Any, "Age", OPTS)
            .unwrap();
        assert_eq!(
            RecordAdapter.try_get(&node, &TypeDesc::Any, "Name", OPTS).unwrap(),
            Node::from("")
        );
        assert_eq!(
            RecordAdapter.try_get(&node, &TypeDesc::Any, "Age", OPTS).unwrap(),
            Node::Int(0)
        );
    }

    #[test]
    fn read_only_member_rejects_writes() {
        let mut node = customer();
        let err = RecordAdapter
            .try_replace(&mut node, &TypeDesc::Any, "Id", OPTS, &Node::Int(2))
            .unwrap_err();
        assert!(err.message.unwrap().contains("could not be updated"));

        // Still readable
        RecordAdapter.try_get(&node, &TypeDesc::Any, "Id", OPTS).unwrap();
    }

    #[test]
    fn unknown_member_is_not_found() {
        let node = customer();
        let err = RecordAdapter
            .try_get(&node, &TypeDesc::Any, "Ghost", OPTS)
            .unwrap_err();
        assert!(err.message.unwrap().contains("was not found"));
    }

    #[test]
    fn narrower_declared_schema_hides_members() {
        let narrow = RecordSchema::builder("CustomerView")
            .field("Name", TypeDesc::String)
            .build();
        let node = customer();
        let declared = TypeDesc::record(narrow);

        // Visible through the narrow view
        RecordAdapter.try_get(&node, &declared, "Name", OPTS).unwrap();

        // Hidden even though the instance has it
        let err = RecordAdapter
            .try_get(&node, &declared, "Age", OPTS)
            .unwrap_err();
        assert!(err.message.unwrap().contains("was not found"));
    }

    #[test]
    fn scalar_target_fails_member_lookup() {
        let mut node = Node::Int(3);
        let err = RecordAdapter
            .try_traverse(&mut node, &TypeDesc::Any, "anything", OPTS)
            .unwrap_err();
        assert!(err.message.unwrap().contains("was not found"));
    }

    #[test]
    fn null_traverse_is_silent() {
        let mut node = Node::Null;
        let err = RecordAdapter
            .try_traverse(&mut node, &TypeDesc::Any, "anything", OPTS)
            .unwrap_err();
        assert_eq!(err.message, None);
    }

    #[test]
    fn test_converts_against_member_type() {
        let node = customer();
        RecordAdapter
            .try_test(&node, &TypeDesc::Any, "Age", OPTS, &Node::from("30"))
            .unwrap();
        let err = RecordAdapter
            .try_test(&node, &TypeDesc::Any, "Age", OPTS, &Node::Int(29))
            .unwrap_err();
        let message = err.message.unwrap();
        assert!(message.contains("'30'") && message.contains("'29'"));
    }
}
