//! Accessor for dynamic property bags (late-bound member access).

use crate::convert::convert_to;
use crate::node::{Bag, Node};
use crate::options::PatchOptions;
use crate::schema::TypeDesc;

use super::{invalid_value_message, json_text_equal, not_found_message, Adapter, StepFailure, StepResult};

fn as_bag(target: &Node) -> StepResult<&Bag> {
    match target {
        Node::Bag(b) => Ok(b),
        _ => Err(StepFailure::msg(
            "The value at the target location is not a property bag.",
        )),
    }
}

fn as_bag_mut(target: &mut Node) -> StepResult<&mut Bag> {
    match target {
        Node::Bag(b) => Ok(b),
        _ => Err(StepFailure::msg(
            "The value at the target location is not a property bag.",
        )),
    }
}

fn get_member<'a>(bag: &'a Bag, name: &str, segment: &str) -> StepResult<&'a Node> {
    bag.members
        .get(name)
        .ok_or_else(|| StepFailure::msg(not_found_message(segment)))
}

/// The value `remove` writes over a member: the zero value of the member's
/// runtime type for value-typed scalars, null for everything else. The
/// backing store has no notion of absence, only "holds a value".
fn runtime_default(current: &Node) -> Node {
    current.runtime_type().default_value()
}

pub struct BagAdapter;

impl Adapter for BagAdapter {
    fn try_traverse<'a>(
        &self,
        target: &'a mut Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
    ) -> StepResult<&'a mut Node> {
        let bag = match target {
            Node::Bag(b) => b,
            _ => return Err(StepFailure::silent()),
        };

        // Unlike mappings, a failed member bind carries a message even
        // during traversal.
        let name = options.key_name(segment);
        bag.members
            .get_mut(&name)
            .ok_or_else(|| StepFailure::msg(not_found_message(segment)))
    }

    fn try_add(
        &self,
        target: &mut Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let bag = as_bag_mut(target)?;
        let name = options.key_name(segment);
        bag.members.insert(name, value.clone());
        Ok(())
    }

    fn try_remove(
        &self,
        target: &mut Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
    ) -> StepResult<()> {
        let bag = as_bag_mut(target)?;
        let name = options.key_name(segment);
        let current = get_member(bag, &name, segment)?;
        let default = runtime_default(current);
        bag.members.insert(name, default);
        Ok(())
    }

    fn try_replace(
        &self,
        target: &mut Node,
        declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let bag = as_bag(target)?;
        let name = options.key_name(segment);
        let current = get_member(bag, &name, segment)?;

        // Convert against the member's current runtime type, then rebind
        // through remove so the member passes through its default first.
        let converted = convert_to(value, &current.runtime_type())
            .ok_or_else(|| StepFailure::msg(invalid_value_message(value)))?;

        self.try_remove(target, declared, segment, options)?;

        let bag = as_bag_mut(target)?;
        bag.members.insert(name, converted);
        Ok(())
    }

    fn try_get(
        &self,
        target: &Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
    ) -> StepResult<Node> {
        let bag = as_bag(target)?;
        let name = options.key_name(segment);
        get_member(bag, &name, segment).cloned()
    }

    fn try_test(
        &self,
        target: &Node,
        _declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let bag = as_bag(target)?;
        let name = options.key_name(segment);
        let current = get_member(bag, &name, segment)?;

        let converted = convert_to(value, &current.runtime_type())
            .ok_or_else(|| StepFailure::msg(invalid_value_message(value)))?;

        if !json_text_equal(current, &converted) {
            return Err(StepFailure::msg(format!(
                "The current value '{current}' at path '{segment}' is not equal to the test value '{value}'."
            )));
        }
        Ok(())
    }
}
