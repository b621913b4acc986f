//! Accessor for ordered sequences (index-addressed).

use crate::convert::convert_to;
use crate::node::{Node, Sequence};
use crate::options::PatchOptions;
use crate::schema::TypeDesc;

use super::{invalid_value_message, json_text_equal, Adapter, StepFailure, StepResult};

/// How a resolved segment addresses the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Index(usize),
    /// The `-` marker on an add: insert past the last element.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeqOp {
    Add,
    Remove,
    Get,
    Replace,
}

fn out_of_bounds(segment: &str) -> StepFailure {
    StepFailure::msg(format!(
        "The index value provided by path segment '{segment}' is out of bounds of the array size."
    ))
}

fn invalid_index(segment: &str) -> StepFailure {
    StepFailure::msg(format!(
        "The path segment '{segment}' is invalid for an array index."
    ))
}

fn fixed_size() -> StepFailure {
    StepFailure::msg("The target sequence has a fixed size and cannot be modified.")
}

fn as_seq(target: &Node) -> StepResult<&Sequence> {
    match target {
        Node::Seq(s) => Ok(s),
        _ => Err(StepFailure::msg(
            "The value at the target location is not a sequence.",
        )),
    }
}

fn as_seq_mut(target: &mut Node) -> StepResult<&mut Sequence> {
    match target {
        Node::Seq(s) => Ok(s),
        _ => Err(StepFailure::msg(
            "The value at the target location is not a sequence.",
        )),
    }
}

/// Resolve a segment to a position.
///
/// Per RFC 6902 the index equal to the current length is valid only for
/// add (append); every other operation requires an existing element. The
/// `-` marker appends for add and addresses the last element otherwise.
fn resolve(seq: &Sequence, segment: &str, op: SeqOp) -> StepResult<Position> {
    if segment == "-" {
        return match op {
            SeqOp::Add => Ok(Position::End),
            _ if seq.is_empty() => Err(out_of_bounds(segment)),
            _ => Ok(Position::Index(seq.len() - 1)),
        };
    }

    match segment.parse::<i64>() {
        Ok(index) if index >= 0 => {
            let index = index as usize;
            if index < seq.len() {
                Ok(Position::Index(index))
            } else if index == seq.len() && op == SeqOp::Add {
                Ok(Position::End)
            } else {
                Err(out_of_bounds(segment))
            }
        }
        Ok(_) => Err(out_of_bounds(segment)),
        Err(_) => Err(invalid_index(segment)),
    }
}

fn convert_item(seq: &Sequence, value: &Node) -> StepResult<Node> {
    convert_to(value, seq.item_type()).ok_or_else(|| StepFailure::msg(invalid_value_message(value)))
}

pub struct SeqAdapter;

impl Adapter for SeqAdapter {
    fn try_traverse<'a>(
        &self,
        target: &'a mut Node,
        _declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
    ) -> StepResult<&'a mut Node> {
        let seq = match target {
            Node::Seq(s) => s,
            _ => return Err(StepFailure::silent()),
        };

        let index: i64 = segment.parse().map_err(|_| invalid_index(segment))?;
        if index < 0 || index as usize >= seq.items.len() {
            return Err(out_of_bounds(segment));
        }
        Ok(&mut seq.items[index as usize])
    }

    fn try_add(
        &self,
        target: &mut Node,
        _declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let seq = as_seq_mut(target)?;
        if seq.is_fixed() {
            return Err(fixed_size());
        }

        let position = resolve(seq, segment, SeqOp::Add)?;
        let converted = convert_item(seq, value)?;
        match position {
            Position::End => seq.items.push(converted),
            Position::Index(i) => seq.items.insert(i, converted),
        }
        Ok(())
    }

    fn try_remove(
        &self,
        target: &mut Node,
        _declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
    ) -> StepResult<()> {
        let seq = as_seq_mut(target)?;
        if seq.is_fixed() {
            return Err(fixed_size());
        }

        match resolve(seq, segment, SeqOp::Remove)? {
            Position::Index(i) => {
                seq.items.remove(i);
            }
            Position::End => {
                seq.items.pop();
            }
        }
        Ok(())
    }

    fn try_replace(
        &self,
        target: &mut Node,
        _declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let seq = as_seq_mut(target)?;
        if seq.is_fixed() {
            return Err(fixed_size());
        }

        let position = resolve(seq, segment, SeqOp::Replace)?;
        let converted = convert_item(seq, value)?;
        match position {
            Position::Index(i) => seq.items[i] = converted,
            Position::End => {
                if let Some(last) = seq.items.last_mut() {
                    *last = converted;
                }
            }
        }
        Ok(())
    }

    fn try_get(
        &self,
        target: &Node,
        _declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
    ) -> StepResult<Node> {
        let seq = as_seq(target)?;
        match resolve(seq, segment, SeqOp::Get)? {
            Position::Index(i) => Ok(seq.items()[i].clone()),
            Position::End => Ok(seq.items().last().cloned().unwrap_or(Node::Null)),
        }
    }

    fn try_test(
        &self,
        target: &Node,
        _declared: &TypeDesc,
        segment: &str,
        _options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()> {
        let seq = as_seq(target)?;
        let position = resolve(seq, segment, SeqOp::Get)?;
        let converted = convert_item(seq, value)?;

        let index = match position {
            Position::Index(i) => i,
            Position::End => seq.len().saturating_sub(1),
        };
        let current = &seq.items()[index];
        if !json_text_equal(current, &converted) {
            return Err(StepFailure::msg(format!(
                "The current value '{current}' at position '{index}' is not equal to the test value '{value}'."
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(items: impl IntoIterator<Item = i64>) -> Node {
        Node::Seq(Sequence::of(
            TypeDesc::Int,
            items.into_iter().map(Node::Int),
        ))
    }

    fn seq_items(node: &Node) -> Vec<i64> {
        match node {
            Node::Seq(s) => s
                .items()
                .iter()
                .map(|n| match n {
                    Node::Int(i) => *i,
                    other => panic!("unexpected item {other:?}"),
                })
                .collect(),
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    const OPTS: &PatchOptions = &PatchOptions { key_policy: None };

    #[test]
    fn add_inserts_before_index() {
        let mut node = ints([1, 3]);
        SeqAdapter
            .try_add(&mut node, &TypeDesc::Any, "1", OPTS, &Node::Int(2))
            .unwrap();
        assert_eq!(seq_items(&node), [1, 2, 3]);
    }

    #[test]
    fn add_at_length_appends() {
        let mut node = ints([1]);
        SeqAdapter
            .try_add(&mut node, &TypeDesc::Any, "1", OPTS, &Node::Int(2))
            .unwrap();
        assert_eq!(seq_items(&node), [1, 2]);
    }

    #[test]
    fn add_with_end_marker_appends() {
        let mut node = ints([1]);
        SeqAdapter
            .try_add(&mut node, &TypeDesc::Any, "-", OPTS, &Node::Int(9))
            .unwrap();
        assert_eq!(seq_items(&node), [1, 9]);
    }

    #[test]
    fn add_past_length_is_out_of_bounds() {
        let mut node = ints([1]);
        let err = SeqAdapter
            .try_add(&mut node, &TypeDesc::Any, "3", OPTS, &Node::Int(9))
            .unwrap_err();
        assert!(err.message.unwrap().contains("out of bounds"));
    }

    #[test]
    fn negative_index_is_out_of_bounds() {
        let mut node = ints([1]);
        let err = SeqAdapter
            .try_add(&mut node, &TypeDesc::Any, "-1", OPTS, &Node::Int(9))
            .unwrap_err();
        assert!(err.message.unwrap().contains("out of bounds"));
    }

    #[test]
    fn non_numeric_segment_is_invalid() {
        let mut node = ints([1]);
        let err = SeqAdapter
            .try_remove(&mut node, &TypeDesc::Any, "first", OPTS)
            .unwrap_err();
        assert!(err.message.unwrap().contains("invalid for an array index"));
    }

    #[test]
    fn remove_with_end_marker_drops_last() {
        let mut node = ints([1, 2, 3]);
        SeqAdapter
            .try_remove(&mut node, &TypeDesc::Any, "-", OPTS)
            .unwrap();
        assert_eq!(seq_items(&node), [1, 2]);
    }

    #[test]
    fn end_marker_on_empty_is_out_of_bounds() {
        let mut node = ints([]);
        let err = SeqAdapter
            .try_remove(&mut node, &TypeDesc::Any, "-", OPTS)
            .unwrap_err();
        assert!(err.message.unwrap().contains("out of bounds"));
    }

    #[test]
    fn fixed_sequences_reject_mutation_but_allow_reads() {
        let mut node = Node::Seq(Sequence::fixed_of(TypeDesc::Int, [Node::Int(1)]));
        let err = SeqAdapter
            .try_add(&mut node, &TypeDesc::Any, "0", OPTS, &Node::Int(2))
            .unwrap_err();
        assert!(err.message.unwrap().contains("fixed size"));

        let got = SeqAdapter
            .try_get(&node, &TypeDesc::Any, "0", OPTS)
            .unwrap();
        assert_eq!(got, Node::Int(1));
    }

    #[test]
    fn add_converts_to_item_type() {
        let mut node = ints([1]);
        SeqAdapter
            .try_add(&mut node, &TypeDesc::Any, "-", OPTS, &Node::from("2"))
            .unwrap();
        assert_eq!(seq_items(&node), [1, 2]);

        let err = SeqAdapter
            .try_add(&mut node, &TypeDesc::Any, "-", OPTS, &Node::from("nope"))
            .unwrap_err();
        assert!(err.message.unwrap().contains("invalid for target location"));
    }

    #[test]
    fn test_compares_serialized_text() {
        let node = ints([5]);
        SeqAdapter
            .try_test(&node, &TypeDesc::Any, "0", OPTS, &Node::Int(5))
            .unwrap();
        let err = SeqAdapter
            .try_test(&node, &TypeDesc::Any, "0", OPTS, &Node::Int(6))
            .unwrap_err();
        let message = err.message.unwrap();
        assert!(message.contains("'5'") && message.contains("'6'"));
    }

    #[test]
    fn traverse_mismatched_shape_is_silent() {
        let mut node = Node::Int(1);
        let err = SeqAdapter
            .try_traverse(&mut node, &TypeDesc::Any, "0", OPTS)
            .unwrap_err();
        assert_eq!(err.message, None);
    }
}
