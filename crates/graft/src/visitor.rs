//! Path walker: locates the penultimate node of a parsed path.

use graft_json_pointer::ParsedPath;

use crate::adapters::{select, Adapter, StepFailure};
use crate::node::Node;
use crate::options::PatchOptions;
use crate::schema::TypeDesc;

/// Walk all but the last segment of `path`, returning the penultimate node,
/// its effective declared type, and the accessor selected for it.
///
/// A null root and a null interior node fail silently (no message): absence
/// is not a data error by itself, and reporting substitutes a default text
/// later. The final segment is deliberately not validated here — whether
/// the terminal member must exist depends on the operation (add may target
/// a member that does not exist yet, remove may not).
pub(crate) fn visit<'a>(
    mut target: &'a mut Node,
    mut declared: TypeDesc,
    path: &ParsedPath,
    options: &PatchOptions,
) -> Result<(&'a mut Node, TypeDesc, &'static dyn Adapter), StepFailure> {
    if target.is_null() {
        return Err(StepFailure::silent());
    }

    let mut adapter = select(target, &declared);
    let segments = path.segments();
    let hops = segments.len().saturating_sub(1);

    for segment in &segments[..hops] {
        let next = adapter.try_traverse(target, &declared, segment, options)?;

        // A null interior node stops the walk without a message.
        if next.is_null() {
            return Err(StepFailure::silent());
        }

        // The next node's shape may differ, so re-select.
        declared = next.runtime_type();
        target = next;
        adapter = select(target, &declared);
    }

    Ok((target, declared, adapter))
}
