//! Consolidation: removal of provably redundant nesting.
//!
//! The pass traverses a [`ProgramGraph`] depth-first and breaks down every
//! nested graph that has no effect on the final sequencing or scheduling of
//! the instructions:
//!
//! - an empty nested graph is removed entirely, with its predecessors
//!   reconnected directly to its successors;
//! - a sequentially aligned nested graph inside a sequentially aligned
//!   parent is inlined via subgraph substitution;
//! - a single-element nested graph with left, right, or sequential
//!   alignment is replaced by its element in place.
//!
//! Equispaced and callback alignments are position-dependent and are never
//! simplified. The pass must run while the graph is still unscheduled,
//! strictly before the external scheduling pass, and is idempotent.
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{Element, ProgramGraph};

/// Consolidate redundant nesting in `program`, in place.
///
/// Fails with [`Error::AlreadyScheduled`] if the graph or any nested graph
/// has an assigned start time; the failing subgraph is left untouched
/// (atomicity is per subgraph, not whole tree).
pub fn consolidate(program: &mut ProgramGraph) -> Result<()> {
    consolidate_recursion(program)
}

fn consolidate_recursion(program: &mut ProgramGraph) -> Result<()> {
    if program.has_scheduled_nodes() {
        return Err(Error::AlreadyScheduled(
            "can not consolidate a program that is already scheduled; run consolidation \
             before scheduling"
                .into(),
        ));
    }

    // Snapshot of ids: nodes spliced in below were consolidated during the
    // recursion into their graph and need no second visit.
    for id in program.node_ids() {
        // A collapse can expose another nested graph at the same node, so
        // the rules re-run on the id until none fires.
        loop {
            {
                let Some(Element::Nested(sub)) = program.element_mut(id) else {
                    break;
                };
                consolidate_recursion(sub)?;
            }

            let (count, sub_sequential, sub_collapses) = {
                let Some(Element::Nested(sub)) = program.element(id) else {
                    break;
                };
                (
                    sub.element_count(),
                    sub.alignment().is_sequential(),
                    sub.alignment().collapses_single(),
                )
            };

            // Checked after the recursion so that a child emptied by it is
            // removed in the same run, keeping the pass idempotent.
            if count == 0 {
                debug!(node = id.index(), "removing empty nested program");
                program.remove_node_retain_edges(id)?;
                break;
            }

            // Inlining takes priority over single-element collapse when both
            // apply.
            if sub_sequential && program.alignment().is_sequential() {
                debug!(node = id.index(), "inlining sequential nested program");
                program.inline_nested(id)?;
                break;
            }

            if sub_collapses && count == 1 {
                debug!(node = id.index(), "collapsing single-element nested program");
                if let Some(slot) = program.element_mut(id) {
                    if let Element::Nested(sub) = slot {
                        let inner = sub.take_sole_element()?;
                        *slot = inner;
                    }
                }
                continue;
            }

            break;
        }
    }

    Ok(())
}
