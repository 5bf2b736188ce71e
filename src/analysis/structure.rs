//! Structural classification: leaf-ness and loop-ness.
//!
//! Both classifiers are deliberately shallow. Leaf detection is a single
//! linear pass looking for call instructions. Loop detection is a back-edge
//! approximation over basic-block boundaries: an incoming edge from an
//! address at or past a boundary, within the same function, is taken as a
//! loop. It cannot distinguish real loops from unusual forward-jump layouts,
//! which is acceptable for the short library routines being classified.

use crate::core::arch::ArchProfile;
use crate::core::database::DisassemblyDatabase;
use crate::core::function::FunctionSpan;

/// True iff no instruction in `[start, end]` is classified as a call.
pub fn is_leaf(db: &dyn DisassemblyDatabase, profile: &ArchProfile, span: &FunctionSpan) -> bool {
    let mut ea = span.start;
    while ea <= span.end {
        if let Some(ins) = db.decode(ea) {
            if ins.is_call {
                return false;
            }
        }
        ea += profile.instruction_width;
    }
    true
}

/// Back-edge approximation of "contains a loop".
///
/// The boundary set is the function start plus every basic-block end address
/// of its control-flow graph. Any cross-reference into a boundary that
/// originates at or past that boundary, from inside the same function, is
/// counted as a back-edge.
pub fn has_loop(db: &dyn DisassemblyDatabase, span: &FunctionSpan) -> bool {
    let mut boundaries = vec![span.start];
    boundaries.extend(db.basic_block_ends(span));

    for boundary in boundaries {
        for xref in db.xrefs_to(boundary) {
            let Some(source_fn) = db.function_at(xref.from) else {
                continue;
            };
            if source_fn.start == span.start && xref.from >= boundary {
                return true;
            }
        }
    }
    false
}
