//! Argument-count inference from register use/def order.
//!
//! A register that is read before anything writes it must have carried a
//! value into the function, so it is an incoming argument; a register that is
//! written before any read cannot have been one. Tracking both sets over the
//! ordered argument registers of the calling convention yields an argument
//! count without any symbol or type information.
//!
//! This is a heuristic, not a proof: it assumes arguments are consumed before
//! their registers are reused as scratch, which holds for typical leaf
//! prologues but can misclassify functions with unusual register allocation.
//! Such functions still get a best-effort count rather than an error.

use std::collections::BTreeSet;

use crate::core::arch::ArchProfile;
use crate::core::database::DisassemblyDatabase;
use crate::core::function::FunctionSpan;

/// Count the incoming arguments of the function covering `span`.
///
/// Scans instructions sequentially from the function start, classifying each
/// argument register into one of two disjoint sets:
///
/// - read while not excluded: that register and every earlier-indexed
///   argument register are in use (the convention never skips a slot, so a
///   read of argument 2 implies arguments 0 and 1 exist too);
/// - written while not yet in use: that register and every later-indexed one
///   are excluded (a clobbered slot cannot carry a live incoming value, nor
///   can anything passed after it).
///
/// The scan stops early once every argument register is classified.
pub fn count_arguments(
    db: &dyn DisassemblyDatabase,
    profile: &ArchProfile,
    span: &FunctionSpan,
) -> usize {
    let total = profile.arg_register_count();
    let mut used: BTreeSet<usize> = BTreeSet::new();
    let mut excluded: BTreeSet<usize> = BTreeSet::new();

    let mut ea = span.start;
    while ea < span.end {
        if let Some(ins) = db.decode(ea) {
            // Reads first: a register consumed and redefined by the same
            // instruction is still an argument.
            for op in &ins.operands {
                if !op.is_register_like() || !op.is_read() {
                    continue;
                }
                let Some(index) = op.register.as_deref().and_then(|r| profile.arg_index(r)) else {
                    continue;
                };
                if !excluded.contains(&index) {
                    used.extend(0..=index);
                }
            }

            for op in &ins.operands {
                if !op.is_register_like() || !op.is_write() {
                    continue;
                }
                let Some(index) = op.register.as_deref().and_then(|r| profile.arg_index(r)) else {
                    continue;
                };
                if !used.contains(&index) {
                    excluded.extend(index..total);
                }
            }

            if used.len() + excluded.len() >= total {
                break;
            }
        }

        ea += profile.instruction_width;
    }

    used.len()
}
