//! Call-site tracing for argument-register writes.
//!
//! Given an instruction that loads an argument register, the tracer answers
//! "which function call is this write preparing an argument for?". That is
//! the primitive that lets a format-string literal be attributed to the
//! function consuming it: the instruction referencing the literal defines an
//! argument register, and the call it feeds is the format-string consumer.

use serde::{Deserialize, Serialize};

use crate::core::arch::ArchProfile;
use crate::core::database::DisassemblyDatabase;
use crate::core::function::FunctionSpan;

/// A resolved attribution of an argument-register write to a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedArgument {
    /// Entry address of the callee receiving the argument
    pub callee: u64,
    /// Argument slot being set up
    pub arg_index: usize,
    /// Name of the register carrying the argument
    pub register: String,
}

/// Trace the argument-register write at `addr` to the call it feeds.
///
/// The scan steps back by the delay-slot distance first: on delay-slot
/// architectures the write sits *after* the branch it belongs to in the
/// instruction stream. From there it advances one instruction width at a
/// time until it meets a call, whose first call-classified outgoing
/// cross-reference names the callee.
///
/// Returns `None` when `addr` does not define an argument register, when the
/// call target cannot be resolved (no guessing), or when a basic-block
/// boundary is reached before any call.
pub fn trace_definition(
    db: &dyn DisassemblyDatabase,
    profile: &ArchProfile,
    addr: u64,
) -> Option<TracedArgument> {
    let ins = db.decode(addr)?;
    let (arg_index, register) = ins
        .operands
        .iter()
        .filter(|op| op.is_register_like() && op.is_write())
        .find_map(|op| {
            let name = op.register.as_deref()?;
            Some((profile.arg_index(name)?, name.to_string()))
        })?;

    let mut ea = addr.saturating_sub(profile.delay_bytes());
    loop {
        let ins = db.decode(ea)?;
        if ins.is_call {
            let target = db
                .xrefs_from(ea)
                .into_iter()
                .find(|x| x.kind.is_call_transfer())?;
            return Some(TracedArgument {
                callee: target.to,
                arg_index,
                register,
            });
        }
        if ins.ends_basic_block {
            return None;
        }
        ea += profile.instruction_width;
    }
}

/// Argument types recoverable from call-site context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgType {
    /// The slot is loaded with the address of a string literal
    Str,
}

/// Backward scan window when sampling one call site, in instructions.
const SAMPLE_WINDOW: u64 = 10;

/// Minimum literal length before a string argument is trusted.
const MIN_SAMPLE_STRING_LEN: usize = 4;

/// Sample argument types observed at the call sites of a function.
///
/// For every call-classified cross-reference to `span.start`, walks backward
/// from the call (delay-slot adjusted) over a bounded window, stopping at
/// basic-block boundaries and at other calls. An argument slot whose
/// defining instruction carries a data reference to a sufficiently long
/// string literal is marked [`ArgType::Str`].
///
/// One slot vector per call site, in cross-reference order. Purely
/// observational today; no finder consumes it.
pub fn sample_argument_types(
    db: &dyn DisassemblyDatabase,
    profile: &ArchProfile,
    span: &FunctionSpan,
) -> Vec<Vec<Option<ArgType>>> {
    let mut samples = Vec::new();

    for xref in db.xrefs_to(span.start) {
        let call_ea = xref.from;
        let is_call_site = db.decode(call_ea).map(|i| i.is_call).unwrap_or(false);
        if !is_call_site {
            continue;
        }

        let mut args: Vec<Option<ArgType>> = vec![None; profile.arg_register_count()];
        let floor = call_ea.saturating_sub(profile.instruction_width * SAMPLE_WINDOW);
        let mut ea = call_ea + profile.delay_bytes();

        while ea >= floor {
            let Some(ins) = db.decode(ea) else { break };
            if ins.ends_basic_block || (ea != call_ea && ins.is_call) {
                break;
            }

            for op in &ins.operands {
                if !op.is_register_like() || !op.is_write() {
                    continue;
                }
                let Some(index) = op.register.as_deref().and_then(|r| profile.arg_index(r))
                else {
                    continue;
                };
                let loaded_string = db
                    .xrefs_from(ea)
                    .into_iter()
                    .filter(|x| x.kind.is_data())
                    .find_map(|x| db.string_at(x.to));
                if let Some(literal) = loaded_string {
                    if literal.len() > MIN_SAMPLE_STRING_LEN {
                        args[index] = Some(ArgType::Str);
                    }
                }
            }

            let Some(next) = ea.checked_sub(profile.instruction_width) else {
                break;
            };
            ea = next;
        }

        samples.push(args);
    }

    samples
}
