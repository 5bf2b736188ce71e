//! Heuristic analysis passes over the disassembly database.
//!
//! The passes here perform approximate data-flow analysis over raw decoded
//! instructions with no symbol names and no calling-convention metadata to
//! lean on. Results are best-effort signatures, not proofs; the matcher
//! surfaces every prototype consistent with a signature rather than guessing
//! a single winner.

pub mod args;
pub mod candidates;
pub mod finders;
pub mod structure;
pub mod trace;
