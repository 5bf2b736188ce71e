//! Leafsig identifies unnamed, statically-linked standard-library functions
//! (`strcpy`, `memcmp`, `printf`, ...) inside stripped binaries.
//!
//! The analysis only works for fixed-instruction-width architectures that pass
//! function arguments in registers (MIPS, ARM, and friends). It infers each
//! function's argument count and argument roles from register use/def patterns
//! in the instruction stream, then matches the inferred signature against a
//! catalog of known prototypes. Results are ranked, multi-candidate, and
//! deliberately unarbitrated: the engine reports every prototype consistent
//! with what it observed and leaves the final call to the analyst.
//!
//! Instruction decoding, control-flow graphs, and cross-reference indexing are
//! supplied by an external disassembly database behind the
//! [`core::database::DisassemblyDatabase`] trait; this crate only queries it.

/// Heuristic analyzers and result-set orchestrators
pub mod analysis;
/// Core data types and the disassembly database interface
pub mod core;
/// Error types
pub mod error;
/// Logging and tracing infrastructure
pub mod logging;

pub use error::{LeafsigError, Result};
