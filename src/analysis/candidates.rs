//! Prototype-candidate matching.
//!
//! Two mutually exclusive matching modes per function. Leaf mode requires
//! the inferred argument count and loop flag to both agree with a catalog
//! entry. Format mode keys on the format-argument position alone, since that
//! is the only signal the format-string trace recovers reliably. Multiple
//! prototypes sharing a signature are all returned; the matcher never picks
//! a single winner.

use serde::{Deserialize, Serialize};

use crate::core::prototype::{catalog, CandidateSet, Prototype};

/// The facts inferred about one function, as input to matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Whether the function calls nothing else
    pub is_leaf: bool,
    /// Inferred incoming-argument count, when leaf inference ran
    pub argc: Option<usize>,
    /// Back-edge loop flag, when structural classification ran
    pub has_loop: Option<bool>,
    /// Argument slot observed receiving a format string, when discovered via
    /// format-string tracing
    pub format_arg: Option<usize>,
}

/// Match `signature` against the built-in prototype catalog.
pub fn match_candidates(signature: &Signature) -> CandidateSet {
    match_against(catalog(), signature)
}

/// Match `signature` against an explicit prototype table.
pub fn match_against(prototypes: &[Prototype], signature: &Signature) -> CandidateSet {
    let mut candidates = CandidateSet::new();

    for prototype in prototypes {
        let matched = match signature.format_arg {
            Some(position) => prototype.format_arg == Some(position),
            None => {
                signature.is_leaf
                    && prototype.format_arg.is_none()
                    && signature.argc == Some(prototype.argc)
                    && signature.has_loop == Some(prototype.has_loop)
            }
        };
        if matched {
            candidates.add(prototype.name);
        }
    }

    candidates
}
