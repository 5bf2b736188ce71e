//! Cross-reference types.
//!
//! A Reference is a directed edge between two addresses, as indexed by the
//! host database: call edges, branch edges, and data reads. The tracer only
//! trusts call-classified edges when attributing an argument write to a
//! callee.

use serde::{Deserialize, Serialize};

/// Classification of a cross-reference edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// Direct (far) call to a resolved target
    Call,
    /// Near call to a resolved target
    NearCall,
    /// Unconditional jump
    Jump,
    /// Conditional branch
    Branch,
    /// Data read
    Read,
    /// Other data reference (e.g. an address loaded as an operand)
    Data,
}

impl ReferenceKind {
    /// True for the edge kinds accepted as evidence of a resolved call target.
    pub fn is_call_transfer(&self) -> bool {
        matches!(self, ReferenceKind::Call | ReferenceKind::NearCall)
    }

    /// True for data-flavored references (string loads and the like).
    pub fn is_data(&self) -> bool {
        matches!(self, ReferenceKind::Read | ReferenceKind::Data)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReferenceKind::Call => "call",
            ReferenceKind::NearCall => "near_call",
            ReferenceKind::Jump => "jump",
            ReferenceKind::Branch => "branch",
            ReferenceKind::Read => "read",
            ReferenceKind::Data => "data",
        }
    }
}

/// A directed cross-reference between two addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Source address where the reference originates
    pub from: u64,
    /// Target address
    pub to: u64,
    /// Kind of the reference
    pub kind: ReferenceKind,
}

impl Reference {
    pub fn new(from: u64, to: u64, kind: ReferenceKind) -> Self {
        Self { from, to, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_transfer_kinds() {
        assert!(ReferenceKind::Call.is_call_transfer());
        assert!(ReferenceKind::NearCall.is_call_transfer());
        assert!(!ReferenceKind::Jump.is_call_transfer());
        assert!(!ReferenceKind::Branch.is_call_transfer());
        assert!(!ReferenceKind::Data.is_call_transfer());
    }

    #[test]
    fn test_data_kinds() {
        assert!(ReferenceKind::Read.is_data());
        assert!(ReferenceKind::Data.is_data());
        assert!(!ReferenceKind::Call.is_data());
    }

    #[test]
    fn test_kind_as_str() {
        assert_eq!(ReferenceKind::Call.as_str(), "call");
        assert_eq!(ReferenceKind::NearCall.as_str(), "near_call");
        assert_eq!(ReferenceKind::Branch.as_str(), "branch");
    }

    #[test]
    fn test_reference_new() {
        let r = Reference::new(0x1000, 0x2000, ReferenceKind::Call);
        assert_eq!(r.from, 0x1000);
        assert_eq!(r.to, 0x2000);
        assert_eq!(r.kind, ReferenceKind::Call);
    }
}
