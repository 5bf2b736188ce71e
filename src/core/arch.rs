//! Architecture profiles for register-argument calling conventions.
//!
//! A profile records which ordered registers carry the first N integer/pointer
//! arguments, how many delay slots follow a branch, and the fixed instruction
//! width. Every analyzer in this crate depends on a resolved profile, so
//! resolution failure is fatal for the whole session.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{LeafsigError, Result};

/// Architectures with a known calling-convention profile.
///
/// Adding support for a new fixed-width, register-passing architecture means
/// adding a variant here plus a row in the profile table; nothing else changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    /// MIPS (32-bit, o32 calling convention)
    Mips,
    /// ARM (32-bit, AAPCS)
    Arm,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::Mips => write!(f, "mips"),
            Arch::Arm => write!(f, "arm"),
        }
    }
}

/// Calling-convention profile for one supported architecture.
///
/// Immutable once resolved. The byte-accurate backward/forward scans in
/// `analysis` rely on `instruction_width` being fixed; variable-width
/// instruction sets cannot be described by a profile and are rejected at
/// resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchProfile {
    /// Which architecture this profile describes
    pub arch: Arch,
    /// Register names carrying arguments 0..N-1, in calling-convention order
    pub argument_registers: Vec<String>,
    /// Instructions that still execute after a branch/call before control
    /// actually transfers
    pub delay_slots: u64,
    /// Fixed instruction size in bytes
    pub instruction_width: u64,
}

/// Fixed, ordered table of known profiles. Resolution picks the first match.
static PROFILES: Lazy<Vec<ArchProfile>> = Lazy::new(|| {
    vec![
        ArchProfile {
            arch: Arch::Mips,
            argument_registers: ["$a0", "$a1", "$a2", "$a3"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            delay_slots: 1,
            instruction_width: 4,
        },
        ArchProfile {
            arch: Arch::Arm,
            argument_registers: ["R0", "R1", "R2", "R3"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            delay_slots: 0,
            instruction_width: 4,
        },
    ]
});

impl ArchProfile {
    /// Resolve a profile from the live register-name list of the current
    /// target.
    ///
    /// Iterates the fixed profile table in order and selects the first entry
    /// whose argument registers all appear in `register_names`. Matching by
    /// set containment cannot distinguish sub-variants that share register
    /// names (e.g. ARM vs. Thumb); the first table entry wins.
    pub fn resolve(register_names: &[String]) -> Result<ArchProfile> {
        for profile in PROFILES.iter() {
            let matched = profile
                .argument_registers
                .iter()
                .all(|arg| register_names.iter().any(|name| name == arg));
            if matched {
                debug!(arch = %profile.arch, "resolved architecture profile");
                return Ok(profile.clone());
            }
        }
        Err(LeafsigError::UnsupportedArchitecture(
            "no known profile matches the live register set".to_string(),
        ))
    }

    /// Index of `name` in the argument-register order, if it is one.
    pub fn arg_index(&self, name: &str) -> Option<usize> {
        self.argument_registers.iter().position(|r| r == name)
    }

    /// Number of argument-passing registers in this convention.
    pub fn arg_register_count(&self) -> usize {
        self.argument_registers.len()
    }

    /// Byte distance covered by the delay slots of one branch.
    pub fn delay_bytes(&self) -> u64 {
        self.delay_slots * self.instruction_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_mips() {
        let live = regs(&[
            "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3", "$t0", "$sp", "$ra",
        ]);
        let profile = ArchProfile::resolve(&live).unwrap();
        assert_eq!(profile.arch, Arch::Mips);
        assert_eq!(profile.delay_slots, 1);
        assert_eq!(profile.instruction_width, 4);
        assert_eq!(profile.arg_register_count(), 4);
    }

    #[test]
    fn test_resolve_arm() {
        let live = regs(&[
            "R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7", "SP", "LR", "PC",
        ]);
        let profile = ArchProfile::resolve(&live).unwrap();
        assert_eq!(profile.arch, Arch::Arm);
        assert_eq!(profile.delay_slots, 0);
        assert_eq!(profile.delay_bytes(), 0);
    }

    #[test]
    fn test_resolve_unknown_is_fatal() {
        let live = regs(&["rax", "rbx", "rcx", "rdx", "rsi", "rdi"]);
        let err = ArchProfile::resolve(&live).unwrap_err();
        assert!(matches!(err, LeafsigError::UnsupportedArchitecture(_)));
    }

    #[test]
    fn test_resolve_prefers_first_table_entry() {
        // A register list satisfying both profiles resolves to the earlier row.
        let live = regs(&["$a0", "$a1", "$a2", "$a3", "R0", "R1", "R2", "R3"]);
        let profile = ArchProfile::resolve(&live).unwrap();
        assert_eq!(profile.arch, Arch::Mips);
    }

    #[test]
    fn test_arg_index() {
        let live = regs(&["$a0", "$a1", "$a2", "$a3"]);
        let profile = ArchProfile::resolve(&live).unwrap();
        assert_eq!(profile.arg_index("$a0"), Some(0));
        assert_eq!(profile.arg_index("$a3"), Some(3));
        assert_eq!(profile.arg_index("$t0"), None);
    }

    #[test]
    fn test_delay_bytes_mips() {
        let live = regs(&["$a0", "$a1", "$a2", "$a3"]);
        let profile = ArchProfile::resolve(&live).unwrap();
        assert_eq!(profile.delay_bytes(), 4);
    }

    #[test]
    fn test_profile_serde_round_trip() {
        let live = regs(&["$a0", "$a1", "$a2", "$a3"]);
        let profile = ArchProfile::resolve(&live).unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        let back: ArchProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(profile, back);
    }
}
