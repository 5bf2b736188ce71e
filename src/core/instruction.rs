//! Instruction and Operand types for decoded assembly instructions.
//!
//! An [`Instruction`] is an explicit, immutable value describing one decoded
//! instruction at a specific address, as reported by the host disassembly
//! database. Successive decode calls never alias each other: every call
//! returns a fresh value, so analyzers can hold several decoded instructions
//! at once without hidden state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of operand slots the database reports per instruction.
pub const MAX_OPERANDS: usize = 6;

/// Types of operands that can appear in instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    /// Register operand
    Register,
    /// Immediate value operand
    Immediate,
    /// Register-indirect with displacement (e.g. `8($sp)`)
    Displacement,
    /// Register-indirect memory phrase (e.g. `($a1)`)
    Phrase,
    /// Direct memory reference
    Memory,
}

impl OperandKind {
    /// Operand kinds whose register field participates in use/def analysis.
    ///
    /// Displacement and phrase operands count through their base register:
    /// a store through `($a1)` still reads or clobbers `$a1` as far as the
    /// argument-register scans are concerned.
    pub fn is_register_like(&self) -> bool {
        matches!(
            self,
            OperandKind::Register | OperandKind::Displacement | OperandKind::Phrase
        )
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandKind::Register => write!(f, "Register"),
            OperandKind::Immediate => write!(f, "Immediate"),
            OperandKind::Displacement => write!(f, "Displacement"),
            OperandKind::Phrase => write!(f, "Phrase"),
            OperandKind::Memory => write!(f, "Memory"),
        }
    }
}

/// Access types for operands, mirroring the database's per-slot use/change
/// flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
    /// Read access ("use" flag set)
    Read,
    /// Write access ("change" flag set)
    Write,
    /// Read and write access (both flags set)
    ReadWrite,
}

impl Access {
    /// Check if this access reads the operand
    pub fn is_read(&self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    /// Check if this access writes the operand
    pub fn is_write(&self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => write!(f, "Read"),
            Access::Write => write!(f, "Write"),
            Access::ReadWrite => write!(f, "ReadWrite"),
        }
    }
}

/// Structured operand representation for instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operand {
    /// Type of operand
    pub kind: OperandKind,
    /// Access type for this operand slot
    pub access: Access,
    /// Register name (for register-like operands; the base register for
    /// displacement/phrase forms)
    pub register: Option<String>,
    /// Immediate or displacement value
    pub value: Option<i64>,
}

impl Operand {
    /// Create a new register operand
    pub fn register(name: impl Into<String>, access: Access) -> Self {
        Self {
            kind: OperandKind::Register,
            access,
            register: Some(name.into()),
            value: None,
        }
    }

    /// Create a new immediate operand
    pub fn immediate(value: i64) -> Self {
        Self {
            kind: OperandKind::Immediate,
            access: Access::Read,
            register: None,
            value: Some(value),
        }
    }

    /// Create a new displacement operand (`value(base)`)
    pub fn displacement(base: impl Into<String>, value: i64, access: Access) -> Self {
        Self {
            kind: OperandKind::Displacement,
            access,
            register: Some(base.into()),
            value: Some(value),
        }
    }

    /// Create a new phrase operand (`(base)`)
    pub fn phrase(base: impl Into<String>, access: Access) -> Self {
        Self {
            kind: OperandKind::Phrase,
            access,
            register: Some(base.into()),
            value: None,
        }
    }

    /// Check if this operand's register participates in use/def analysis
    pub fn is_register_like(&self) -> bool {
        self.kind.is_register_like()
    }

    /// Check if this operand slot is read
    pub fn is_read(&self) -> bool {
        self.access.is_read()
    }

    /// Check if this operand slot is written
    pub fn is_write(&self) -> bool {
        self.access.is_write()
    }
}

/// Decoded instruction at a specific address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Address where this instruction is located
    pub address: u64,
    /// Instruction mnemonic (e.g., "lw", "addiu", "jal")
    pub mnemonic: String,
    /// Structured operands
    pub operands: Vec<Operand>,
    /// Call-instruction classification from the database
    pub is_call: bool,
    /// True when this instruction ends a basic block
    pub ends_basic_block: bool,
}

impl Instruction {
    /// Create a new Instruction instance
    pub fn new(
        address: u64,
        mnemonic: impl Into<String>,
        operands: Vec<Operand>,
        is_call: bool,
        ends_basic_block: bool,
    ) -> Self {
        Self {
            address,
            mnemonic: mnemonic.into(),
            operands,
            is_call,
            ends_basic_block,
        }
    }

    /// Ordinary straight-line instruction
    pub fn plain(address: u64, mnemonic: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self::new(address, mnemonic, operands, false, false)
    }

    /// Call instruction
    pub fn call(address: u64, mnemonic: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self::new(address, mnemonic, operands, true, false)
    }

    /// Branch or other basic-block-ending instruction
    pub fn branch(address: u64, mnemonic: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self::new(address, mnemonic, operands, false, true)
    }

    /// Get the number of operands
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Register names read by this instruction, through register-like operands
    pub fn register_reads(&self) -> impl Iterator<Item = &str> {
        self.operands
            .iter()
            .filter(|op| op.is_register_like() && op.is_read())
            .filter_map(|op| op.register.as_deref())
    }

    /// Register names written by this instruction, through register-like
    /// operands
    pub fn register_writes(&self) -> impl Iterator<Item = &str> {
        self.operands
            .iter()
            .filter(|op| op.is_register_like() && op.is_write())
            .filter_map(|op| op.register.as_deref())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}: {}", self.address, self.mnemonic)
    }
}
