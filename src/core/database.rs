//! Read-only interface to the host disassembly database.
//!
//! The analyzers never mutate the database and never cache across queries; a
//! refresh simply reruns a finder against the live trait object. Hosts adapt
//! their own project model behind [`DisassemblyDatabase`]; [`MemoryDatabase`]
//! is a self-contained implementation used by the test suite and by embedders
//! that already hold a decoded view of the program.

use std::collections::BTreeMap;

use crate::core::function::FunctionSpan;
use crate::core::instruction::{Instruction, MAX_OPERANDS};
use crate::core::reference::Reference;
use crate::core::string_literal::StringLiteral;
use crate::error::{LeafsigError, Result};

/// Queries the core issues against the host's disassembly project.
///
/// All methods are read-only. `decode` returns a fresh immutable value per
/// call; implementations must not hand out views into shared mutable decoder
/// state.
pub trait DisassemblyDatabase {
    /// Register-name list of the current processor module.
    fn register_names(&self) -> &[String];

    /// All known function address ranges.
    fn functions(&self) -> Vec<FunctionSpan>;

    /// The function containing `addr`, if any.
    fn function_at(&self, addr: u64) -> Option<FunctionSpan>;

    /// Decode the instruction at `addr`. Reports at most
    /// [`MAX_OPERANDS`] operands per instruction.
    fn decode(&self, addr: u64) -> Option<Instruction>;

    /// Cross-references pointing at `addr`.
    fn xrefs_to(&self, addr: u64) -> Vec<Reference>;

    /// Cross-references originating at `addr`.
    fn xrefs_from(&self, addr: u64) -> Vec<Reference>;

    /// Basic-block end addresses of the function's control-flow graph.
    fn basic_block_ends(&self, span: &FunctionSpan) -> Vec<u64>;

    /// All string literals in the string pool.
    fn strings(&self) -> Vec<StringLiteral>;

    /// String literal starting at `addr`, if any.
    fn string_at(&self, addr: u64) -> Option<StringLiteral>;

    /// Symbolic name of `addr`, for display.
    fn name_at(&self, addr: u64) -> Option<String>;

    /// Address carrying the symbolic name `name` (navigation primitive).
    fn address_of_name(&self, name: &str) -> Option<u64>;
}

/// In-memory [`DisassemblyDatabase`] built from explicit inserts.
///
/// Keeps every index in sorted maps so enumeration order is deterministic.
/// Inserting a reference indexes both directions at once.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    registers: Vec<String>,
    functions: BTreeMap<u64, FunctionSpan>,
    instructions: BTreeMap<u64, Instruction>,
    refs_from: BTreeMap<u64, Vec<Reference>>,
    refs_to: BTreeMap<u64, Vec<Reference>>,
    block_ends: BTreeMap<u64, Vec<u64>>,
    strings: BTreeMap<u64, StringLiteral>,
    names: BTreeMap<u64, String>,
}

impl MemoryDatabase {
    /// Create an empty database advertising the given register names.
    pub fn new(registers: Vec<String>) -> Self {
        Self {
            registers,
            ..Self::default()
        }
    }

    /// Convenience constructor from string slices.
    pub fn with_registers(registers: &[&str]) -> Self {
        Self::new(registers.iter().map(|s| s.to_string()).collect())
    }

    /// Register a function address range.
    pub fn add_function(&mut self, span: FunctionSpan) -> Result<()> {
        if span.end < span.start {
            return Err(LeafsigError::InvalidInput(format!(
                "function end {:#x} precedes start {:#x}",
                span.end, span.start
            )));
        }
        self.functions.insert(span.start, span);
        Ok(())
    }

    /// Register a decoded instruction at its own address.
    pub fn add_instruction(&mut self, instruction: Instruction) -> Result<()> {
        if instruction.operands.len() > MAX_OPERANDS {
            return Err(LeafsigError::InvalidInput(format!(
                "instruction at {:#x} carries {} operands (max {})",
                instruction.address,
                instruction.operands.len(),
                MAX_OPERANDS
            )));
        }
        self.instructions.insert(instruction.address, instruction);
        Ok(())
    }

    /// Register a cross-reference, indexing both directions.
    pub fn add_reference(&mut self, reference: Reference) {
        self.refs_from
            .entry(reference.from)
            .or_default()
            .push(reference);
        self.refs_to
            .entry(reference.to)
            .or_default()
            .push(reference);
    }

    /// Register a string literal.
    pub fn add_string(&mut self, literal: StringLiteral) {
        self.strings.insert(literal.address, literal);
    }

    /// Record the basic-block end addresses for the function starting at
    /// `function_start`.
    pub fn set_block_ends(&mut self, function_start: u64, ends: Vec<u64>) {
        self.block_ends.insert(function_start, ends);
    }

    /// Assign a display name to an address.
    pub fn set_name(&mut self, addr: u64, name: impl Into<String>) {
        self.names.insert(addr, name.into());
    }
}

impl DisassemblyDatabase for MemoryDatabase {
    fn register_names(&self) -> &[String] {
        &self.registers
    }

    fn functions(&self) -> Vec<FunctionSpan> {
        self.functions.values().copied().collect()
    }

    fn function_at(&self, addr: u64) -> Option<FunctionSpan> {
        self.functions
            .range(..=addr)
            .next_back()
            .map(|(_, span)| *span)
            .filter(|span| span.contains(addr) || span.start == addr)
    }

    fn decode(&self, addr: u64) -> Option<Instruction> {
        self.instructions.get(&addr).cloned()
    }

    fn xrefs_to(&self, addr: u64) -> Vec<Reference> {
        self.refs_to.get(&addr).cloned().unwrap_or_default()
    }

    fn xrefs_from(&self, addr: u64) -> Vec<Reference> {
        self.refs_from.get(&addr).cloned().unwrap_or_default()
    }

    fn basic_block_ends(&self, span: &FunctionSpan) -> Vec<u64> {
        self.block_ends
            .get(&span.start)
            .cloned()
            .unwrap_or_else(|| vec![span.end])
    }

    fn strings(&self) -> Vec<StringLiteral> {
        self.strings.values().cloned().collect()
    }

    fn string_at(&self, addr: u64) -> Option<StringLiteral> {
        self.strings.get(&addr).cloned()
    }

    fn name_at(&self, addr: u64) -> Option<String> {
        self.names.get(&addr).cloned()
    }

    fn address_of_name(&self, name: &str) -> Option<u64> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(addr, _)| *addr)
    }
}
