//! Common test fixtures for integration tests.
//!
//! Builds small in-memory disassembly databases resembling what a host
//! project would expose for stripped MIPS/ARM binaries.

use leafsig::core::database::MemoryDatabase;
use leafsig::core::function::FunctionSpan;
use leafsig::core::instruction::{Access, Instruction, Operand};

/// Register list of a typical 32-bit MIPS processor module.
pub const MIPS_REGS: &[&str] = &[
    "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3", "$t0", "$t1", "$s0", "$sp", "$ra",
];

/// Register list of a typical 32-bit ARM processor module.
pub const ARM_REGS: &[&str] = &[
    "R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7", "SP", "LR", "PC",
];

/// Empty database advertising MIPS registers.
pub fn mips_database() -> MemoryDatabase {
    MemoryDatabase::with_registers(MIPS_REGS)
}

/// Empty database advertising ARM registers.
pub fn arm_database() -> MemoryDatabase {
    MemoryDatabase::with_registers(ARM_REGS)
}

/// Insert a leaf function at `start` whose body reads the first three
/// argument registers before writing anything, then returns.
pub fn add_three_arg_leaf(db: &mut MemoryDatabase, start: u64) -> FunctionSpan {
    let span = FunctionSpan::new(start, start + 0x10);
    db.add_function(span).expect("add function");
    db.add_instruction(Instruction::plain(
        start,
        "lbu",
        vec![
            Operand::register("$t0", Access::Write),
            Operand::phrase("$a0", Access::Read),
        ],
    ))
    .expect("add instruction");
    db.add_instruction(Instruction::plain(
        start + 4,
        "lbu",
        vec![
            Operand::register("$t1", Access::Write),
            Operand::phrase("$a1", Access::Read),
        ],
    ))
    .expect("add instruction");
    db.add_instruction(Instruction::plain(
        start + 8,
        "addu",
        vec![
            Operand::register("$v0", Access::Write),
            Operand::register("$a2", Access::Read),
        ],
    ))
    .expect("add instruction");
    db.add_instruction(Instruction::branch(start + 0xc, "jr", vec![]))
        .expect("add instruction");
    span
}
