//! Result-set orchestrators: the leaf-function and format-string scans.
//!
//! Each finder resolves the architecture profile once (failure is fatal for
//! the session), enumerates the database, drives the analyzers, and builds a
//! ranked, immutable result set. Refreshing means running the finder again
//! and discarding the previous results; nothing is cached or updated in
//! place.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::candidates::{match_against, Signature};
use crate::analysis::{args, structure, trace};
use crate::core::arch::ArchProfile;
use crate::core::database::DisassemblyDatabase;
use crate::core::function::FunctionSpan;
use crate::core::prototype::{catalog, CandidateSet, Prototype};
use crate::error::Result;

/// Everything inferred about one function during a scan.
///
/// Constructed once per discovered function per query and never mutated
/// afterwards. The argument count and the format-argument position are
/// independent fields: a function found by the format-string scan has a
/// position but no inferred count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedFunction {
    /// Function start address
    pub start: u64,
    /// Function end address (exclusive); equals `start` when the database
    /// has no bounds for a traced callee
    pub end: u64,
    /// Display name: the database symbol, or a `sub_…` placeholder
    pub name: String,
    /// True iff the function calls no other function
    pub is_leaf: bool,
    /// Back-edge loop flag, when structural classification ran
    pub has_loop: Option<bool>,
    /// Inferred incoming-argument count, when leaf inference ran
    pub argument_count: Option<usize>,
    /// Argument slot receiving the matched format string, when discovered by
    /// the format-string scan
    pub format_arg: Option<usize>,
    /// Number of cross-references to the function start, used for ranking
    pub xref_count: usize,
    /// Prototype names consistent with the inferred signature
    pub candidates: CandidateSet,
}

impl AnalyzedFunction {
    /// Build a leaf-mode entry for a function with known bounds.
    pub fn new_leaf(
        db: &dyn DisassemblyDatabase,
        span: FunctionSpan,
        argument_count: usize,
        has_loop: bool,
        prototypes: &[Prototype],
    ) -> Self {
        let signature = Signature {
            is_leaf: true,
            argc: Some(argument_count),
            has_loop: Some(has_loop),
            format_arg: None,
        };
        Self {
            start: span.start,
            end: span.end,
            name: display_name(db, span.start),
            is_leaf: true,
            has_loop: Some(has_loop),
            argument_count: Some(argument_count),
            format_arg: None,
            xref_count: db.xrefs_to(span.start).len(),
            candidates: match_against(prototypes, &signature),
        }
    }

    /// Build a format-mode entry for a callee discovered by tracing.
    pub fn new_format(
        db: &dyn DisassemblyDatabase,
        callee: u64,
        format_arg: usize,
        prototypes: &[Prototype],
    ) -> Self {
        let span = db
            .function_at(callee)
            .unwrap_or_else(|| FunctionSpan::new(callee, callee));
        let signature = Signature {
            is_leaf: false,
            argc: None,
            has_loop: None,
            format_arg: Some(format_arg),
        };
        Self {
            start: callee,
            end: span.end,
            name: display_name(db, callee),
            is_leaf: false,
            has_loop: None,
            argument_count: None,
            format_arg: Some(format_arg),
            xref_count: db.xrefs_to(callee).len(),
            candidates: match_against(prototypes, &signature),
        }
    }
}

fn display_name(db: &dyn DisassemblyDatabase, addr: u64) -> String {
    db.name_at(addr)
        .unwrap_or_else(|| format!("sub_{:x}", addr))
}

/// Sort descending by cross-reference count. The sort is stable, so ties
/// keep their discovery order.
fn rank(results: &mut [AnalyzedFunction]) {
    results.sort_by(|a, b| b.xref_count.cmp(&a.xref_count));
}

/// Scans for functions that call no other function and matches their
/// inferred signatures against the catalog.
pub struct LeafFunctionFinder;

impl LeafFunctionFinder {
    /// Enumerate every function, keep the leaves, and rank them.
    pub fn run(db: &dyn DisassemblyDatabase) -> Result<Vec<AnalyzedFunction>> {
        Self::run_with_catalog(db, catalog())
    }

    /// Same scan, matched against an explicit prototype table.
    pub fn run_with_catalog(
        db: &dyn DisassemblyDatabase,
        prototypes: &[Prototype],
    ) -> Result<Vec<AnalyzedFunction>> {
        let profile = ArchProfile::resolve(db.register_names())?;
        let mut results = Vec::new();

        for span in db.functions() {
            if !structure::is_leaf(db, &profile, &span) {
                continue;
            }
            let has_loop = structure::has_loop(db, &span);
            let argument_count = args::count_arguments(db, &profile, &span);
            results.push(AnalyzedFunction::new_leaf(
                db,
                span,
                argument_count,
                has_loop,
                prototypes,
            ));
        }

        rank(&mut results);
        debug!(count = results.len(), "leaf scan complete");
        Ok(results)
    }
}

/// Scans string literals containing `%` and traces each referencing
/// instruction to the function consuming the string as an argument.
pub struct FormatStringFunctionFinder;

impl FormatStringFunctionFinder {
    /// Enumerate `%`-strings, trace their uses, and rank the callees found.
    pub fn run(db: &dyn DisassemblyDatabase) -> Result<Vec<AnalyzedFunction>> {
        Self::run_with_catalog(db, catalog())
    }

    /// Same scan, matched against an explicit prototype table.
    pub fn run_with_catalog(
        db: &dyn DisassemblyDatabase,
        prototypes: &[Prototype],
    ) -> Result<Vec<AnalyzedFunction>> {
        let profile = ArchProfile::resolve(db.register_names())?;
        let mut seen: BTreeSet<u64> = BTreeSet::new();
        let mut results = Vec::new();

        for literal in db.strings() {
            if !literal.contains_percent() {
                continue;
            }
            for xref in db.xrefs_to(literal.address) {
                let Some(traced) = trace::trace_definition(db, &profile, xref.from) else {
                    continue;
                };
                if seen.insert(traced.callee) {
                    results.push(AnalyzedFunction::new_format(
                        db,
                        traced.callee,
                        traced.arg_index,
                        prototypes,
                    ));
                }
            }
        }

        rank(&mut results);
        debug!(count = results.len(), "format-string scan complete");
        Ok(results)
    }
}

/// One row of the presentation contract. Unset values render as `"*"`; the
/// third column carries the inferred argument count for leaf results and the
/// format-string argument index for format results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Function start address, for the navigate-on-select action
    pub start: u64,
    pub name: String,
    pub xrefs: String,
    pub argc: String,
    pub has_loop: String,
    pub candidates: String,
}

/// Render a ranked result set into display rows.
pub fn rows(results: &[AnalyzedFunction]) -> Vec<ResultRow> {
    results
        .iter()
        .map(|f| ResultRow {
            start: f.start,
            name: f.name.clone(),
            xrefs: if f.xref_count > 0 {
                f.xref_count.to_string()
            } else {
                "*".to_string()
            },
            argc: f
                .argument_count
                .or(f.format_arg)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "*".to_string()),
            has_loop: f
                .has_loop
                .map(|v| v.to_string())
                .unwrap_or_else(|| "*".to_string()),
            candidates: f.candidates.join(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::MemoryDatabase;
    use crate::core::instruction::{Access, Instruction, Operand};
    use crate::core::reference::{Reference, ReferenceKind};
    use crate::core::string_literal::StringLiteral;
    use crate::error::LeafsigError;

    const MIPS_REGS: &[&str] = &[
        "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3", "$t0", "$sp", "$ra",
    ];

    /// A three-instruction leaf body reading `$a0..$a2` before any writes.
    fn add_leaf_body(db: &mut MemoryDatabase, start: u64) {
        db.add_instruction(Instruction::plain(
            start,
            "lbu",
            vec![
                Operand::register("$t0", Access::Write),
                Operand::phrase("$a0", Access::Read),
            ],
        ))
        .unwrap();
        db.add_instruction(Instruction::plain(
            start + 4,
            "lbu",
            vec![
                Operand::register("$v0", Access::Write),
                Operand::phrase("$a1", Access::Read),
            ],
        ))
        .unwrap();
        db.add_instruction(Instruction::plain(
            start + 8,
            "addu",
            vec![
                Operand::register("$v1", Access::Write),
                Operand::register("$a2", Access::Read),
            ],
        ))
        .unwrap();
    }

    #[test]
    fn test_leaf_finder_unsupported_architecture_is_fatal() {
        let db = MemoryDatabase::with_registers(&["rax", "rbx"]);
        let err = LeafFunctionFinder::run(&db).unwrap_err();
        assert!(matches!(err, LeafsigError::UnsupportedArchitecture(_)));
    }

    #[test]
    fn test_leaf_finder_skips_non_leaves() {
        let mut db = MemoryDatabase::with_registers(MIPS_REGS);
        db.add_function(FunctionSpan::new(0x1000, 0x100c)).unwrap();
        add_leaf_body(&mut db, 0x1000);
        db.add_function(FunctionSpan::new(0x2000, 0x2008)).unwrap();
        db.add_instruction(Instruction::call(
            0x2000,
            "jal",
            vec![Operand::immediate(0x1000)],
        ))
        .unwrap();

        let results = LeafFunctionFinder::run(&db).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].start, 0x1000);
        assert!(results[0].is_leaf);
    }

    #[test]
    fn test_leaf_finder_ranks_by_xref_count() {
        let mut db = MemoryDatabase::with_registers(MIPS_REGS);
        db.add_function(FunctionSpan::new(0x1000, 0x100c)).unwrap();
        add_leaf_body(&mut db, 0x1000);
        db.add_function(FunctionSpan::new(0x2000, 0x200c)).unwrap();
        add_leaf_body(&mut db, 0x2000);

        // 0x2000 referenced twice, 0x1000 once.
        db.add_reference(Reference::new(0x3000, 0x2000, ReferenceKind::Call));
        db.add_reference(Reference::new(0x3010, 0x2000, ReferenceKind::Call));
        db.add_reference(Reference::new(0x3020, 0x1000, ReferenceKind::Call));

        let results = LeafFunctionFinder::run(&db).unwrap();
        let starts: Vec<u64> = results.iter().map(|f| f.start).collect();
        assert_eq!(starts, vec![0x2000, 0x1000]);
        assert_eq!(results[0].xref_count, 2);
    }

    #[test]
    fn test_leaf_finder_tie_preserves_discovery_order() {
        let mut db = MemoryDatabase::with_registers(MIPS_REGS);
        for start in [0x1000u64, 0x2000, 0x3000] {
            db.add_function(FunctionSpan::new(start, start + 0xc)).unwrap();
            add_leaf_body(&mut db, start);
        }

        let results = LeafFunctionFinder::run(&db).unwrap();
        let starts: Vec<u64> = results.iter().map(|f| f.start).collect();
        assert_eq!(starts, vec![0x1000, 0x2000, 0x3000]);
    }

    #[test]
    fn test_format_finder_dedupes_callees() {
        let mut db = MemoryDatabase::with_registers(MIPS_REGS);
        db.add_function(FunctionSpan::new(0x4000, 0x4020)).unwrap();

        // Two distinct format strings, both traced into 0x4000.
        for (string_addr, site) in [(0x5000u64, 0x1000u64), (0x5010, 0x2000)] {
            db.add_string(StringLiteral::new(string_addr, "%d\n"));
            db.add_instruction(Instruction::call(
                site,
                "jal",
                vec![Operand::immediate(0x4000)],
            ))
            .unwrap();
            db.add_instruction(Instruction::plain(
                site + 4,
                "addiu",
                vec![
                    Operand::register("$a1", Access::Write),
                    Operand::immediate(string_addr as i64),
                ],
            ))
            .unwrap();
            db.add_reference(Reference::new(site + 4, string_addr, ReferenceKind::Data));
            db.add_reference(Reference::new(site, 0x4000, ReferenceKind::NearCall));
        }

        let results = FormatStringFunctionFinder::run(&db).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].start, 0x4000);
        assert_eq!(results[0].format_arg, Some(1));
        assert_eq!(results[0].argument_count, None);
    }

    #[test]
    fn test_format_finder_ignores_plain_strings() {
        let mut db = MemoryDatabase::with_registers(MIPS_REGS);
        db.add_string(StringLiteral::new(0x5000, "hello"));
        db.add_reference(Reference::new(0x1000, 0x5000, ReferenceKind::Data));

        assert!(FormatStringFunctionFinder::run(&db).unwrap().is_empty());
    }

    #[test]
    fn test_rows_render_unset_as_star() {
        let mut db = MemoryDatabase::with_registers(MIPS_REGS);
        db.add_function(FunctionSpan::new(0x1000, 0x100c)).unwrap();
        add_leaf_body(&mut db, 0x1000);

        let results = LeafFunctionFinder::run(&db).unwrap();
        let rendered = rows(&results);
        assert_eq!(rendered.len(), 1);
        // No xrefs recorded: the count renders as "*".
        assert_eq!(rendered[0].xrefs, "*");
        assert_eq!(rendered[0].argc, "3");
        assert_eq!(rendered[0].has_loop, "false");
        assert_eq!(rendered[0].name, "sub_1000");
        assert_eq!(rendered[0].start, 0x1000);
    }

    #[test]
    fn test_rows_use_database_symbol_names() {
        let mut db = MemoryDatabase::with_registers(MIPS_REGS);
        db.add_function(FunctionSpan::new(0x1000, 0x100c)).unwrap();
        add_leaf_body(&mut db, 0x1000);
        db.set_name(0x1000, "maybe_memcpy");

        let results = LeafFunctionFinder::run(&db).unwrap();
        assert_eq!(results[0].name, "maybe_memcpy");
        assert_eq!(db.address_of_name("maybe_memcpy"), Some(0x1000));
    }
}
