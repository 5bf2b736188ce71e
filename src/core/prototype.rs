//! The catalog of known standard-library prototypes.
//!
//! Each entry records the signature facts the analyzers can actually recover
//! from a stripped binary: argument count, whether the body is expected to
//! contain a loop, and (for the stdio family) which argument slot receives
//! the format string. Names are unique today, but match results are kept as
//! occurrence counts so a catalog with duplicate names keeps working.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One known function signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prototype {
    /// Function name to suggest when the signature matches
    pub name: &'static str,
    /// Number of incoming arguments
    pub argc: usize,
    /// Whether the implementation is expected to contain a loop
    pub has_loop: bool,
    /// Argument slot receiving a format string, for format-consuming functions
    pub format_arg: Option<usize>,
}

impl Prototype {
    /// Leaf-matchable prototype. Every cataloged leaf routine iterates over
    /// its input, so the loop flag defaults to true.
    pub const fn leaf(name: &'static str, argc: usize) -> Self {
        Self {
            name,
            argc,
            has_loop: true,
            format_arg: None,
        }
    }

    /// Format-consuming prototype, matched by format-argument position only.
    pub const fn format(name: &'static str, argc: usize, format_arg: usize) -> Self {
        Self {
            name,
            argc,
            has_loop: true,
            format_arg: Some(format_arg),
        }
    }

    /// Override the loop expectation (builder form, for custom tables).
    pub const fn with_loop(mut self, has_loop: bool) -> Self {
        self.has_loop = has_loop;
        self
    }

    /// True when this prototype consumes a format string.
    pub fn is_format(&self) -> bool {
        self.format_arg.is_some()
    }
}

/// The fixed prototype table.
static PROTOTYPES: Lazy<Vec<Prototype>> = Lazy::new(|| {
    vec![
        Prototype::leaf("atoi", 1),
        Prototype::leaf("strlen", 1),
        Prototype::leaf("strcpy", 2),
        Prototype::leaf("strcat", 2),
        Prototype::leaf("strcmp", 2),
        Prototype::leaf("strstr", 2),
        Prototype::leaf("strchr", 2),
        Prototype::leaf("strrchr", 2),
        Prototype::leaf("bzero", 2),
        Prototype::leaf("strtol", 3),
        Prototype::leaf("strncpy", 3),
        Prototype::leaf("strncmp", 3),
        Prototype::leaf("memcpy", 3),
        Prototype::leaf("memmove", 3),
        Prototype::leaf("bcopy", 3),
        Prototype::leaf("memcmp", 3),
        Prototype::leaf("memset", 3),
        Prototype::format("printf", 1, 0),
        Prototype::format("sprintf", 2, 1),
        Prototype::format("snprintf", 3, 2),
        Prototype::format("fprintf", 2, 1),
        Prototype::format("fscanf", 2, 1),
        Prototype::format("sscanf", 2, 1),
    ]
});

/// The full catalog, in table order.
pub fn catalog() -> &'static [Prototype] {
    &PROTOTYPES
}

/// Prototype names matched for one analyzed function, with occurrence counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    counts: BTreeMap<String, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one match for `name`.
    pub fn add(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Number of distinct candidate names.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Occurrence count for one name.
    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Candidate names in deterministic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(|s| s.as_str())
    }

    /// Comma-joined candidate names for display.
    pub fn join(&self) -> String {
        self.names().collect::<Vec<_>>().join(",")
    }
}

impl fmt::Display for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join())
    }
}
