//! Error types for leafsig analysis.
//!
//! This module provides structured error handling using thiserror. Most
//! analysis dead-ends (an unresolvable call target, an undecodable address)
//! are ordinary `Option`s rather than errors; the variants below cover the
//! failures that actually abort an analysis session.

use thiserror::Error;

/// Main error type for leafsig operations.
#[derive(Debug, Error)]
pub enum LeafsigError {
    /// No known architecture profile matches the live register set. Fatal:
    /// every analyzer depends on the resolved profile.
    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    /// Invalid input data handed to the database fixture or an analyzer.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for leafsig operations
pub type Result<T> = std::result::Result<T, LeafsigError>;
