//! Error types for LocaStor

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in LocaStor
///
/// The cache itself is infallible once constructed: misses, revision
/// mismatches and unreachable peers are expressed as empty results, never as
/// errors. The only failure point is configuration at construction time.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

// =============================================================================
// Tests
// =============================================================================
