//! # Telecommand module
//!
//! This module provides the requests which other software can make of the arm executable, and
//! the responses the arm executable sends back.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arm_ctrl;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum TcParseError {
    #[error("Request contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Request is not valid UTF-8")]
    NonUtf8,
}
