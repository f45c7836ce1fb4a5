//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the arm software: the messages exchanged
//! with the planning service, the commands sent to the arm's actuators, and the networking layer
//! used to move them around.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm requests and responses (direct targets and pose queries)
pub mod tc;

/// Command and status definitions for equipment (the arm's joint actuators)
pub mod eqpt;

/// Messages exchanged with the external planning service
pub mod plan;

/// Network module
pub mod net;
