//! # Arm library.
//!
//! This library allows other crates in the workspace to access items defined inside the arm
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Trajectory playback - replays planned paths waypoint by waypoint and tracks the motion state
pub mod playback;

/// Command emitter - fans playback output out to the joint actuators and the status topic
pub mod emitter;

/// Planning service - the interface to the external motion planner
pub mod planning;

/// Request handling - answers direct joint, pose and state requests
pub mod request_handler;

/// Arm executable parameters
pub mod params;

/// Command server - publishes joint commands and the arm status
pub mod cmd_server;

/// Path client - recieves planned paths from the planning service
pub mod path_client;

/// Arm server - recieves requests from other software
pub mod arm_server;

// ------------------------------------------------------------------------------------------------
// TEST UTILITIES
// ------------------------------------------------------------------------------------------------
