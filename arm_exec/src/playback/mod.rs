//! Trajectory playback module
//!
//! Replays planned joint trajectories waypoint by waypoint at the cycle rate, and tracks whether
//! the arm is currently moving so that overlapping motions can be refused.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod ingest;
mod motion_state;
mod params;
mod state;
mod waypoint_buffer;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use ingest::*;
pub use motion_state::*;
pub use params::*;
pub use state::*;
pub use waypoint_buffer::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during playback.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("Invalid trajectory: {0}")]
    InvalidTrajectory(String),

    #[error("The arm is already executing a trajectory, overlapping motion rejected")]
    OverlappingMotionRejected,

    #[error("Playback cursor ({step_index}) is outside of the loaded trajectory ({waypoint_count} waypoints)")]
    CursorOutOfRange {
        step_index: usize,
        waypoint_count: usize,
    },

    #[error("The joint count must be at least 1")]
    NoJoints,
}
