//! Parameters structure for playback

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Marker found in the joint names of gripper trajectories.
pub const DEFAULT_GRIPPER_MARKER: &str = "grip";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Number of arm joints. Every waypoint of a loaded trajectory has exactly this many
    /// positions.
    pub joint_num: usize,

    /// Planned paths whose first joint name contains this marker belong to the gripper and are
    /// not replayed.
    #[serde(default = "default_gripper_marker")]
    pub gripper_marker: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            joint_num: 4,
            gripper_marker: default_gripper_marker(),
        }
    }
}

fn default_gripper_marker() -> String {
    DEFAULT_GRIPPER_MARKER.into()
}
