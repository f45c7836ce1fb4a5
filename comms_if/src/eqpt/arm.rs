//! # Arm Equipment Commands
//!
//! Per-joint position commands and the coarse arm status which are published by the arm
//! executable on every cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Prefix of every arm joint name, the joint number (starting at 1) follows it.
pub const JOINT_NAME_PREFIX: &str = "joint";

/// Topic suffix on which the arm status is published.
pub const STATUS_TOPIC: &str = "state";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single position demand for one joint actuator.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct JointCmd {
    /// The demanded position of the joint.
    ///
    /// Units: radians
    pub pos_rad: f64,
}

/// Coarse state of the manipulator, published every cycle regardless of motion.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmStatus {
    /// State of the gripper. This executable never moves the gripper so it always reports
    /// [`ActState::Stopped`].
    pub gripper: ActState,

    /// State of the arm, mirrors the playback motion state.
    pub arm: ActState,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Motion state of an actuator group.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActState {
    Stopped,
    IsMoving,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmStatus {
    /// Status reported while no trajectory is being played back.
    pub fn stopped() -> Self {
        Self {
            gripper: ActState::Stopped,
            arm: ActState::Stopped,
        }
    }

    /// Status reported while a trajectory is being played back.
    pub fn moving() -> Self {
        Self {
            gripper: ActState::Stopped,
            arm: ActState::IsMoving,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Name of the joint at the given zero-based index, i.e. `joint1` for index 0.
pub fn joint_name(index: usize) -> String {
    format!("{}{}", JOINT_NAME_PREFIX, index + 1)
}

/// Topic on which position commands for the given joint are published.
pub fn joint_cmd_topic(robot_name: &str, joint_name: &str) -> String {
    format!("{}/{}_position/command", robot_name, joint_name)
}

/// Topic on which the arm status is published.
pub fn status_topic(robot_name: &str) -> String {
    format!("{}/{}", robot_name, STATUS_TOPIC)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_topic_names() {
        assert_eq!(joint_name(0), "joint1");
        assert_eq!(joint_name(3), "joint4");
        assert_eq!(
            joint_cmd_topic("open_manipulator", &joint_name(1)),
            "open_manipulator/joint2_position/command"
        );
        assert_eq!(status_topic("open_manipulator"), "open_manipulator/state");
    }

    #[test]
    fn test_status_constructors() {
        assert_eq!(ArmStatus::stopped().arm, ActState::Stopped);
        assert_eq!(ArmStatus::moving().arm, ActState::IsMoving);
        assert_eq!(ArmStatus::moving().gripper, ActState::Stopped);
    }
}
