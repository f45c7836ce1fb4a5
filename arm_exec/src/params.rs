//! # Arm Executable Parameters
//!
//! This module provide parameters for the arm executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::playback;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmExecParams {
    /// Name of the robot, used as the prefix of every published topic
    pub robot_name: String,

    /// If true joint commands are published for the simulated actuators. On hardware only the
    /// arm status is published.
    #[serde(default)]
    pub sim_mode: bool,

    /// Actuator ID of the first joint, following joints have consecutive IDs
    pub first_joint_id: u8,

    /// Frequency of the main loop.
    ///
    /// Units: hertz
    #[serde(default = "default_cycle_frequency_hz")]
    pub cycle_frequency_hz: f64,

    /// Time waited after a planned path is loaded, before playback starts, for the arm to settle.
    ///
    /// Units: seconds
    #[serde(default = "default_arm_settle_time_s")]
    pub arm_settle_time_s: f64,

    /// How long a planning request waits for the planning service to connect before failing.
    ///
    /// Units: seconds
    #[serde(default = "default_planner_connect_timeout_s")]
    pub planner_connect_timeout_s: f64,

    /// Joint positions requested once all clients are initialised
    ///
    /// Units: radians
    #[serde(default)]
    pub initial_joint_pose: Option<Vec<f64>>,

    /// Playback parameters, `joint_num` and `gripper_marker`
    #[serde(flatten)]
    pub playback: playback::Params,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_cycle_frequency_hz() -> f64 {
    25.0
}

fn default_arm_settle_time_s() -> f64 {
    0.5
}

fn default_planner_connect_timeout_s() -> f64 {
    10.0
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_params() {
        let params: ArmExecParams = util::params::from_str(
            r#"
            robot_name = "open_manipulator"
            sim_mode = true
            first_joint_id = 11
            joint_num = 4
            initial_joint_pose = [0.0, -1.05, 0.35, 0.7]
            "#,
        )
        .unwrap();

        assert_eq!(params.robot_name, "open_manipulator");
        assert!(params.sim_mode);
        assert_eq!(params.first_joint_id, 11);
        assert_eq!(params.cycle_frequency_hz, 25.0);
        assert_eq!(params.arm_settle_time_s, 0.5);
        assert_eq!(params.planner_connect_timeout_s, 10.0);
        assert_eq!(params.playback.joint_num, 4);
        assert_eq!(params.playback.gripper_marker, "grip");
        assert_eq!(
            params.initial_joint_pose,
            Some(vec![0.0, -1.05, 0.35, 0.7])
        );
    }

    #[test]
    fn test_missing_joint_num_rejected() {
        let res: Result<ArmExecParams, _> = util::params::from_str(
            r#"
            robot_name = "open_manipulator"
            first_joint_id = 11
            "#,
        );

        assert!(res.is_err());
    }
}
