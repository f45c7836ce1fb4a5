//! # Planning Service Interface
//!
//! Messages exchanged with the external motion planning service. The planning service computes
//! joint-space trajectories from goals, publishes the planned paths it produces, and answers
//! queries on the live state of the manipulator.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A planned path as published by the planning service after each successful plan.
///
/// A plan may be made of several trajectory segments, only the first is ever replayed.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PlannedPath {
    pub trajectory: Vec<JointTrajectory>,
}

/// A joint-space trajectory segment.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct JointTrajectory {
    /// Names of the joints, in the same order as the positions in each point.
    pub joint_names: Vec<String>,

    /// Waypoints of the trajectory, in playback order.
    pub points: Vec<JointTrajectoryPoint>,
}

/// A single point in a joint trajectory.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct JointTrajectoryPoint {
    /// Position of each joint.
    ///
    /// Units: radians
    pub positions: Vec<f64>,
}

/// Named joint positions.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct JointPose {
    pub joint_name: Vec<String>,

    /// Units: radians
    pub position: Vec<f64>,
}

/// A Cartesian pose.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position of the frame.
    ///
    /// Units: meters
    pub position_m: Vector3<f64>,

    /// Attitude of the frame.
    pub attitude_q: UnitQuaternion<f64>,
}

/// A pose with the frame it's expressed in and the time it was valid at.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PoseStamped {
    pub frame_id: String,

    pub stamp: DateTime<Utc>,

    pub pose: Pose,
}

/// A pose associated with a planning group (e.g. `arm`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KinematicsPose {
    pub group_name: String,

    pub pose: Pose,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Requests sent to the planning service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum PlanRequest {
    /// Plan and execute a motion to the given joint positions, ordered as the planning group's
    /// joints.
    JointTarget(Vec<f64>),

    /// Plan and execute a motion bringing the end effector to the given pose.
    PoseTarget(Pose),

    /// Get the current joint names and values.
    GetJointValues,

    /// Get the current end effector pose.
    GetCurrentPose,
}

/// Responses from the planning service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum PlanResponse {
    /// The goal was planned successfully and execution has been started.
    PlanExecuted,

    /// Planning failed, with the planner's reason.
    PlanFailed(String),

    /// Current joint state.
    JointValues(JointPose),

    /// Current end effector pose.
    CurrentPose(PoseStamped),

    /// The request could not be understood.
    Invalid,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlannedPath {
    /// Names of the joints in the first trajectory segment, if any.
    pub fn joint_names(&self) -> Option<&[String]> {
        self.trajectory.first().map(|t| t.joint_names.as_slice())
    }
}

impl Pose {
    /// Roll, pitch and yaw of the attitude.
    ///
    /// Units: radians
    pub fn rpy(&self) -> (f64, f64, f64) {
        self.attitude_q.euler_angles()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position_m: Vector3::zeros(),
            attitude_q: UnitQuaternion::identity(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_planned_path_joint_names() {
        let empty = PlannedPath::default();
        assert!(empty.joint_names().is_none());

        let path = PlannedPath {
            trajectory: vec![JointTrajectory {
                joint_names: vec!["joint1".into(), "joint2".into()],
                points: vec![],
            }],
        };
        assert_eq!(path.joint_names().unwrap()[1], "joint2");
    }

    #[test]
    fn test_plan_request_json() {
        let req = PlanRequest::JointTarget(vec![0.0, -1.5707, 1.37, 0.2258]);
        let json = serde_json::to_string(&req).unwrap();
        let back: PlanRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }
}
