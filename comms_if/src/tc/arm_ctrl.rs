//! # Arm control requests

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::plan::{JointPose, KinematicsPose, Pose};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TcParseError;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A request that can be made of the arm executable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ArmRequest {
    /// Move the arm to the given joint positions.
    ///
    /// Only joints whose name matches the joint at the same index are changed, all other joints
    /// keep their current position.
    JointTarget(JointPose),

    /// Move the end effector to the given pose.
    PoseTarget(Pose),

    /// Get the current position of each joint.
    GetJointPose,

    /// Get the current pose of the end effector.
    GetKinematicsPose,
}

/// Response to an [`ArmRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ArmResponse {
    /// The target was accepted and passed to the planner.
    Ok,

    /// Current joint positions.
    JointPose(JointPose),

    /// Current end effector pose.
    KinematicsPose {
        frame_id: String,
        stamp: DateTime<Utc>,
        kinematics_pose: KinematicsPose,
    },

    /// The arm is already executing a trajectory, the target was dropped.
    RobotIsWorking,

    /// The planner could not plan or answer the request.
    PlanningFailed(String),

    /// The request could not be parsed.
    Invalid,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmRequest {
    /// Parse a request from a JSON packet.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Returns true if the request would start a motion of the arm.
    pub fn is_motion(&self) -> bool {
        matches!(self, ArmRequest::JointTarget(_) | ArmRequest::PoseTarget(_))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_requests() {
        let req = ArmRequest::from_json(r#""GetJointPose""#).unwrap();
        assert_eq!(req, ArmRequest::GetJointPose);
        assert!(!req.is_motion());

        let req = ArmRequest::from_json(
            r#"{"JointTarget": {"joint_name": ["joint1"], "position": [0.5]}}"#,
        )
        .unwrap();
        assert!(req.is_motion());

        assert!(ArmRequest::from_json("{not json").is_err());
    }
}
