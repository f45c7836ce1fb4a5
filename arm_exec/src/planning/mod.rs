//! # Planning Service
//!
//! The arm executable never plans motions itself. Goals are handed to an external planning
//! service, which publishes the resulting planned path for playback and answers queries on the
//! arm's live state.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod plan_client;
mod worker;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::plan::{JointPose, Pose, PoseStamped};

pub use plan_client::*;
pub use worker::*;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Capabilities of the planning service used by the arm executable.
pub trait PlanningService {
    /// Check if the planning service can currently be reached.
    fn is_connected(&self) -> bool;

    /// Plan and execute a motion to the given joint positions.
    fn plan_joint_target(&mut self, target_rad: &[f64]) -> Result<(), PlanningError>;

    /// Plan and execute a motion bringing the end effector to the given pose.
    fn plan_pose_target(&mut self, target: &Pose) -> Result<(), PlanningError>;

    /// Get the current joint names and positions.
    fn get_current_joint_values(&mut self) -> Result<JointPose, PlanningError>;

    /// Get the current end effector pose.
    fn get_current_pose(&mut self) -> Result<PoseStamped, PlanningError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PlanningError {
    #[error("Planning failed: {0}")]
    PlanningFailed(String),

    #[error("The planning service sent an unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Could not reach the planning service: {0}")]
    ClientError(PlanClientError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl From<PlanClientError> for PlanningError {
    fn from(e: PlanClientError) -> Self {
        PlanningError::ClientError(e)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use comms_if::plan::PlanRequest;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Receiver,
        Arc,
    };

    /// Planning service which records requests and answers from fixed state.
    pub(crate) struct MockPlanner {
        pub joint_pose: JointPose,
        pub pose: PoseStamped,
        pub fail_planning: bool,
        pub requests: Vec<PlanRequest>,

        /// Shared so tests can connect the planner while a worker owns it.
        pub connected: Arc<AtomicBool>,

        /// If set, planning calls wait for a message on this channel before answering.
        pub hold: Option<Receiver<()>>,
    }

    impl MockPlanner {
        pub fn new(joint_num: usize) -> Self {
            Self {
                joint_pose: JointPose {
                    joint_name: (0..joint_num)
                        .map(comms_if::eqpt::arm::joint_name)
                        .collect(),
                    position: vec![0.0; joint_num],
                },
                pose: PoseStamped {
                    frame_id: "world".into(),
                    stamp: chrono::Utc::now(),
                    pose: Pose::default(),
                },
                fail_planning: false,
                requests: Vec::new(),
                connected: Arc::new(AtomicBool::new(true)),
                hold: None,
            }
        }

        fn plan(&mut self, request: PlanRequest) -> Result<(), PlanningError> {
            self.requests.push(request);

            if let Some(ref hold) = self.hold {
                hold.recv().ok();
            }

            match self.fail_planning {
                true => Err(PlanningError::PlanningFailed("no solution".into())),
                false => Ok(()),
            }
        }
    }

    impl PlanningService for MockPlanner {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::Relaxed)
        }

        fn plan_joint_target(&mut self, target_rad: &[f64]) -> Result<(), PlanningError> {
            self.plan(PlanRequest::JointTarget(target_rad.to_vec()))
        }

        fn plan_pose_target(&mut self, target: &Pose) -> Result<(), PlanningError> {
            self.plan(PlanRequest::PoseTarget(*target))
        }

        fn get_current_joint_values(&mut self) -> Result<JointPose, PlanningError> {
            self.requests.push(PlanRequest::GetJointValues);
            Ok(self.joint_pose.clone())
        }

        fn get_current_pose(&mut self) -> Result<PoseStamped, PlanningError> {
            self.requests.push(PlanRequest::GetCurrentPose);
            Ok(self.pose.clone())
        }
    }
}
