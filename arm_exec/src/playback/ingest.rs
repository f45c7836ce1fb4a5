//! Planned path ingestion
//!
//! Converts planned paths published by the planning service into trajectories and arms playback.
//! Only arm paths are handled here, gripper paths are recognised by the gripper marker in their
//! first joint name and ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::plan::PlannedPath;
use log::info;

use super::{PlannedTrajectory, PlaybackCtrl, PlaybackError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Result of a successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The path was loaded and playback armed.
    Armed { waypoint_count: usize },

    /// The path does not belong to the arm and was ignored.
    NotArmPath,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PlaybackCtrl {
    /// Ingest a planned path.
    ///
    /// Paths for the gripper are ignored. For arm paths the first `joint_num` positions of each
    /// point are taken, in order, as the waypoint. If the arm is already moving, or the path is
    /// malformed, the path is dropped and neither the loaded trajectory nor the motion state
    /// change. Rejections are returned, not logged.
    pub fn ingest(&mut self, path: &PlannedPath) -> Result<IngestOutcome, PlaybackError> {
        let segment = match path.trajectory.first() {
            Some(s) => s,
            None => {
                return Err(PlaybackError::InvalidTrajectory(
                    "planned path contains no trajectory".into(),
                ))
            }
        };

        if segment.joint_names.is_empty() {
            return Err(PlaybackError::InvalidTrajectory(
                "planned path has no joint names".into(),
            ));
        }

        if !is_arm_path(path, &self.params.gripper_marker) {
            return Ok(IngestOutcome::NotArmPath);
        }

        info!("Get ARM Planned Path");

        self.motion.check_idle()?;

        let trajectory = extract_trajectory(path, self.params.joint_num)?;
        let waypoint_count = trajectory.waypoint_count();

        self.arm(trajectory)?;

        info!("Playback armed with {} waypoints", waypoint_count);

        Ok(IngestOutcome::Armed { waypoint_count })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Returns true if the path is for the arm rather than the gripper.
pub fn is_arm_path(path: &PlannedPath, gripper_marker: &str) -> bool {
    match path.joint_names().and_then(|n| n.first()) {
        Some(name) => !name.contains(gripper_marker),
        None => false,
    }
}

/// Build a trajectory from the first segment of the path.
///
/// Every point must have one position per joint name, and there must be at least `joint_num`
/// joints. Positions are taken by index, joint ordering is assumed to match the arm's.
pub fn extract_trajectory(
    path: &PlannedPath,
    joint_num: usize,
) -> Result<PlannedTrajectory, PlaybackError> {
    let segment = path.trajectory.first().ok_or_else(|| {
        PlaybackError::InvalidTrajectory("planned path contains no trajectory".into())
    })?;

    let num_names = segment.joint_names.len();
    if num_names < joint_num {
        return Err(PlaybackError::InvalidTrajectory(format!(
            "planned path has {} joints, expected at least {}",
            num_names, joint_num
        )));
    }

    let mut waypoints = Vec::with_capacity(segment.points.len());

    for (i, point) in segment.points.iter().enumerate() {
        if point.positions.len() != num_names {
            return Err(PlaybackError::InvalidTrajectory(format!(
                "point {} has {} positions but the path has {} joints",
                i,
                point.positions.len(),
                num_names
            )));
        }

        waypoints.push(point.positions[..joint_num].to_vec());
    }

    PlannedTrajectory::new(waypoints)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::playback::{MotionState, Params};
    use crate::test_log;
    use comms_if::plan::{JointTrajectory, JointTrajectoryPoint};
    use util::module::State;

    fn path(names: &[&str], points: Vec<Vec<f64>>) -> PlannedPath {
        PlannedPath {
            trajectory: vec![JointTrajectory {
                joint_names: names.iter().map(|n| n.to_string()).collect(),
                points: points
                    .into_iter()
                    .map(|positions| JointTrajectoryPoint { positions })
                    .collect(),
            }],
        }
    }

    fn arm_path(points: Vec<Vec<f64>>) -> PlannedPath {
        path(&["joint1", "joint2", "joint3", "joint4"], points)
    }

    fn ctrl() -> PlaybackCtrl {
        PlaybackCtrl::new(Params {
            joint_num: 4,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_ingest_arms_playback() {
        let mut ctrl = ctrl();
        let outcome = ctrl
            .ingest(&arm_path(vec![vec![0.0; 4], vec![0.1, 0.0, 0.0, 0.05]]))
            .unwrap();

        assert_eq!(outcome, IngestOutcome::Armed { waypoint_count: 2 });
        assert_eq!(ctrl.motion_state(), MotionState::Moving);
        assert_eq!(ctrl.cursor().step_index, 0);
        assert_eq!(ctrl.cursor().terminal_index, 1);
    }

    #[test]
    fn test_gripper_path_ignored() {
        let mut ctrl = ctrl();
        let p = path(&["grip_joint", "grip_joint_sub"], vec![vec![0.01, 0.01]]);
        assert!(!is_arm_path(&p, "grip"));

        assert_eq!(ctrl.ingest(&p).unwrap(), IngestOutcome::NotArmPath);
        assert_eq!(ctrl.motion_state(), MotionState::Idle);
        assert_eq!(ctrl.waypoint_count(), 0);

        let (out, _) = ctrl.proc(&()).unwrap();
        assert_eq!(out.joint_pos_rad, None);
    }

    #[test]
    fn test_inconsistent_joint_count_rejected() {
        let mut ctrl = ctrl();
        let res = ctrl.ingest(&arm_path(vec![vec![0.0; 4], vec![0.0; 3]]));
        assert!(matches!(res, Err(PlaybackError::InvalidTrajectory(_))));
        assert_eq!(ctrl.motion_state(), MotionState::Idle);
        assert_eq!(ctrl.waypoint_count(), 0);

        // Rejecting again changes nothing either
        let res = ctrl.ingest(&arm_path(vec![vec![0.0; 4], vec![0.0; 3]]));
        assert!(matches!(res, Err(PlaybackError::InvalidTrajectory(_))));
        assert_eq!(ctrl.motion_state(), MotionState::Idle);
    }

    #[test]
    fn test_empty_and_short_paths_rejected() {
        let mut ctrl = ctrl();
        assert!(ctrl.ingest(&arm_path(vec![])).is_err());
        assert!(ctrl.ingest(&PlannedPath::default()).is_err());
        assert!(ctrl
            .ingest(&path(&["joint1", "joint2"], vec![vec![0.0, 0.0]]))
            .is_err());
        assert_eq!(ctrl.motion_state(), MotionState::Idle);
    }

    #[test]
    fn test_extra_joints_truncated() {
        let p = path(
            &["joint1", "joint2", "joint3", "joint4", "joint5"],
            vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]],
        );
        let traj = extract_trajectory(&p, 4).unwrap();
        assert_eq!(traj.get(0), Some(&[1.0, 2.0, 3.0, 4.0][..]));
    }

    #[test]
    fn test_ingest_while_moving_rejected() {
        let mut ctrl = ctrl();
        ctrl.ingest(&arm_path(vec![vec![0.0; 4], vec![1.0; 4], vec![2.0; 4]]))
            .unwrap();
        ctrl.proc(&()).unwrap();
        let cursor = ctrl.cursor();

        test_log::capture();
        let res = ctrl.ingest(&arm_path(vec![vec![5.0; 4]]));
        assert_eq!(res, Err(PlaybackError::OverlappingMotionRejected));
        assert!(test_log::warnings().is_empty());
        assert_eq!(ctrl.cursor(), cursor);
        assert_eq!(ctrl.waypoint_count(), 3);
        assert_eq!(ctrl.motion_state(), MotionState::Moving);

        let (out, _) = ctrl.proc(&()).unwrap();
        assert_eq!(out.joint_pos_rad, Some(vec![1.0; 4]));
    }
}
