//! # Arm Request Handling
//!
//! Handles the direct requests made of the arm executable. Motion requests are only passed on to
//! the planning service while playback is idle, queries are always answered.
//!
//! Gating runs on the main loop, serving runs on the planning worker.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::arm::joint_name,
    plan::{JointPose, KinematicsPose},
    tc::arm_ctrl::{ArmRequest, ArmResponse},
};
use log::{info, warn};

use crate::{
    planning::{PlanningError, PlanningService},
    playback::PlaybackCtrl,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Name of the planning group reported with kinematics poses.
pub const ARM_GROUP_NAME: &str = "arm";

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Check whether a request may be served given the playback state.
///
/// Returns the response to send straight back if the request is refused, `None` if it should be
/// passed on to [`serve_request`]. Motion requests are refused while playback is moving.
pub fn gate_request(request: &ArmRequest, playback: &PlaybackCtrl) -> Option<ArmResponse> {
    match request.is_motion() && playback.check_can_move().is_err() {
        true => {
            warn!("ROBOT IS WORKING, {} rejected", request_kind(request));
            Some(ArmResponse::RobotIsWorking)
        }
        false => None,
    }
}

/// Serve a request using the planning service, returning the response to send back.
///
/// Never touches playback: accepted motion requests only reach the planner, and playback starts
/// once the planner publishes the resulting path.
pub fn serve_request<P: PlanningService>(
    request: &ArmRequest,
    joint_num: usize,
    planner: &mut P,
) -> ArmResponse {
    let result = match request {
        ArmRequest::JointTarget(target) => {
            joint_target(target, joint_num, planner).map(|_| ArmResponse::Ok)
        }
        ArmRequest::PoseTarget(pose) => planner
            .plan_pose_target(pose)
            .map(|_| ArmResponse::Ok)
            .map_err(|e| {
                warn!("Planning (cartesian space goal) is FAILED: {}", e);
                e
            }),
        ArmRequest::GetJointPose => get_joint_pose(planner).map(ArmResponse::JointPose),
        ArmRequest::GetKinematicsPose => get_kinematics_pose(planner),
    };

    match result {
        Ok(r) => r,
        Err(e) => ArmResponse::PlanningFailed(e.to_string()),
    }
}

/// Merge a named joint target onto the current joint positions.
///
/// The target position at index `i` is used only if the name at index `i` is that joint's name,
/// otherwise the joint keeps its current position. Only the first `joint_num` joints are
/// considered.
pub fn merge_joint_target(current_rad: &[f64], target: &JointPose, joint_num: usize) -> Vec<f64> {
    let mut merged = current_rad.to_vec();

    for (i, pos) in merged.iter_mut().enumerate().take(joint_num) {
        let name_matches = target
            .joint_name
            .get(i)
            .map(|n| *n == joint_name(i))
            .unwrap_or(false);

        if let (true, Some(target_pos)) = (name_matches, target.position.get(i)) {
            *pos = *target_pos;
        }
    }

    merged
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn request_kind(request: &ArmRequest) -> &'static str {
    match request {
        ArmRequest::JointTarget(_) => "joint target",
        ArmRequest::PoseTarget(_) => "pose target",
        ArmRequest::GetJointPose => "joint pose query",
        ArmRequest::GetKinematicsPose => "kinematics pose query",
    }
}

fn joint_target<P: PlanningService>(
    target: &JointPose,
    joint_num: usize,
    planner: &mut P,
) -> Result<(), PlanningError> {
    let current = planner.get_current_joint_values()?;
    let merged = merge_joint_target(&current.position, target, joint_num);

    planner.plan_joint_target(&merged).map_err(|e| {
        warn!("Planning (joint space goal) is FAILED: {}", e);
        e
    })
}

fn get_joint_pose<P: PlanningService>(planner: &mut P) -> Result<JointPose, PlanningError> {
    let joint_pose = planner.get_current_joint_values()?;

    for (name, pos) in joint_pose.joint_name.iter().zip(joint_pose.position.iter()) {
        info!("{}: {:.6}", name, pos);
    }

    Ok(joint_pose)
}

fn get_kinematics_pose<P: PlanningService>(
    planner: &mut P,
) -> Result<ArmResponse, PlanningError> {
    let current = planner.get_current_pose()?;

    info!("Pose Reference Frame = {}", current.frame_id);
    let (r, p, y) = current.pose.rpy();
    info!("R: {:.6}", r);
    info!("P: {:.6}", p);
    info!("Y: {:.6}", y);

    Ok(ArmResponse::KinematicsPose {
        frame_id: current.frame_id,
        stamp: current.stamp,
        kinematics_pose: KinematicsPose {
            group_name: ARM_GROUP_NAME.into(),
            pose: current.pose,
        },
    })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::planning::test::MockPlanner;
    use crate::playback::{Params, PlannedTrajectory};
    use crate::test_log;
    use comms_if::plan::{PlanRequest, Pose};
    use nalgebra::Vector3;

    fn playback() -> PlaybackCtrl {
        PlaybackCtrl::new(Params {
            joint_num: 4,
            ..Default::default()
        })
        .unwrap()
    }

    fn joint_pose(names: &[&str], position: &[f64]) -> JointPose {
        JointPose {
            joint_name: names.iter().map(|n| n.to_string()).collect(),
            position: position.to_vec(),
        }
    }

    #[test]
    fn test_merge_joint_target() {
        let current = [0.1, 0.2, 0.3, 0.4];

        // Matching names replace the current values
        let merged = merge_joint_target(
            &current,
            &joint_pose(&["joint1", "joint2", "joint3", "joint4"], &[1.0, 2.0, 3.0, 4.0]),
            4,
        );
        assert_eq!(merged, vec![1.0, 2.0, 3.0, 4.0]);

        // Names out of place, or missing, keep the current value
        let merged = merge_joint_target(
            &current,
            &joint_pose(&["joint1", "joint3"], &[1.0, 3.0]),
            4,
        );
        assert_eq!(merged, vec![1.0, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_joint_target_planned() {
        let playback = playback();
        let mut planner = MockPlanner::new(4);

        let request = ArmRequest::JointTarget(joint_pose(
            &["joint1", "joint2", "joint3", "joint4"],
            &[0.0, -1.5707, 1.37, 0.2258],
        ));

        assert_eq!(gate_request(&request, &playback), None);
        assert_eq!(serve_request(&request, 4, &mut planner), ArmResponse::Ok);
        assert_eq!(
            planner.requests,
            vec![
                PlanRequest::GetJointValues,
                PlanRequest::JointTarget(vec![0.0, -1.5707, 1.37, 0.2258])
            ]
        );
    }

    #[test]
    fn test_motion_rejected_while_moving() {
        let mut playback = playback();
        playback
            .arm(PlannedTrajectory::new(vec![vec![0.0; 4], vec![0.1; 4]]).unwrap())
            .unwrap();
        let cursor = playback.cursor();

        let pose = Pose {
            position_m: Vector3::new(0.2, 0.0, 0.1),
            ..Default::default()
        };

        test_log::capture();

        assert_eq!(
            gate_request(&ArmRequest::PoseTarget(pose), &playback),
            Some(ArmResponse::RobotIsWorking)
        );
        assert_eq!(test_log::warnings().len(), 1);

        assert_eq!(
            gate_request(
                &ArmRequest::JointTarget(joint_pose(&["joint1"], &[1.0])),
                &playback
            ),
            Some(ArmResponse::RobotIsWorking)
        );
        assert_eq!(test_log::warnings().len(), 2);

        assert_eq!(playback.cursor(), cursor);
        assert_eq!(playback.waypoint_count(), 2);

        // Queries are still answered
        assert_eq!(gate_request(&ArmRequest::GetJointPose, &playback), None);
        assert_eq!(gate_request(&ArmRequest::GetKinematicsPose, &playback), None);
    }

    #[test]
    fn test_planning_failure_reported() {
        let playback = playback();
        let mut planner = MockPlanner::new(4);
        planner.fail_planning = true;

        let resp = serve_request(&ArmRequest::PoseTarget(Pose::default()), 4, &mut planner);

        assert!(matches!(resp, ArmResponse::PlanningFailed(_)));
        assert_eq!(playback.check_can_move(), Ok(()));
    }

    #[test]
    fn test_kinematics_pose_query() {
        let mut planner = MockPlanner::new(4);

        match serve_request(&ArmRequest::GetKinematicsPose, 4, &mut planner) {
            ArmResponse::KinematicsPose {
                frame_id,
                kinematics_pose,
                ..
            } => {
                assert_eq!(frame_id, "world");
                assert_eq!(kinematics_pose.group_name, ARM_GROUP_NAME);
                assert_eq!(kinematics_pose.pose, Pose::default());
            }
            r => panic!("Unexpected response {:?}", r),
        }
    }
}
