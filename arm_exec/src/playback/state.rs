//! Implementations for the PlaybackCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::{Deserialize, Serialize};

// Internal
use super::{
    MotionState, MotionStateMachine, Params, PlannedTrajectory, PlaybackCursor, PlaybackError,
    WaypointBuffer,
};
use comms_if::eqpt::arm::ArmStatus;
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Playback control module state
///
/// Owns the loaded trajectory, the motion state and the playback cursor. Both the cyclic
/// processing and the ingestion of planned paths take `&mut self`, so they can never interleave.
#[derive(Debug, Default)]
pub struct PlaybackCtrl {
    pub(crate) params: Params,

    pub(crate) buffer: WaypointBuffer,

    pub(crate) motion: MotionStateMachine,

    pub(crate) cursor: PlaybackCursor,

    pub(crate) report: StatusReport,
}

/// Output of one playback cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputData {
    /// Joint positions to command this cycle, `None` while idle.
    pub joint_pos_rad: Option<Vec<f64>>,

    /// Status to publish this cycle.
    pub status: ArmStatus,
}

/// Status report for PlaybackCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Index of the waypoint emitted on this cycle.
    pub step_index: Option<usize>,

    /// Number of waypoints in the loaded trajectory.
    pub waypoint_count: usize,

    /// True on the cycle where the final waypoint was emitted.
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for PlaybackCtrl {
    type InitData = Params;
    type InitError = PlaybackError;

    type InputData = ();
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = PlaybackError;

    /// Initialise the PlaybackCtrl module.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        if init_data.joint_num == 0 {
            return Err(PlaybackError::NoJoints);
        }

        self.buffer = WaypointBuffer::new(init_data.joint_num);
        self.motion = MotionStateMachine::new();
        self.cursor.reset();
        self.params = init_data;

        Ok(())
    }

    /// Perform one playback step.
    ///
    /// The waypoint at the cursor is output and then the cursor is advanced. On the cycle the
    /// terminal waypoint is output the arm still reports moving, the motion state returns to
    /// idle so that the following cycle reports stopped.
    fn proc(
        &mut self,
        _input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport {
            waypoint_count: self.buffer.count(),
            ..Default::default()
        };

        if !self.motion.is_moving() {
            return Ok((
                OutputData {
                    joint_pos_rad: None,
                    status: ArmStatus::stopped(),
                },
                self.report,
            ));
        }

        let waypoint = match self.buffer.current(&self.cursor) {
            Some(w) => w.to_vec(),
            None => {
                // Nothing to replay, stop rather than report moving forever
                let err = PlaybackError::CursorOutOfRange {
                    step_index: self.cursor.step_index,
                    waypoint_count: self.buffer.count(),
                };
                self.finish();
                return Err(err);
            }
        };

        self.report.step_index = Some(self.cursor.step_index);

        if self.cursor.at_terminal() {
            self.finish();
            self.report.completed = true;
            info!("Complete Execution");
        } else {
            self.cursor.advance();
        }

        debug!(
            "Playback step {:?}/{}: {:?}",
            self.report.step_index, self.report.waypoint_count, waypoint
        );

        Ok((
            OutputData {
                joint_pos_rad: Some(waypoint),
                status: ArmStatus::moving(),
            },
            self.report,
        ))
    }
}

impl PlaybackCtrl {
    /// Create a new playback module for the given parameters.
    pub fn new(params: Params) -> Result<Self, PlaybackError> {
        let mut ctrl = Self::default();
        ctrl.init(params)?;
        Ok(ctrl)
    }

    pub fn motion_state(&self) -> MotionState {
        self.motion.state()
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Number of waypoints in the loaded trajectory.
    pub fn waypoint_count(&self) -> usize {
        self.buffer.count()
    }

    /// Check that a new motion, such as a direct target, may be started.
    pub fn check_can_move(&self) -> Result<(), PlaybackError> {
        self.motion.check_idle()
    }

    /// Load a trajectory and start replaying it from its first waypoint.
    ///
    /// Nothing is changed if the arm is already moving or the trajectory is invalid.
    pub fn arm(&mut self, trajectory: PlannedTrajectory) -> Result<(), PlaybackError> {
        self.motion.check_idle()?;

        self.buffer.load(trajectory)?;
        self.cursor = PlaybackCursor::start(self.buffer.count());
        self.motion.arm()
    }

    /// Return to idle, discarding the trajectory and resetting the cursor.
    fn finish(&mut self) {
        self.motion.complete();
        self.cursor.reset();
        self.buffer.clear();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::arm::ActState;

    fn ctrl(joint_num: usize) -> PlaybackCtrl {
        PlaybackCtrl::new(Params {
            joint_num,
            ..Default::default()
        })
        .unwrap()
    }

    fn tick(ctrl: &mut PlaybackCtrl) -> OutputData {
        ctrl.proc(&()).unwrap().0
    }

    #[test]
    fn test_init_rejects_no_joints() {
        assert_eq!(
            PlaybackCtrl::new(Params {
                joint_num: 0,
                ..Default::default()
            })
            .unwrap_err(),
            PlaybackError::NoJoints
        );
    }

    #[test]
    fn test_idle_tick() {
        let mut ctrl = ctrl(4);
        let out = tick(&mut ctrl);
        assert_eq!(out.joint_pos_rad, None);
        assert_eq!(out.status, ArmStatus::stopped());
    }

    #[test]
    fn test_four_joint_scenario() {
        let mut ctrl = ctrl(4);
        let waypoints = vec![
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.1, 0.0, 0.0, 0.05],
            vec![0.2, 0.0, 0.0, 0.1],
        ];
        ctrl.arm(PlannedTrajectory::new(waypoints.clone()).unwrap())
            .unwrap();

        for (i, w) in waypoints.iter().enumerate() {
            let (out, rpt) = ctrl.proc(&()).unwrap();
            assert_eq!(out.joint_pos_rad.as_ref(), Some(w));
            assert_eq!(out.status.arm, ActState::IsMoving);
            assert_eq!(rpt.step_index, Some(i));
            assert_eq!(rpt.completed, i == 2);
        }

        let out = tick(&mut ctrl);
        assert_eq!(out.joint_pos_rad, None);
        assert_eq!(out.status.arm, ActState::Stopped);
        assert_eq!(ctrl.motion_state(), MotionState::Idle);
    }

    #[test]
    fn test_moving_for_exactly_n_ticks() {
        for n in 1..=6 {
            let mut ctrl = ctrl(2);
            let waypoints: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, -(i as f64)]).collect();
            ctrl.arm(PlannedTrajectory::new(waypoints.clone()).unwrap())
                .unwrap();

            let mut emitted = Vec::new();
            while ctrl.motion_state() == MotionState::Moving {
                let out = tick(&mut ctrl);
                emitted.push(out.joint_pos_rad.unwrap());
                assert!(emitted.len() <= n);
            }

            assert_eq!(emitted, waypoints);
            assert_eq!(ctrl.cursor(), PlaybackCursor::default());
        }
    }

    #[test]
    fn test_rearm_after_completion() {
        let mut ctrl = ctrl(1);
        ctrl.arm(PlannedTrajectory::new(vec![vec![1.0], vec![2.0]]).unwrap())
            .unwrap();
        tick(&mut ctrl);
        tick(&mut ctrl);
        assert_eq!(ctrl.motion_state(), MotionState::Idle);

        ctrl.arm(PlannedTrajectory::new(vec![vec![5.0], vec![6.0], vec![7.0]]).unwrap())
            .unwrap();
        let emitted: Vec<_> = (0..3).map(|_| tick(&mut ctrl).joint_pos_rad.unwrap()).collect();
        assert_eq!(emitted, vec![vec![5.0], vec![6.0], vec![7.0]]);
        assert_eq!(tick(&mut ctrl).joint_pos_rad, None);
    }

    #[test]
    fn test_arm_while_moving_rejected() {
        let mut ctrl = ctrl(1);
        ctrl.arm(PlannedTrajectory::new(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap())
            .unwrap();
        tick(&mut ctrl);
        let cursor = ctrl.cursor();

        let res = ctrl.arm(PlannedTrajectory::new(vec![vec![9.0]]).unwrap());
        assert_eq!(res, Err(PlaybackError::OverlappingMotionRejected));
        assert_eq!(ctrl.cursor(), cursor);
        assert_eq!(ctrl.waypoint_count(), 3);
        assert_eq!(tick(&mut ctrl).joint_pos_rad, Some(vec![2.0]));
    }

    #[test]
    fn test_arm_invalid_leaves_state() {
        let mut ctrl = ctrl(4);
        let res = ctrl.arm(PlannedTrajectory::new(vec![vec![0.0; 3]]).unwrap());
        assert!(matches!(res, Err(PlaybackError::InvalidTrajectory(_))));
        assert_eq!(ctrl.motion_state(), MotionState::Idle);
        assert_eq!(ctrl.waypoint_count(), 0);
    }
}
