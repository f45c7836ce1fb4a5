//! Motion state machine
//!
//! Tracks whether the arm is replaying a trajectory. New motion is only accepted while the arm is
//! idle, a trajectory is never interrupted or queued behind another.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::arm::ActState;
use log::info;
use serde::{Deserialize, Serialize};

use super::PlaybackError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionStateMachine {
    state: MotionState,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    Idle,
    Moving,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MotionState {
    fn default() -> Self {
        MotionState::Idle
    }
}

impl MotionState {
    /// The actuator state reported in the arm status.
    pub fn act_state(&self) -> ActState {
        match self {
            MotionState::Idle => ActState::Stopped,
            MotionState::Moving => ActState::IsMoving,
        }
    }
}

impl MotionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        self.state == MotionState::Moving
    }

    /// Check that a new motion may be started, `OverlappingMotionRejected` while moving.
    ///
    /// The rejection is left to the caller to report.
    pub fn check_idle(&self) -> Result<(), PlaybackError> {
        match self.state {
            MotionState::Idle => Ok(()),
            MotionState::Moving => Err(PlaybackError::OverlappingMotionRejected),
        }
    }

    /// `Idle -> Moving`, rejected if already moving.
    pub fn arm(&mut self) -> Result<(), PlaybackError> {
        self.check_idle()?;
        self.state = MotionState::Moving;
        info!("Motion state: Idle -> Moving");
        Ok(())
    }

    /// `Moving -> Idle`, called once the final waypoint has been emitted.
    pub fn complete(&mut self) {
        if self.state == MotionState::Moving {
            info!("Motion state: Moving -> Idle");
        }
        self.state = MotionState::Idle;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
