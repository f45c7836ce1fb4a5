//! # Command Emitter
//!
//! Fans the output of each playback cycle out to one sink per joint, and the arm status out to
//! the status sink. Writes are fire-and-forget: failures are logged and counted but never retried.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::arm::{joint_name, ArmStatus, JointCmd};
use log::{debug, warn};
use std::{convert::TryFrom, fmt::Display};

use crate::playback::OutputData;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Destination of joint commands and arm status.
pub trait CommandSink {
    type Error: Display;

    /// Send a position command to the joint at the given index.
    fn send_joint_cmd(&mut self, joint: &Joint, cmd: JointCmd) -> Result<(), Self::Error>;

    /// Send the arm status.
    fn send_status(&mut self, status: ArmStatus) -> Result<(), Self::Error>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An arm joint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joint {
    /// Zero-based position of the joint in each waypoint.
    pub index: usize,

    /// Name of the joint, e.g. `joint1`.
    pub name: String,

    /// Actuator ID of the joint.
    pub id: u8,
}

/// Writes playback output to a [`CommandSink`].
pub struct CommandEmitter<S: CommandSink> {
    sink: S,

    joints: Vec<Joint>,

    /// If false only the status is emitted, joint commands are left to the planner's own
    /// execution.
    emit_joint_cmds: bool,
}

/// Outcome of emitting one cycle's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Number of joint commands written successfully.
    pub joint_cmds_sent: usize,

    /// Number of writes which failed.
    pub num_failed: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EmitterError {
    #[error("{joint_num} joints starting at actuator ID {first_id} would exceed the largest ID (255)")]
    JointIdOverflow { first_id: u8, joint_num: usize },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Joint {
    /// Build the list of arm joints, named `joint1..=jointN` with consecutive IDs starting at
    /// `first_id`.
    pub fn arm_joints(joint_num: usize, first_id: u8) -> Result<Vec<Joint>, EmitterError> {
        (0..joint_num)
            .map(|index| {
                let id = u8::try_from(index)
                    .ok()
                    .and_then(|offset| first_id.checked_add(offset))
                    .ok_or(EmitterError::JointIdOverflow {
                        first_id,
                        joint_num,
                    })?;

                Ok(Joint {
                    index,
                    name: joint_name(index),
                    id,
                })
            })
            .collect()
    }
}

impl<S: CommandSink> CommandEmitter<S> {
    pub fn new(sink: S, joints: Vec<Joint>, emit_joint_cmds: bool) -> Self {
        Self {
            sink,
            joints,
            emit_joint_cmds,
        }
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Emit the output of one playback cycle.
    pub fn emit(&mut self, output: &OutputData) -> EmitReport {
        let mut report = EmitReport::default();

        if let (true, Some(positions)) = (self.emit_joint_cmds, &output.joint_pos_rad) {
            if positions.len() != self.joints.len() {
                warn!(
                    "Waypoint has {} positions but there are {} joints, extra values ignored",
                    positions.len(),
                    self.joints.len()
                );
            }

            for (joint, pos_rad) in self.joints.iter().zip(positions.iter()) {
                match self.sink.send_joint_cmd(joint, JointCmd { pos_rad: *pos_rad }) {
                    Ok(()) => report.joint_cmds_sent += 1,
                    Err(e) => {
                        debug!("Could not send command to {}: {}", joint.name, e);
                        report.num_failed += 1;
                    }
                }
            }
        }

        if let Err(e) = self.sink.send_status(output.status) {
            debug!("Could not send arm status: {}", e);
            report.num_failed += 1;
        }

        report
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
