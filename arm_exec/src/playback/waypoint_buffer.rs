//! Waypoint buffer and playback cursor

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::PlaybackError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One position per joint.
///
/// Units: radians
pub type Waypoint = Vec<f64>;

/// An ordered, non-empty sequence of waypoints which all have the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedTrajectory {
    waypoints: Vec<Waypoint>,
}

/// Holds the trajectory currently being played back.
#[derive(Debug, Clone, Default)]
pub struct WaypointBuffer {
    /// Configured number of joints.
    joint_count: usize,

    trajectory: Option<PlannedTrajectory>,
}

/// Position of playback within the loaded trajectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackCursor {
    /// Index of the next waypoint to emit.
    pub step_index: usize,

    /// Index of the last waypoint of the trajectory.
    pub terminal_index: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PlannedTrajectory {
    /// Build a trajectory, checking that it has at least one waypoint and that every waypoint has
    /// the same number of joints.
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, PlaybackError> {
        let joint_count = match waypoints.first() {
            Some(w) => w.len(),
            None => {
                return Err(PlaybackError::InvalidTrajectory(
                    "trajectory contains no waypoints".into(),
                ))
            }
        };

        if let Some((i, w)) = waypoints
            .iter()
            .enumerate()
            .find(|(_, w)| w.len() != joint_count)
        {
            return Err(PlaybackError::InvalidTrajectory(format!(
                "waypoint {} has {} joints but waypoint 0 has {}",
                i,
                w.len(),
                joint_count
            )));
        }

        Ok(Self { waypoints })
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn joint_count(&self) -> usize {
        self.waypoints.first().map(|w| w.len()).unwrap_or(0)
    }

    pub fn get(&self, index: usize) -> Option<&[f64]> {
        self.waypoints.get(index).map(|w| w.as_slice())
    }
}

impl WaypointBuffer {
    /// Create an empty buffer for an arm with the given number of joints.
    pub fn new(joint_count: usize) -> Self {
        Self {
            joint_count,
            trajectory: None,
        }
    }

    /// Replace the buffer's content with the given trajectory.
    ///
    /// If the trajectory's joint count doesn't match the configured one the buffer is left
    /// untouched.
    pub fn load(&mut self, trajectory: PlannedTrajectory) -> Result<(), PlaybackError> {
        if trajectory.joint_count() != self.joint_count {
            return Err(PlaybackError::InvalidTrajectory(format!(
                "trajectory has {} joints, expected {}",
                trajectory.joint_count(),
                self.joint_count
            )));
        }

        self.trajectory = Some(trajectory);

        Ok(())
    }

    /// Waypoint at the cursor, or `None` if nothing is loaded or the cursor is past the end.
    pub fn current(&self, cursor: &PlaybackCursor) -> Option<&[f64]> {
        self.trajectory
            .as_ref()
            .and_then(|t| t.get(cursor.step_index))
    }

    /// Number of waypoints in the loaded trajectory, 0 if empty.
    pub fn count(&self) -> usize {
        self.trajectory
            .as_ref()
            .map(|t| t.waypoint_count())
            .unwrap_or(0)
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    /// Discard the loaded trajectory.
    pub fn clear(&mut self) {
        self.trajectory = None;
    }
}

impl PlaybackCursor {
    /// A cursor at the start of a trajectory with the given number of waypoints.
    pub fn start(waypoint_count: usize) -> Self {
        Self {
            step_index: 0,
            terminal_index: waypoint_count.saturating_sub(1),
        }
    }

    pub fn at_terminal(&self) -> bool {
        self.step_index >= self.terminal_index
    }

    pub fn advance(&mut self) {
        self.step_index += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn traj(waypoints: Vec<Vec<f64>>) -> PlannedTrajectory {
        PlannedTrajectory::new(waypoints).unwrap()
    }

    #[test]
    fn test_trajectory_validation() {
        assert!(matches!(
            PlannedTrajectory::new(vec![]),
            Err(PlaybackError::InvalidTrajectory(_))
        ));
        assert!(matches!(
            PlannedTrajectory::new(vec![vec![0.0; 4], vec![0.0; 3]]),
            Err(PlaybackError::InvalidTrajectory(_))
        ));

        let t = traj(vec![vec![0.0; 4], vec![1.0; 4]]);
        assert_eq!(t.waypoint_count(), 2);
        assert_eq!(t.joint_count(), 4);
    }

    #[test]
    fn test_load_replaces_content() {
        let mut buffer = WaypointBuffer::new(2);
        assert_eq!(buffer.count(), 0);

        buffer.load(traj(vec![vec![0.0, 0.1]])).unwrap();
        assert_eq!(buffer.count(), 1);

        buffer
            .load(traj(vec![vec![1.0, 1.1], vec![2.0, 2.1], vec![3.0, 3.1]]))
            .unwrap();
        assert_eq!(buffer.count(), 3);

        let cursor = PlaybackCursor {
            step_index: 2,
            terminal_index: 2,
        };
        assert_eq!(buffer.current(&cursor), Some(&[3.0, 3.1][..]));
    }

    #[test]
    fn test_load_wrong_joint_count_keeps_content() {
        let mut buffer = WaypointBuffer::new(2);
        buffer.load(traj(vec![vec![0.0, 0.1]])).unwrap();

        let res = buffer.load(traj(vec![vec![0.0; 3], vec![0.0; 3]]));
        assert!(matches!(res, Err(PlaybackError::InvalidTrajectory(_))));

        assert_eq!(buffer.count(), 1);
        assert_eq!(
            buffer.current(&PlaybackCursor::start(1)),
            Some(&[0.0, 0.1][..])
        );
    }

    #[test]
    fn test_cursor() {
        let mut cursor = PlaybackCursor::start(3);
        assert_eq!(cursor.terminal_index, 2);
        assert!(!cursor.at_terminal());
        cursor.advance();
        cursor.advance();
        assert!(cursor.at_terminal());
        cursor.reset();
        assert_eq!(cursor, PlaybackCursor::default());

        // A single waypoint trajectory starts on its terminal index
        assert!(PlaybackCursor::start(1).at_terminal());
    }
}
