//! Dead-reckoning pose integration
//!
//! Integrates noisy velocity commands through the shared motion model with
//! no external correction, so estimation error accumulates without bound.
//! The divergence from ground truth is the point of the demo and is left
//! uncorrected.

use crate::common::{Command, Pose2D, PoseEstimator};
use crate::localization::motion;

/// Dead-reckoning (odometry-only) pose estimator
#[derive(Debug, Clone)]
pub struct OdometryIntegrator {
    pose: Pose2D,
}

impl OdometryIntegrator {
    pub fn new() -> Self {
        Self { pose: Pose2D::origin() }
    }

    pub fn with_initial_pose(pose: Pose2D) -> Self {
        Self { pose }
    }

    /// Integrate one noisy command and return the updated pose
    pub fn step(&mut self, noisy_command: &Command, dt: f64) -> Pose2D {
        self.pose = motion::propagate(&self.pose, noisy_command, dt);
        self.pose
    }

    /// Rewind the integrator to the given pose
    pub fn reset(&mut self, pose: Pose2D) {
        self.pose = pose;
    }

    pub fn pose(&self) -> Pose2D {
        self.pose
    }
}

impl Default for OdometryIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseEstimator for OdometryIntegrator {
    fn predict(&mut self, command: &Command, dt: f64) {
        self.step(command, dt);
    }

    fn pose(&self) -> Pose2D {
        self.pose
    }
}
