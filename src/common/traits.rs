//! Common traits defining interfaces for pose estimators

use crate::common::types::{Command, Pose2D};
use nalgebra::Matrix3;

/// Trait for estimators that track a 2D pose from velocity commands
/// (dead reckoning, EKF, ...)
pub trait PoseEstimator {
    /// Propagate the estimate forward by one timestep
    fn predict(&mut self, command: &Command, dt: f64);

    /// Current pose estimate
    fn pose(&self) -> Pose2D;

    /// Current pose covariance, if the estimator tracks one
    fn covariance(&self) -> Option<&Matrix3<f64>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEstimator {
        pose: Pose2D,
    }

    impl PoseEstimator for FixedEstimator {
        fn predict(&mut self, command: &Command, dt: f64) {
            self.pose = Pose2D::new(self.pose.x + command.v * dt, self.pose.y, self.pose.theta);
        }

        fn pose(&self) -> Pose2D {
            self.pose
        }
    }

    #[test]
    fn test_pose_estimator_trait() {
        let mut est = FixedEstimator { pose: Pose2D::origin() };
        est.predict(&Command::new(1.0, 0.0), 0.5);
        assert!((est.pose().x - 0.5).abs() < 1e-12);
        assert!(est.covariance().is_none());
    }
}
