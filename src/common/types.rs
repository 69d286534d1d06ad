//! Common types used throughout wheel_odometry

use nalgebra::{Matrix3, Vector2, Vector3};
use std::f64::consts::PI;

/// Normalize an angle into (-pi, pi]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a <= -PI {
        a += 2.0 * PI;
    }
    a
}

/// 2D rigid-body pose (position + heading)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    /// Create a new pose; the heading is normalized into (-pi, pi]
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, theta: 0.0 }
    }

    /// Euclidean distance between the positions of two poses
    pub fn distance(&self, other: &Pose2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.theta)
    }
}

impl From<Vector3<f64>> for Pose2D {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Velocity command for a differential-drive robot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    pub v: f64,     // linear velocity [m/s]
    pub omega: f64, // angular velocity [rad/s]
}

impl Command {
    pub fn new(v: f64, omega: f64) -> Self {
        Self { v, omega }
    }

    pub fn zero() -> Self {
        Self { v: 0.0, omega: 0.0 }
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.v, self.omega)
    }
}

impl From<Vector2<f64>> for Command {
    fn from(v: Vector2<f64>) -> Self {
        Self { v: v[0], omega: v[1] }
    }
}

/// Static, uniquely identified point landmark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// Range/bearing observation of a known landmark, relative to the sensing pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub landmark_id: usize,
    pub range: f64,
    pub bearing: f64,
}

impl Measurement {
    /// Create a new measurement; the bearing is normalized into (-pi, pi]
    pub fn new(landmark_id: usize, range: f64, bearing: f64) -> Self {
        Self {
            landmark_id,
            range,
            bearing: normalize_angle(bearing),
        }
    }
}

/// One timestep's snapshot of the simulation, immutable once produced.
///
/// Each step stores an independent copy of the EKF covariance so that
/// history entries never alias the live belief.
#[derive(Debug, Clone)]
pub struct SimulationStep {
    /// Simulation time [s]
    pub t: f64,
    /// Ground-truth pose
    pub true_pose: Pose2D,
    /// Dead-reckoning pose integrated from noisy commands
    pub odometry_pose: Pose2D,
    /// EKF posterior mean
    pub ekf_pose: Pose2D,
    /// EKF posterior covariance
    pub ekf_covariance: Matrix3<f64>,
    /// Noisy measurements fused during this step
    pub measurements: Vec<Measurement>,
    /// True if any correction this step needed regularization or was skipped
    pub regularized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle_range() {
        for i in -100..100 {
            let a = i as f64 * 0.37;
            let n = normalize_angle(a);
            assert!(n > -PI && n <= PI, "normalize({}) = {}", a, n);
        }
    }

    #[test]
    fn test_normalize_angle_periodic() {
        for i in -50..50 {
            let a = i as f64 * 0.53;
            let diff = normalize_angle(a + 2.0 * PI) - normalize_angle(a);
            assert!(diff.abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalize_angle_boundaries() {
        assert!((normalize_angle(PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_pose2d_distance() {
        let p1 = Pose2D::new(0.0, 0.0, 0.0);
        let p2 = Pose2D::new(3.0, 4.0, 1.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_pose2d_new_normalizes_heading() {
        let pose = Pose2D::new(0.0, 0.0, 4.0 * PI + 0.1);
        assert!((pose.theta - 0.1).abs() < 1e-10);
    }

    #[test]
    fn test_measurement_bearing_wrapped() {
        let m = Measurement::new(0, 1.0, 3.0 * PI);
        assert!((m.bearing - PI).abs() < 1e-12);
    }
}
