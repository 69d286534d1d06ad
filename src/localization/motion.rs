//! Discrete-time unicycle (differential-drive) kinematics
//!
//! The single motion model shared by the trajectory generator, the
//! dead-reckoning integrator and the EKF prediction step, together with its
//! analytic Jacobians. All functions are pure.

use crate::common::{normalize_angle, Command, Pose2D};
use nalgebra::{Matrix3, Matrix3x2};

/// Propagate a pose by one timestep:
/// x' = x + v cos(theta) dt, y' = y + v sin(theta) dt, theta' = theta + omega dt
pub fn propagate(pose: &Pose2D, command: &Command, dt: f64) -> Pose2D {
    Pose2D {
        x: pose.x + command.v * pose.theta.cos() * dt,
        y: pose.y + command.v * pose.theta.sin() * dt,
        theta: normalize_angle(pose.theta + command.omega * dt),
    }
}

/// Jacobian of the motion model with respect to the state (G matrix)
pub fn jacobian_state(pose: &Pose2D, command: &Command, dt: f64) -> Matrix3<f64> {
    let theta = pose.theta;
    let v = command.v;
    Matrix3::new(
        1.0, 0.0, -dt * v * theta.sin(),
        0.0, 1.0, dt * v * theta.cos(),
        0.0, 0.0, 1.0,
    )
}

/// Jacobian of the motion model with respect to the command noise (V matrix)
pub fn jacobian_control(pose: &Pose2D, _command: &Command, dt: f64) -> Matrix3x2<f64> {
    let theta = pose.theta;
    Matrix3x2::new(
        dt * theta.cos(), 0.0,
        dt * theta.sin(), 0.0,
        0.0, dt,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_propagate_straight() {
        let pose = Pose2D::origin();
        let next = propagate(&pose, &Command::new(1.0, 0.0), 0.1);
        assert!((next.x - 0.1).abs() < 1e-12);
        assert!(next.y.abs() < 1e-12);
        assert!(next.theta.abs() < 1e-12);
    }

    #[test]
    fn test_propagate_turn_in_place() {
        let pose = Pose2D::origin();
        let next = propagate(&pose, &Command::new(0.0, PI / 2.0), 1.0);
        assert!(next.x.abs() < 1e-12);
        assert!((next.theta - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_propagate_wraps_heading() {
        let pose = Pose2D::new(0.0, 0.0, PI - 0.01);
        let next = propagate(&pose, &Command::new(0.0, 0.02), 1.0);
        assert!(next.theta <= PI && next.theta > -PI);
        assert!((next.theta - (-PI + 0.01)).abs() < 1e-10);
    }

    #[test]
    fn test_jacobian_state_matches_finite_difference() {
        let pose = Pose2D::new(1.0, 2.0, 0.7);
        let cmd = Command::new(0.5, 0.2);
        let dt = 0.1;
        let g = jacobian_state(&pose, &cmd, dt);

        let eps = 1e-7;
        let perturbed = Pose2D { theta: pose.theta + eps, ..pose };
        let f0 = propagate(&pose, &cmd, dt);
        let f1 = propagate(&perturbed, &cmd, dt);
        assert!((g[(0, 2)] - (f1.x - f0.x) / eps).abs() < 1e-5);
        assert!((g[(1, 2)] - (f1.y - f0.y) / eps).abs() < 1e-5);
    }

    #[test]
    fn test_jacobian_control_matches_finite_difference() {
        let pose = Pose2D::new(1.0, 2.0, 0.7);
        let cmd = Command::new(0.5, 0.2);
        let dt = 0.1;
        let v_mat = jacobian_control(&pose, &cmd, dt);

        let eps = 1e-7;
        let cmd_dv = Command::new(cmd.v + eps, cmd.omega);
        let f0 = propagate(&pose, &cmd, dt);
        let f1 = propagate(&pose, &cmd_dv, dt);
        assert!((v_mat[(0, 0)] - (f1.x - f0.x) / eps).abs() < 1e-5);
        assert!((v_mat[(1, 0)] - (f1.y - f0.y) / eps).abs() < 1e-5);

        let cmd_dw = Command::new(cmd.v, cmd.omega + eps);
        let f2 = propagate(&pose, &cmd_dw, dt);
        assert!((v_mat[(2, 1)] - (f2.theta - f0.theta) / eps).abs() < 1e-5);
    }
}
