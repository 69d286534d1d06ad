//! Extended Kalman Filter (EKF) localization
//!
//! Maintains a Gaussian belief over the robot pose (x, y, theta), fusing
//! noisy velocity commands in the prediction step with noisy range/bearing
//! landmark observations in the correction step.

use crate::common::{normalize_angle, Command, Landmark, Measurement, Pose2D, PoseEstimator};
use crate::localization::motion;
use crate::simulation::landmarks::{range_bearing, LandmarkMap};
use nalgebra::{Matrix2, Matrix2x3, Matrix3, Vector2, Vector3};

/// Gaussian belief over the robot pose
#[derive(Debug, Clone)]
pub struct Belief {
    /// Mean pose [x, y, theta]
    pub mean: Vector3<f64>,
    /// Pose covariance, kept symmetric positive semi-definite
    pub covariance: Matrix3<f64>,
}

impl Belief {
    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.mean[0], self.mean[1], self.mean[2])
    }
}

/// Configuration for the EKF localizer
#[derive(Debug, Clone)]
pub struct EKFConfig {
    /// Process noise covariance in command space, diag(v_std^2, omega_std^2)
    pub q: Matrix2<f64>,
    /// Measurement noise covariance, diag(range_std^2, bearing_std^2)
    pub r: Matrix2<f64>,
    /// Initial pose covariance
    pub initial_covariance: Matrix3<f64>,
    /// Measurements closer than this are skipped (observation Jacobian
    /// degenerates as range goes to zero)
    pub min_range: f64,
    /// Condition-number threshold on the innovation covariance beyond which
    /// regularization kicks in
    pub max_condition: f64,
    /// Diagonal loading added to a (near-)singular innovation covariance
    pub regularization: f64,
    /// Floor applied to covariance eigenvalues to keep the belief PSD
    pub min_eigenvalue: f64,
}

impl EKFConfig {
    /// Build process and measurement noise from the simulation noise
    /// standard deviations
    pub fn from_noise_std(v_std: f64, omega_std: f64, range_std: f64, bearing_std: f64) -> Self {
        Self {
            q: Matrix2::from_diagonal(&Vector2::new(v_std.powi(2), omega_std.powi(2))),
            r: Matrix2::from_diagonal(&Vector2::new(range_std.powi(2), bearing_std.powi(2))),
            ..Self::default()
        }
    }
}

impl Default for EKFConfig {
    fn default() -> Self {
        Self {
            q: Matrix2::from_diagonal(&Vector2::new(0.1_f64.powi(2), 0.05_f64.powi(2))),
            r: Matrix2::from_diagonal(&Vector2::new(0.1_f64.powi(2), 0.02_f64.powi(2))),
            initial_covariance: Matrix3::from_diagonal(&Vector3::new(0.1, 0.1, 0.01)),
            min_range: 0.1,
            max_condition: 1e12,
            regularization: 1e-9,
            min_eigenvalue: 1e-6,
        }
    }
}

/// Extended Kalman Filter over (x, y, theta) with range/bearing corrections
#[derive(Debug, Clone)]
pub struct EKFLocalizer {
    belief: Belief,
    config: EKFConfig,
}

impl EKFLocalizer {
    pub fn new(config: EKFConfig) -> Self {
        Self::with_initial_pose(Pose2D::origin(), config)
    }

    pub fn with_initial_pose(pose: Pose2D, config: EKFConfig) -> Self {
        Self {
            belief: Belief {
                mean: pose.to_vector(),
                covariance: config.initial_covariance,
            },
            config,
        }
    }

    /// Reinitialize the belief at the given pose
    pub fn reset(&mut self, pose: Pose2D) {
        self.belief.mean = pose.to_vector();
        self.belief.covariance = self.config.initial_covariance;
    }

    pub fn belief(&self) -> &Belief {
        &self.belief
    }

    pub fn config(&self) -> &EKFConfig {
        &self.config
    }

    /// Prediction step: propagate the mean through the motion model and the
    /// covariance through G Sigma G^T + V Q V^T
    pub fn predict(&mut self, command: &Command, dt: f64) {
        let pose = self.belief.pose();
        let g = motion::jacobian_state(&pose, command, dt);
        let v = motion::jacobian_control(&pose, command, dt);

        self.belief.mean = motion::propagate(&pose, command, dt).to_vector();
        self.belief.covariance =
            g * self.belief.covariance * g.transpose() + v * self.config.q * v.transpose();
    }

    /// Correction step: fuse each measurement sequentially, every update
    /// using the posterior of the previous one as its prior.
    ///
    /// Returns true if any measurement required regularization or had to be
    /// skipped; the run itself is never aborted by a degenerate innovation
    /// covariance.
    pub fn correct(&mut self, measurements: &[Measurement], map: &LandmarkMap) -> bool {
        let mut degraded = false;
        for measurement in measurements {
            let landmark = match map.get(measurement.landmark_id) {
                Some(lm) => lm,
                None => {
                    degraded = true;
                    continue;
                }
            };

            let pose = self.belief.pose();
            let (expected_range, expected_bearing) = range_bearing(&pose, landmark);
            if expected_range < self.config.min_range {
                degraded = true;
                continue;
            }

            let h = observation_jacobian(&pose, landmark);
            let p = self.belief.covariance;
            let mut s = h * p * h.transpose() + self.config.r;

            if !is_well_conditioned(&s, self.config.max_condition) {
                s += Matrix2::identity() * self.config.regularization;
                degraded = true;
            }
            let s_inv = match s.try_inverse() {
                Some(inv) => inv,
                None => {
                    // Still singular after diagonal loading: drop this
                    // measurement and carry on
                    degraded = true;
                    continue;
                }
            };

            let k = p * h.transpose() * s_inv;
            let innovation = Vector2::new(
                measurement.range - expected_range,
                normalize_angle(measurement.bearing - expected_bearing),
            );

            self.belief.mean += k * innovation;
            self.belief.mean[2] = normalize_angle(self.belief.mean[2]);
            self.belief.covariance = (Matrix3::identity() - k * h) * p;
            self.enforce_psd();
        }
        degraded
    }

    /// Symmetrize the covariance and floor its eigenvalues, counteracting
    /// floating-point drift away from symmetric PSD
    fn enforce_psd(&mut self) {
        let p = self.belief.covariance;
        let sym = (p + p.transpose()) * 0.5;
        let min_eig = sym
            .symmetric_eigenvalues()
            .iter()
            .fold(f64::INFINITY, |a, &b| a.min(b));
        self.belief.covariance = if min_eig < self.config.min_eigenvalue {
            sym + Matrix3::identity() * (self.config.min_eigenvalue - min_eig)
        } else {
            sym
        };
    }
}

impl PoseEstimator for EKFLocalizer {
    fn predict(&mut self, command: &Command, dt: f64) {
        EKFLocalizer::predict(self, command, dt);
    }

    fn pose(&self) -> Pose2D {
        self.belief.pose()
    }

    fn covariance(&self) -> Option<&Matrix3<f64>> {
        Some(&self.belief.covariance)
    }
}

/// Jacobian of the range/bearing observation with respect to the robot pose
fn observation_jacobian(pose: &Pose2D, landmark: &Landmark) -> Matrix2x3<f64> {
    let dx = landmark.x - pose.x;
    let dy = landmark.y - pose.y;
    let d2 = dx * dx + dy * dy;
    let d = d2.sqrt();
    Matrix2x3::new(
        -dx / d, -dy / d, 0.0,
        dy / d2, -dx / d2, -1.0,
    )
}

fn is_well_conditioned(s: &Matrix2<f64>, max_condition: f64) -> bool {
    let eigs = s.symmetric_eigenvalues();
    let max_abs = eigs[0].abs().max(eigs[1].abs());
    let min_abs = eigs[0].abs().min(eigs[1].abs());
    min_abs > 0.0 && max_abs / min_abs < max_condition && max_abs.is_finite()
}
