//! Post-hoc error analysis of simulation history
//!
//! Pure functions comparing the dead-reckoning and EKF estimates against
//! ground truth. The per-step series is lazy over borrowed history, so a
//! plotting layer can consume it incrementally without this module
//! buffering anything; restart by re-iterating the engine's history.

use crate::common::{normalize_angle, Pose2D, SimulationStep};

/// Euclidean distance between true and estimated positions
pub fn position_error(truth: &Pose2D, estimate: &Pose2D) -> f64 {
    truth.distance(estimate)
}

/// Absolute wrapped heading difference, in [0, pi]
pub fn heading_error(truth: &Pose2D, estimate: &Pose2D) -> f64 {
    normalize_angle(truth.theta - estimate.theta).abs()
}

/// Per-step errors of both estimators against ground truth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorSample {
    pub t: f64,
    pub odometry_position: f64,
    pub odometry_heading: f64,
    pub ekf_position: f64,
    pub ekf_heading: f64,
}

impl ErrorSample {
    pub fn from_step(step: &SimulationStep) -> Self {
        Self {
            t: step.t,
            odometry_position: position_error(&step.true_pose, &step.odometry_pose),
            odometry_heading: heading_error(&step.true_pose, &step.odometry_pose),
            ekf_position: position_error(&step.true_pose, &step.ekf_pose),
            ekf_heading: heading_error(&step.true_pose, &step.ekf_pose),
        }
    }
}

/// Lazy error series over borrowed history
pub fn error_series<'a, I>(steps: I) -> impl Iterator<Item = ErrorSample> + 'a
where
    I: IntoIterator<Item = &'a SimulationStep>,
    I::IntoIter: 'a,
{
    steps.into_iter().map(ErrorSample::from_step)
}

/// Aggregate position/heading errors of a single estimator track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorSummary {
    pub samples: usize,
    pub mean_position: f64,
    pub max_position: f64,
    pub final_position: f64,
    pub mean_heading: f64,
    pub final_heading: f64,
}

impl ErrorSummary {
    /// Summarize the dead-reckoning track; None for empty history
    pub fn odometry<'a, I>(steps: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a SimulationStep>,
    {
        Self::from_samples(
            steps
                .into_iter()
                .map(ErrorSample::from_step)
                .map(|s| (s.odometry_position, s.odometry_heading)),
        )
    }

    /// Summarize the EKF track; None for empty history
    pub fn ekf<'a, I>(steps: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a SimulationStep>,
    {
        Self::from_samples(
            steps
                .into_iter()
                .map(ErrorSample::from_step)
                .map(|s| (s.ekf_position, s.ekf_heading)),
        )
    }

    fn from_samples(samples: impl Iterator<Item = (f64, f64)>) -> Option<Self> {
        let mut summary = ErrorSummary {
            samples: 0,
            mean_position: 0.0,
            max_position: 0.0,
            final_position: 0.0,
            mean_heading: 0.0,
            final_heading: 0.0,
        };
        for (position, heading) in samples {
            summary.samples += 1;
            summary.mean_position += position;
            summary.mean_heading += heading;
            summary.max_position = summary.max_position.max(position);
            summary.final_position = position;
            summary.final_heading = heading;
        }
        if summary.samples == 0 {
            return None;
        }
        summary.mean_position /= summary.samples as f64;
        summary.mean_heading /= summary.samples as f64;
        Some(summary)
    }
}
