//! Noise-free rectangular reference trajectory
//!
//! The reference path is a rectangle driven as four straight segments, each
//! followed by a 90-degree turn in place, emitted as a finite tape of
//! `(v, omega)` commands. Ground truth comes from integrating those commands
//! exactly through the shared motion model, so truth, dead reckoning and the
//! EKF prediction all see the same kinematics.
//!
//! Step counts are rounded to whole timesteps and the per-segment speed and
//! per-turn rate re-derived from them, so every straight covers exactly its
//! segment length and every turn is exactly pi/2. Four turns sum to 2*pi and
//! the lap closes on the starting pose.

use crate::common::{Command, OdometryError, OdometryResult, Pose2D};
use crate::localization::motion;
use std::f64::consts::{FRAC_PI_2, PI};

/// Geometry and timing of the rectangular reference path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleConfig {
    /// Length of the bottom/top segments [m]
    pub width: f64,
    /// Length of the left/right segments [m]
    pub height: f64,
    /// Nominal straight-segment speed [m/s]
    pub speed: f64,
    /// Nominal turn-in-place rate [rad/s]
    pub turn_rate: f64,
}

impl RectangleConfig {
    pub fn validate(&self) -> OdometryResult<()> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("speed", self.speed),
            ("turn_rate", self.turn_rate),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(OdometryError::InvalidConfiguration(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for RectangleConfig {
    /// The original demo's 10 x 8 m arena at 0.5 m/s
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 8.0,
            speed: 0.5,
            turn_rate: PI / 4.0,
        }
    }
}

/// Finite, restartable generator of reference commands and exact true poses
#[derive(Debug, Clone)]
pub struct TrajectoryGenerator {
    lap: Vec<Command>,
    n_steps: usize,
    dt: f64,
    start_pose: Pose2D,
    index: usize,
    pose: Pose2D,
}

impl TrajectoryGenerator {
    /// Build the command tape for `total_time` seconds of driving, cycling
    /// laps of the rectangle as needed
    pub fn new(config: &RectangleConfig, total_time: f64, dt: f64) -> OdometryResult<Self> {
        config.validate()?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(OdometryError::InvalidConfiguration(format!(
                "dt must be a positive finite number, got {}",
                dt
            )));
        }
        if !total_time.is_finite() || total_time <= 0.0 {
            return Err(OdometryError::InvalidConfiguration(format!(
                "total_time must be a positive finite number, got {}",
                total_time
            )));
        }

        let mut lap = Vec::new();
        for &length in &[config.width, config.height, config.width, config.height] {
            let n_straight = ((length / (config.speed * dt)).round() as usize).max(1);
            let v = length / (n_straight as f64 * dt);
            lap.extend(std::iter::repeat(Command::new(v, 0.0)).take(n_straight));

            let n_turn = ((FRAC_PI_2 / (config.turn_rate * dt)).round() as usize).max(1);
            let omega = FRAC_PI_2 / (n_turn as f64 * dt);
            lap.extend(std::iter::repeat(Command::new(0.0, omega)).take(n_turn));
        }

        let n_steps = ((total_time / dt).round() as usize).max(1);
        let start_pose = Pose2D::origin();
        Ok(Self {
            lap,
            n_steps,
            dt,
            start_pose,
            index: 0,
            pose: start_pose,
        })
    }

    /// Rewind to the first command
    pub fn reset(&mut self) {
        self.index = 0;
        self.pose = self.start_pose;
    }

    /// Advance one timestep: the emitted command and the exact pose it
    /// produces. Fails with `ExhaustedTrajectory` past the end.
    pub fn next(&mut self) -> OdometryResult<(Command, Pose2D)> {
        if self.index >= self.n_steps {
            return Err(OdometryError::ExhaustedTrajectory);
        }
        let command = self.lap[self.index % self.lap.len()];
        self.pose = motion::propagate(&self.pose, &command, self.dt);
        self.index += 1;
        Ok((command, self.pose))
    }

    /// Total number of steps in the finite sequence
    pub fn len(&self) -> usize {
        self.n_steps
    }

    pub fn is_empty(&self) -> bool {
        self.n_steps == 0
    }

    /// Steps in one full lap of the rectangle
    pub fn steps_per_lap(&self) -> usize {
        self.lap.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.n_steps
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}
