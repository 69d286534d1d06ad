//! wheel_odometry - wheel-odometry + EKF localization simulation
//!
//! This crate simulates a differential-drive robot driving a rectangular
//! reference trajectory, derives a noisy dead-reckoning estimate and noisy
//! range/bearing landmark observations, and fuses odometry with landmark
//! corrections via an Extended Kalman Filter.

// Core modules
pub mod common;

// Simulation and estimation modules
pub mod analysis;
pub mod engine;
pub mod localization;
pub mod simulation;

// Re-export common types for convenience
pub use common::{normalize_angle, Command, Landmark, Measurement, Pose2D, SimulationStep};
pub use common::{OdometryError, OdometryResult, PoseEstimator};
pub use engine::{EngineState, SimulationConfig, SimulationEngine};
pub use localization::{Belief, EKFConfig, EKFLocalizer, OdometryIntegrator};
pub use simulation::{LandmarkMap, NoiseConfig, NoiseModel, RectangleConfig, TrajectoryGenerator};
