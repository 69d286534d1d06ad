// Localization algorithms module

pub mod ekf;
pub mod motion;
pub mod odometry;

// Re-exports
pub use ekf::{Belief, EKFConfig, EKFLocalizer};
pub use odometry::OdometryIntegrator;
