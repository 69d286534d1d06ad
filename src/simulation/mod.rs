// Simulation inputs module: reference trajectory, noise injection, landmarks

pub mod landmarks;
pub mod noise;
pub mod trajectory;

// Re-exports
pub use landmarks::{LandmarkMap, MAX_LANDMARK_COUNT};
pub use noise::{NoiseConfig, NoiseModel};
pub use trajectory::{RectangleConfig, TrajectoryGenerator};
