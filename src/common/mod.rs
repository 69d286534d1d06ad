//! Common types, traits, and error definitions for wheel_odometry
//!
//! This module provides the foundational building blocks used across
//! the simulation and localization modules in this crate.

pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
