//! Error types for wheel_odometry

use std::fmt;

/// Main error type for the odometry/EKF simulation engine
#[derive(Debug)]
pub enum OdometryError {
    /// Rejected configuration (negative dt, negative noise std, empty map, ...)
    InvalidConfiguration(String),
    /// The finite reference trajectory has been fully consumed
    ExhaustedTrajectory,
    /// Numerical computation failed (matrix inversion, etc.)
    NumericalError(String),
}

impl fmt::Display for OdometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OdometryError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            OdometryError::ExhaustedTrajectory => {
                write!(f, "Trajectory exhausted: reset() the engine to restart")
            }
            OdometryError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for OdometryError {}

/// Result type alias for engine operations
pub type OdometryResult<T> = Result<T, OdometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OdometryError::InvalidConfiguration("dt must be positive".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid configuration: dt must be positive"
        );
    }

    #[test]
    fn test_exhausted_display() {
        let err = OdometryError::ExhaustedTrajectory;
        assert!(format!("{}", err).contains("reset()"));
    }
}
