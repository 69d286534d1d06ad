//! Synchronous simulation engine
//!
//! One `step()` advances the whole pipeline by a single timestep: the
//! trajectory generator emits a command and the exact true pose, the noise
//! model corrupts the command, dead reckoning and the EKF prediction both
//! integrate it, landmark observations are taken from the true pose,
//! corrupted, and fused by the EKF correction, and the resulting snapshot is
//! appended to history.
//!
//! The engine owns all of its mutable state and has no notion of wall-clock
//! time; play/pause/step affordances of a caller map onto whether `step()`
//! gets called. Independent engines share nothing and can run in parallel
//! for Monte Carlo evaluation.

use crate::common::{Landmark, OdometryError, OdometryResult, Pose2D, SimulationStep};
use crate::localization::{EKFConfig, EKFLocalizer, OdometryIntegrator};
use crate::simulation::{
    LandmarkMap, NoiseConfig, NoiseModel, RectangleConfig, TrajectoryGenerator,
};

/// Engine lifecycle: `Ready` after construction or `reset()`, `Running` once
/// steps are accepted, `Exhausted` when the finite trajectory is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Ready,
    Running,
    Exhausted,
}

/// Full engine configuration, validated at construction and `configure()`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Simulated duration [s]
    pub total_time: f64,
    /// Timestep [s]
    pub dt: f64,
    /// Linear velocity noise std [m/s]
    pub v_std: f64,
    /// Angular velocity noise std [rad/s]
    pub omega_std: f64,
    /// Landmark range noise std [m]
    pub range_std: f64,
    /// Landmark bearing noise std [rad]
    pub bearing_std: f64,
    /// Maximum landmark sensing range [m]
    pub max_range: f64,
    /// Whether EKF corrections are performed at all
    pub landmarks_enabled: bool,
    /// Attempt corrections every this many steps
    pub landmark_interval: usize,
    /// Number of landmarks from the canonical layout
    pub landmark_count: usize,
    /// Reference path geometry
    pub rectangle: RectangleConfig,
}

impl SimulationConfig {
    pub fn validate(&self) -> OdometryResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(OdometryError::InvalidConfiguration(format!(
                "dt must be a positive finite number, got {}",
                self.dt
            )));
        }
        if !self.total_time.is_finite() || self.total_time <= 0.0 {
            return Err(OdometryError::InvalidConfiguration(format!(
                "total_time must be a positive finite number, got {}",
                self.total_time
            )));
        }
        self.noise_config().validate()?;
        self.rectangle.validate()?;
        if self.max_range <= 0.0 {
            return Err(OdometryError::InvalidConfiguration(format!(
                "max_range must be positive, got {}",
                self.max_range
            )));
        }
        if self.landmark_interval == 0 {
            return Err(OdometryError::InvalidConfiguration(
                "landmark_interval must be at least 1".to_string(),
            ));
        }
        if self.landmarks_enabled && self.landmark_count == 0 {
            return Err(OdometryError::InvalidConfiguration(
                "landmarks are enabled but the map is empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn noise_config(&self) -> NoiseConfig {
        NoiseConfig {
            v_std: self.v_std,
            omega_std: self.omega_std,
            range_std: self.range_std,
            bearing_std: self.bearing_std,
        }
    }

    fn ekf_config(&self) -> EKFConfig {
        EKFConfig::from_noise_std(self.v_std, self.omega_std, self.range_std, self.bearing_std)
    }
}

impl Default for SimulationConfig {
    /// Defaults of the original demo: 50 s at 10 Hz, five landmarks
    fn default() -> Self {
        let noise = NoiseConfig::default();
        Self {
            total_time: 50.0,
            dt: 0.1,
            v_std: noise.v_std,
            omega_std: noise.omega_std,
            range_std: noise.range_std,
            bearing_std: noise.bearing_std,
            max_range: f64::INFINITY,
            landmarks_enabled: true,
            landmark_interval: 1,
            landmark_count: 5,
            rectangle: RectangleConfig::default(),
        }
    }
}

/// Wheel-odometry + EKF localization engine
pub struct SimulationEngine {
    config: SimulationConfig,
    generator: TrajectoryGenerator,
    noise: NoiseModel,
    odometry: OdometryIntegrator,
    ekf: EKFLocalizer,
    map: LandmarkMap,
    history: Vec<SimulationStep>,
    state: EngineState,
    step_index: usize,
    seed: u64,
}

impl SimulationEngine {
    /// Build an engine with the canonical landmark layout; fails with
    /// `InvalidConfiguration` for a bad configuration, never during `step()`
    pub fn new(config: SimulationConfig) -> OdometryResult<Self> {
        let map =
            LandmarkMap::generate(config.landmark_count).with_max_range(config.max_range);
        Self::with_map(config, map)
    }

    /// Build an engine with an explicit landmark map
    pub fn with_map(config: SimulationConfig, map: LandmarkMap) -> OdometryResult<Self> {
        config.validate()?;
        if config.landmarks_enabled && map.is_empty() {
            return Err(OdometryError::InvalidConfiguration(
                "landmarks are enabled but the map is empty".to_string(),
            ));
        }
        let seed = 0;
        Ok(Self {
            generator: TrajectoryGenerator::new(&config.rectangle, config.total_time, config.dt)?,
            noise: NoiseModel::new(&config.noise_config(), seed)?,
            odometry: OdometryIntegrator::new(),
            ekf: EKFLocalizer::new(config.ekf_config()),
            map,
            history: Vec::new(),
            state: EngineState::Ready,
            step_index: 0,
            seed,
            config,
        })
    }

    /// Replace the configuration, rebuilding the landmark map and all
    /// component state; returns the engine to `Ready` with the current seed
    pub fn configure(&mut self, config: SimulationConfig) -> OdometryResult<()> {
        let seed = self.seed;
        *self = Self::new(config)?;
        self.reset(seed);
        Ok(())
    }

    /// Rewind the trajectory, both estimators and the random stream;
    /// the engine returns to `Ready`
    pub fn reset(&mut self, seed: u64) {
        self.generator.reset();
        self.noise.reset(seed);
        self.odometry.reset(Pose2D::origin());
        self.ekf.reset(Pose2D::origin());
        self.history.clear();
        self.state = EngineState::Ready;
        self.step_index = 0;
        self.seed = seed;
    }

    /// Advance one timestep. Fails with `ExhaustedTrajectory` once the
    /// finite reference trajectory is consumed; recover with `reset()`.
    pub fn step(&mut self) -> OdometryResult<SimulationStep> {
        let (command, true_pose) = match self.generator.next() {
            Ok(pair) => pair,
            Err(e) => {
                self.state = EngineState::Exhausted;
                return Err(e);
            }
        };
        self.state = EngineState::Running;
        self.step_index += 1;

        let dt = self.config.dt;
        let noisy_command = self.noise.corrupt_command(&command);
        let odometry_pose = self.odometry.step(&noisy_command, dt);
        self.ekf.predict(&noisy_command, dt);

        let mut measurements = Vec::new();
        let mut regularized = false;
        if self.config.landmarks_enabled && self.step_index % self.config.landmark_interval == 0 {
            let ideal = self.map.observe(&true_pose);
            measurements = ideal
                .iter()
                .map(|m| self.noise.corrupt_measurement(m))
                .collect();
            regularized = self.ekf.correct(&measurements, &self.map);
        }

        let belief = self.ekf.belief();
        let step = SimulationStep {
            t: self.step_index as f64 * dt,
            true_pose,
            odometry_pose,
            ekf_pose: belief.pose(),
            ekf_covariance: belief.covariance,
            measurements,
            regularized,
        };
        self.history.push(step.clone());
        if self.generator.is_exhausted() {
            self.state = EngineState::Exhausted;
        }
        Ok(step)
    }

    /// Landmarks in id order, for display
    pub fn landmarks(&self) -> &[Landmark] {
        self.map.landmarks()
    }

    /// Lazy replay of all steps since the last `reset()`
    pub fn history(&self) -> impl Iterator<Item = &SimulationStep> + '_ {
        self.history.iter()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of steps in the configured trajectory
    pub fn trajectory_len(&self) -> usize {
        self.generator.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ErrorSummary;

    fn noiseless_config() -> SimulationConfig {
        SimulationConfig {
            total_time: 20.0,
            v_std: 0.0,
            omega_std: 0.0,
            range_std: 0.0,
            bearing_std: 0.0,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_noise_free_round_trip() {
        let mut engine = SimulationEngine::new(noiseless_config()).unwrap();
        engine.reset(42);
        while let Ok(step) = engine.step() {
            assert!(step.true_pose.distance(&step.odometry_pose) < 1e-9);
            assert!((step.true_pose.theta - step.odometry_pose.theta).abs() < 1e-9);
            assert!(step.true_pose.distance(&step.ekf_pose) < 1e-9);
            assert!((step.true_pose.theta - step.ekf_pose.theta).abs() < 1e-9);
        }
        assert_eq!(engine.state(), EngineState::Exhausted);
    }

    #[test]
    fn test_exhaustion_and_reset_cycle() {
        let config = SimulationConfig { total_time: 5.0, ..SimulationConfig::default() };
        let mut engine = SimulationEngine::new(config).unwrap();
        engine.reset(1);
        let n = engine.trajectory_len();
        for _ in 0..n {
            assert!(engine.step().is_ok());
        }
        assert!(matches!(
            engine.step(),
            Err(OdometryError::ExhaustedTrajectory)
        ));
        assert_eq!(engine.state(), EngineState::Exhausted);

        engine.reset(1);
        assert_eq!(engine.state(), EngineState::Ready);
        for _ in 0..n {
            assert!(engine.step().is_ok());
        }
    }

    #[test]
    fn test_state_machine() {
        let config = SimulationConfig { total_time: 1.0, ..SimulationConfig::default() };
        let mut engine = SimulationEngine::new(config).unwrap();
        assert_eq!(engine.state(), EngineState::Ready);
        engine.step().unwrap();
        assert_eq!(engine.state(), EngineState::Running);
        while engine.step().is_ok() {}
        assert_eq!(engine.state(), EngineState::Exhausted);
        engine.reset(0);
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[test]
    fn test_covariance_valid_every_step() {
        let mut engine = SimulationEngine::new(SimulationConfig {
            total_time: 20.0,
            ..SimulationConfig::default()
        })
        .unwrap();
        engine.reset(7);
        while let Ok(step) = engine.step() {
            let p = step.ekf_covariance;
            assert!((p - p.transpose()).norm() < 1e-9);
            for eig in p.symmetric_eigenvalues().iter() {
                assert!(*eig >= -1e-9, "negative eigenvalue {}", eig);
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces_history() {
        let config = SimulationConfig { total_time: 10.0, ..SimulationConfig::default() };
        let mut a = SimulationEngine::new(config).unwrap();
        let mut b = SimulationEngine::new(config).unwrap();
        a.reset(123);
        b.reset(123);
        while a.step().is_ok() {
            b.step().unwrap();
        }
        for (sa, sb) in a.history().zip(b.history()) {
            assert_eq!(sa.true_pose, sb.true_pose);
            assert_eq!(sa.odometry_pose, sb.odometry_pose);
            assert_eq!(sa.ekf_pose, sb.ekf_pose);
        }
    }

    #[test]
    fn test_landmark_interval_gates_corrections() {
        let config = SimulationConfig {
            total_time: 3.0,
            landmark_interval: 3,
            ..SimulationConfig::default()
        };
        let mut engine = SimulationEngine::new(config).unwrap();
        engine.reset(0);
        let mut i = 0;
        while let Ok(step) = engine.step() {
            i += 1;
            if i % 3 == 0 {
                assert!(!step.measurements.is_empty());
            } else {
                assert!(step.measurements.is_empty());
            }
        }
    }

    #[test]
    fn test_landmarks_disabled_produces_no_measurements() {
        let config = SimulationConfig {
            total_time: 2.0,
            landmarks_enabled: false,
            ..SimulationConfig::default()
        };
        let mut engine = SimulationEngine::new(config).unwrap();
        engine.reset(0);
        while let Ok(step) = engine.step() {
            assert!(step.measurements.is_empty());
        }
    }

    #[test]
    fn test_invalid_configurations_rejected_up_front() {
        let bad_dt = SimulationConfig { dt: -0.1, ..SimulationConfig::default() };
        assert!(SimulationEngine::new(bad_dt).is_err());

        let bad_std = SimulationConfig { v_std: -1.0, ..SimulationConfig::default() };
        assert!(SimulationEngine::new(bad_std).is_err());

        let no_landmarks = SimulationConfig {
            landmark_count: 0,
            landmarks_enabled: true,
            ..SimulationConfig::default()
        };
        assert!(SimulationEngine::new(no_landmarks).is_err());

        // Disabled landmarks make the empty map acceptable
        let disabled = SimulationConfig {
            landmark_count: 0,
            landmarks_enabled: false,
            ..SimulationConfig::default()
        };
        assert!(SimulationEngine::new(disabled).is_ok());
    }

    #[test]
    fn test_drift_is_monotonic_in_expectation() {
        // Dead reckoning with command noise and no corrections cannot
        // self-correct, so the mean error over seeds grows with time
        let config = SimulationConfig {
            total_time: 20.0,
            landmarks_enabled: false,
            ..SimulationConfig::default()
        };
        let mut early_sum = 0.0;
        let mut late_sum = 0.0;
        for seed in 0..30 {
            let mut engine = SimulationEngine::new(config).unwrap();
            engine.reset(seed);
            while engine.step().is_ok() {}
            let steps: Vec<_> = engine.history().cloned().collect();
            let early = &steps[49];
            let late = steps.last().unwrap();
            early_sum += early.true_pose.distance(&early.odometry_pose);
            late_sum += late.true_pose.distance(&late.odometry_pose);
        }
        assert!(
            late_sum > early_sum,
            "mean drift shrank over time: early {} late {}",
            early_sum / 30.0,
            late_sum / 30.0
        );
    }

    #[test]
    fn test_ekf_beats_dead_reckoning() {
        let config = SimulationConfig {
            total_time: 30.0,
            ..SimulationConfig::default()
        };
        let mut odom_final = 0.0;
        let mut ekf_final = 0.0;
        let runs = 20;
        for seed in 0..runs {
            let mut engine = SimulationEngine::new(config).unwrap();
            engine.reset(seed);
            while engine.step().is_ok() {}
            let odom = ErrorSummary::odometry(engine.history()).unwrap();
            let ekf = ErrorSummary::ekf(engine.history()).unwrap();
            odom_final += odom.final_position;
            ekf_final += ekf.final_position;
        }
        assert!(
            ekf_final < odom_final,
            "mean final EKF error {} not below odometry {}",
            ekf_final / runs as f64,
            odom_final / runs as f64
        );
    }
}
