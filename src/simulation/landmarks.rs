//! Static landmark registry and the ideal range/bearing observation function
//!
//! Landmarks are fixed once the map is built. `observe` returns exact,
//! noise-free measurements; noise injection is the `NoiseModel`'s job.

use crate::common::{normalize_angle, Landmark, Measurement, Pose2D};

/// Canonical landmark layout of the demo arena, ordered so that a prefix of
/// any length is a sensible spread: rectangle corners first, then center,
/// then outer and inner rings.
const LAYOUT: [(f64, f64); 13] = [
    (2.0, 2.0),
    (8.0, 2.0),
    (8.0, 6.0),
    (2.0, 6.0),
    (5.0, 4.0),
    (1.0, 1.0),
    (9.0, 1.0),
    (9.0, 7.0),
    (1.0, 7.0),
    (3.0, 3.0),
    (7.0, 3.0),
    (7.0, 5.0),
    (3.0, 5.0),
];

/// Maximum number of landmarks `generate` can produce
pub const MAX_LANDMARK_COUNT: usize = 13;

/// Fixed set of uniquely identified landmarks with a sensing-range policy
#[derive(Debug, Clone)]
pub struct LandmarkMap {
    landmarks: Vec<Landmark>,
    max_range: f64,
}

impl LandmarkMap {
    /// Build a map from explicit landmark positions; ids are assigned in order
    pub fn new(positions: &[(f64, f64)]) -> Self {
        let landmarks = positions
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| Landmark::new(id, x, y))
            .collect();
        Self {
            landmarks,
            max_range: f64::INFINITY,
        }
    }

    /// Build the canonical demo layout with the first `count` landmarks
    /// (capped at [`MAX_LANDMARK_COUNT`])
    pub fn generate(count: usize) -> Self {
        let n = count.min(MAX_LANDMARK_COUNT);
        Self::new(&LAYOUT[..n])
    }

    /// Limit visibility to landmarks within `max_range` of the sensing pose
    pub fn with_max_range(mut self, max_range: f64) -> Self {
        self.max_range = max_range;
        self
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Landmark> {
        self.landmarks.iter().find(|lm| lm.id == id)
    }

    /// Ideal range/bearing from `pose` to every visible landmark.
    ///
    /// Landmarks beyond `max_range` are omitted; that is a visibility policy,
    /// not an error.
    pub fn observe(&self, pose: &Pose2D) -> Vec<Measurement> {
        self.landmarks
            .iter()
            .filter_map(|lm| {
                let (range, bearing) = range_bearing(pose, lm);
                if range <= self.max_range {
                    Some(Measurement::new(lm.id, range, bearing))
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Exact range and bearing from a pose to a landmark
pub fn range_bearing(pose: &Pose2D, landmark: &Landmark) -> (f64, f64) {
    let dx = landmark.x - pose.x;
    let dy = landmark.y - pose.y;
    let range = (dx * dx + dy * dy).sqrt();
    let bearing = normalize_angle(dy.atan2(dx) - pose.theta);
    (range, bearing)
}
