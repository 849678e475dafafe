use serde::{Deserialize, Serialize};

use crate::{harmony::Key, primitives::NEAREST_EPSILON};

/// Parameters of batch analysis, owned by [`Score`](crate::dom::Score).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Dots allowed on a single note-head by tie resolution.
    pub max_dots: u8,
    /// Key for chord guessing, when no key is set.
    pub fallback_key: Key,
    /// Length of chord characteristic (`"m"`, `"7"`, `"m7b5"`), that
    /// wins ties between equally likely chord names.
    pub preferred_characteristic_length: usize,
    /// Precision of converting floating-point lengths to Rational.
    pub nearest_epsilon: f64,
}
impl AnalysisSettings {
    pub fn new(max_dots: u8, fallback_key: Key) -> Self {
        Self {
            max_dots,
            fallback_key,
            ..Default::default()
        }
    }
}
impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_dots: 1,
            fallback_key: Key::c_major(),
            preferred_characteristic_length: 1,
            nearest_epsilon: NEAREST_EPSILON,
        }
    }
}
