//! Common types shared across matching modules.

use serde::{Deserialize, Serialize};

/// Compatibility score clamped to the [0.0, 1.0] range.
///
/// Non-finite inputs collapse to zero so that a malformed factor can only
/// lower a score, never poison a ranking.
///
/// # Examples
///
/// ```
/// use helpix_matching::Score;
///
/// let s = Score::new(0.75);
/// assert_eq!(s.value(), 0.75);
///
/// assert_eq!(Score::new(1.5).value(), 1.0);
/// assert_eq!(Score::new(-0.5).value(), 0.0);
/// assert_eq!(Score::new(f64::NAN).value(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// Create a new Score, clamping the value to [0.0, 1.0].
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    /// Get the inner score value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Self(0.0)
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
