//! Inclusive value ranges over input signal domains.
//!
//! A range is either *digital* (a single accepted "on" value, the usual case for
//! buttons) or *analog* (an inclusive `[min, max]` interval over an axis domain).
//! Analog ranges carry a derived *sensitivity* in `[0, 1)`: the closer to 1, the
//! nearer to the rest position the range begins.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest accepted analog sensitivity (inclusive).
pub const MIN_ANALOG_SENSITIVITY: f32 = 0.0;

/// Highest accepted analog sensitivity (exclusive).
pub const MAX_ANALOG_SENSITIVITY: f32 = 1.0;

/// Errors raised when a range would be constructed in an invalid state.
///
/// Invalid ranges are rejected at the constructing call, never clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    /// The lower bound exceeds the upper bound.
    #[error("minimum cannot be greater than maximum: {min} > {max}")]
    InvertedBounds { min: f32, max: f32 },

    /// A sensitivity value outside `[0, 1)`.
    #[error("analog sensitivity out of range [0, 1): {0}")]
    SensitivityOutOfRange(f32),
}

/// Validates a sensitivity value against `[0, 1)`.
pub(crate) fn ensure_valid_sensitivity(sensitivity: f32) -> Result<(), RangeError> {
    if !(MIN_ANALOG_SENSITIVITY..MAX_ANALOG_SENSITIVITY).contains(&sensitivity) {
        return Err(RangeError::SensitivityOutOfRange(sensitivity));
    }
    Ok(())
}

/// An inclusive value interval, digital (single value) or analog (`[min, max]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputValueRange {
    min: f32,
    max: f32,
    analog: bool,
}

impl InputValueRange {
    /// A digital range accepting exactly one value.
    pub fn digital(value: f32) -> Self {
        Self {
            min: value,
            max: value,
            analog: false,
        }
    }

    /// An analog range over `[min, max]`.
    ///
    /// Rejects `min > max` with [`RangeError::InvertedBounds`].
    pub fn analog(min: f32, max: f32) -> Result<Self, RangeError> {
        if min > max {
            return Err(RangeError::InvertedBounds { min, max });
        }
        Ok(Self {
            min,
            max,
            analog: true,
        })
    }

    /// An analog range spanning two bounds in either order. Always valid.
    pub(crate) fn analog_span(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
            analog: true,
        }
    }

    pub fn min_value(&self) -> f32 {
        self.min
    }

    pub fn max_value(&self) -> f32 {
        self.max
    }

    pub fn is_analog(&self) -> bool {
        self.analog
    }

    pub fn is_digital(&self) -> bool {
        !self.analog
    }

    pub fn is_single_value(&self) -> bool {
        self.min == self.max
    }

    /// Whether `value` lies within the range, bounds included.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn has_positive_domain(&self) -> bool {
        self.min >= 0.0
    }

    /// The derived analog sensitivity, or `None` for digital ranges.
    ///
    /// On a positive domain this is `1 - min`; on a negative domain `1 + max`.
    pub fn analog_sensitivity(&self) -> Option<f32> {
        if !self.analog {
            return None;
        }
        if self.has_positive_domain() {
            Some(1.0 - self.min)
        } else {
            Some(1.0 + self.max)
        }
    }

    /// Re-derives the near-zero bound from `sensitivity`, clamping the far bound
    /// outward where needed so that `min <= max` is preserved.
    ///
    /// Digital ranges pass through unchanged. Sensitivity outside `[0, 1)` is
    /// rejected with [`RangeError::SensitivityOutOfRange`].
    pub fn with_analog_sensitivity(self, sensitivity: f32) -> Result<Self, RangeError> {
        ensure_valid_sensitivity(sensitivity)?;
        if !self.analog {
            return Ok(self);
        }
        let threshold = 1.0 - sensitivity;
        if self.has_positive_domain() {
            Ok(Self {
                min: threshold,
                max: self.max.max(threshold),
                analog: true,
            })
        } else {
            Ok(Self {
                min: self.min.min(-threshold),
                max: -threshold,
                analog: true,
            })
        }
    }
}

impl std::fmt::Display for InputValueRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single_value() {
            write!(f, "[{}]", self.min)
        } else {
            write!(f, "[{},{}]", self.min, self.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_holds_exactly_between_bounds() {
        let range = InputValueRange::analog(0.25, 0.75).unwrap();
        assert!(!range.contains(0.2499));
        assert!(range.contains(0.25));
        assert!(range.contains(0.5));
        assert!(range.contains(0.75));
        assert!(!range.contains(0.7501));
    }

    #[test]
    fn digital_range_is_single_value() {
        let range = InputValueRange::digital(1.0);
        assert!(range.is_single_value());
        assert!(range.is_digital());
        assert!(range.contains(1.0));
        assert!(!range.contains(0.999));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert_eq!(
            InputValueRange::analog(0.8, 0.2),
            Err(RangeError::InvertedBounds { min: 0.8, max: 0.2 })
        );
    }

    #[test]
    fn positive_domain_sensitivity_round_trips() {
        let range = InputValueRange::analog(0.5, 1.0).unwrap();
        // Dyadic values keep 1 - s exact in f32, so the round trip is bitwise.
        for s in [0.0, 0.125, 0.25, 0.5, 0.75, 0.875] {
            let adjusted = range.with_analog_sensitivity(s).unwrap();
            assert_eq!(adjusted.analog_sensitivity(), Some(s));
        }
        // Arbitrary values round-trip within float tolerance.
        for s in [0.1, 0.6, 0.99] {
            let adjusted = range.with_analog_sensitivity(s).unwrap();
            assert!((adjusted.analog_sensitivity().unwrap() - s).abs() < 1e-6);
        }
    }

    #[test]
    fn negative_domain_sensitivity_derives_from_max() {
        let range = InputValueRange::analog(-1.0, -0.5).unwrap();
        assert_eq!(range.analog_sensitivity(), Some(0.5));
        let adjusted = range.with_analog_sensitivity(0.25).unwrap();
        assert_eq!(adjusted.max_value(), -0.75);
        assert_eq!(adjusted.min_value(), -1.0);
    }

    #[test]
    fn sensitivity_widens_far_bound_when_needed() {
        // Near bound moves above the old far bound: far bound is pushed outward.
        let range = InputValueRange::analog(0.5, 0.625).unwrap();
        let adjusted = range.with_analog_sensitivity(0.25).unwrap();
        assert_eq!(adjusted.min_value(), 0.75);
        assert_eq!(adjusted.max_value(), 0.75);
    }

    #[test]
    fn sensitivity_out_of_bounds_is_rejected() {
        let range = InputValueRange::analog(0.5, 1.0).unwrap();
        assert!(matches!(
            range.with_analog_sensitivity(1.0),
            Err(RangeError::SensitivityOutOfRange(_))
        ));
        assert!(matches!(
            range.with_analog_sensitivity(-0.1),
            Err(RangeError::SensitivityOutOfRange(_))
        ));
    }

    #[test]
    fn digital_range_ignores_sensitivity_changes() {
        let range = InputValueRange::digital(1.0);
        assert_eq!(range.with_analog_sensitivity(0.5), Ok(range));
        assert_eq!(range.analog_sensitivity(), None);
    }
}
