//! Three-segment mapping between a bounded slider and a data range
//!
//! The bulk of the distribution (p2..p98) gets the central segment of the
//! slider; the sparse tails are compressed into small edge segments. Both
//! directions share the same breakpoints, so each is the inverse of the other.

use super::statistics::DateStatistics;
use log::warn;

/// Slider geometry: positions run from 0 to `max`, split at two breakpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderConfig {
    pub max: f64,
    pub left_break: f64,
    pub right_break: f64,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            max: 1000.0,
            left_break: 50.0,
            right_break: 950.0,
        }
    }
}

impl SliderConfig {
    /// Breakpoints must satisfy 0 < left < right < max
    pub fn is_valid(&self) -> bool {
        self.max.is_finite()
            && self.left_break > 0.0
            && self.left_break < self.right_break
            && self.right_break < self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiecewiseScale {
    data_min: f64,
    data_max: f64,
    /// `None` when the percentiles are unavailable or inconsistent: plain linear map
    percentiles: Option<(f64, f64)>,
    slider: SliderConfig,
}

impl PiecewiseScale {
    /// Build a scale; percentiles outside `[data_min, data_max]` or out of order are dropped
    pub fn new(
        data_min: f64,
        data_max: f64,
        p2: Option<f64>,
        p98: Option<f64>,
        slider: SliderConfig,
    ) -> Self {
        if !data_min.is_finite() || !data_max.is_finite() {
            warn!("Non-finite data range [{}, {}]", data_min, data_max);
        }
        // A non-finite bound collapses onto the other one
        let (data_min, data_max) = match (data_min.is_finite(), data_max.is_finite()) {
            (true, true) => (data_min, data_max),
            (true, false) => (data_min, data_min),
            (false, true) => (data_max, data_max),
            (false, false) => (0.0, 0.0),
        };
        let (data_min, data_max) = if data_min > data_max {
            (data_max, data_min)
        } else {
            (data_min, data_max)
        };

        let percentiles = match (p2, p98) {
            (Some(p2), Some(p98)) if data_min <= p2 && p2 <= p98 && p98 <= data_max => {
                Some((p2, p98))
            }
            (Some(p2), Some(p98)) => {
                warn!(
                    "Percentiles p2={} p98={} inconsistent with range [{}, {}], using linear scale",
                    p2, p98, data_min, data_max
                );
                None
            }
            _ => None,
        };

        let slider = if slider.is_valid() {
            slider
        } else {
            warn!("Invalid slider breakpoints {:?}, using defaults", slider);
            SliderConfig::default()
        };

        Self {
            data_min,
            data_max,
            percentiles,
            slider,
        }
    }

    pub fn from_statistics(stats: &DateStatistics, slider: SliderConfig) -> Self {
        Self::new(stats.min, stats.max, Some(stats.p2), Some(stats.p98), slider)
    }

    pub fn data_min(&self) -> f64 {
        self.data_min
    }

    pub fn data_max(&self) -> f64 {
        self.data_max
    }

    pub fn slider(&self) -> SliderConfig {
        self.slider
    }

    /// Restrict a value to `[data_min, data_max]`
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.data_min).min(self.data_max)
    }

    /// Map a data value to a slider position
    pub fn to_slider(&self, value: f64) -> f64 {
        let value = self.clamp(value);
        let s = self.slider;

        let (p2, p98) = match self.percentiles {
            Some(p) => p,
            None => return map_segment(value, self.data_min, self.data_max, 0.0, s.max),
        };

        if value <= p2 {
            map_segment(value, self.data_min, p2, 0.0, s.left_break)
        } else if value <= p98 {
            map_segment(value, p2, p98, s.left_break, s.right_break)
        } else {
            map_segment(value, p98, self.data_max, s.right_break, s.max)
        }
    }

    /// Map a slider position back to a data value
    pub fn to_value(&self, position: f64) -> f64 {
        let s = self.slider;
        let position = position.clamp(0.0, s.max);

        let (p2, p98) = match self.percentiles {
            Some(p) => p,
            None => return map_segment(position, 0.0, s.max, self.data_min, self.data_max),
        };

        if position <= s.left_break {
            map_segment(position, 0.0, s.left_break, self.data_min, p2)
        } else if position <= s.right_break {
            map_segment(position, s.left_break, s.right_break, p2, p98)
        } else {
            map_segment(position, s.right_break, s.max, p98, self.data_max)
        }
    }
}

/// Linear map of `x` from `[from_lo, from_hi]` onto `[to_lo, to_hi]`
///
/// A zero-width source segment maps everything to `to_lo`.
fn map_segment(x: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    let width = from_hi - from_lo;
    if width.abs() <= f64::EPSILON {
        return to_lo;
    }
    to_lo + (x - from_lo) / width * (to_hi - to_lo)
}
