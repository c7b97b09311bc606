//! Engine configuration
//!
//! Defaults are the constants below. A hosting application can override
//! them through a flat settings map (JSON file) and `PALEOMAP_*`
//! environment variables, environment first. Invalid overrides are logged
//! and replaced by the constant.

use crate::map::error::Result;
use crate::map::palettes::{parse_hex_color, RAMP_REGISTRY};
use crate::map::properties::PropertyReader;
use crate::map::scale::SliderConfig;
use crate::map::statistics::DateRange;
use log::warn;
use std::path::Path;

pub use crate::map::palettes::DEFAULT_RAMP;

/// Default lower age bound (cal BP) when the data has no dated records
pub const DEFAULT_MIN_AGE: f64 = 0.0;

/// Default upper age bound (cal BP) when the data has no dated records
pub const DEFAULT_MAX_AGE: f64 = 50000.0;

/// Color for uncolored points, absent values and unselected categories
pub const DEFAULT_POINT_COLOR: &str = "#3388ff";

/// Recognized property keys
pub const PROPERTY_KEYS: &[&str] = &[
    "age.min.default",
    "age.max.default",
    "color.point.default",
    "color.ramp.default",
    "slider.max",
    "slider.break.left",
    "slider.break.right",
];

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Age range reported when nothing is dated (cal BP)
    pub default_min_age: f64,
    pub default_max_age: f64,

    /// "#rrggbb" used wherever no ramp color applies
    pub default_point_color: String,

    /// Ramp used when a request names none for the active coloring mode
    pub default_ramp: String,

    /// Range slider geometry (positions 0..max, split at two breakpoints)
    pub slider: SliderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_min_age: DEFAULT_MIN_AGE,
            default_max_age: DEFAULT_MAX_AGE,
            default_point_color: DEFAULT_POINT_COLOR.to_string(),
            default_ramp: DEFAULT_RAMP.to_string(),
            slider: SliderConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create config from properties, validating every override
    pub fn from_properties(props: &PropertyReader) -> Self {
        let mut min_age = props.get_f64("age.min.default", DEFAULT_MIN_AGE);
        let mut max_age = props.get_f64("age.max.default", DEFAULT_MAX_AGE);
        if min_age > max_age {
            warn!(
                "age.min.default {} > age.max.default {}, swapping",
                min_age, max_age
            );
            std::mem::swap(&mut min_age, &mut max_age);
        }

        let point_color = props.get_string("color.point.default", DEFAULT_POINT_COLOR);
        let default_point_color = if parse_hex_color(&point_color).is_some() {
            point_color
        } else {
            warn!(
                "Invalid color.point.default '{}', using {}",
                point_color, DEFAULT_POINT_COLOR
            );
            DEFAULT_POINT_COLOR.to_string()
        };

        let ramp = props.get_string("color.ramp.default", DEFAULT_RAMP);
        let default_ramp = if RAMP_REGISTRY.contains(&ramp) {
            ramp
        } else {
            warn!(
                "Unknown color.ramp.default '{}'. Valid ramps: [{}]. Using '{}'",
                ramp,
                RAMP_REGISTRY.names().join(", "),
                DEFAULT_RAMP
            );
            DEFAULT_RAMP.to_string()
        };

        let defaults = SliderConfig::default();
        let slider = SliderConfig {
            max: props.get_f64("slider.max", defaults.max),
            left_break: props.get_f64("slider.break.left", defaults.left_break),
            right_break: props.get_f64("slider.break.right", defaults.right_break),
        };
        let slider = if slider.is_valid() {
            slider
        } else {
            warn!(
                "Slider breakpoints must satisfy 0 < left < right < max, got {:?}; using defaults",
                slider
            );
            defaults
        };

        Self {
            default_min_age: min_age,
            default_max_age: max_age,
            default_point_color,
            default_ramp,
            slider,
        }
    }

    /// Load config from an optional settings file plus environment overrides
    pub fn load(settings_path: Option<&Path>) -> Result<Self> {
        let props = match settings_path {
            Some(path) => PropertyReader::from_file(path)?,
            None => PropertyReader::default(),
        };
        Ok(Self::from_properties(
            &props.with_env_overrides(PROPERTY_KEYS),
        ))
    }

    /// Age range used when a dataset or subset has no dated records
    pub fn age_defaults(&self) -> DateRange {
        DateRange::new(self.default_min_age, self.default_max_age)
    }
}
