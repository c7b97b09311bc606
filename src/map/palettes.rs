//! Color ramp registry for loading and accessing named gradients
//!
//! Loads ramps from ramps.json (embedded at compile time) and provides
//! access by name. Lookup is case-insensitive so "Viridis" and "viridis"
//! resolve to the same ramp.
//!
//! Ramp kinds:
//! - `sequential`: Gradient from low to high values
//! - `diverging`: Gradient with a neutral midpoint

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

/// Embedded ramps.json content
const RAMPS_JSON: &str = include_str!("../../ramps.json");

/// Color returned for unknown ramp names
pub const FALLBACK_COLOR: &str = "#808080";

/// Default ramp name used by every colorable dimension
pub const DEFAULT_RAMP: &str = "viridis";

/// Global ramp registry, initialized lazily on first access
pub static RAMP_REGISTRY: Lazy<RampRegistry> = Lazy::new(|| {
    RampRegistry::from_json(RAMPS_JSON).unwrap_or_else(|e| {
        log::error!("Failed to load ramps.json: {}", e);
        RampRegistry::default()
    })
});

/// Ramp kind as defined in ramps.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RampKind {
    Sequential,
    Diverging,
}

/// A single ramp definition from ramps.json
#[derive(Debug, Clone, Deserialize)]
pub struct RampDefinition {
    pub name: String,
    pub kind: RampKind,
    pub colors: Vec<String>,
}

/// A ramp with its stops parsed to RGB, ready for interpolation
#[derive(Debug, Clone)]
pub struct ColorRamp {
    pub name: String,
    pub kind: RampKind,
    stops: Vec<[u8; 3]>,
}

impl ColorRamp {
    fn from_definition(def: RampDefinition) -> Option<Self> {
        let stops: Vec<[u8; 3]> = def
            .colors
            .iter()
            .filter_map(|hex| {
                let parsed = parse_hex_color(hex);
                if parsed.is_none() {
                    warn!("Ramp '{}': skipping invalid color stop '{}'", def.name, hex);
                }
                parsed
            })
            .collect();

        if stops.is_empty() {
            warn!("Ramp '{}' has no valid color stops, ignoring it", def.name);
            return None;
        }

        Some(Self {
            name: def.name,
            kind: def.kind,
            stops,
        })
    }

    /// Number of color stops in this ramp
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Check if the ramp has no stops (never true for registry ramps)
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// First color of the ramp as "#rrggbb"
    pub fn first(&self) -> String {
        format_hex_color(self.stops[0])
    }

    /// Last color of the ramp as "#rrggbb"
    pub fn last(&self) -> String {
        format_hex_color(self.stops[self.stops.len() - 1])
    }

    /// Interpolate a color from the ramp at position t ∈ [0, 1]
    ///
    /// t=0 returns the first color, t=1 returns the last color. Values in
    /// between are linearly interpolated per channel and rounded to the
    /// nearest integer. Out-of-range t is clamped.
    pub fn interpolate(&self, t: f64) -> [u8; 3] {
        let n = self.stops.len();
        if n == 1 {
            return self.stops[0];
        }

        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        // Map t to position in the stop array
        let pos = t * (n - 1) as f64;
        let idx_low = (pos.floor() as usize).min(n - 2);
        let idx_high = idx_low + 1;
        let frac = pos - idx_low as f64;

        let low = self.stops[idx_low];
        let high = self.stops[idx_high];

        let channel = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * frac)
                .round()
                .clamp(0.0, 255.0) as u8
        };

        [
            channel(low[0], high[0]),
            channel(low[1], high[1]),
            channel(low[2], high[2]),
        ]
    }

    /// Interpolate and encode as "#rrggbb"
    pub fn interpolate_hex(&self, t: f64) -> String {
        format_hex_color(self.interpolate(t))
    }
}

/// Registry of all available ramps
#[derive(Debug, Clone, Default)]
pub struct RampRegistry {
    /// All ramps by name (lowercase keys for case-insensitive lookup)
    ramps: HashMap<String, ColorRamp>,
    /// Ramp names in definition order (for listing)
    names: Vec<String>,
}

impl RampRegistry {
    /// Load ramps from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<RampDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse ramps JSON: {}", e))?;

        let mut registry = Self::default();

        for def in definitions {
            if let Some(ramp) = ColorRamp::from_definition(def) {
                registry.names.push(ramp.name.clone());
                registry.ramps.insert(ramp.name.to_lowercase(), ramp);
            }
        }

        debug!("RampRegistry: Loaded {} ramps", registry.ramps.len());

        Ok(registry)
    }

    /// Get a ramp by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&ColorRamp> {
        self.ramps.get(&name.trim().to_lowercase())
    }

    /// Check whether a ramp name resolves
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// List all ramp names in definition order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Interpolate a named ramp at t, falling back to gray for unknown names
    pub fn interpolate(&self, name: &str, t: f64) -> String {
        match self.get(name) {
            Some(ramp) => ramp.interpolate_hex(t),
            None => {
                warn!("Unknown color ramp '{}', using {}", name, FALLBACK_COLOR);
                FALLBACK_COLOR.to_string()
            }
        }
    }
}

/// Interpolate a named ramp from the global registry
///
/// Never fails: unknown ramp names yield `FALLBACK_COLOR`.
pub fn interpolate(ramp_name: &str, t: f64) -> String {
    RAMP_REGISTRY.interpolate(ramp_name, t)
}

/// Parse a hex color string to RGB array
///
/// Supports formats:
/// - `#RRGGBB` (6 hex digits)
/// - `#RRGGBBAA` (8 hex digits, alpha ignored)
/// - `RRGGBB` / `RRGGBBAA` (without #)
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim().trim_start_matches('#');

    if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some([r, g, b])
}

/// Encode RGB as lowercase "#rrggbb"
pub fn format_hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}
