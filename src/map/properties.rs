//! Settings property reading and parsing
//!
//! Reads a flat name → value property map (from a JSON settings file and
//! the environment) and provides type-safe conversions with explicit
//! defaults.

use super::error::{MapError, Result};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Prefix for environment overrides: `age.max.default` → `PALEOMAP_AGE_MAX_DEFAULT`
pub const ENV_PREFIX: &str = "PALEOMAP_";

/// Reads engine properties with type-safe conversions
#[derive(Debug, Clone, Default)]
pub struct PropertyReader {
    properties: HashMap<String, String>,
}

impl PropertyReader {
    pub fn new(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }

    /// Parse a flat JSON object; strings, numbers and booleans are accepted
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or_else(|| MapError::Config("Settings must be a JSON object".to_string()))?;

        let mut properties = HashMap::new();
        for (key, value) in object {
            let value_str = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => continue,
                _ => {
                    warn!("Ignoring non-scalar setting '{}'", key);
                    continue;
                }
            };
            properties.insert(key.clone(), value_str);
        }

        debug!("PropertyReader: Found {} properties", properties.len());
        Ok(Self { properties })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Overlay values from `lookup` (normally the process environment) for the given keys
    pub fn with_overrides<F>(mut self, keys: &[&str], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in keys {
            if let Some(value) = lookup(&env_key(key)) {
                debug!("PropertyReader: '{}' overridden from environment", key);
                self.properties.insert(key.to_string(), value);
            }
        }
        self
    }

    /// Overlay `PALEOMAP_*` environment variables for the given keys
    pub fn with_env_overrides(self, keys: &[&str]) -> Self {
        self.with_overrides(keys, |name| std::env::var(name).ok())
    }

    /// Get raw property value (None if not set or empty)
    fn get_raw(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Get string property with explicit default
    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.get_raw(name).unwrap_or(default).to_string()
    }

    /// Get f64 property with validation and explicit default
    pub fn get_f64(&self, name: &str, default: f64) -> f64 {
        match self.get_raw(name) {
            None => default,
            Some(raw) => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    warn!(
                        "Invalid numeric value for '{}': '{}', using default: {}",
                        name, raw, default
                    );
                    default
                }
            },
        }
    }
}

/// Environment variable name for a property key
pub fn env_key(name: &str) -> String {
    format!("{}{}", ENV_PREFIX, name.replace('.', "_").to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_scalars() {
        let reader = PropertyReader::from_json(
            r#"{"slider.max": 2000, "color.ramp.default": "plasma", "flag": true, "nested": {"a": 1}, "gone": null}"#,
        )
        .unwrap();
        assert_eq!(reader.get_f64("slider.max", 1000.0), 2000.0);
        assert_eq!(reader.get_string("color.ramp.default", "viridis"), "plasma");
        assert_eq!(reader.get_string("flag", "false"), "true");
        assert_eq!(reader.get_string("nested", "x"), "x");
        assert_eq!(reader.get_string("gone", "x"), "x");
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(matches!(
            PropertyReader::from_json("[1, 2]"),
            Err(MapError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_and_empty_values_use_default() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), "abc".to_string());
        map.insert("b".to_string(), "".to_string());
        map.insert("c".to_string(), "inf".to_string());
        let reader = PropertyReader::new(map);
        assert_eq!(reader.get_f64("a", 1.5), 1.5);
        assert_eq!(reader.get_f64("b", 2.5), 2.5);
        assert_eq!(reader.get_f64("c", 3.5), 3.5);
        assert_eq!(reader.get_string("b", "dflt"), "dflt");
    }

    #[test]
    fn test_env_key() {
        assert_eq!(env_key("age.max.default"), "PALEOMAP_AGE_MAX_DEFAULT");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let reader = PropertyReader::from_json(r#"{"age.max.default": "40000"}"#)
            .unwrap()
            .with_overrides(&["age.max.default", "age.min.default"], |name| {
                (name == "PALEOMAP_AGE_MAX_DEFAULT").then(|| "60000".to_string())
            });
        assert_eq!(reader.get_f64("age.max.default", 0.0), 60000.0);
        assert_eq!(reader.get_f64("age.min.default", 7.0), 7.0);
    }
}
