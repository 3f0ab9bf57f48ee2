//! Compiler configuration.
//!
//! Supports JSON and TOML files. Every field has a default, so partial
//! files are accepted.

use kerfkit_core::constants::{DEFAULT_TESSELLATION_TOLERANCE, DEFAULT_TOLERANCE};
use kerfkit_core::MeasurementSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CamError, CamResult};

/// Parameters handed to the offset engine with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetParameters {
    /// Endpoint matching tolerance
    pub tolerance: f64,
    /// Largest gap the engine may bridge without warning
    pub max_extension: f64,
    /// Gaps at or below this size are snapped shut instead of filled
    pub snap_threshold: f64,
}

impl Default for OffsetParameters {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_extension: 5.0,
            snap_threshold: 0.05,
        }
    }
}

/// Cut compiler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Selects which measurement-qualified tool values apply
    pub measurement_system: MeasurementSystem,
    /// Offset engine parameters
    pub offset: OffsetParameters,
    /// Chord tolerance for winding and containment checks
    pub tessellation_tolerance: f64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            measurement_system: MeasurementSystem::Metric,
            offset: OffsetParameters::default(),
            tessellation_tolerance: DEFAULT_TESSELLATION_TOLERANCE,
        }
    }
}

impl CompilerConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file(path: &Path) -> CamResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CompilerConfig = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(CamError::UnsupportedFormat(
                    "Config file must be .json or .toml".to_string(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file(&self, path: &Path) -> CamResult<()> {
        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            _ => {
                return Err(CamError::UnsupportedFormat(
                    "Config file must be .json or .toml".to_string(),
                ))
            }
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> CamResult<()> {
        let positive = [
            ("offset.tolerance", self.offset.tolerance),
            ("tessellation_tolerance", self.tessellation_tolerance),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CamError::InvalidConfig {
                    key: key.to_string(),
                    reason: format!("must be positive, got {value}"),
                });
            }
        }

        let non_negative = [
            ("offset.max_extension", self.offset.max_extension),
            ("offset.snap_threshold", self.offset.snap_threshold),
        ];
        for (key, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CamError::InvalidConfig {
                    key: key.to_string(),
                    reason: format!("must not be negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CompilerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.measurement_system, MeasurementSystem::Metric);
    }

    #[test]
    fn test_negative_snap_threshold_rejected() {
        let mut config = CompilerConfig::default();
        config.offset.snap_threshold = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("offset.snap_threshold"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CompilerConfig = toml::from_str(
            r#"
            measurement_system = "imperial"

            [offset]
            max_extension = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.measurement_system, MeasurementSystem::Imperial);
        assert_eq!(config.offset.max_extension, 0.25);
        assert_eq!(config.offset.snap_threshold, OffsetParameters::default().snap_threshold);
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kerfkit.json");
        let mut config = CompilerConfig::default();
        config.tessellation_tolerance = 0.002;
        config.save_to_file(&path).unwrap();
        assert_eq!(CompilerConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kerfkit.yaml");
        assert!(matches!(
            CompilerConfig::default().save_to_file(&path),
            Err(CamError::UnsupportedFormat(_))
        ));
    }
}
