/// Landscape configuration: terrain grid, alpine noise profile and lighting.
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```json
/// { "seed": 7, "terrain": { "segments": 128 }, "lighting": { "transition_duration": 4.0 } }
/// ```
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::TerrainConfig;
use crate::transition::LightingConfig;

/// Largest accepted grid resolution per side.
pub const MAX_SEGMENTS: u32 = 4096;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    /// Noise seed; `None` lets the caller pick one at random.
    pub seed: Option<u32>,
    pub terrain: TerrainConfig,
    pub lighting: LightingConfig,
}

impl LandscapeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects grids that cannot be built.  A non-positive transition
    /// duration is accepted; the state machine completes such transitions
    /// in one update.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.terrain;
        for (name, value) in [
            ("terrain.width", t.width),
            ("terrain.depth", t.depth),
            ("terrain.height_scale", t.height_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if t.segments == 0 || t.segments > MAX_SEGMENTS {
            return Err(ConfigError::Invalid(format!(
                "terrain.segments must be between 1 and {MAX_SEGMENTS}, got {}",
                t.segments
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::{AlpineProfile, FractalParams};
    use crate::transition::{DEFAULT_TRANSITION_SECONDS, DayPhase};
    use std::io::Write;

    #[test]
    fn empty_object_gives_defaults() {
        let config = LandscapeConfig::from_json("{}").unwrap();
        assert_eq!(config, LandscapeConfig::default());
        assert_eq!(config.seed, None);
        assert_eq!(config.terrain.segments, 256);
        assert_eq!(config.lighting.transition_duration, DEFAULT_TRANSITION_SECONDS);
        assert_eq!(config.terrain.profile.ridges.lacunarity, 2.2);
    }

    #[test]
    fn partial_override() {
        let config = LandscapeConfig::from_json(
            r#"{ "seed": 7, "terrain": { "segments": 64, "height_scale": 12.5 },
                 "lighting": { "start_phase": "night" } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.terrain.segments, 64);
        assert_eq!(config.terrain.height_scale, 12.5);
        assert_eq!(config.terrain.width, 200.0);
        assert_eq!(config.lighting.start_phase, DayPhase::Night);
    }

    #[test]
    fn profile_constants_can_be_overridden() {
        let config = LandscapeConfig::from_json(
            r#"{ "terrain": { "profile": { "peak_exponent": 1.6 } } }"#,
        )
        .unwrap();
        assert_eq!(config.terrain.profile.peak_exponent, 1.6);
        assert_eq!(config.terrain.profile.valley_threshold, 0.25);
    }

    #[test]
    fn nested_profile_override_keeps_layer_defaults() {
        let config = LandscapeConfig::from_json(
            r#"{ "terrain": { "profile": {
                   "warp": { "strength": 1.0 },
                   "base": { "octaves": 7 } } } }"#,
        )
        .unwrap();
        let profile = &config.terrain.profile;
        let defaults = AlpineProfile::default();
        assert_eq!(profile.warp.strength, 1.0);
        assert_eq!(profile.warp.scale, 0.3);
        assert_eq!(profile.base, FractalParams::new(7, 0.5, 2.0, 1.5));
        assert_eq!(profile.ridges, defaults.ridges);
        assert_eq!(profile.peak_exponent, defaults.peak_exponent);
    }

    #[test]
    fn empty_profile_equals_default_profile() {
        let config =
            LandscapeConfig::from_json(r#"{ "terrain": { "profile": { "detail": {} } } }"#)
                .unwrap();
        assert_eq!(config.terrain.profile, AlpineProfile::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{ "terrain": { "segments": 0 } }"#,
            r#"{ "terrain": { "width": -3.0 } }"#,
            r#"{ "terrain": { "height_scale": 0.0 } }"#,
        ] {
            let err = LandscapeConfig::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{json}: {err}");
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = LandscapeConfig::from_json("{ seed: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_duration_is_accepted() {
        let config =
            LandscapeConfig::from_json(r#"{ "lighting": { "transition_duration": 0.0 } }"#)
                .unwrap();
        assert_eq!(config.lighting.transition_duration, 0.0);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "seed": 99 }}"#).unwrap();
        let config = LandscapeConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LandscapeConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
