//! # Engine Configuration
//!
//! Pool sizes and motion defaults, loaded once at startup.
//!
//! ```toml
//! [pools]
//! runner_capacity = 256
//! command_capacity = 512
//! motion_capacity = 128
//! pre_allocate = true
//!
//! [motion]
//! default_frames = 60
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use cadence_core::{CadenceError, CadenceResult};
use cadence_shared::{
    DEFAULT_COMMAND_CAPACITY, DEFAULT_FRAMES, DEFAULT_MOTION_CAPACITY, DEFAULT_RUNNER_CAPACITY,
};

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Pool sizing.
    pub pools: PoolConfig,
    /// Motion defaults.
    pub motion: MotionConfig,
}

/// Pool sizing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Idle runners kept per runner kind.
    pub runner_capacity: usize,
    /// Idle legs kept by the motion group.
    pub command_capacity: usize,
    /// Idle motions kept by the motion group.
    pub motion_capacity: usize,
    /// Fill every pool to capacity at startup.
    pub pre_allocate: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            runner_capacity: DEFAULT_RUNNER_CAPACITY,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            motion_capacity: DEFAULT_MOTION_CAPACITY,
            pre_allocate: true,
        }
    }
}

/// Motion defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Duration in ticks of a leg that never sets one.
    pub default_frames: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            default_frames: DEFAULT_FRAMES,
        }
    }
}

impl CadenceConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`CadenceError::InvalidConfig`] when the document does not parse or
    /// fails [`CadenceConfig::validate`].
    pub fn from_toml_str(source: &str) -> CadenceResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| CadenceError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`CadenceError::ConfigIo`] when the file cannot be read, otherwise as
    /// [`CadenceConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> CadenceResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| CadenceError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Checks that every capacity and the default leg duration are non-zero.
    ///
    /// # Errors
    ///
    /// [`CadenceError::InvalidConfig`] naming the first offending key.
    pub fn validate(&self) -> CadenceResult<()> {
        let zero = [
            ("pools.runner_capacity", self.pools.runner_capacity == 0),
            ("pools.command_capacity", self.pools.command_capacity == 0),
            ("pools.motion_capacity", self.pools.motion_capacity == 0),
            ("motion.default_frames", self.motion.default_frames == 0),
        ];
        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((key, _)) => Err(CadenceError::InvalidConfig(format!("{key} must be non-zero"))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_mirror_constants() {
        let config = CadenceConfig::default();
        assert_eq!(config.pools.runner_capacity, DEFAULT_RUNNER_CAPACITY);
        assert_eq!(config.pools.command_capacity, DEFAULT_COMMAND_CAPACITY);
        assert_eq!(config.pools.motion_capacity, DEFAULT_MOTION_CAPACITY);
        assert!(config.pools.pre_allocate);
        assert_eq!(config.motion.default_frames, DEFAULT_FRAMES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = CadenceConfig::from_toml_str("[pools]\nrunner_capacity = 8\n").unwrap();
        assert_eq!(config.pools.runner_capacity, 8);
        assert_eq!(config.pools.motion_capacity, DEFAULT_MOTION_CAPACITY);
        assert_eq!(config.motion.default_frames, DEFAULT_FRAMES);

        assert_eq!(CadenceConfig::from_toml_str("").unwrap(), CadenceConfig::default());
    }

    #[test]
    fn test_shipped_file_parses() {
        let source = include_str!("../config/cadence.toml");
        assert_eq!(CadenceConfig::from_toml_str(source).unwrap(), CadenceConfig::default());
    }

    #[test]
    fn test_zero_values_rejected() {
        let err = CadenceConfig::from_toml_str("[motion]\ndefault_frames = 0\n").unwrap_err();
        assert_eq!(
            err,
            CadenceError::InvalidConfig("motion.default_frames must be non-zero".to_owned())
        );
    }

    #[test]
    fn test_malformed_document_rejected() {
        let err = CadenceConfig::from_toml_str("[pools\n").unwrap_err();
        assert!(matches!(err, CadenceError::InvalidConfig(_)));

        let err = CadenceConfig::from_toml_str("[pools]\nrunner_capacity = \"many\"\n").unwrap_err();
        assert!(matches!(err, CadenceError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = CadenceConfig::from_file("/definitely/not/here/cadence.toml").unwrap_err();
        assert!(matches!(err, CadenceError::ConfigIo { .. }));
    }
}
