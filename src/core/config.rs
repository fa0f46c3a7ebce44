//! Configuration utilities for the classification pipeline.
//!
//! This module provides the configuration structures handed to the inference
//! provider and the orchestrator, the [`ConfigError`] type, and the
//! [`ConfigValidator`] trait used to validate configuration before a pipeline
//! is built.

use crate::core::constants::DEFAULT_TOP_K;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that the top-k value is invalid (must be greater than 0).
    #[error("topk must be greater than 0")]
    InvalidTopK,

    /// Error indicating that the model version is not supported.
    #[error("unsupported model version: {version}")]
    UnsupportedModelVersion {
        /// The rejected version.
        version: u32,
    },

    /// Error indicating that the width multiplier is out of range.
    #[error("alpha must be in (0, 1], got {alpha}")]
    InvalidAlpha {
        /// The rejected width multiplier.
        alpha: f32,
    },

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// A message describing the invalid configuration.
        message: String,
    },
}

/// A trait for validating configuration parameters.
///
/// Configuration is validated once, before the pipeline is constructed;
/// the running pipeline never re-validates.
pub trait ConfigValidator {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// A Result indicating success or a ConfigError if validation fails.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;
}

/// Configuration handed to the inference provider when loading a model.
///
/// Mirrors the provider contract `load({version, alpha})`: a model
/// architecture version plus the width multiplier of the trained variant.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelConfig {
    /// Model architecture version.
    pub version: u32,
    /// Width multiplier of the trained variant.
    pub alpha: f32,
}

impl ModelConfig {
    /// Creates a model configuration with the given version and width multiplier.
    pub fn new(version: u32, alpha: f32) -> Self {
        Self { version, alpha }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            version: 2,
            alpha: 1.0,
        }
    }
}

impl ConfigValidator for ModelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=2).contains(&self.version) {
            return Err(ConfigError::UnsupportedModelVersion {
                version: self.version,
            });
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::InvalidAlpha { alpha: self.alpha });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Configuration for the classification pipeline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipelineConfig {
    /// Number of top predictions to produce for each classification.
    pub topk: usize,
    /// Configuration handed to the inference provider.
    pub model: ModelConfig,
}

impl PipelineConfig {
    /// Creates a pipeline configuration with the given top-k and model settings.
    pub fn new(topk: usize, model: ModelConfig) -> Self {
        Self { topk, model }
    }

    /// Sets the number of top predictions to produce.
    pub fn with_topk(mut self, topk: usize) -> Self {
        self.topk = topk;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topk: DEFAULT_TOP_K,
            model: ModelConfig::default(),
        }
    }
}

impl ConfigValidator for PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.topk == 0 {
            return Err(ConfigError::InvalidTopK);
        }
        self.model.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_topk_rejected() {
        let config = PipelineConfig::default().with_topk(0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTopK)));
    }

    #[test]
    fn test_bad_model_version_rejected() {
        let config = PipelineConfig::new(3, ModelConfig::new(7, 1.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedModelVersion { version: 7 })
        ));
    }

    #[test]
    fn test_alpha_out_of_range_rejected() {
        let config = PipelineConfig::new(3, ModelConfig::new(2, 0.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAlpha { .. })
        ));
    }
}
