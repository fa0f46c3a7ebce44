//! The core module of the classification pipeline.
//!
//! This module contains the fundamental components of the pipeline, including:
//! - Configuration management and validation
//! - Constants used throughout the pipeline
//! - Error handling
//! - The decoded tensor type
//! - Prediction and image-reference types
//! - Capability traits for platform adapters
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod constants;
pub mod errors;
pub mod predictions;
pub mod tensor;
pub mod traits;

pub use config::{ConfigError, ConfigValidator, ModelConfig, PipelineConfig};
pub use constants::{DEFAULT_TOP_K, RGB_CHANNELS};
pub use errors::{
    DecodeError, InferenceError, LoadError, PipelineError, SimpleError, SourceError,
};
pub use predictions::{ImageHandle, Prediction};
pub use tensor::DecodedTensor;
pub use traits::{ImageDecoder, ImageSource, InferenceProvider, ModelInstance};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
