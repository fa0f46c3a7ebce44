//! # snapclass
//!
//! An on-device image classification pipeline: pick an image, decode it,
//! run it through a loaded model, and surface ranked top-k predictions
//! through an observable state machine.
//!
//! The pipeline logic is written once against small capability traits;
//! platform adapters supply the concrete picker, decoder, and inference
//! runtime bindings. The view layer stays outside this crate: it subscribes
//! to [`PipelineState`](pipeline::PipelineState) transitions and issues the
//! two intents `request_image` and `classify_current`.
//!
//! ## Components
//!
//! - **Image source**: obtains a user-selected image as a decodable byte
//!   buffer, independent of origin (file path, native picker).
//! - **Decoder**: converts encoded bytes into a fixed-channel tensor.
//! - **Model manager**: owns the loaded model instance for the life of the
//!   process, with a single-flight, idempotent load.
//! - **Orchestrator**: sequences source → decoder → model, gates concurrent
//!   episodes, and discards results of superseded selections by episode
//!   identity.
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, capability traits, tensor and
//!   prediction types
//! * [`decode`] - Raster image decoding
//! * [`source`] - Image source adapters
//! * [`model`] - Model lifecycle management and inference backends
//! * [`processors`] - Top-k selection
//! * [`pipeline`] - The orchestrator state machine
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapclass::prelude::*;
//! use snapclass::decode::RasterDecoder;
//! use snapclass::source::FileImageSource;
//! # use snapclass::core::traits::InferenceProvider;
//! # async fn run<P: InferenceProvider>(provider: P) -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = ClassificationPipeline::builder(
//!     FileImageSource::new("cat.jpg"),
//!     RasterDecoder::new(),
//!     provider,
//! )
//! .topk(3)
//! .build()?;
//!
//! pipeline.load_model().await?;
//! pipeline.request_image().await;
//! pipeline.classify_current().await;
//!
//! if let PipelineState::Results(predictions) = pipeline.state() {
//!     for prediction in predictions {
//!         println!("{}: {}", prediction.label, prediction.confidence);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod decode;
pub mod model;
pub mod pipeline;
pub mod processors;
pub mod source;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error handling
    pub use crate::core::errors::{
        DecodeError, InferenceError, LoadError, PipelineError, SourceError,
    };

    // Configuration
    pub use crate::core::config::{ConfigError, ConfigValidator, ModelConfig, PipelineConfig};

    // Domain types
    pub use crate::core::predictions::{ImageHandle, Prediction};
    pub use crate::core::tensor::DecodedTensor;

    // Capability traits
    pub use crate::core::traits::{ImageDecoder, ImageSource, InferenceProvider, ModelInstance};

    // Pipeline (high-level API)
    pub use crate::model::{ModelManager, ModelPhase};
    pub use crate::pipeline::{
        ClassificationPipeline, ClassificationPipelineBuilder, ClassifyOutcome, PipelineState,
        RequestOutcome, StatsSnapshot,
    };
}
