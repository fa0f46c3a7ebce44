//! Error types for the classification pipeline.
//!
//! This module defines the error taxonomy of the pipeline, one enum per
//! pipeline stage: model loading errors, image source errors, decode errors,
//! and inference errors. [`PipelineError`] is the orchestrator-level sum of
//! those; its `Display` output is what the orchestrator surfaces as the
//! user-visible error state.

use thiserror::Error;

/// Minimal string-backed error used when no richer source error exists.
#[derive(Debug)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}

/// Errors raised while fetching or initializing the model.
///
/// A load failure is terminal for that load attempt; there is no automatic
/// retry. Callers may retry manually by issuing a new load.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The model weights could not be fetched.
    #[error("model fetch failed: {context}")]
    Fetch {
        /// Additional context about the fetch failure.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The fetched model could not be initialized into a runnable instance.
    #[error("model initialization failed: {context}")]
    Initialize {
        /// Additional context about the initialization failure.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A load was requested while another load is already in flight.
    ///
    /// The orchestrator gates on the model phase, so this is only reachable
    /// when driving the model manager directly from concurrent tasks.
    #[error("a model load is already in flight")]
    LoadInFlight,

    /// IO error while reading model assets.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Creates a LoadError for a failed weight fetch.
    pub fn fetch(context: &str, error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Fetch {
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a LoadError for a failed model initialization.
    pub fn initialize(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Initialize {
            context: context.to_string(),
            source: Box::new(error),
        }
    }
}

/// Errors raised while obtaining a user-selected image.
///
/// `Cancelled` is a benign outcome: the pipeline returns to its prior state
/// without surfacing anything. The other variants are user-visible.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The user or platform denied access to the image library or camera.
    #[error("permission to access images was denied")]
    PermissionDenied,

    /// The user aborted the selection. Not an error to surface loudly.
    #[error("image selection was cancelled")]
    Cancelled,

    /// The source could not produce an image for another reason.
    #[error("image source unavailable: {message}")]
    Unavailable {
        /// A message describing why the source failed.
        message: String,
    },
}

impl SourceError {
    /// Creates a SourceError for an unavailable source.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Unavailable {
                message: error.to_string(),
            },
        }
    }
}

/// Errors raised while decoding encoded image bytes into a tensor.
///
/// Both failure modes are attributable to the selected file and surface as a
/// user-visible error state.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The byte buffer is not in a supported raster image encoding.
    #[error("unsupported image format: {message}")]
    UnsupportedFormat {
        /// A message describing the unrecognized encoding.
        message: String,
    },

    /// The encoding was recognized but the data stream is broken.
    #[error("corrupt image data: {message}")]
    CorruptData {
        /// A message describing the corruption.
        message: String,
    },

    /// The decoder cannot produce the requested channel layout.
    #[error("unsupported channel count: {requested}")]
    UnsupportedChannelCount {
        /// The channel count that was requested.
        requested: usize,
    },
}

impl From<image::ImageError> for DecodeError {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::Unsupported(err) => Self::UnsupportedFormat {
                message: err.to_string(),
            },
            other => Self::CorruptData {
                message: other.to_string(),
            },
        }
    }
}

/// Errors raised by the model instance during inference.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The input tensor does not match the model's expected input shape.
    ///
    /// This indicates a decoder/model contract violation and should be
    /// treated as a defect to fix, not a transient condition.
    #[error("input shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Description of the shape the model expects.
        expected: String,
        /// Description of the shape that was provided.
        actual: String,
    },

    /// The inference runtime failed.
    #[error("inference failed: {context}")]
    RuntimeFailure {
        /// Additional context about the runtime failure.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl InferenceError {
    /// Creates an InferenceError for a tensor that violates the input contract.
    pub fn shape_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an InferenceError for a runtime failure.
    pub fn runtime(context: &str, error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::RuntimeFailure {
            context: context.to_string(),
            source: Box::new(error),
        }
    }
}

/// The orchestrator-level error: any failure below the orchestrator.
///
/// All variants are converted to the `Error(message)` pipeline state; nothing
/// is retried automatically.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error from the model load stage.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Error from the image source stage.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Error from the decode stage.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Error from the inference stage.
    #[error(transparent)]
    Inference(#[from] InferenceError),
}
