//! Capability traits at the platform seams of the pipeline.
//!
//! The pipeline logic is written once against these traits; thin platform
//! adapters supply the concrete picker, decoder, and inference runtime
//! bindings. Any implementation satisfying the contracts is substitutable.

use std::future::Future;

use crate::core::config::ModelConfig;
use crate::core::errors::{DecodeError, InferenceError, LoadError, SourceError};
use crate::core::predictions::{ImageHandle, Prediction};
use crate::core::tensor::DecodedTensor;

/// Obtains a user-selected image as a decodable byte buffer.
///
/// Implementations may suspend on user interaction (file dialog, OS picker)
/// and on permission grants. Cancellation is reported as
/// [`SourceError::Cancelled`] and is a benign outcome. The orchestrator
/// guarantees last-request-wins across overlapping requests; implementations
/// only need to resolve each call independently.
pub trait ImageSource {
    /// Requests an image from the user.
    ///
    /// # Returns
    ///
    /// A handle to the selected image, or a [`SourceError`] describing why
    /// no image was produced.
    fn request_image(&self)
    -> impl Future<Output = Result<ImageHandle, SourceError>> + Send;
}

/// Converts raw encoded image bytes into a fixed-channel tensor.
///
/// Decoding is a deterministic, pure function of the input bytes. The
/// decoder normalizes arbitrary source color depths to the requested channel
/// count but does NOT resize to the model's spatial dimensions; spatial
/// preprocessing belongs to the model provider.
pub trait ImageDecoder {
    /// Decodes encoded bytes into an owned tensor with `channels` channels.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The encoded image bytes.
    /// * `channels` - The channel count the model expects.
    ///
    /// # Returns
    ///
    /// The decoded tensor, owned by the caller, or a [`DecodeError`] if the
    /// bytes are not a supported raster encoding.
    fn decode(&self, bytes: &[u8], channels: usize) -> Result<DecodedTensor, DecodeError>;
}

/// A loaded model capable of classifying decoded images.
///
/// Instances are shared read-only across the process once loaded; `classify`
/// does not mutate loaded weights.
pub trait ModelInstance: Send + Sync {
    /// Number of classes in the model's label set.
    fn num_classes(&self) -> usize;

    /// Classifies a decoded image, consuming the tensor.
    ///
    /// The tensor must already match the model's input contract; a mismatch
    /// fails with [`InferenceError::ShapeMismatch`] rather than silently
    /// reshaping. Taking the tensor by value guarantees it is released on
    /// every exit path of the call.
    ///
    /// # Arguments
    ///
    /// * `tensor` - The decoded image, consumed by the call.
    /// * `topk` - Number of top predictions requested.
    ///
    /// # Returns
    ///
    /// Exactly `min(topk, num_classes)` predictions sorted by descending
    /// confidence, ties kept in the provider's own stable order.
    fn classify(
        &self,
        tensor: DecodedTensor,
        topk: usize,
    ) -> impl Future<Output = Result<Vec<Prediction>, InferenceError>> + Send;
}

/// Loads model instances from a provider-specific runtime.
pub trait InferenceProvider {
    /// The instance type produced by a successful load.
    type Instance: ModelInstance + 'static;

    /// Loads a model instance for the given configuration.
    ///
    /// Loading may suspend on network or disk fetches of model weights. A
    /// failure is terminal for this attempt; the caller decides whether to
    /// retry.
    fn load(
        &self,
        config: &ModelConfig,
    ) -> impl Future<Output = Result<Self::Instance, LoadError>> + Send;
}
