//! Prediction and image-reference types for the classification pipeline.

use std::sync::Arc;

/// A single ranked class prediction.
///
/// Confidences come directly from the provider's output distribution; the
/// pipeline applies no smoothing, calibration, or thresholding. Display
/// formatting (percentages, rounding) is a presentation concern and stays
/// outside this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Human-readable class label.
    pub label: Arc<str>,
    /// Confidence score in `[0, 1]`.
    pub confidence: f32,
}

impl Prediction {
    /// Creates a new prediction.
    pub fn new(label: impl Into<Arc<str>>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// An opaque reference to one user-selected image.
///
/// Holds the image's origin (a URI, path, or synthetic name) together with
/// its encoded bytes. Cloning is cheap; the bytes are shared. The
/// orchestrator replaces the handle wholesale whenever the user selects a
/// new image; handles are never mutated in place.
#[derive(Clone)]
pub struct ImageHandle {
    origin: Arc<str>,
    bytes: Arc<[u8]>,
}

impl ImageHandle {
    /// Creates a handle from an origin string and encoded image bytes.
    pub fn new(origin: impl Into<Arc<str>>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            origin: origin.into(),
            bytes: bytes.into(),
        }
    }

    /// The origin of the image (URI, path, or synthetic name).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("origin", &self.origin)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}
