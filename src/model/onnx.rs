//! ONNX Runtime inference provider.
//!
//! Adapts an ONNX image-classification model (MobileNet-style: RGB input at
//! a fixed square resolution, one score per class) to the
//! [`InferenceProvider`]/[`ModelInstance`] capability contract. Spatial
//! resizing and input scaling happen here, per the provider contract; the
//! decoder hands over the image at its source resolution.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use image::{Rgb, RgbImage, imageops};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use tracing::{debug, info};

use crate::core::config::{ConfigError, ConfigValidator, ModelConfig};
use crate::core::constants::RGB_CHANNELS;
use crate::core::errors::{InferenceError, LoadError, SimpleError};
use crate::core::predictions::Prediction;
use crate::core::tensor::DecodedTensor;
use crate::core::traits::{InferenceProvider, ModelInstance};
use crate::processors::Topk;

/// Configuration for the ONNX provider.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OnnxProviderConfig {
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Path to the newline-separated class label file.
    pub labels_path: PathBuf,
    /// Square input resolution the model expects.
    pub input_size: u32,
    /// Input tensor name; discovered from the session when not set.
    pub input_name: Option<String>,
}

impl OnnxProviderConfig {
    /// Creates a configuration with the default 224×224 input resolution.
    pub fn new(model_path: impl Into<PathBuf>, labels_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            labels_path: labels_path.into(),
            input_size: 224,
            input_name: None,
        }
    }

    /// Sets the square input resolution.
    pub fn with_input_size(mut self, input_size: u32) -> Self {
        self.input_size = input_size;
        self
    }
}

impl ConfigValidator for OnnxProviderConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.input_size == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "input size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::new("model.onnx", "labels.txt")
    }
}

/// Inference provider backed by ONNX Runtime.
#[derive(Debug, Clone)]
pub struct OnnxProvider {
    config: OnnxProviderConfig,
}

impl OnnxProvider {
    /// Creates a provider for the given configuration.
    pub fn new(config: OnnxProviderConfig) -> Self {
        Self { config }
    }
}

impl InferenceProvider for OnnxProvider {
    type Instance = OnnxModel;

    async fn load(&self, config: &ModelConfig) -> Result<OnnxModel, LoadError> {
        let labels = tokio::fs::read_to_string(&self.config.labels_path).await?;
        let labels: Vec<&str> = labels
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if labels.is_empty() {
            return Err(LoadError::initialize(
                "label file contains no labels",
                SimpleError::new(self.config.labels_path.display().to_string()),
            ));
        }

        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(&self.config.model_path))
            .map_err(|e| LoadError::initialize("failed to create ONNX session", e))?;

        let input_name = match self.config.input_name {
            Some(ref name) => name.clone(),
            None => session
                .inputs
                .first()
                .map(|input| input.name.clone())
                .ok_or_else(|| {
                    LoadError::initialize(
                        "model has no inputs",
                        SimpleError::new(self.config.model_path.display().to_string()),
                    )
                })?,
        };
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                LoadError::initialize(
                    "model has no outputs",
                    SimpleError::new(self.config.model_path.display().to_string()),
                )
            })?;

        info!(
            model = %self.config.model_path.display(),
            classes = labels.len(),
            version = config.version,
            alpha = config.alpha,
            "ONNX model loaded"
        );

        Ok(OnnxModel {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_size: self.config.input_size,
            topk: Topk::from_class_names(labels),
        })
    }
}

/// A loaded ONNX classification model.
pub struct OnnxModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_size: u32,
    topk: Topk,
}

impl OnnxModel {
    fn run_forward(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let input_tensor = TensorRef::from_array_view(input.view())
            .map_err(|e| InferenceError::runtime("failed to convert input tensor", e))?;

        // A poisoned session lock still holds a usable session; recover it.
        let mut session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| InferenceError::runtime("forward pass failed", e))?;

        let (_, scores) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::runtime("failed to extract output tensor", e))?;
        Ok(scores.to_vec())
    }
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_size", &self.input_size)
            .field("classes", &self.topk.num_classes())
            .finish()
    }
}

impl ModelInstance for OnnxModel {
    fn num_classes(&self) -> usize {
        self.topk.num_classes()
    }

    async fn classify(
        &self,
        tensor: DecodedTensor,
        topk: usize,
    ) -> Result<Vec<Prediction>, InferenceError> {
        if tensor.channels() != RGB_CHANNELS {
            let (height, width, channels) = tensor.shape();
            return Err(InferenceError::shape_mismatch(
                format!("HxWx{RGB_CHANNELS}"),
                format!("{height}x{width}x{channels}"),
            ));
        }

        let input = preprocess(&tensor, self.input_size);
        drop(tensor);

        let raw = self.run_forward(&input)?;
        let scores = if is_distribution(&raw) {
            raw
        } else {
            softmax(&raw)
        };
        debug!(classes = scores.len(), topk, "forward pass complete");

        self.topk.select(&scores, topk)
    }
}

/// Resizes to the model's input resolution and scales channels to `[-1, 1]`,
/// producing an NCHW batch of one.
fn preprocess(tensor: &DecodedTensor, input_size: u32) -> Array4<f32> {
    let view = tensor.view();
    let image = RgbImage::from_fn(tensor.width() as u32, tensor.height() as u32, |x, y| {
        Rgb([
            view[(y as usize, x as usize, 0)].clamp(0.0, 255.0) as u8,
            view[(y as usize, x as usize, 1)].clamp(0.0, 255.0) as u8,
            view[(y as usize, x as usize, 2)].clamp(0.0, 255.0) as u8,
        ])
    });
    let resized = imageops::resize(&image, input_size, input_size, imageops::FilterType::Triangle);

    let size = input_size as usize;
    Array4::from_shape_fn((1, RGB_CHANNELS, size, size), |(_, c, y, x)| {
        resized.get_pixel(x as u32, y as u32)[c] as f32 / 127.5 - 1.0
    })
}

/// Whether the scores already form a probability distribution.
///
/// Models exported with a softmax head emit probabilities directly; applying
/// a second softmax would flatten them.
fn is_distribution(scores: &[f32]) -> bool {
    let sum: f32 = scores.iter().sum();
    scores.iter().all(|&s| (0.0..=1.0).contains(&s)) && (sum - 1.0).abs() < 1e-3
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_preprocess_shape_and_range() {
        let image = RgbImage::from_pixel(10, 6, Rgb([0, 128, 255]));
        let tensor = DecodedTensor::from_rgb(&image);

        let input = preprocess(&tensor, 8);
        assert_eq!(input.shape(), &[1, 3, 8, 8]);
        assert!((input[(0, 0, 0, 0)] + 1.0).abs() < 1e-6);
        assert!((input[(0, 2, 0, 0)] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();

        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_distribution_detection() {
        assert!(is_distribution(&[0.7, 0.2, 0.1]));
        assert!(!is_distribution(&[3.2, -1.0, 0.4]));
    }
}
