//! Externally observable pipeline state.

use crate::core::predictions::Prediction;

/// The externally observable state of the classification pipeline.
///
/// Exactly one state holds at a time. The view-state projector subscribes to
/// transitions and renders them; it holds no state of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    /// The pipeline is starting and the initial model load is in progress.
    Initializing,
    /// No image is selected. `model_ready` reflects whether classification
    /// is possible; `false` after a failed load until a retry succeeds.
    Idle {
        /// Whether the model finished loading successfully.
        model_ready: bool,
    },
    /// An image is selected and awaiting an explicit classify trigger.
    ImageSelected,
    /// A classification episode is in flight for the current image.
    Classifying,
    /// The most recent episode produced ranked predictions.
    Results(Vec<Prediction>),
    /// The most recent episode failed; the message is user-presentable.
    Error(String),
}

impl PipelineState {
    /// Short name of the state, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Initializing => "initializing",
            PipelineState::Idle { .. } => "idle",
            PipelineState::ImageSelected => "image-selected",
            PipelineState::Classifying => "classifying",
            PipelineState::Results(_) => "results",
            PipelineState::Error(_) => "error",
        }
    }
}

/// Outcome of a `request_image` intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// An image was selected and is now current.
    Selected,
    /// The user aborted selection; nothing changed.
    Cancelled,
    /// A newer request was issued before this one resolved; its result was
    /// dropped.
    Superseded,
    /// The source failed; the pipeline entered the error state.
    Failed,
}

/// Outcome of a `classify_current` intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyOutcome {
    /// The episode produced predictions that are now displayed.
    Completed,
    /// The trigger was gated (model not ready, no image, or an episode
    /// already in flight for the current image) and ignored.
    Ignored,
    /// The episode finished after its image was superseded; its result was
    /// discarded.
    Superseded,
    /// The episode failed; the pipeline entered the error state.
    Failed,
}
