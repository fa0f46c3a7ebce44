//! The classification orchestrator.
//!
//! [`ClassificationPipeline`] sequences image source → decoder → model,
//! owns the process-wide model lifecycle, and converts every failure below
//! it into the presentable error state. The state machine is cyclic: each
//! new selection re-enters `ImageSelected`/`Classifying`, and no state is
//! terminal while the process runs.
//!
//! Concurrency model: single-threaded cooperative execution with suspension
//! points at model loading, image selection, and inference. Single-flight is
//! enforced with plain gates; no lock is held across an await point.
//! Episodes are identified by the selection counter captured at
//! classification start, so a result that arrives for a since-superseded
//! selection is discarded by identity, never by arrival order.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::core::config::{ConfigError, ConfigValidator, ModelConfig, PipelineConfig};
use crate::core::constants::RGB_CHANNELS;
use crate::core::errors::{LoadError, PipelineError, SourceError};
use crate::core::predictions::{ImageHandle, Prediction};
use crate::core::traits::{ImageDecoder, ImageSource, InferenceProvider, ModelInstance};
use crate::model::ModelManager;
use crate::pipeline::state::{ClassifyOutcome, PipelineState, RequestOutcome};
use crate::pipeline::stats::{PipelineStats, StatsSnapshot};

/// Tracks the current selection and the in-flight episode.
///
/// `selection` increments on every committed image selection; an episode
/// captures the value at classification start and commits only if it still
/// matches. `request_seq` increments on every `request_image` entry and
/// implements last-request-wins for overlapping selections.
#[derive(Debug, Default)]
struct EpisodeTracker {
    image: Option<ImageHandle>,
    selection: u64,
    request_seq: u64,
    classifying: Option<u64>,
}

/// The shared classification pipeline.
///
/// The pipeline is written once against the capability traits; platform
/// adapters supply the concrete picker, decoder, and inference runtime. The
/// view-state projector drives it through the two intents
/// [`request_image`](Self::request_image) and
/// [`classify_current`](Self::classify_current), and observes it through
/// [`subscribe`](Self::subscribe).
pub struct ClassificationPipeline<S, D, P: InferenceProvider> {
    source: S,
    decoder: D,
    model: ModelManager<P>,
    topk: usize,
    tracker: Mutex<EpisodeTracker>,
    state_tx: watch::Sender<PipelineState>,
    state_rx: watch::Receiver<PipelineState>,
    stats: PipelineStats,
}

impl<S, D, P> ClassificationPipeline<S, D, P>
where
    S: ImageSource,
    D: ImageDecoder,
    P: InferenceProvider,
{
    /// Creates a pipeline from its capabilities and a validated configuration.
    ///
    /// # Arguments
    ///
    /// * `source` - The image source adapter.
    /// * `decoder` - The image decoder.
    /// * `provider` - The inference provider the model is loaded through.
    /// * `config` - Pipeline configuration; validated before construction.
    ///
    /// # Returns
    ///
    /// The pipeline in the `Initializing` state, or a [`ConfigError`] if the
    /// configuration is invalid.
    pub fn new(
        source: S,
        decoder: D,
        provider: P,
        config: PipelineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (state_tx, state_rx) = watch::channel(PipelineState::Initializing);

        Ok(Self {
            source,
            decoder,
            model: ModelManager::new(provider, config.model),
            topk: config.topk,
            tracker: Mutex::new(EpisodeTracker::default()),
            state_tx,
            state_rx,
            stats: PipelineStats::default(),
        })
    }

    /// Returns a builder for the pipeline.
    pub fn builder(source: S, decoder: D, provider: P) -> ClassificationPipelineBuilder<S, D, P> {
        ClassificationPipelineBuilder::new(source, decoder, provider)
    }

    /// Loads the model, transitioning `Initializing → Idle`.
    ///
    /// Idempotent: once the model is ready, further calls return without
    /// reloading. After a failed attempt the pipeline rests in
    /// `Idle { model_ready: false }`; calling this again retries. A retry
    /// issued after the user already selected an image flips the
    /// model-ready gate without touching the selection state.
    ///
    /// # Returns
    ///
    /// Ok once the model is ready, or the [`LoadError`] that failed this
    /// attempt.
    pub async fn load_model(&self) -> Result<(), LoadError> {
        let result = self.model.load().await;

        let pre_selection = matches!(
            *self.state_rx.borrow(),
            PipelineState::Initializing | PipelineState::Idle { .. }
        );
        match result {
            Ok(_) => {
                if pre_selection {
                    self.set_state(PipelineState::Idle { model_ready: true });
                }
                Ok(())
            }
            Err(error) => {
                // An in-flight load is still running; only a settled failure
                // moves the machine to the not-ready idle state.
                if pre_selection && !matches!(error, LoadError::LoadInFlight) {
                    self.set_state(PipelineState::Idle { model_ready: false });
                }
                Err(error)
            }
        }
    }

    /// Requests a new image from the source adapter.
    ///
    /// On success the handle replaces the current image wholesale, prior
    /// predictions or errors are cleared, and the state becomes
    /// `ImageSelected`. A cancelled pick leaves the pipeline exactly as it
    /// was. Overlapping requests are last-request-wins: a result arriving
    /// for an outdated request is dropped, not queued.
    pub async fn request_image(&self) -> RequestOutcome {
        let ticket = {
            let mut tracker = self.lock_tracker();
            tracker.request_seq += 1;
            tracker.request_seq
        };
        debug!(ticket, "requesting image");

        let picked = self.source.request_image().await;

        let mut tracker = self.lock_tracker();
        if tracker.request_seq != ticket {
            debug!(ticket, "selection superseded by a newer request");
            self.stats.record_selection_superseded();
            return RequestOutcome::Superseded;
        }

        match picked {
            Ok(handle) => {
                tracker.selection += 1;
                debug!(
                    selection = tracker.selection,
                    origin = handle.origin(),
                    "image selected"
                );
                tracker.image = Some(handle);
                drop(tracker);
                self.set_state(PipelineState::ImageSelected);
                RequestOutcome::Selected
            }
            Err(SourceError::Cancelled) => {
                debug!("image selection cancelled");
                RequestOutcome::Cancelled
            }
            Err(error) => {
                drop(tracker);
                warn!(error = %error, "image selection failed");
                self.set_state(PipelineState::Error(error.to_string()));
                RequestOutcome::Failed
            }
        }
    }

    /// Runs one classification episode for the current image.
    ///
    /// The trigger is gated: it is silently ignored when the model is not
    /// ready, when no image is selected, or when an episode is already in
    /// flight for the current selection. An episode whose selection was
    /// superseded while it ran commits nothing.
    pub async fn classify_current(&self) -> ClassifyOutcome {
        let (episode, handle, instance) = {
            let mut tracker = self.lock_tracker();
            let Some(instance) = self.model.instance() else {
                debug!("classify ignored: model not ready");
                return ClassifyOutcome::Ignored;
            };
            let Some(handle) = tracker.image.clone() else {
                debug!("classify ignored: no image selected");
                return ClassifyOutcome::Ignored;
            };
            if tracker.classifying == Some(tracker.selection) {
                debug!(
                    selection = tracker.selection,
                    "classify ignored: episode already in flight"
                );
                return ClassifyOutcome::Ignored;
            }
            tracker.classifying = Some(tracker.selection);
            (tracker.selection, handle, instance)
        };

        self.stats.record_episode_started();
        self.set_state(PipelineState::Classifying);
        let result = self.run_episode(&handle, instance.as_ref()).await;

        let mut tracker = self.lock_tracker();
        if tracker.classifying == Some(episode) {
            tracker.classifying = None;
        }
        if tracker.selection != episode {
            drop(tracker);
            debug!(episode, "discarding result for superseded episode");
            self.stats.record_episode_superseded();
            return ClassifyOutcome::Superseded;
        }
        drop(tracker);

        match result {
            Ok(predictions) => {
                info!(
                    episode,
                    count = predictions.len(),
                    "classification complete"
                );
                self.stats.record_episode_completed();
                self.set_state(PipelineState::Results(predictions));
                ClassifyOutcome::Completed
            }
            Err(error) => {
                warn!(episode, error = %error, "classification failed");
                self.stats.record_episode_failed();
                self.set_state(PipelineState::Error(error.to_string()));
                ClassifyOutcome::Failed
            }
        }
    }

    /// Decode then infer, in order, for one episode.
    ///
    /// The decoded tensor is moved into the inference call, which releases
    /// it on every exit path.
    async fn run_episode(
        &self,
        handle: &ImageHandle,
        instance: &P::Instance,
    ) -> Result<Vec<Prediction>, PipelineError> {
        let tensor = self.decoder.decode(handle.bytes(), RGB_CHANNELS)?;
        debug!(shape = ?tensor.shape(), "image decoded");
        let predictions = instance.classify(tensor, self.topk).await?;
        Ok(predictions)
    }

    /// The current pipeline state.
    pub fn state(&self) -> PipelineState {
        self.state_rx.borrow().clone()
    }

    /// Subscribes to state transitions.
    ///
    /// The receiver observes every transition; the view-state projector
    /// renders from it and issues intents back into the pipeline.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state_rx.clone()
    }

    /// Whether the model is loaded and classification is possible.
    pub fn model_ready(&self) -> bool {
        self.model.is_ready()
    }

    /// The currently selected image, if any.
    pub fn selected_image(&self) -> Option<ImageHandle> {
        self.lock_tracker().image.clone()
    }

    /// The number of top predictions produced per classification.
    pub fn topk(&self) -> usize {
        self.topk
    }

    /// A snapshot of the pipeline's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Tears the pipeline down, dropping the loaded model instance.
    pub fn shutdown(self) {
        info!(stats = ?self.stats.snapshot(), "pipeline shut down");
    }

    fn set_state(&self, next: PipelineState) {
        self.state_tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            debug!(from = state.name(), to = next.name(), "state transition");
            *state = next;
            true
        });
    }

    fn lock_tracker(&self) -> MutexGuard<'_, EpisodeTracker> {
        // A poisoned tracker still holds consistent data; recover it.
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, D, P: InferenceProvider> std::fmt::Debug for ClassificationPipeline<S, D, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationPipeline")
            .field("state", &self.state_rx.borrow().name())
            .field("topk", &self.topk)
            .finish()
    }
}

/// Builder for [`ClassificationPipeline`].
pub struct ClassificationPipelineBuilder<S, D, P> {
    source: S,
    decoder: D,
    provider: P,
    config: PipelineConfig,
}

impl<S, D, P> ClassificationPipelineBuilder<S, D, P>
where
    S: ImageSource,
    D: ImageDecoder,
    P: InferenceProvider,
{
    /// Creates a builder with the default configuration.
    pub fn new(source: S, decoder: D, provider: P) -> Self {
        Self {
            source,
            decoder,
            provider,
            config: PipelineConfig::default(),
        }
    }

    /// Sets the number of top predictions to produce.
    pub fn topk(mut self, topk: usize) -> Self {
        self.config.topk = topk;
        self
    }

    /// Sets the model configuration handed to the provider.
    pub fn model(mut self, model: ModelConfig) -> Self {
        self.config.model = model;
        self
    }

    /// Sets the whole pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the configuration and builds the pipeline.
    pub fn build(self) -> Result<ClassificationPipeline<S, D, P>, ConfigError> {
        ClassificationPipeline::new(self.source, self.decoder, self.provider, self.config)
    }
}
