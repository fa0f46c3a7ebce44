//! Model lifecycle management.
//!
//! [`ModelManager`] owns the loaded model instance for the life of the
//! process. It is constructed explicitly and injected into the orchestrator
//! (there is no ambient global model state) and it enforces the lifecycle
//! `Unloaded → Loading → Ready | Failed`, with at most one load in flight
//! and the `Ready` instance reused for every subsequent inference.

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(feature = "onnx")]
pub use onnx::{OnnxModel, OnnxProvider, OnnxProviderConfig};

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::core::config::ModelConfig;
use crate::core::errors::LoadError;
use crate::core::traits::InferenceProvider;

/// Externally observable phase of the model lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelPhase {
    /// No load has been attempted yet.
    Unloaded,
    /// A load is in flight.
    Loading,
    /// The model is loaded and reusable.
    Ready,
    /// The most recent load attempt failed.
    Failed,
}

enum Slot<I> {
    Unloaded,
    Loading,
    Ready(Arc<I>),
    Failed(String),
}

/// Owns a provider and the model instance it loads.
///
/// `load` is idempotent: once `Ready`, it returns the cached instance
/// without reloading. A failed attempt leaves the manager in `Failed`, from
/// which a fresh `load` starts over (manual retry). The held instance is
/// dropped when the manager is dropped, at process teardown.
pub struct ModelManager<P: InferenceProvider> {
    provider: P,
    config: ModelConfig,
    slot: Mutex<Slot<P::Instance>>,
}

impl<P: InferenceProvider> ModelManager<P> {
    /// Creates a manager that will load through the given provider.
    pub fn new(provider: P, config: ModelConfig) -> Self {
        Self {
            provider,
            config,
            slot: Mutex::new(Slot::Unloaded),
        }
    }

    /// The provider configuration this manager loads with.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> ModelPhase {
        match *self.lock_slot() {
            Slot::Unloaded => ModelPhase::Unloaded,
            Slot::Loading => ModelPhase::Loading,
            Slot::Ready(_) => ModelPhase::Ready,
            Slot::Failed(_) => ModelPhase::Failed,
        }
    }

    /// Whether a loaded instance is available.
    pub fn is_ready(&self) -> bool {
        self.phase() == ModelPhase::Ready
    }

    /// The loaded instance, if the manager is `Ready`.
    pub fn instance(&self) -> Option<Arc<P::Instance>> {
        match *self.lock_slot() {
            Slot::Ready(ref instance) => Some(instance.clone()),
            _ => None,
        }
    }

    /// Loads the model, or returns the already loaded instance.
    ///
    /// Single-flight: if a load is already in flight,
    /// [`LoadError::LoadInFlight`] is returned instead of starting a second
    /// one. The orchestrator's model-ready gate means pipeline callers never
    /// hit that variant.
    ///
    /// # Returns
    ///
    /// The shared model instance, or the [`LoadError`] that failed this
    /// attempt.
    pub async fn load(&self) -> Result<Arc<P::Instance>, LoadError> {
        {
            let mut slot = self.lock_slot();
            match &*slot {
                Slot::Ready(instance) => {
                    debug!("model already loaded; reusing instance");
                    return Ok(instance.clone());
                }
                Slot::Loading => return Err(LoadError::LoadInFlight),
                Slot::Unloaded | Slot::Failed(_) => {}
            }
            *slot = Slot::Loading;
        }

        info!(
            version = self.config.version,
            alpha = self.config.alpha,
            "loading model"
        );
        let result = self.provider.load(&self.config).await;

        let mut slot = self.lock_slot();
        match result {
            Ok(instance) => {
                let instance = Arc::new(instance);
                *slot = Slot::Ready(instance.clone());
                info!("model ready");
                Ok(instance)
            }
            Err(error) => {
                warn!(error = %error, "model load failed");
                *slot = Slot::Failed(error.to_string());
                Err(error)
            }
        }
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Slot<P::Instance>> {
        // A poisoned slot still holds a consistent phase; recover it.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: InferenceProvider> std::fmt::Debug for ModelManager<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{InferenceError, SimpleError};
    use crate::core::predictions::Prediction;
    use crate::core::tensor::DecodedTensor;
    use crate::core::traits::ModelInstance;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct StubModel;

    impl ModelInstance for StubModel {
        fn num_classes(&self) -> usize {
            0
        }

        async fn classify(
            &self,
            _tensor: DecodedTensor,
            _topk: usize,
        ) -> Result<Vec<Prediction>, InferenceError> {
            Ok(Vec::new())
        }
    }

    /// Counts loads and fails the first `fail_first` attempts.
    struct CountingProvider {
        loads: AtomicUsize,
        fail_first: usize,
    }

    impl CountingProvider {
        fn new(fail_first: usize) -> Self {
            Self {
                loads: AtomicUsize::new(0),
                fail_first,
            }
        }
    }

    impl InferenceProvider for CountingProvider {
        type Instance = StubModel;

        async fn load(&self, _config: &ModelConfig) -> Result<StubModel, LoadError> {
            let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
            if attempt < self.fail_first {
                return Err(LoadError::fetch(
                    "weights unreachable",
                    SimpleError::new("stub fetch failure"),
                ));
            }
            Ok(StubModel)
        }
    }

    /// Blocks inside `load` until released, to exercise the Loading phase.
    struct GatedProvider {
        entered: Notify,
        release: Notify,
    }

    impl InferenceProvider for &GatedProvider {
        type Instance = StubModel;

        async fn load(&self, _config: &ModelConfig) -> Result<StubModel, LoadError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(StubModel)
        }
    }

    #[tokio::test]
    async fn test_load_is_idempotent_once_ready() {
        let manager = ModelManager::new(CountingProvider::new(0), ModelConfig::default());

        let first = manager.load().await.unwrap();
        let second = manager.load().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.provider.loads.load(Ordering::SeqCst), 1);
        assert_eq!(manager.phase(), ModelPhase::Ready);
    }

    #[tokio::test]
    async fn test_failed_load_allows_manual_retry() {
        let manager = ModelManager::new(CountingProvider::new(1), ModelConfig::default());

        assert!(manager.load().await.is_err());
        assert_eq!(manager.phase(), ModelPhase::Failed);
        assert!(manager.instance().is_none());

        assert!(manager.load().await.is_ok());
        assert_eq!(manager.phase(), ModelPhase::Ready);
    }

    #[tokio::test]
    async fn test_concurrent_load_reports_in_flight() {
        let provider = GatedProvider {
            entered: Notify::new(),
            release: Notify::new(),
        };
        let manager = ModelManager::new(&provider, ModelConfig::default());

        let (first, second) = tokio::join!(manager.load(), async {
            provider.entered.notified().await;
            assert_eq!(manager.phase(), ModelPhase::Loading);
            let second = manager.load().await;
            provider.release.notify_one();
            second
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(LoadError::LoadInFlight)));
    }
}
