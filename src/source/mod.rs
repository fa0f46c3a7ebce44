//! Image source adapters.
//!
//! Each adapter implements [`ImageSource`](crate::core::traits::ImageSource)
//! for one platform binding: a path-fed source for headless and test use,
//! and a native file-picker source behind the `dialog` feature.

#[cfg(feature = "dialog")]
mod dialog;

#[cfg(feature = "dialog")]
pub use dialog::DialogImageSource;

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::core::errors::SourceError;
use crate::core::predictions::ImageHandle;
use crate::core::traits::ImageSource;

/// Path-fed image source.
///
/// Each `request_image` call takes the next queued path and reads its bytes.
/// An empty queue resolves as [`SourceError::Cancelled`]: there was nothing
/// to pick, which is the benign outcome, not a failure. Paths can be queued
/// up front or pushed while the pipeline runs.
#[derive(Debug, Default)]
pub struct FileImageSource {
    queue: Mutex<VecDeque<PathBuf>>,
}

impl FileImageSource {
    /// Creates a source with a single queued path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_paths([path.into()])
    }

    /// Creates a source from an iterator of paths, selected in order.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            queue: Mutex::new(paths.into_iter().map(Into::into).collect()),
        }
    }

    /// Queues another path for a future selection.
    pub fn push(&self, path: impl Into<PathBuf>) {
        self.lock_queue().push_back(path.into());
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<PathBuf>> {
        // A poisoned queue still holds consistent data; recover it.
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for FileImageSource {
    async fn request_image(&self) -> Result<ImageHandle, SourceError> {
        let Some(path) = self.lock_queue().pop_front() else {
            debug!("no queued path; reporting cancelled selection");
            return Err(SourceError::Cancelled);
        };

        let bytes = tokio::fs::read(&path).await.map_err(SourceError::from)?;
        debug!(path = %path.display(), len = bytes.len(), "read image file");
        Ok(ImageHandle::new(path.display().to_string(), bytes))
    }
}
