//! Native file-picker image source.

use tracing::debug;

use crate::core::errors::SourceError;
use crate::core::predictions::ImageHandle;
use crate::core::traits::ImageSource;

/// Image source backed by the platform's native file dialog.
///
/// The picker suspends until the user selects a file or dismisses the
/// dialog; dismissal maps to [`SourceError::Cancelled`].
#[derive(Debug, Clone)]
pub struct DialogImageSource {
    title: String,
    extensions: Vec<String>,
}

impl DialogImageSource {
    /// Creates a picker for the common raster image extensions.
    pub fn new() -> Self {
        Self {
            title: "Choose an image".to_string(),
            extensions: ["png", "jpg", "jpeg", "gif", "bmp", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Sets the dialog title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Default for DialogImageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSource for DialogImageSource {
    async fn request_image(&self) -> Result<ImageHandle, SourceError> {
        let extensions: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        let picked = rfd::AsyncFileDialog::new()
            .set_title(&self.title)
            .add_filter("images", &extensions)
            .pick_file()
            .await;

        let Some(file) = picked else {
            debug!("file dialog dismissed");
            return Err(SourceError::Cancelled);
        };

        let bytes = file.read().await;
        debug!(name = %file.file_name(), len = bytes.len(), "picked image file");
        Ok(ImageHandle::new(file.file_name(), bytes))
    }
}
