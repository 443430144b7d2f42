//! Theme source trait abstraction.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::DownloadError;

/// Finds and downloads theme audio.
#[async_trait]
pub trait ThemeSource: Send + Sync {
    /// Look up a theme video for a title. `None` means nothing suitable was
    /// found.
    async fn find_theme_audio_id(&self, title: &str) -> Result<Option<String>, DownloadError>;

    /// Download `video` (an id or a full URL) as audio into `dest_dir` and
    /// return the written file.
    async fn download_as_audio(
        &self,
        video: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, DownloadError>;
}
