//! Mock theme source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::DownloadError;
use crate::traits::ThemeSource;

/// Theme source with scripted search results.
///
/// Downloads write a small placeholder file named `<video>.mp3` into the
/// destination directory.
#[derive(Debug, Clone, Default)]
pub struct MockThemeSource {
    themes: Arc<Mutex<HashMap<String, String>>>,
    failing_downloads: Arc<Mutex<HashSet<String>>>,
    searches: Arc<Mutex<Vec<String>>>,
    downloads: Arc<Mutex<Vec<(String, PathBuf)>>>,
}

impl MockThemeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer searches for `title` with `video_id`.
    pub fn with_theme(self, title: &str, video_id: &str) -> Self {
        self.themes
            .lock()
            .unwrap()
            .insert(title.to_string(), video_id.to_string());
        self
    }

    /// Make downloads of `video_id` fail.
    pub fn with_failing_download(self, video_id: &str) -> Self {
        self.failing_downloads
            .lock()
            .unwrap()
            .insert(video_id.to_string());
        self
    }

    /// Titles searched so far.
    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    /// Downloads performed so far, as (video, destination directory).
    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ThemeSource for MockThemeSource {
    async fn find_theme_audio_id(&self, title: &str) -> Result<Option<String>, DownloadError> {
        self.searches.lock().unwrap().push(title.to_string());
        Ok(self.themes.lock().unwrap().get(title).cloned())
    }

    async fn download_as_audio(
        &self,
        video: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        if self.failing_downloads.lock().unwrap().contains(video) {
            return Err(DownloadError::Download {
                video: video.to_string(),
                message: "mock download failure".to_string(),
            });
        }
        self.downloads
            .lock()
            .unwrap()
            .push((video.to_string(), dest_dir.to_path_buf()));

        let file = dest_dir.join(format!("{}.mp3", video));
        tokio::fs::write(&file, video.as_bytes())
            .await
            .map_err(|e| DownloadError::Download {
                video: video.to_string(),
                message: e.to_string(),
            })?;
        Ok(file)
    }
}
