//! Batch theme download.
//!
//! Items are processed one at a time. A failing item is logged and
//! recorded in the [`BatchReport`]; the batch always runs to the end.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::DownloadError;
use crate::models::Item;
use crate::startup::DownloadConfig;
use crate::traits::{MediaClient, ThemeSource};

/// File name the server picks up as the theme song.
pub const THEME_FILE_NAME: &str = "theme.mp3";

/// What happened to one item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Theme written to this path.
    Downloaded(PathBuf),
    /// No suitable theme was found.
    NoTheme,
}

/// Result of a batch, per item.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// (item id, written file)
    pub downloaded: Vec<(String, PathBuf)>,
    /// Items without a suitable theme.
    pub not_found: Vec<String>,
    /// (item id, reason)
    pub failed: Vec<(String, DownloadError)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.downloaded.len() + self.not_found.len() + self.failed.len()
    }
}

/// Downloads themes for library items.
pub struct ThemeDownloader {
    source: Arc<dyn ThemeSource>,
    config: DownloadConfig,
}

impl ThemeDownloader {
    pub fn new(source: Arc<dyn ThemeSource>, config: DownloadConfig) -> Self {
        Self { source, config }
    }

    /// Find and store the theme for one item.
    pub async fn download_one(
        &self,
        client: &dyn MediaClient,
        item: &Item,
    ) -> Result<ItemOutcome, DownloadError> {
        info!("Downloading theme for {}", item.name);
        let media = client.get_item(&item.id).await?;
        let dest_dir = media.theme_directory()?;

        let Some(video) = self.source.find_theme_audio_id(&item.name).await? else {
            info!("No theme found for {}", item.name);
            return Ok(ItemOutcome::NoTheme);
        };
        info!("The file will be stored in {:?}", dest_dir);

        let pause = self.config.pause_between_downloads.as_duration();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        let downloaded = self.source.download_as_audio(&video, &dest_dir).await?;
        let target = dest_dir.join(THEME_FILE_NAME);
        tokio::fs::rename(&downloaded, &target)
            .await
            .map_err(|source| DownloadError::Move {
                from: downloaded.clone(),
                to: target.clone(),
                source,
            })?;
        Ok(ItemOutcome::Downloaded(target))
    }

    /// Run [`download_one`](Self::download_one) over every item.
    pub async fn download_themes(&self, client: &dyn MediaClient, items: &[Item]) -> BatchReport {
        let mut report = BatchReport::default();
        for item in items {
            match self.download_one(client, item).await {
                Ok(ItemOutcome::Downloaded(path)) => {
                    report.downloaded.push((item.id.clone(), path));
                }
                Ok(ItemOutcome::NoTheme) => report.not_found.push(item.id.clone()),
                Err(e) => {
                    warn!("Skipping {}: {}", item.name, e);
                    report.failed.push((item.id.clone(), e));
                }
            }
        }
        report
    }
}
