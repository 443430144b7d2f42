//! Theme source backed by the `yt-dlp` executable.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{DownloadError, ToolError};
use crate::themes::search::{parse_search_output, pick_theme, theme_query, video_url, MAX_RESULTS};
use crate::traits::ThemeSource;

/// Default executable name, looked up on `PATH`.
pub const YT_DLP: &str = "yt-dlp";

/// Searches and downloads through `yt-dlp`.
#[derive(Debug, Clone)]
pub struct YtDlpThemeSource {
    program: PathBuf,
}

impl Default for YtDlpThemeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpThemeSource {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(YT_DLP),
        }
    }

    /// Use a specific executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<String, ToolError> {
        debug!("Running {:?} {:?}", self.program, args);
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ToolError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ThemeSource for YtDlpThemeSource {
    async fn find_theme_audio_id(&self, title: &str) -> Result<Option<String>, DownloadError> {
        let query = theme_query(title);
        let args = vec![
            "--flat-playlist".to_string(),
            "--dump-json".to_string(),
            "--no-warnings".to_string(),
            format!("ytsearch{}:{}", MAX_RESULTS, query),
        ];
        let stdout = self
            .run(&args)
            .await
            .map_err(|source| DownloadError::Search {
                query: query.clone(),
                source,
            })?;

        let results = parse_search_output(&stdout);
        Ok(pick_theme(&results).map(|hit| hit.id.clone()))
    }

    async fn download_as_audio(
        &self,
        video: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let url = video_url(video);
        let template = dest_dir.join("%(title)s.%(ext)s");
        let args = vec![
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--no-playlist".to_string(),
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            "--output".to_string(),
            template.to_string_lossy().into_owned(),
            url.clone(),
        ];
        let stdout = self
            .run(&args)
            .await
            .map_err(|source| DownloadError::Extract {
                video: url.clone(),
                source,
            })?;

        let file = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| DownloadError::Download {
                video: url.clone(),
                message: "no output file reported".to_string(),
            })?;
        if !file.exists() {
            return Err(DownloadError::Download {
                video: url,
                message: format!("{:?} was not written", file),
            });
        }
        info!("Downloaded {} to {:?}", url, file);
        Ok(file)
    }
}
