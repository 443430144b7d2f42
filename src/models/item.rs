//! Library items and the query used to search them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DownloadError;

/// A library item (movie, series, ...) as returned by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub production_year: Option<i32>,
    #[serde(default)]
    pub provider_ids: HashMap<String, String>,
    /// Folder path. Set for series.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub media_sources: Vec<MediaSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MediaSource {
    #[serde(default)]
    pub path: Option<String>,
}

impl Item {
    /// The TMDb id the server knows for this item, if any.
    pub fn tmdb_id(&self) -> Option<&str> {
        self.provider_ids.get("Tmdb").map(String::as_str)
    }

    /// Path of the first media file. Set for movies.
    pub fn media_path(&self) -> Option<&str> {
        self.media_sources.first()?.path.as_deref()
    }

    /// Folder of a series.
    pub fn series_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Directory the theme song belongs in.
    ///
    /// Movies: the directory containing the media file. Series: the series
    /// folder itself.
    pub fn theme_directory(&self) -> Result<PathBuf, DownloadError> {
        if let Some(media) = self.media_path() {
            if let Some(parent) = Path::new(media).parent() {
                return Ok(parent.to_path_buf());
            }
        }
        self.series_path()
            .map(PathBuf::from)
            .ok_or_else(|| DownloadError::MissingField {
                item_id: self.id.clone(),
                field: "media path",
            })
    }
}

/// Filter parameters for an item search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemQuery {
    pub search_term: Option<String>,
    pub include_item_types: Vec<String>,
    pub exclude_item_types: Vec<String>,
    pub recursive: bool,
    pub has_theme_song: Option<bool>,
    pub fields: Vec<String>,
    pub limit: Option<u32>,
    pub enable_images: Option<bool>,
    pub enable_user_data: Option<bool>,
}

impl ItemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn with_include_types(mut self, types: &[&str]) -> Self {
        self.include_item_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_exclude_types(mut self, types: &[&str]) -> Self {
        self.exclude_item_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    pub fn with_has_theme_song(mut self, has: bool) -> Self {
        self.has_theme_song = Some(has);
        self
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip images and user data in the response.
    pub fn lean(mut self) -> Self {
        self.enable_images = Some(false);
        self.enable_user_data = Some(false);
        self
    }

    /// Query-string pairs in the server's parameter naming.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref term) = self.search_term {
            params.push(("searchTerm", term.clone()));
        }
        if !self.include_item_types.is_empty() {
            params.push(("IncludeItemTypes", self.include_item_types.join(",")));
        }
        if !self.exclude_item_types.is_empty() {
            params.push(("ExcludeItemTypes", self.exclude_item_types.join(",")));
        }
        if self.recursive {
            params.push(("Recursive", "true".to_string()));
        }
        if let Some(has) = self.has_theme_song {
            params.push(("HasThemeSong", has.to_string()));
        }
        if !self.fields.is_empty() {
            params.push(("Fields", self.fields.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("Limit", limit.to_string()));
        }
        if let Some(images) = self.enable_images {
            params.push(("EnableImages", images.to_string()));
        }
        if let Some(user_data) = self.enable_user_data {
            params.push(("EnableUserData", user_data.to_string()));
        }
        params
    }
}
