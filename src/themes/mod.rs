//! Theme songs: finding them and putting them next to the media.

pub mod downloader;
pub mod search;

pub use downloader::{BatchReport, ItemOutcome, ThemeDownloader, THEME_FILE_NAME};
pub use search::{pick_theme, theme_query, video_url, SearchResult};
