//! Theme search rules.
//!
//! A theme is the first search hit shorter than an hour whose minute count
//! is at most [`MAX_THEME_MINUTES`]. Hits without a known duration are
//! skipped.

use serde::Deserialize;
use tracing::debug;

/// Appended to titles before searching.
pub const THEME_SUFFIX: &str = " theme";

/// Number of search hits considered.
pub const MAX_RESULTS: usize = 10;

pub const MAX_THEME_MINUTES: u64 = 5;

pub const VIDEO_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// One hit of a video search.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Length in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl SearchResult {
    fn is_theme_length(&self) -> bool {
        match self.duration {
            Some(secs) if secs >= 0.0 => {
                let secs = secs as u64;
                secs < 3600 && secs / 60 <= MAX_THEME_MINUTES
            }
            _ => false,
        }
    }
}

/// Search query for a title: the title with `" theme"` appended, unless
/// it already ends that way.
pub fn theme_query(title: &str) -> String {
    if title.ends_with(THEME_SUFFIX) {
        title.to_string()
    } else {
        format!("{}{}", title, THEME_SUFFIX)
    }
}

/// First hit that passes the length rule.
pub fn pick_theme(results: &[SearchResult]) -> Option<&SearchResult> {
    results
        .iter()
        .take(MAX_RESULTS)
        .find(|result| result.is_theme_length())
}

/// Full watch URL for a video id. URLs pass through unchanged.
pub fn video_url(video: &str) -> String {
    if video.starts_with("http://") || video.starts_with("https://") {
        video.to_string()
    } else if video.starts_with("www.youtube.com/") {
        format!("https://{}", video)
    } else {
        format!("{}{}", VIDEO_URL_PREFIX, video)
    }
}

/// Parse line-delimited JSON search output. Unparseable lines are skipped.
pub fn parse_search_output(stdout: &str) -> Vec<SearchResult> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<SearchResult>(line) {
            Ok(result) => Some(result),
            Err(e) => {
                debug!("Skipping search line: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, duration: Option<f64>) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            title: None,
            duration,
        }
    }

    #[test]
    fn test_theme_query_suffix() {
        assert_eq!(theme_query("Firefly"), "Firefly theme");
        assert_eq!(theme_query("Firefly theme"), "Firefly theme");
        assert_eq!(theme_query("Themes"), "Themes theme");
    }

    #[test]
    fn test_pick_theme_length_rule() {
        let results = vec![
            hit("long", Some(3700.0)),
            hit("unknown", None),
            hit("six-min", Some(6.0 * 60.0)),
            hit("ok", Some(5.0 * 60.0 + 59.0)),
            hit("later", Some(60.0)),
        ];
        assert_eq!(pick_theme(&results).map(|r| r.id.as_str()), Some("ok"));
    }

    #[test]
    fn test_pick_theme_none() {
        assert!(pick_theme(&[hit("long", Some(7200.0))]).is_none());
        assert!(pick_theme(&[]).is_none());
    }

    #[test]
    fn test_pick_theme_only_first_ten() {
        let mut results: Vec<_> = (0..10).map(|i| hit(&i.to_string(), Some(4000.0))).collect();
        results.push(hit("eleventh", Some(30.0)));
        assert!(pick_theme(&results).is_none());
    }

    #[test]
    fn test_video_url() {
        assert_eq!(video_url("abc123"), "https://www.youtube.com/watch?v=abc123");
        assert_eq!(
            video_url("www.youtube.com/watch?v=abc123"),
            "https://www.youtube.com/watch?v=abc123"
        );
        assert_eq!(
            video_url("https://youtu.be/abc123"),
            "https://youtu.be/abc123"
        );
    }

    #[test]
    fn test_parse_search_output() {
        let stdout = concat!(
            r#"{"id": "a", "title": "Alien theme", "duration": 185.0}"#,
            "\n",
            "garbage\n",
            "\n",
            r#"{"id": "b", "duration": null}"#,
            "\n"
        );
        let results = parse_search_output(stdout);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title.as_deref(), Some("Alien theme"));
        assert_eq!(results[1].duration, None);
    }
}
