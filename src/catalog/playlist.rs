//! Playlist creation from matched candidates.

use tracing::{info, warn};

use crate::error::ClientError;
use crate::traits::MediaClient;

use super::matching::CatalogCandidate;

/// Create a playlist named `title` holding every matched candidate.
///
/// Unmatched candidates are ignored. Nothing is created when no candidate
/// is matched. Returns the playlist id reported by the server.
pub async fn sync_playlist(
    client: &dyn MediaClient,
    title: &str,
    candidates: &[CatalogCandidate],
) -> Result<Option<String>, ClientError> {
    let ids: Vec<String> = candidates
        .iter()
        .filter_map(|c| c.matched_id.clone())
        .collect();
    if ids.is_empty() {
        return Ok(None);
    }

    let id = client.create_playlist(title, &ids).await?;
    match id {
        Some(ref id) => info!("Created playlist {} ({} items)", id, ids.len()),
        None => warn!("Server did not report an id for playlist {}", title),
    }
    Ok(id)
}
