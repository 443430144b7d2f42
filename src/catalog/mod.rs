//! Library queries on top of an authenticated client.

pub mod matching;
pub mod playlist;

use tracing::debug;

use crate::error::ClientError;
use crate::models::{Item, ItemQuery};
use crate::traits::MediaClient;

pub use matching::{match_candidates, match_item, CatalogCandidate};
pub use playlist::sync_playlist;

/// Movies and series that have no theme song yet, movies first.
pub async fn medias_without_theme(client: &dyn MediaClient) -> Result<Vec<Item>, ClientError> {
    let mut output = Vec::new();
    for kind in ["Movie", "Series"] {
        let query = ItemQuery::new()
            .recursive()
            .with_has_theme_song(false)
            .with_include_types(&[kind]);
        let items = client.search_items(&query).await?;
        debug!("{} {} item(s) without a theme", items.len(), kind);
        output.extend(items);
    }
    Ok(output)
}
