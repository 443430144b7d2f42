//! Matching external titles against the library.

use tracing::info;

use crate::error::ClientError;
use crate::models::ItemQuery;
use crate::traits::MediaClient;

/// Number of search hits requested per title. Only the first is used.
const MATCH_SEARCH_LIMIT: u32 = 20;

/// A title from an external list (e.g. a TMDb list) to look up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogCandidate {
    pub title: String,
    /// 0 means any year.
    pub year: i32,
    /// 0 means unknown.
    pub tmdb_id: u64,
    /// Library id, set once matched.
    pub matched_id: Option<String>,
}

impl CatalogCandidate {
    pub fn new(title: impl Into<String>, year: i32, tmdb_id: u64) -> Self {
        Self {
            title: title.into(),
            year,
            tmdb_id,
            matched_id: None,
        }
    }
}

/// Look `candidate` up by title and set its `matched_id` on success.
///
/// Only the first hit is considered. If it carries a TMDb id, that id must
/// equal the candidate's (when the candidate has one). Otherwise the
/// production year must match (when the candidate has one).
pub async fn match_item(
    client: &dyn MediaClient,
    candidate: &mut CatalogCandidate,
) -> Result<bool, ClientError> {
    let query = ItemQuery::new()
        .with_search_term(candidate.title.clone())
        .recursive()
        .with_exclude_types(&["Episode"])
        .with_fields(&["ProviderIds"])
        .with_limit(MATCH_SEARCH_LIMIT)
        .lean();
    let items = client.search_items(&query).await?;
    let Some(hit) = items.first() else {
        return Ok(false);
    };

    match hit.tmdb_id() {
        Some(tmdb) => {
            if candidate.tmdb_id != 0 && tmdb != candidate.tmdb_id.to_string() {
                return Ok(false);
            }
        }
        None => {
            if candidate.year != 0 && hit.production_year != Some(candidate.year) {
                return Ok(false);
            }
        }
    }

    candidate.matched_id = Some(hit.id.clone());
    Ok(true)
}

/// Keep only the candidates found in the library, each with its
/// `matched_id` set.
pub async fn match_candidates(
    client: &dyn MediaClient,
    candidates: Vec<CatalogCandidate>,
) -> Result<Vec<CatalogCandidate>, ClientError> {
    let mut matched = Vec::with_capacity(candidates.len());
    for mut candidate in candidates {
        if match_item(client, &mut candidate).await? {
            info!("matched: {}", candidate.title);
            matched.push(candidate);
        } else {
            info!("removing: {}", candidate.title);
        }
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockBackend, MockMediaClient};
    use crate::models::Item;
    use std::collections::HashMap;

    fn item(id: &str, name: &str, year: i32, tmdb: Option<&str>) -> Item {
        let mut provider_ids = HashMap::new();
        if let Some(tmdb) = tmdb {
            provider_ids.insert("Tmdb".to_string(), tmdb.to_string());
        }
        Item {
            id: id.to_string(),
            name: name.to_string(),
            item_type: Some("Movie".to_string()),
            production_year: Some(year),
            provider_ids,
            ..Default::default()
        }
    }

    async fn client_with(items: Vec<Item>) -> MockMediaClient {
        let backend = MockBackend::new();
        backend.add_user("alice", "secret");
        for item in items {
            backend.add_item(item);
        }
        let client = MockMediaClient::new(backend);
        client.login("http://x", "alice", "secret").await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_match_by_tmdb_id() {
        let client = client_with(vec![item("m1", "Alien", 1979, Some("348"))]).await;

        let mut hit = CatalogCandidate::new("Alien", 1979, 348);
        assert!(match_item(&client, &mut hit).await.unwrap());
        assert_eq!(hit.matched_id.as_deref(), Some("m1"));

        let mut wrong = CatalogCandidate::new("Alien", 1979, 999);
        assert!(!match_item(&client, &mut wrong).await.unwrap());
        assert!(wrong.matched_id.is_none());

        // Unknown candidate id accepts any TMDb id
        let mut any = CatalogCandidate::new("Alien", 0, 0);
        assert!(match_item(&client, &mut any).await.unwrap());
    }

    #[tokio::test]
    async fn test_match_by_year_without_tmdb() {
        let client = client_with(vec![item("m1", "Heat", 1995, None)]).await;

        let mut hit = CatalogCandidate::new("Heat", 1995, 949);
        assert!(match_item(&client, &mut hit).await.unwrap());

        let mut wrong_year = CatalogCandidate::new("Heat", 1986, 949);
        assert!(!match_item(&client, &mut wrong_year).await.unwrap());

        let mut any_year = CatalogCandidate::new("Heat", 0, 949);
        assert!(match_item(&client, &mut any_year).await.unwrap());
    }

    #[tokio::test]
    async fn test_match_candidates_filters() {
        let client = client_with(vec![
            item("m1", "Alien", 1979, Some("348")),
            item("m2", "Heat", 1995, None),
        ])
        .await;

        let matched = match_candidates(
            &client,
            vec![
                CatalogCandidate::new("Alien", 1979, 348),
                CatalogCandidate::new("Missing", 2000, 1),
                CatalogCandidate::new("Heat", 1995, 949),
            ],
        )
        .await
        .unwrap();

        let ids: Vec<_> = matched
            .iter()
            .map(|c| c.matched_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["m1".to_string(), "m2".to_string()]);
    }
}
