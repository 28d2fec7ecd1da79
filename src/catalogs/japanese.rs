use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use super::{Catalog, ContentId, SubtitleCandidate, CATALOG_TIMEOUT};
use crate::errors::CatalogError;

/// Specialist catalog for Japanese subtitles.
///
/// Queried in addition to the regular catalogs whenever a request involves
/// Japanese; everything it serves is Japanese, so entries carry no language
/// field of their own.
#[derive(Debug)]
pub struct JapaneseCatalog {
    /// HTTP client for catalog requests
    client: Client,
    /// Base URL of the catalog service
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct JapaneseEntry {
    id: String,
    url: String,
}

impl JapaneseCatalog {
    /// Create a new specialist catalog client
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        JapaneseCatalog {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn search_url(&self, content: &ContentId) -> String {
        match (content.season, content.episode) {
            (Some(season), Some(episode)) => format!(
                "{}/search/{}?season={}&episode={}",
                self.endpoint, content.imdb_id, season, episode
            ),
            _ => format!("{}/search/{}", self.endpoint, content.imdb_id),
        }
    }
}

#[async_trait]
impl Catalog for JapaneseCatalog {
    fn name(&self) -> &'static str {
        "japanese"
    }

    async fn list(&self, content: &ContentId) -> Result<Vec<SubtitleCandidate>, CatalogError> {
        let url = self.search_url(content);
        debug!("querying specialist catalog: {url}");

        let response = self
            .client
            .get(&url)
            .timeout(CATALOG_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::BadStatus {
                status: status.as_u16(),
                message: format!("search request for {content}"),
            });
        }

        let entries: Vec<JapaneseEntry> = response
            .json()
            .await
            .map_err(|e| CatalogError::ResponseParse(e.to_string()))?;

        Ok(entries
            .into_iter()
            .map(|entry| SubtitleCandidate {
                id: entry.id,
                url: entry.url,
                lang: "jpn".to_string(),
            })
            .collect())
    }
}
