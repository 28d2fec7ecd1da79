use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{Catalog, ContentId, SubtitleCandidate, CATALOG_TIMEOUT};
use crate::errors::CatalogError;

/// Fallback catalog client: a legacy flat-array listing that requires a
/// session cookie obtained from a landing page.
///
/// The cookie is process-scoped state owned by this adapter alone; a 403 or
/// 404 triggers exactly one forced refresh and retry.
#[derive(Debug)]
pub struct FallbackCatalog {
    /// HTTP client for catalog requests
    client: Client,
    /// Base URL of the search API
    endpoint: String,
    /// Landing page that hands out the session cookie
    landing_url: String,
    /// Current session, refreshed on demand
    session: Mutex<SessionState>,
}

/// The adapter-owned session cookie
#[derive(Debug, Default)]
struct SessionState {
    cookie: Option<String>,
}

/// Wire shape of one fallback catalog entry
#[derive(Debug, Deserialize)]
struct FallbackEntry {
    #[serde(rename = "IDSubtitleFile")]
    id_subtitle_file: String,

    #[serde(rename = "SubDownloadLink")]
    sub_download_link: String,

    #[serde(rename = "SubFormat")]
    sub_format: String,

    #[serde(rename = "SubLanguageID")]
    sub_language_id: String,

    #[serde(rename = "SubDownloadsCnt")]
    sub_downloads_cnt: String,
}

impl FallbackCatalog {
    /// Create a new fallback catalog client
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        landing_url: impl Into<String>,
    ) -> Self {
        FallbackCatalog {
            client,
            endpoint: endpoint.into(),
            landing_url: landing_url.into(),
            session: Mutex::new(SessionState::default()),
        }
    }

    fn search_url(&self, content: &ContentId) -> String {
        let numeric_id = content.imdb_id.trim_start_matches("tt");
        match (content.season, content.episode) {
            (Some(season), Some(episode)) => format!(
                "{}/search/episode-{}/imdbid-{}/season-{}",
                self.endpoint, episode, numeric_id, season
            ),
            _ => format!("{}/search/imdbid-{}", self.endpoint, numeric_id),
        }
    }

    /// Return the current cookie, visiting the landing page when there is
    /// none yet or a refresh is forced
    async fn ensure_cookie(&self, force: bool) -> Result<String, CatalogError> {
        let mut session = self.session.lock().await;

        if !force {
            if let Some(cookie) = &session.cookie {
                return Ok(cookie.clone());
            }
        }

        debug!("fetching session cookie from landing page");
        let response = self
            .client
            .get(&self.landing_url)
            .timeout(CATALOG_TIMEOUT)
            .send()
            .await?;

        let cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .collect::<Vec<&str>>()
            .join("; ");

        if cookie.is_empty() {
            return Err(CatalogError::RequestFailed(
                "landing page returned no session cookie".to_string(),
            ));
        }

        session.cookie = Some(cookie.clone());
        Ok(cookie)
    }

    async fn search(
        &self,
        content: &ContentId,
        cookie: &str,
    ) -> Result<reqwest::Response, CatalogError> {
        let url = self.search_url(content);
        debug!("querying fallback catalog: {url}");

        Ok(self
            .client
            .get(&url)
            .header(header::COOKIE, cookie)
            .timeout(CATALOG_TIMEOUT)
            .send()
            .await?)
    }
}

#[async_trait]
impl Catalog for FallbackCatalog {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn list(&self, content: &ContentId) -> Result<Vec<SubtitleCandidate>, CatalogError> {
        let cookie = self.ensure_cookie(false).await?;
        let mut response = self.search(content, &cookie).await?;

        // An expired session shows up as 403 or 404; refresh the cookie once
        if matches!(response.status().as_u16(), 403 | 404) {
            warn!(
                "fallback catalog rejected the session ({}), refreshing cookie",
                response.status()
            );
            let cookie = self.ensure_cookie(true).await?;
            response = self.search(content, &cookie).await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::BadStatus {
                status: status.as_u16(),
                message: format!("search request for {content}"),
            });
        }

        let entries: Vec<FallbackEntry> = response
            .json()
            .await
            .map_err(|e| CatalogError::ResponseParse(e.to_string()))?;

        // Only SRT entries are usable; rank by download count like the
        // primary catalog does server-side
        let mut usable: Vec<FallbackEntry> = entries
            .into_iter()
            .filter(|entry| entry.sub_format.eq_ignore_ascii_case("srt"))
            .collect();
        usable.sort_by_key(|entry| {
            std::cmp::Reverse(entry.sub_downloads_cnt.parse::<u64>().unwrap_or(0))
        });

        Ok(usable
            .into_iter()
            .map(|entry| SubtitleCandidate {
                id: entry.id_subtitle_file,
                url: entry.sub_download_link,
                lang: entry.sub_language_id,
            })
            .collect())
    }
}
