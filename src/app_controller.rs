use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::app_config::Config;
use crate::catalogs::fallback::FallbackCatalog;
use crate::catalogs::japanese::JapaneseCatalog;
use crate::catalogs::primary::PrimaryCatalog;
use crate::catalogs::{Catalog, ContentId, SubtitleCandidate};
use crate::decoder;
use crate::errors::{CandidateError, PipelineError};
use crate::fetch;
use crate::file_utils::{self, FileManager};
use crate::lang_verifier::{self, Verdict};
use crate::language_utils;
use crate::merger;
use crate::subtitle_processor::SubtitleTrack;

/// How many translation candidates are downloaded concurrently
const TRANSLATION_FETCH_CONCURRENCY: usize = 4;

/// Cache TTL for an empty response
const EMPTY_CACHE_MAX_AGE_SECS: u64 = 60;

/// Cache TTL for a successful response
const SUCCESS_CACHE_MAX_AGE_SECS: u64 = 6 * 60 * 60;

/// Stale-while-revalidate window for a successful response
const SUCCESS_STALE_REVALIDATE_SECS: u64 = 24 * 60 * 60;

/// One finished dual-language SRT file
#[derive(Debug, Clone)]
pub struct SubtitleArtifact {
    /// File name the artifact is stored under
    pub file_name: String,

    /// Language pair label, `main+translation`
    pub lang_pair: String,

    /// Complete SRT text, UTF-8
    pub content: String,
}

/// The listing document handed back to the addon host
#[derive(Debug, Serialize)]
pub struct SubtitlesResponse {
    /// Available dual-language subtitles
    pub subtitles: Vec<SubtitleRef>,

    /// Cache TTL in seconds
    #[serde(rename = "cacheMaxAge")]
    pub cache_max_age: u64,

    /// Stale-while-revalidate window in seconds
    #[serde(rename = "staleRevalidate")]
    pub stale_revalidate: u64,
}

/// One entry in the listing document
#[derive(Debug, Serialize)]
pub struct SubtitleRef {
    /// Stable artifact identifier
    pub id: String,

    /// Where the artifact is served from
    pub url: String,

    /// Language pair label
    pub lang: String,
}

/// Application controller module
/// coordinating catalog lookups, the decode/verify/parse pipeline,
/// merging and artifact output.
/// Main controller for the application
pub struct Controller {
    /// Application configuration
    config: Config,

    /// Shared HTTP client for subtitle downloads
    client: Client,

    /// Primary catalog adapter
    primary: Arc<dyn Catalog>,

    /// Fallback catalog adapter
    fallback: Arc<dyn Catalog>,

    /// Specialist catalog adapter for Japanese, when configured
    japanese: Option<Arc<dyn Catalog>>,
}

impl Controller {
    /// Create a new Controller with the specified configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("dualsub/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let primary: Arc<dyn Catalog> = Arc::new(PrimaryCatalog::new(
            client.clone(),
            config.catalogs.primary_endpoint.clone(),
        ));
        let fallback: Arc<dyn Catalog> = Arc::new(FallbackCatalog::new(
            client.clone(),
            config.catalogs.fallback_endpoint.clone(),
            config.catalogs.fallback_landing_url.clone(),
        ));
        let japanese: Option<Arc<dyn Catalog>> = config
            .catalogs
            .japanese_endpoint
            .as_ref()
            .map(|endpoint| {
                Arc::new(JapaneseCatalog::new(client.clone(), endpoint.clone())) as Arc<dyn Catalog>
            });

        Ok(Controller {
            config,
            client,
            primary,
            fallback,
            japanese,
        })
    }

    /// Create a Controller with injected catalog adapters
    pub fn with_catalogs(
        config: Config,
        primary: Arc<dyn Catalog>,
        fallback: Arc<dyn Catalog>,
        japanese: Option<Arc<dyn Catalog>>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("dualsub/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Controller {
            config,
            client,
            primary,
            fallback,
            japanese,
        })
    }

    /// Run the full request for a content id and store the artifacts.
    ///
    /// Pipeline failures surface as an empty listing with a short cache TTL,
    /// mirroring what the addon host expects; only storage problems are hard
    /// errors here.
    pub async fn run(&self, content_id: &str, output_dir: Option<PathBuf>) -> Result<()> {
        let start_time = Instant::now();

        // Validate configuration
        self.config.validate()?;

        let content: ContentId = content_id
            .parse()
            .with_context(|| format!("Invalid content id: {content_id}"))?;

        let artifacts = match self.build_dual_subtitles(&content).await {
            Ok(artifacts) => artifacts,
            Err(e) => {
                warn!("Request for {content} produced no subtitles: {e}");
                Vec::new()
            }
        };

        let store = file_utils::store_for(&self.config.output, output_dir.as_deref());

        if !artifacts.is_empty() {
            let progress = ProgressBar::new(artifacts.len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let mut last_path = None;
            for artifact in &artifacts {
                progress.set_message(artifact.file_name.clone());
                last_path = Some(store.store(&artifact.file_name, &artifact.content)?);
                progress.inc(1);
            }
            progress.finish_and_clear();

            if let Some(path) = last_path.as_ref().and_then(|p| p.parent()) {
                info!(
                    "Wrote {} artifact(s) to {} in {:.1}s",
                    artifacts.len(),
                    path.display(),
                    start_time.elapsed().as_secs_f64()
                );
            }
        }

        let response = self.build_response(&content, &artifacts);
        println!("{}", serde_json::to_string_pretty(&response)?);

        Ok(())
    }

    /// Produce up to `max_translation_candidates` merged dual-language
    /// subtitles for the content
    pub async fn build_dual_subtitles(
        &self,
        content: &ContentId,
    ) -> Result<Vec<SubtitleArtifact>, PipelineError> {
        let main_tag = self.config.main_language.clone();
        let trans_tag = self.config.translation_language.clone();

        if language_utils::is_skippable(&main_tag) {
            return Err(PipelineError::SkippedLanguage(main_tag));
        }
        if language_utils::is_skippable(&trans_tag) {
            return Err(PipelineError::SkippedLanguage(trans_tag));
        }

        let main_part1 = language_utils::normalize_to_part1(&main_tag)
            .map_err(|_| PipelineError::SkippedLanguage(main_tag.clone()))?;
        let trans_part1 = language_utils::normalize_to_part1(&trans_tag)
            .map_err(|_| PipelineError::SkippedLanguage(trans_tag.clone()))?;

        if main_part1 == trans_part1 {
            return Err(PipelineError::SameLanguage(main_part1));
        }

        let listing = self.fetch_listing(content, &main_part1, &trans_part1).await?;
        info!(
            "{} candidate(s) listed for {} ({}+{})",
            listing.len(),
            content,
            main_tag,
            trans_tag
        );

        let main_candidates: Vec<SubtitleCandidate> = listing
            .iter()
            .filter(|c| language_utils::language_codes_match(&c.lang, &main_part1))
            .filter(|c| has_valid_url(c))
            .cloned()
            .collect();
        let trans_candidates = distinct_candidates(
            &listing,
            &trans_part1,
            self.config.max_translation_candidates,
        );

        // The two language legs run concurrently; merging waits for both
        let (main_track, trans_tracks) = tokio::join!(
            self.select_main(&main_candidates, &main_part1),
            self.prepare_translations(&trans_candidates, &trans_part1),
        );
        let main_track = main_track?;

        let lang_pair = format!("{main_tag}+{trans_tag}");
        let mut artifacts = Vec::new();

        for (track, candidate) in trans_tracks {
            let result = merger::merge(
                &main_track.entries,
                &track.entries,
                self.config.merge_threshold_ms,
            );
            if result.entries.is_empty() || result.matched == 0 {
                debug!(
                    "translation candidate {} skipped: {}",
                    candidate.id,
                    CandidateError::EmptyMerge
                );
                continue;
            }

            let merged = SubtitleTrack {
                entries: result.entries,
                language: lang_pair.clone(),
            };
            let file_name = FileManager::artifact_file_name(
                content,
                &main_tag,
                &trans_tag,
                artifacts.len() + 1,
            );

            artifacts.push(SubtitleArtifact {
                file_name,
                lang_pair: lang_pair.clone(),
                content: merged.to_srt_string(),
            });
        }

        info!("{} artifact(s) produced for {}", artifacts.len(), content);
        Ok(artifacts)
    }

    /// Build the host-facing listing document with the cache policy applied
    pub fn build_response(
        &self,
        content: &ContentId,
        artifacts: &[SubtitleArtifact],
    ) -> SubtitlesResponse {
        if artifacts.is_empty() {
            return SubtitlesResponse {
                subtitles: Vec::new(),
                cache_max_age: EMPTY_CACHE_MAX_AGE_SECS,
                stale_revalidate: EMPTY_CACHE_MAX_AGE_SECS,
            };
        }

        let base_url = self.config.output.base_url.trim_end_matches('/');
        let subtitles = artifacts
            .iter()
            .map(|artifact| SubtitleRef {
                id: format!("{}-{}", content.file_stem(), artifact.lang_pair),
                url: format!("{}/{}", base_url, artifact.file_name),
                lang: artifact.lang_pair.clone(),
            })
            .collect();

        SubtitlesResponse {
            subtitles,
            cache_max_age: SUCCESS_CACHE_MAX_AGE_SECS,
            stale_revalidate: SUCCESS_STALE_REVALIDATE_SECS,
        }
    }

    /// Query the catalogs for everything available, applying the fallback
    /// and specialist rules
    async fn fetch_listing(
        &self,
        content: &ContentId,
        main_part1: &str,
        trans_part1: &str,
    ) -> Result<Vec<SubtitleCandidate>, PipelineError> {
        let has_either = |entries: &[SubtitleCandidate]| {
            entries.iter().any(|c| {
                language_utils::language_codes_match(&c.lang, main_part1)
                    || language_utils::language_codes_match(&c.lang, trans_part1)
            })
        };

        let mut any_catalog_ok = false;
        let mut listing: Vec<SubtitleCandidate> = Vec::new();

        match self.primary.list(content).await {
            Ok(entries) => {
                any_catalog_ok = true;
                if has_either(&entries) {
                    listing = entries;
                } else {
                    debug!("primary catalog has neither requested language, trying fallback");
                    match self.fallback.list(content).await {
                        Ok(entries) => listing = entries,
                        Err(e) => warn!("fallback catalog failed: {e}"),
                    }
                }
            }
            Err(e) => {
                warn!("primary catalog failed: {e}");
                match self.fallback.list(content).await {
                    Ok(entries) => {
                        any_catalog_ok = true;
                        listing = entries;
                    }
                    Err(e) => warn!("fallback catalog failed: {e}"),
                }
            }
        }

        // Japanese requests additionally consult the specialist catalog;
        // its entries merge into the listing by language field
        if main_part1 == "ja" || trans_part1 == "ja" {
            if let Some(japanese) = &self.japanese {
                match japanese.list(content).await {
                    Ok(mut extra) => {
                        any_catalog_ok = true;
                        listing.append(&mut extra);
                    }
                    Err(e) => warn!("specialist catalog failed: {e}"),
                }
            }
        }

        if any_catalog_ok {
            Ok(listing)
        } else {
            Err(PipelineError::UpstreamUnavailable)
        }
    }

    /// Walk main-language candidates in catalog rank order and return the
    /// first one that survives decode, verification and parsing
    async fn select_main(
        &self,
        candidates: &[SubtitleCandidate],
        expected: &str,
    ) -> Result<SubtitleTrack, PipelineError> {
        for candidate in candidates {
            match self.process_candidate(candidate, expected, true).await {
                Ok(track) => {
                    info!(
                        "selected main subtitle {} ({} cues)",
                        candidate.id,
                        track.len()
                    );
                    return Ok(track);
                }
                Err(e) => debug!("main candidate {} rejected: {e}", candidate.id),
            }
        }

        Err(PipelineError::NoMainCandidate(expected.to_string()))
    }

    /// Fetch and parse the translation candidates, keeping catalog order and
    /// silently dropping failures
    async fn prepare_translations(
        &self,
        candidates: &[SubtitleCandidate],
        expected: &str,
    ) -> Vec<(SubtitleTrack, SubtitleCandidate)> {
        stream::iter(candidates.iter().cloned())
            .map(|candidate| async move {
                match self.process_candidate(&candidate, expected, true).await {
                    Ok(track) => Some((track, candidate)),
                    Err(e) => {
                        debug!("translation candidate {} rejected: {e}", candidate.id);
                        None
                    }
                }
            })
            .buffered(TRANSLATION_FETCH_CONCURRENCY)
            .filter_map(|processed| async move { processed })
            .collect()
            .await
    }

    /// Run one candidate through fetch, decode, verification and parsing
    async fn process_candidate(
        &self,
        candidate: &SubtitleCandidate,
        expected: &str,
        verify: bool,
    ) -> Result<SubtitleTrack, CandidateError> {
        let bytes = fetch::fetch_subtitle_bytes(&self.client, &candidate.url).await?;
        let decoded = decoder::decode_subtitle(&bytes, Some(expected));
        debug!(
            "decoded candidate {} as {} ({:?})",
            candidate.id, decoded.guess.name, decoded.guess.origin
        );

        if decoder::has_replacement_characters(&decoded.text) {
            return Err(CandidateError::DecodeReplacementChars);
        }

        if verify {
            let verdict = lang_verifier::verify(&decoded.text, expected);
            match &verdict {
                Verdict::RelatedMatch { detected } => debug!(
                    "candidate {} detected as {detected}, accepted as relative of {expected}",
                    candidate.id
                ),
                Verdict::Reject { .. } => {
                    return Err(CandidateError::LangMismatch {
                        expected: expected.to_string(),
                        detected: verdict.detected().unwrap_or("unknown").to_string(),
                    });
                }
                Verdict::Match => {}
            }
        }

        let track = SubtitleTrack::from_srt_text(&decoded.text, candidate.lang.clone())?;
        Ok(track)
    }
}

/// Translation candidates: first seen URL wins, catalog order preserved
fn distinct_candidates(
    listing: &[SubtitleCandidate],
    expected: &str,
    limit: usize,
) -> Vec<SubtitleCandidate> {
    let mut seen_urls = HashSet::new();
    listing
        .iter()
        .filter(|c| language_utils::language_codes_match(&c.lang, expected))
        .filter(|c| has_valid_url(c))
        .filter(|c| seen_urls.insert(c.url.clone()))
        .take(limit)
        .cloned()
        .collect()
}

/// Catalog data is untrusted; a candidate with an unparseable download link
/// can never be fetched
fn has_valid_url(candidate: &SubtitleCandidate) -> bool {
    match Url::parse(&candidate.url) {
        Ok(_) => true,
        Err(e) => {
            debug!("candidate {} has invalid url: {e}", candidate.id);
            false
        }
    }
}
