/*!
 * # dualsub - dual-language subtitle delivery middleware
 *
 * A Rust library that fetches two monolingual subtitle files from upstream
 * catalogs and merges them into a single dual-language SRT file.
 *
 * ## Features
 *
 * - Encoding salvage: BOM dispatch, legacy codepage detection, mojibake repair
 * - Language verification with related-language acceptance
 * - Strict SRT parsing with promotional-insert scrubbing
 * - Time-based cue merging with an italic translation line
 * - Upstream catalog adapters with fallback and session handling
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `decoder`: Byte-stream decoding and mojibake repair
 * - `encoding_tables`: Static encoding and script tables
 * - `lang_verifier`: Post-decode language verification
 * - `language_utils`: ISO language code utilities
 * - `subtitle_processor`: SRT parsing, scrubbing and serialization
 * - `merger`: Time-based bilingual cue merging
 * - `fetch`: Gzip-aware subtitle downloads
 * - `catalogs`: Upstream catalog adapters:
 *   - `catalogs::primary`: ranked JSON catalog
 *   - `catalogs::fallback`: legacy catalog behind a session cookie
 *   - `catalogs::japanese`: specialist catalog for Japanese
 * - `app_controller`: Per-request orchestration
 * - `file_utils`: Artifact naming and storage
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod catalogs;
pub mod decoder;
pub mod encoding_tables;
pub mod errors;
pub mod fetch;
pub mod file_utils;
pub mod lang_verifier;
pub mod language_utils;
pub mod merger;
pub mod subtitle_processor;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, SubtitleArtifact, SubtitlesResponse};
pub use catalogs::{Catalog, ContentId, SubtitleCandidate};
pub use decoder::{decode_subtitle, Decoded, EncodingGuess};
pub use file_utils::{ArtifactStore, LocalDirStore};
pub use lang_verifier::{verify, Verdict};
pub use language_utils::{is_skippable, language_codes_match, normalize_to_part1};
pub use merger::{merge, MergeResult};
pub use subtitle_processor::{SubtitleEntry, SubtitleTrack};
