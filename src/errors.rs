/*!
 * Error types for the dualsub pipeline.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while parsing SRT text into cues
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No cue blocks could be found at all
    #[error("no cue blocks found in subtitle text")]
    NoBlocks,

    /// The first non-empty line of a block was not a cue number
    #[error("block {block}: expected cue number, found {found:?}")]
    BadCueNumber {
        /// 1-based block index
        block: usize,
        /// The offending line
        found: String,
    },

    /// The timestamp line did not match `HH:MM:SS,mmm --> HH:MM:SS,mmm`
    #[error("block {block}: malformed timestamp line at column {column}: {reason}")]
    BadTimestamp {
        /// 1-based block index
        block: usize,
        /// 0-based byte column where scanning stopped
        column: usize,
        /// What the scanner expected
        reason: &'static str,
    },

    /// A block carried a cue number and timing but no text line
    #[error("block {block}: cue has number and timing but no text")]
    MissingText {
        /// 1-based block index
        block: usize,
    },
}

/// Errors that disqualify a single subtitle candidate.
///
/// These are recoverable: the controller skips to the next candidate.
#[derive(Error, Debug)]
pub enum CandidateError {
    /// Decoding left replacement characters in the text
    #[error("decoded text contains replacement characters")]
    DecodeReplacementChars,

    /// Detected language does not match the requested one
    #[error("language mismatch: expected {expected}, detected {detected}")]
    LangMismatch {
        /// The language the caller asked for
        expected: String,
        /// What the detector actually saw
        detected: String,
    },

    /// The text could not be parsed as SRT
    #[error("subtitle parse failure: {0}")]
    ParseFailure(#[from] ParseError),

    /// Merging produced no bilingual cues
    #[error("merge produced no bilingual cues")]
    EmptyMerge,

    /// The subtitle bytes could not be downloaded
    #[error("download failed: {0}")]
    Download(String),
}

/// Errors from an upstream catalog adapter
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Error when making the catalog request fails
    #[error("catalog request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the catalog itself
    #[error("catalog responded with {status}: {message}")]
    BadStatus {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Error when parsing the catalog response fails
    #[error("failed to parse catalog response: {0}")]
    ResponseParse(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            Self::BadStatus {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Request-level errors surfaced as an empty, short-cached response
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Every main-language candidate failed decode, verify or parse
    #[error("no usable subtitle found for main language {0}")]
    NoMainCandidate(String),

    /// Main and translation language are identical
    #[error("main and translation language are both {0}")]
    SameLanguage(String),

    /// One of the requested languages is in the skip set
    #[error("language {0} cannot be merged")]
    SkippedLanguage(String),

    /// All upstream catalogs failed
    #[error("all upstream catalogs unavailable")]
    UpstreamUnavailable,
}
