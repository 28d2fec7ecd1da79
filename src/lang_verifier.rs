use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::language_utils;

// @module: Post-decode language verification — corruption gate, sampling
// and trigram detection with related-language acceptance

/// Minimum text length worth verifying
const MIN_TEXT_CHARS: usize = 100;

/// Replacement-character share above which text counts as corrupt
const MAX_REPLACEMENT_RATIO: f64 = 0.01;

/// C0 control share (TAB, LF, CR excluded) above which text counts as corrupt
const MAX_CONTROL_RATIO: f64 = 0.01;

/// Longest prefix skipped to get past headers and credits
const SAMPLE_SKIP_CAP: usize = 2000;

/// Sample window length in characters
const SAMPLE_WINDOW: usize = 30_000;

static TIMESTAMP_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{2}:\d{2}:\d{2},\d{3}\s*-->\s*\d{2}:\d{2}:\d{2},\d{3}").unwrap()
});

static CUE_NUMBER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+\s*$").unwrap());

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Outcome of verifying decoded text against an expected language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Detected language equals the expected one
    Match,
    /// Detected a mutually intelligible relative of the expected language
    RelatedMatch {
        /// The 2-letter code that was actually detected
        detected: String,
    },
    /// Corrupt text or an unrelated language
    Reject {
        /// The detected code when detection got that far
        detected: Option<String>,
    },
}

impl Verdict {
    /// Both match kinds count as acceptance
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Match | Verdict::RelatedMatch { .. })
    }

    /// The detected code for error reporting, when one exists
    pub fn detected(&self) -> Option<&str> {
        match self {
            Verdict::Match => None,
            Verdict::RelatedMatch { detected } => Some(detected),
            Verdict::Reject { detected } => detected.as_deref(),
        }
    }
}

/// Verify that decoded subtitle text is in the expected language.
///
/// Runs the corruption gate first, then samples the body of the document and
/// feeds it to the trigram detector. A detected relative from the
/// mutual-intelligibility groups is accepted as `RelatedMatch`.
pub fn verify(text: &str, expected_tag: &str) -> Verdict {
    if let Some(reason) = corruption_reason(text) {
        debug!("language verification rejected corrupt text: {reason}");
        return Verdict::Reject { detected: None };
    }

    let expected = match language_utils::normalize_to_part1(expected_tag) {
        Ok(code) => code,
        Err(_) => {
            debug!("cannot normalize expected language tag {expected_tag:?}");
            return Verdict::Reject { detected: None };
        }
    };

    let sample = sample_body(text);
    let Some(info) = whatlang::detect(&sample) else {
        return Verdict::Reject { detected: None };
    };

    let raw_code = info.lang().code();
    let detected = match language_utils::normalize_to_part1(raw_code) {
        Ok(code) => code,
        Err(_) => {
            debug!("detector produced unmappable code {raw_code:?}");
            return Verdict::Reject {
                detected: Some(raw_code.to_string()),
            };
        }
    };

    if detected == expected {
        return Verdict::Match;
    }

    if language_utils::languages_are_related(&expected, &detected) {
        debug!("accepting {detected} as a relative of {expected}");
        return Verdict::RelatedMatch { detected };
    }

    Verdict::Reject {
        detected: Some(detected),
    }
}

/// First corruption-gate rule the text trips, if any
fn corruption_reason(text: &str) -> Option<&'static str> {
    let mut total = 0usize;
    let mut replacements = 0usize;
    let mut controls = 0usize;
    let mut seen_scripts = [false; 4]; // Hebrew, Arabic, Cyrillic, Thai

    for ch in text.chars() {
        total += 1;
        let cp = ch as u32;
        if ch == '\u{FFFD}' {
            replacements += 1;
        }
        if cp < 0x20 && !matches!(ch, '\t' | '\n' | '\r') {
            controls += 1;
        }
        if (0x0590..=0x05FF).contains(&cp) {
            seen_scripts[0] = true;
        } else if (0x0600..=0x06FF).contains(&cp) {
            seen_scripts[1] = true;
        } else if (0x0400..=0x04FF).contains(&cp) {
            seen_scripts[2] = true;
        } else if (0x0E00..=0x0E7F).contains(&cp) {
            seen_scripts[3] = true;
        }
    }

    if total < MIN_TEXT_CHARS {
        return Some("text too short");
    }
    if replacements as f64 / total as f64 > MAX_REPLACEMENT_RATIO {
        return Some("replacement character flood");
    }
    if controls as f64 / total as f64 > MAX_CONTROL_RATIO {
        return Some("control character flood");
    }

    let thai = seen_scripts[3];
    if thai && (seen_scripts[0] || seen_scripts[1] || seen_scripts[2]) {
        return Some("impossible script pair");
    }

    None
}

/// Cut a detector sample from the document body, free of SRT scaffolding
fn sample_body(text: &str) -> String {
    let total: usize = text.chars().count();
    let skip = SAMPLE_SKIP_CAP.min(total.saturating_sub(SAMPLE_WINDOW));
    let window: String = text.chars().skip(skip).take(SAMPLE_WINDOW).collect();

    let without_timestamps = TIMESTAMP_LINE.replace_all(&window, " ");
    let without_numbers = CUE_NUMBER_LINE.replace_all(&without_timestamps, " ");
    let without_tags = HTML_TAG.replace_all(&without_numbers, " ");
    WHITESPACE_RUN
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}
