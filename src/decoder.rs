use chardetng::EncodingDetector;
use encoding_rs::{UTF_16BE, UTF_16LE};
use log::debug;

use crate::encoding_tables;

// @module: Encoding salvage — BOM dispatch, statistical detection and
// mojibake repair for subtitle byte streams

/// Detector sample size for the no-BOM path
const DETECTOR_SAMPLE_BYTES: usize = 1024;

/// Double-encoding pair count above which a string is treated as mojibake
const DOUBLE_ENCODING_SUSPECT_THRESHOLD: usize = 10;

/// A repair is accepted when it leaves at most this share of the pattern count
const REPAIR_RESIDUAL_RATIO: f64 = 0.20;

/// High-byte character share above which raw legacy text is suspected
const LEGACY_DENSITY_THRESHOLD: f64 = 0.10;

/// Minimum high-byte character count for the legacy suspicion
const LEGACY_MIN_CHARS: usize = 50;

/// A legacy repair must shrink high-byte density to this share of its prior value
const LEGACY_DENSITY_REDUCTION: f64 = 0.30;

/// Script coverage at which a repair candidate is accepted outright
const SCRIPT_COVERAGE_ACCEPT: f64 = 0.15;

/// Where an encoding decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOrigin {
    /// A byte-order mark settled it
    Bom,
    /// The statistical detector chose it
    Statistical,
    /// A language-prioritized repair codepage matched
    LanguagePriority,
    /// A global-fallback repair codepage matched
    Fallback,
}

/// The encoding a buffer was ultimately decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingGuess {
    /// Canonical encoding name
    pub name: &'static str,
    /// How the decision was reached
    pub origin: GuessOrigin,
}

/// A decoded subtitle text with the encoding decision that produced it
#[derive(Debug, Clone)]
pub struct Decoded {
    /// The repaired text
    pub text: String,
    /// The winning encoding
    pub guess: EncodingGuess,
}

/// What kind of mojibake the suspicion stage found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MojibakeKind {
    /// UTF-8 bytes were themselves re-encoded as UTF-8 via Latin-1
    DoubleEncoded,
    /// A legacy codepage was decoded as if it were Unicode
    RawLegacy,
}

/// UTF-8 lead byte classes tracked separately during pattern counting,
/// as inclusive byte ranges with one counting slot each
const LEAD_CLASSES: &[(u8, u8)] = &[
    (0xC2, 0xC2), // Latin special
    (0xC3, 0xC3), // Latin accented
    (0xC4, 0xC5), // extended Latin
    (0xC6, 0xCB), // IPA and modifiers
    (0xCC, 0xCF), // Greek
    (0xD0, 0xD4), // Cyrillic
    (0xD5, 0xD6), // Armenian
    (0xD7, 0xD7), // Hebrew
    (0xD8, 0xDB), // Arabic
    (0xDC, 0xDF), // Syriac, Thaana, NKo
    (0xE0, 0xEF), // 3-byte scripts (Thai, CJK)
];

/// Decode a raw subtitle buffer into text, undoing BOM damage, legacy
/// codepages and double-encoded UTF forms.
///
/// `language_hint` is a 2-letter ISO 639-1 code used to prioritize repair
/// codepages and to enable the script-coverage acceptance rule. Decoding is
/// total and pure: identical inputs always produce identical outputs, and no
/// error is raised here — a hopeless buffer comes back as-is and is caught
/// by the replacement-character gate downstream.
pub fn decode_subtitle(bytes: &[u8], language_hint: Option<&str>) -> Decoded {
    let (text, guess) = match bom_dispatch(bytes) {
        Some(decoded) => decoded,
        None => statistical_decode(bytes),
    };

    let (text, guess) = match detect_mojibake(&text, &guess) {
        Some(kind) => match attempt_repair(&text, language_hint, kind) {
            Some((repaired, repair_guess)) => {
                debug!(
                    "mojibake repaired with {} ({:?})",
                    repair_guess.name, repair_guess.origin
                );
                (repaired, repair_guess)
            }
            None => {
                debug!("mojibake suspected ({kind:?}) but no repair candidate accepted");
                (text, guess)
            }
        },
        None => (text, guess),
    };

    Decoded {
        text: strip_bom_remnants(text),
        guess,
    }
}

/// Whether decoded text still carries the replacement character.
///
/// This is the final check behind the decode-rejection error: decoding never
/// fails by itself, the caller decides with this gate.
pub fn has_replacement_characters(text: &str) -> bool {
    text.contains('\u{FFFD}')
}

/// Test the buffer head against the fixed BOM precedence order
fn bom_dispatch(bytes: &[u8]) -> Option<(String, EncodingGuess)> {
    let bom = |name| EncodingGuess {
        name,
        origin: GuessOrigin::Bom,
    };

    // Double-encoded UTF-16 LE BOM: FF FE re-read as Latin-1 and re-written
    // as UTF-8 becomes C3 BF C3 BE
    if bytes.starts_with(&[0xC3, 0xBF, 0xC3, 0xBE]) {
        let unwrapped = latin1_bytes(&String::from_utf8_lossy(bytes));
        let (text, _) = UTF_16LE.decode_without_bom_handling(&unwrapped[2..]);
        return Some((text.into_owned(), bom("utf16le")));
    }

    if bytes.starts_with(&[0xFF, 0xFE]) {
        let (text, _) = UTF_16LE.decode_without_bom_handling(&bytes[2..]);
        return Some((text.into_owned(), bom("utf16le")));
    }

    // Double-encoded UTF-16 BE BOM
    if bytes.starts_with(&[0xC3, 0xBE, 0xC3, 0xBF]) {
        let unwrapped = latin1_bytes(&String::from_utf8_lossy(bytes));
        let (text, _) = UTF_16BE.decode_without_bom_handling(&unwrapped[2..]);
        return Some((text.into_owned(), bom("utf16be")));
    }

    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (text, _) = UTF_16BE.decode_without_bom_handling(&bytes[2..]);
        return Some((text.into_owned(), bom("utf16be")));
    }

    // Double-encoded UTF-8 BOM: EF BB BF wrapped once more
    if bytes.starts_with(&[0xC3, 0xAF, 0xC2, 0xBB, 0xC2, 0xBF]) {
        return Some((
            String::from_utf8_lossy(&bytes[6..]).into_owned(),
            bom("utf8"),
        ));
    }

    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some((
            String::from_utf8_lossy(&bytes[3..]).into_owned(),
            bom("utf8"),
        ));
    }

    None
}

/// No-BOM path: byte-frequency detection over the buffer head
fn statistical_decode(bytes: &[u8]) -> (String, EncodingGuess) {
    if bytes.is_empty() {
        return (
            String::new(),
            EncodingGuess {
                name: "utf8",
                origin: GuessOrigin::Statistical,
            },
        );
    }

    let sample_len = bytes.len().min(DETECTOR_SAMPLE_BYTES);
    let mut detector = EncodingDetector::new();
    detector.feed(&bytes[..sample_len], sample_len == bytes.len());
    let detected = detector.guess(None, true);

    let canonical = encoding_tables::canonical_label(detected.name());
    if let Some(&name) = encoding_tables::SUPPORTED_ENCODINGS
        .iter()
        .find(|supported| **supported == canonical)
    {
        if let Some(encoding) = encoding_tables::encoding_for(name) {
            debug!("detector chose {} over {} sample bytes", name, sample_len);
            let (text, _, _) = encoding.decode(bytes);
            return (
                text.into_owned(),
                EncodingGuess {
                    name,
                    origin: GuessOrigin::Statistical,
                },
            );
        }
    }

    debug!(
        "detector label {:?} unsupported, decoding as UTF-8",
        detected.name()
    );
    (
        String::from_utf8_lossy(bytes).into_owned(),
        EncodingGuess {
            name: "utf8",
            origin: GuessOrigin::Statistical,
        },
    )
}

/// Map a string back to the Latin-1 byte sequence it was presumably decoded
/// from, taking the low byte of each scalar value
fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars().map(|ch| (ch as u32 & 0xFF) as u8).collect()
}

/// Count lead-plus-continuation pairs in the Latin-1 view, one slot per
/// tracked lead class, and return the sum
fn double_encoding_pattern_count(text: &str) -> usize {
    let view = latin1_bytes(text);
    let mut counts = [0usize; LEAD_CLASSES.len()];

    for pair in view.windows(2) {
        let (lead, follow) = (pair[0], pair[1]);
        if !(0x80..=0xBF).contains(&follow) {
            continue;
        }
        if let Some(slot) = LEAD_CLASSES
            .iter()
            .position(|&(lo, hi)| lead >= lo && lead <= hi)
        {
            counts[slot] += 1;
        }
    }

    counts.iter().sum()
}

/// Share of characters in U+0080..U+00FF, with the absolute count
fn high_byte_density(text: &str) -> (f64, usize) {
    let mut total = 0usize;
    let mut high = 0usize;
    for ch in text.chars() {
        total += 1;
        if ('\u{80}'..='\u{FF}').contains(&ch) {
            high += 1;
        }
    }
    let density = if total == 0 {
        0.0
    } else {
        high as f64 / total as f64
    };
    (density, high)
}

/// Encodings whose decoded text maps back to the original bytes through the
/// Latin-1 view. The double-encoding heuristic is only sound for these:
/// correctly decoded Greek, for one, lands its lowercase letters on the very
/// lead and continuation low bytes the counter looks for.
const LATIN1_COMPATIBLE: &[&str] = &["utf8", "win1252", "iso88591"];

/// Decide whether the decoded string still looks garbled, and how
fn detect_mojibake(text: &str, guess: &EncodingGuess) -> Option<MojibakeKind> {
    if LATIN1_COMPATIBLE.contains(&guess.name) {
        let pattern_total = double_encoding_pattern_count(text);
        if pattern_total > DOUBLE_ENCODING_SUSPECT_THRESHOLD {
            return Some(MojibakeKind::DoubleEncoded);
        }
    }

    let (density, high_count) = high_byte_density(text);
    if density > LEGACY_DENSITY_THRESHOLD && high_count > LEGACY_MIN_CHARS {
        return Some(MojibakeKind::RawLegacy);
    }

    None
}

/// Re-interpret the suspect string as Latin-1 bytes and try decoders until
/// one passes the acceptance rule for the suspected mojibake kind
fn attempt_repair(
    text: &str,
    language_hint: Option<&str>,
    kind: MojibakeKind,
) -> Option<(String, EncodingGuess)> {
    let raw = latin1_bytes(text);
    let pattern_before = double_encoding_pattern_count(text);
    let (density_before, _) = high_byte_density(text);

    let pattern_rule = |candidate: &str| -> bool {
        double_encoding_pattern_count(candidate) as f64
            <= pattern_before as f64 * REPAIR_RESIDUAL_RATIO
    };
    let accepts = |candidate: &str| -> bool {
        match kind {
            MojibakeKind::DoubleEncoded => pattern_rule(candidate),
            MojibakeKind::RawLegacy => {
                high_byte_density(candidate).0 <= density_before * LEGACY_DENSITY_REDUCTION
            }
        }
    };

    // UTF-8 first: strict, so a single invalid sequence disqualifies it.
    // Acceptance here is always the pattern-count rule, whichever kind of
    // mojibake raised the suspicion.
    if let Ok(candidate) = String::from_utf8(raw.clone()) {
        if pattern_rule(&candidate) {
            return Some((
                candidate,
                EncodingGuess {
                    name: "utf8",
                    origin: GuessOrigin::Fallback,
                },
            ));
        }
    }

    let script = language_hint.and_then(encoding_tables::script_blocks);
    let prioritized = encoding_tables::repair_candidates(language_hint);
    let hint_list_len = language_hint
        .and_then(encoding_tables::language_priorities)
        .map_or(0, <[&str]>::len);

    for (index, &name) in prioritized.iter().enumerate() {
        let Some(encoding) = encoding_tables::encoding_for(name) else {
            continue;
        };
        let (candidate, _, had_errors) = encoding.decode(&raw);
        if had_errors || candidate.contains('\u{FFFD}') {
            continue;
        }

        let origin = if index < hint_list_len {
            GuessOrigin::LanguagePriority
        } else {
            GuessOrigin::Fallback
        };

        // A hint with a known script wins outright on coverage
        if let Some(blocks) = script {
            if encoding_tables::script_coverage(&candidate, blocks) >= SCRIPT_COVERAGE_ACCEPT {
                return Some((candidate.into_owned(), EncodingGuess { name, origin }));
            }
        }

        if accepts(&candidate) {
            return Some((candidate.into_owned(), EncodingGuess { name, origin }));
        }
    }

    None
}

/// Strip a leading U+FEFF and the literal mojibake rendering of a UTF-8 BOM
fn strip_bom_remnants(text: String) -> String {
    let stripped = text
        .strip_prefix('\u{FEFF}')
        .map(str::to_owned)
        .unwrap_or(text);
    stripped
        .strip_prefix("\u{EF}\u{BB}\u{BF}")
        .map(str::to_owned)
        .unwrap_or(stripped)
}
