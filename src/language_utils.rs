use std::collections::HashMap;

use anyhow::{anyhow, Result};
use isolang::Language;
use once_cell::sync::Lazy;

// @module: ISO language code utilities, related-language groups and the skip set

/// Language codes that can never take part in a merge.
///
/// "ze" is the catalog convention for pre-mixed bilingual subtitles; merging
/// on top of those would produce three languages per cue.
const SKIP_SET: &[&str] = &["ze"];

/// Macrolanguage and variant rollups from ISO 639-3 to ISO 639-1.
///
/// Trigram detectors report individual members (e.g. `cmn`) where catalogs
/// and users speak in macrolanguage terms (`zh`). isolang has no 639-1 code
/// for these members, so they are folded here before the generic lookup.
static MACRO_ROLLUPS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("cmn", "zh"),
        ("yue", "zh"),
        ("wuu", "zh"),
        ("arb", "ar"),
        ("arz", "ar"),
        ("khk", "mn"),
        ("pes", "fa"),
        ("prs", "fa"),
        ("zsm", "ms"),
        ("azj", "az"),
        ("als", "sq"),
        ("ekk", "et"),
        ("lvs", "lv"),
        ("nob", "nb"),
        ("nno", "nn"),
        ("uzn", "uz"),
        ("kmr", "ku"),
        ("swh", "sw"),
        ("plt", "mg"),
    ])
});

/// Mutual-intelligibility groups over ISO 639-1 codes.
///
/// A detected language in the group of the expected one (or the other way
/// round) is close enough to serve in a dual-subtitle pair. Entries are
/// directional, so asymmetric relations are representable.
static RELATED_LANGUAGES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        // South Slavic, Latin script
        ("hr", &["bs", "sr"] as &[&str]),
        ("bs", &["hr", "sr"]),
        ("sr", &["hr", "bs"]),
        // West Slavic
        ("cs", &["sk"]),
        ("sk", &["cs"]),
        // Scandinavian
        ("da", &["no", "nb", "nn", "sv"]),
        ("no", &["da", "nb", "nn", "sv"]),
        ("nb", &["no", "nn", "da", "sv"]),
        ("nn", &["no", "nb", "da", "sv"]),
        ("sv", &["da", "no", "nb"]),
        // Iberian Romance
        ("es", &["gl"]),
        ("gl", &["es", "pt"]),
        ("pt", &["gl"]),
        ("ca", &["es"]),
        // Malay and Indonesian
        ("ms", &["id"]),
        ("id", &["ms"]),
        // East Slavic
        ("ru", &["uk", "be"]),
        ("uk", &["ru", "be"]),
        ("be", &["ru", "uk"]),
    ])
});

/// Fold an ISO 639-2/B (bibliographic) code into its 639-2/T twin.
///
/// Catalogs are inconsistent about which of the two 3-letter variants they
/// serve, so both must resolve to the same language.
fn bibliographic_to_terminological(code: &str) -> &str {
    match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => code,
    }
}

/// Normalize a language code to ISO 639-1 (2-letter) format.
///
/// Accepts 2-letter codes, 3-letter 639-2/T and 639-2/B codes, and the
/// detector-emitted 639-3 members covered by the rollup table.
pub fn normalize_to_part1(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    // If it's already a 2-letter code, validate it
    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
    }
    // If it's a 3-letter code, fold variants and find the 2-letter code
    else if normalized_code.len() == 3 {
        if let Some(part1) = MACRO_ROLLUPS.get(normalized_code.as_str()) {
            return Ok((*part1).to_string());
        }

        let part2t = bibliographic_to_terminological(&normalized_code);
        if let Some(lang) = Language::from_639_3(part2t) {
            if let Some(code_639_1) = lang.to_639_1() {
                return Ok(code_639_1.to_string());
            }
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format.
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if let Some(part1) = MACRO_ROLLUPS.get(normalized_code.as_str()) {
            if let Some(lang) = Language::from_639_1(part1) {
                return Ok(lang.to_639_3().to_string());
            }
        }

        let part2t = bibliographic_to_terminological(&normalized_code);
        if Language::from_639_3(part2t).is_some() {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let normalized1 = match normalize_to_part2t(code1) {
        Ok(n) => n,
        Err(_) => return false,
    };

    let normalized2 = match normalize_to_part2t(code2) {
        Ok(n) => n,
        Err(_) => return false,
    };

    normalized1 == normalized2
}

/// Whether a language tag is excluded from merging outright
pub fn is_skippable(code: &str) -> bool {
    let normalized = code.trim().to_lowercase();
    SKIP_SET.contains(&normalized.as_str())
}

/// The related-language group for a 2-letter code, empty when it has none
pub fn related_languages(part1: &str) -> &'static [&'static str] {
    RELATED_LANGUAGES.get(part1).copied().unwrap_or(&[])
}

/// Whether two 2-letter codes are mutually intelligible in either direction
pub fn languages_are_related(expected: &str, detected: &str) -> bool {
    related_languages(expected).contains(&detected)
        || related_languages(detected).contains(&expected)
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
