use std::collections::HashMap;

use encoding_rs::Encoding;
use once_cell::sync::Lazy;

// @module: Static encoding tables — canonical names, per-language codepage
// priorities and script block ranges

/// Canonical encoding names understood by the decoder.
///
/// Detector output and catalog metadata use a zoo of spellings; everything is
/// folded into this closed set before lookup.
pub const SUPPORTED_ENCODINGS: &[&str] = &[
    "utf8", "utf16le", "utf16be", "win1250", "win1251", "win1252", "win1253", "win1254",
    "win1255", "win1256", "win1257", "win1258", "win874", "iso88591", "iso88592", "iso88593",
    "iso88594", "iso88595", "iso88596", "iso88597", "iso88598", "iso88599", "iso885910",
    "iso885911", "iso885913", "iso885915", "iso885916", "koi8r", "koi8u", "gbk", "gb2312",
    "big5", "shiftjis", "eucjp", "iso2022jp", "euckr", "cp949", "tis620",
];

/// WHATWG labels for the canonical names that encoding_rs resolves
static WHATWG_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("utf8", "utf-8"),
        ("utf16le", "utf-16le"),
        ("utf16be", "utf-16be"),
        ("win1250", "windows-1250"),
        ("win1251", "windows-1251"),
        ("win1252", "windows-1252"),
        ("win1253", "windows-1253"),
        ("win1254", "windows-1254"),
        ("win1255", "windows-1255"),
        ("win1256", "windows-1256"),
        ("win1257", "windows-1257"),
        ("win1258", "windows-1258"),
        ("win874", "windows-874"),
        ("iso88591", "windows-1252"),
        ("iso88592", "iso-8859-2"),
        ("iso88593", "iso-8859-3"),
        ("iso88594", "iso-8859-4"),
        ("iso88595", "iso-8859-5"),
        ("iso88596", "iso-8859-6"),
        ("iso88597", "iso-8859-7"),
        ("iso88598", "iso-8859-8"),
        ("iso88599", "windows-1254"),
        ("iso885910", "iso-8859-10"),
        // 8859-11 is Thai; WHATWG folds it into windows-874
        ("iso885911", "windows-874"),
        ("iso885913", "iso-8859-13"),
        ("iso885915", "iso-8859-15"),
        ("iso885916", "iso-8859-16"),
        ("koi8r", "koi8-r"),
        ("koi8u", "koi8-u"),
        ("gbk", "gbk"),
        ("gb2312", "gb2312"),
        ("big5", "big5"),
        ("shiftjis", "shift_jis"),
        ("eucjp", "euc-jp"),
        ("iso2022jp", "iso-2022-jp"),
        ("euckr", "euc-kr"),
        ("cp949", "euc-kr"),
        ("tis620", "windows-874"),
    ])
});

/// Preferred repair codepages per ISO 639-1 language code, most likely first
static LANGUAGE_ENCODING_PRIORITY: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        HashMap::from([
            ("ru", &["win1251", "iso88595", "koi8r"] as &[&str]),
            ("uk", &["win1251", "koi8u", "iso88595"]),
            ("be", &["win1251", "iso88595"]),
            ("bg", &["win1251", "iso88595"]),
            ("sr", &["win1250", "win1251", "iso88592"]),
            ("mk", &["win1251", "iso88595"]),
            ("el", &["win1253", "iso88597"]),
            ("th", &["win874", "tis620", "iso885911"]),
            ("tr", &["win1254", "iso88599"]),
            ("he", &["win1255", "iso88598"]),
            ("ar", &["win1256", "iso88596"]),
            ("fa", &["win1256"]),
            ("ur", &["win1256"]),
            ("ja", &["shiftjis", "eucjp", "iso2022jp"]),
            ("ko", &["euckr", "cp949"]),
            ("zh", &["gbk", "gb2312", "big5"]),
            ("cs", &["win1250", "iso88592"]),
            ("sk", &["win1250", "iso88592"]),
            ("pl", &["win1250", "iso88592"]),
            ("hu", &["win1250", "iso88592"]),
            ("hr", &["win1250", "iso88592"]),
            ("bs", &["win1250", "iso88592"]),
            ("sl", &["win1250", "iso88592"]),
            ("ro", &["win1250", "iso88592", "iso885916"]),
            ("sq", &["win1250", "iso88592"]),
            ("vi", &["win1258"]),
            ("lt", &["win1257", "iso885913", "iso88594"]),
            ("lv", &["win1257", "iso885913", "iso88594"]),
            ("et", &["win1257", "iso885913", "iso885915"]),
        ])
    });

/// Order in which codepages are tried when no language hint narrows the field
pub const GLOBAL_FALLBACK_ORDER: &[&str] = &[
    "win1252", "win1250", "win1251", "iso88592", "win1253", "win1254", "win1255", "win1256",
    "win874", "gbk", "big5", "shiftjis", "euckr",
];

/// Unicode code-point ranges characteristic of a language's primary script
static SCRIPT_BLOCKS: Lazy<HashMap<&'static str, &'static [(u32, u32)]>> = Lazy::new(|| {
    const CYRILLIC: &[(u32, u32)] = &[(0x0400, 0x04FF), (0x0500, 0x052F)];
    const ARABIC: &[(u32, u32)] = &[(0x0600, 0x06FF), (0x0750, 0x077F)];
    const CJK: &[(u32, u32)] = &[(0x4E00, 0x9FFF), (0x3400, 0x4DBF)];
    HashMap::from([
        ("ru", CYRILLIC),
        ("uk", CYRILLIC),
        ("be", CYRILLIC),
        ("bg", CYRILLIC),
        ("mk", CYRILLIC),
        ("sr", CYRILLIC),
        ("el", &[(0x0370u32, 0x03FFu32), (0x1F00u32, 0x1FFFu32)]),
        ("th", &[(0x0E00, 0x0E7F)]),
        ("he", &[(0x0590, 0x05FF)]),
        ("yi", &[(0x0590, 0x05FF)]),
        ("ar", ARABIC),
        ("fa", ARABIC),
        ("ur", ARABIC),
        ("ja", &[(0x3040, 0x309F), (0x30A0, 0x30FF), (0x4E00, 0x9FFF)]),
        ("ko", &[(0xAC00, 0xD7AF), (0x1100, 0x11FF)]),
        ("zh", CJK),
        ("hi", &[(0x0900, 0x097F)]),
        ("ka", &[(0x10A0, 0x10FF)]),
        ("hy", &[(0x0530, 0x058F)]),
        ("ta", &[(0x0B80, 0x0BFF)]),
        ("vi", &[(0x1EA0, 0x1EFF)]),
    ])
});

/// Canonicalize an encoding label from a detector or catalog.
///
/// `windows-1254` becomes `win1254`, `ISO-8859-9` becomes `iso88599`,
/// `US-ASCII` becomes `utf8`. Unknown labels pass through lowercased and
/// stripped so the support check can reject them.
pub fn canonical_label(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    match lowered.as_str() {
        "us-ascii" | "ascii" => "utf8".to_string(),
        // detectors report the gb18030 superset for GBK-era text
        "gb18030" => "gbk".to_string(),
        other => other.replace("windows-", "win").replace(['-', '_'], ""),
    }
}

/// Resolve a canonical name to an encoding_rs decoder
pub fn encoding_for(canonical: &str) -> Option<&'static Encoding> {
    WHATWG_LABELS
        .get(canonical)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
}

/// The codepage priority list for a language hint, if one exists
pub fn language_priorities(part1: &str) -> Option<&'static [&'static str]> {
    LANGUAGE_ENCODING_PRIORITY.get(part1).copied()
}

/// Repair codepage candidates for a language hint, priority list first,
/// then the global fallback order with duplicates removed
pub fn repair_candidates(language_hint: Option<&str>) -> Vec<&'static str> {
    let mut candidates: Vec<&'static str> = Vec::new();

    if let Some(hint) = language_hint {
        if let Some(priorities) = LANGUAGE_ENCODING_PRIORITY.get(hint) {
            candidates.extend_from_slice(priorities);
        }
    }

    for &name in GLOBAL_FALLBACK_ORDER {
        if !candidates.contains(&name) {
            candidates.push(name);
        }
    }

    candidates
}

/// The script block ranges for a 2-letter language code, if known
pub fn script_blocks(part1: &str) -> Option<&'static [(u32, u32)]> {
    SCRIPT_BLOCKS.get(part1).copied()
}

/// Fraction of characters in `text` that fall inside the given ranges
pub fn script_coverage(text: &str, blocks: &[(u32, u32)]) -> f64 {
    let mut total = 0usize;
    let mut in_script = 0usize;

    for ch in text.chars() {
        total += 1;
        let cp = ch as u32;
        if blocks.iter().any(|&(lo, hi)| cp >= lo && cp <= hi) {
            in_script += 1;
        }
    }

    if total == 0 {
        0.0
    } else {
        in_script as f64 / total as f64
    }
}
