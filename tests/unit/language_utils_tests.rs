/*!
 * Tests for ISO language code utilities
 */

use dualsub::language_utils::{
    get_language_name, is_skippable, language_codes_match, languages_are_related,
    normalize_to_part1, normalize_to_part2t, related_languages,
};

/// Test 2-letter normalization from all accepted input shapes
#[test]
fn test_normalize_to_part1_withValidCodes_shouldReturnTwoLetterCode() {
    assert_eq!(normalize_to_part1("en").unwrap(), "en");
    assert_eq!(normalize_to_part1("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1("FRA").unwrap(), "fr");
    assert_eq!(normalize_to_part1(" de ").unwrap(), "de");
}

/// Test bibliographic 3-letter variants fold into the same language
#[test]
fn test_normalize_to_part1_withBibliographicCode_shouldFoldAlias() {
    assert_eq!(normalize_to_part1("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1("ger").unwrap(), "de");
    assert_eq!(normalize_to_part1("gre").unwrap(), "el");
    assert_eq!(normalize_to_part1("chi").unwrap(), "zh");
}

/// Test macrolanguage members roll up to their macrolanguage
#[test]
fn test_normalize_to_part1_withMacrolanguageMember_shouldRollUp() {
    assert_eq!(normalize_to_part1("cmn").unwrap(), "zh");
    assert_eq!(normalize_to_part1("yue").unwrap(), "zh");
    assert_eq!(normalize_to_part1("arb").unwrap(), "ar");
    assert_eq!(normalize_to_part1("khk").unwrap(), "mn");
    assert_eq!(normalize_to_part1("pes").unwrap(), "fa");
}

/// Test invalid codes are rejected
#[test]
fn test_normalize_to_part1_withInvalidCode_shouldFail() {
    assert!(normalize_to_part1("").is_err());
    assert!(normalize_to_part1("x").is_err());
    assert!(normalize_to_part1("zz").is_err());
    assert!(normalize_to_part1("notalang").is_err());
}

/// Test 3-letter normalization
#[test]
fn test_normalize_to_part2t_withMixedCodes_shouldReturnTerminological() {
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fra").unwrap(), "fra");
}

/// Test alias-aware language matching used by the catalog filters
#[test]
fn test_language_codes_match_withAliases_shouldMatch() {
    assert!(language_codes_match("fre", "fra"));
    assert!(language_codes_match("fr", "fra"));
    assert!(language_codes_match("en", "eng"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("en", "bogus"));
}

/// Test the skip set excludes pre-mixed bilingual subtitles
#[test]
fn test_is_skippable_withBilingualCode_shouldSkip() {
    assert!(is_skippable("ze"));
    assert!(is_skippable("ZE"));
    assert!(!is_skippable("en"));
    assert!(!is_skippable("zh"));
}

/// Test related-language groups in both directions
#[test]
fn test_languages_are_related_withGroupMembers_shouldRelate() {
    // South Slavic Latin
    assert!(languages_are_related("bs", "hr"));
    assert!(languages_are_related("hr", "bs"));
    // Scandinavian
    assert!(languages_are_related("da", "sv"));
    assert!(languages_are_related("nb", "no"));
    // West Slavic
    assert!(languages_are_related("cs", "sk"));
    // Malay and Indonesian
    assert!(languages_are_related("ms", "id"));
    // East Slavic
    assert!(languages_are_related("uk", "ru"));
    // Unrelated pairs
    assert!(!languages_are_related("en", "fr"));
    assert!(!languages_are_related("th", "zh"));
}

/// Test asymmetric entries still accept in the reverse direction
#[test]
fn test_languages_are_related_withAsymmetricEntry_shouldAcceptBothWays() {
    // ca lists es, but es does not list ca
    assert!(related_languages("ca").contains(&"es"));
    assert!(!related_languages("es").contains(&"ca"));
    assert!(languages_are_related("ca", "es"));
    assert!(languages_are_related("es", "ca"));
}

/// Test language name lookup
#[test]
fn test_get_language_name_withValidCode_shouldReturnName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fre").unwrap(), "French");
    assert!(get_language_name("zzz").is_err());
}
