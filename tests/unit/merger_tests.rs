/*!
 * Tests for time-based cue merging
 */

use dualsub::merger::{merge, DEFAULT_MERGE_THRESHOLD_MS};
use dualsub::subtitle_processor::SubtitleEntry;
use regex::Regex;

fn cue(seq: usize, start: u64, end: u64, text: &str) -> SubtitleEntry {
    SubtitleEntry::new(seq, start, end, text.to_string())
}

/// Test output length always equals the main length
#[test]
fn test_merge_withAnyInputs_shouldPreserveMainLength() {
    let main = vec![
        cue(1, 0, 1000, "a"),
        cue(2, 1000, 2000, "b"),
        cue(3, 2000, 3000, "c"),
    ];
    let trans = vec![cue(1, 500, 1500, "x")];

    assert_eq!(merge(&main, &trans, 500).entries.len(), 3);
    assert_eq!(merge(&main, &[], 500).entries.len(), 3);
    assert_eq!(merge(&[], &trans, 500).entries.len(), 0);
}

/// Test main ids and timings survive merging untouched
#[test]
fn test_merge_withMatches_shouldPreserveIdsAndTimings() {
    let main = vec![cue(1, 1000, 3000, "hello"), cue(2, 4000, 6000, "world")];
    let trans = vec![cue(1, 1100, 2900, "hola"), cue(2, 4100, 5900, "mundo")];

    let result = merge(&main, &trans, DEFAULT_MERGE_THRESHOLD_MS);
    for (merged, original) in result.entries.iter().zip(&main) {
        assert_eq!(merged.seq_num, original.seq_num);
        assert_eq!(merged.start_time_ms, original.start_time_ms);
        assert_eq!(merged.end_time_ms, original.end_time_ms);
    }
    assert_eq!(result.matched, 2);
}

/// Test the proximity rule from both sides of the threshold
#[test]
fn test_merge_withProximityOnly_shouldRespectThreshold() {
    // no interval test holds and |3200-1000| is far beyond the threshold
    let main = vec![cue(1, 1000, 3000, "A"), cue(2, 3100, 4000, "A2")];
    let trans = vec![cue(1, 3200, 5000, "B")];

    let result = merge(&main, &trans, 500);
    assert_eq!(result.entries[0].text, "A");
    // |3200-3100| = 100 < 500
    assert_eq!(result.entries[1].text, "A2\n<i>B</i>");
}

/// Test a translation cue fully containing the main interval is a candidate
#[test]
fn test_merge_withContainingTranslation_shouldPair() {
    let main = vec![cue(1, 2000, 3000, "short")];
    let trans = vec![cue(1, 1000, 5000, "long spanning line")];

    let result = merge(&main, &trans, 500);
    assert_eq!(result.entries[0].text, "short\n<i>long spanning line</i>");
}

/// Test the closest start time wins among several candidates
#[test]
fn test_merge_withMultipleCandidates_shouldPickClosestStart() {
    let main = vec![cue(1, 10_000, 12_000, "main")];
    let trans = vec![
        cue(1, 10_400, 10_900, "near"),
        cue(2, 10_100, 11_000, "nearer"),
        cue(3, 11_900, 12_500, "inside but far"),
    ];

    let result = merge(&main, &trans, 500);
    assert_eq!(result.entries[0].text, "main\n<i>nearer</i>");
}

/// Test equal distances break toward the earlier index
#[test]
fn test_merge_withTiedCandidates_shouldPickEarlierIndex() {
    let main = vec![cue(1, 10_000, 12_000, "main")];
    let trans = vec![
        cue(1, 9_800, 10_500, "first"),
        cue(2, 10_200, 11_000, "second"),
    ];

    let result = merge(&main, &trans, 500);
    assert_eq!(result.entries[0].text, "main\n<i>first</i>");
}

/// Test monotonic main input yields monotonic merged output
#[test]
fn test_merge_withMonotonicMain_shouldStayMonotonic() {
    let main: Vec<SubtitleEntry> = (0..50)
        .map(|i| cue(i + 1, (i as u64) * 1000, (i as u64) * 1000 + 900, "line"))
        .collect();
    let trans: Vec<SubtitleEntry> = (0..50)
        .map(|i| cue(i + 1, (i as u64) * 1000 + 50, (i as u64) * 1000 + 950, "linea"))
        .collect();

    let result = merge(&main, &trans, 500);
    for window in result.entries.windows(2) {
        assert!(window[0].start_time_ms <= window[1].start_time_ms);
    }
    assert_eq!(result.matched, 50);
}

/// Test every merged cue matches the single-or-dual-line shape
#[test]
fn test_merge_withMixedInputs_shouldKeepFlattenInvariant() {
    let shape = Regex::new(r"^[^\n]+(\n<i>[^\n]+</i>)?$").unwrap();

    let main = vec![
        cue(1, 0, 1000, "<b>Tagged\nmain</b>"),
        cue(2, 2000, 3000, "plain"),
        cue(3, 10_000, 11_000, "unmatched"),
    ];
    let trans = vec![
        cue(1, 0, 950, "<font color=\"red\">styled\ntranslation</font>"),
        cue(2, 2100, 2900, "plana"),
    ];

    let result = merge(&main, &trans, 500);
    for entry in &result.entries {
        assert!(shape.is_match(&entry.text), "bad shape: {:?}", entry.text);
        assert!(!entry.text.contains('<') || entry.text.contains("<i>"));
    }
    assert_eq!(result.entries[0].text, "Tagged main\n<i>styled translation</i>");
}

/// Test translation cues far in the past are skipped by the cursor
#[test]
fn test_merge_withLongTranslationPrefix_shouldStillPairLateCues() {
    let mut trans: Vec<SubtitleEntry> = (0..100)
        .map(|i| cue(i + 1, (i as u64) * 100, (i as u64) * 100 + 90, "early"))
        .collect();
    trans.push(cue(101, 60_000, 61_000, "late"));

    let main = vec![cue(1, 60_050, 61_050, "main late")];

    let result = merge(&main, &trans, 500);
    assert_eq!(result.entries[0].text, "main late\n<i>late</i>");
}
