/*!
 * Tests for SRT parsing, scrubbing and serialization
 */

use dualsub::errors::ParseError;
use dualsub::subtitle_processor::{
    parse_srt_string, strip_promotional_entries, SubtitleEntry, SubtitleTrack,
};

/// Test timestamp formatting
#[test]
fn test_format_timestamp_withValidMs_shouldFormatCorrectly() {
    assert_eq!(SubtitleEntry::format_timestamp(5_025_678), "01:23:45,678");
    assert_eq!(SubtitleEntry::format_timestamp(0), "00:00:00,000");
    assert_eq!(SubtitleEntry::format_timestamp(61_234), "00:01:01,234");
}

/// Test parsing valid SRT content
#[test]
fn test_parse_srt_string_withValidContent_shouldParseCorrectly() {
    let srt_content = "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n2\n00:00:05,000 --> 00:00:08,000\nTest subtitle\nSecond line\n\n";

    let entries = parse_srt_string(srt_content).unwrap();

    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].seq_num, 1);
    assert_eq!(entries[0].start_time_ms, 1000);
    assert_eq!(entries[0].end_time_ms, 4000);
    assert_eq!(entries[0].text, "Hello world");

    assert_eq!(entries[1].seq_num, 2);
    assert_eq!(entries[1].start_time_ms, 5000);
    assert_eq!(entries[1].end_time_ms, 8000);
    assert_eq!(entries[1].text, "Test subtitle\nSecond line");
}

/// Test CRLF and lone CR line endings are normalized
#[test]
fn test_parse_srt_string_withCrlfEndings_shouldNormalize() {
    let srt_content =
        "1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst\r\n\r\n2\r00:00:03,000 --> 00:00:04,000\rSecond\r";

    let entries = parse_srt_string(srt_content).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "First");
    assert_eq!(entries[1].text, "Second");
}

/// Test a leading BOM is tolerated
#[test]
fn test_parse_srt_string_withLeadingBom_shouldParse() {
    let srt_content = "\u{FEFF}1\n00:00:01,000 --> 00:00:02,000\nHello\n";
    let entries = parse_srt_string(srt_content).unwrap();
    assert_eq!(entries.len(), 1);
}

/// Test blank lines padded with whitespace still separate blocks
#[test]
fn test_parse_srt_string_withWhitespacePaddedBlankLines_shouldSeparateBlocks() {
    let srt_content =
        "1\n00:00:01,000 --> 00:00:02,000\nOne\n \n2\n00:00:03,000 --> 00:00:04,000\nTwo\n\t\n3\n00:00:05,000 --> 00:00:06,000\nThree\n";

    let entries = parse_srt_string(srt_content).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].text, "One");
    assert_eq!(entries[1].text, "Two");
    assert_eq!(entries[2].text, "Three");
}

/// Test multiple blank lines between blocks are tolerated
#[test]
fn test_parse_srt_string_withExtraBlankLines_shouldParse() {
    let srt_content =
        "1\n00:00:01,000 --> 00:00:02,000\nOne\n\n\n\n2\n00:00:03,000 --> 00:00:04,000\nTwo\n";
    let entries = parse_srt_string(srt_content).unwrap();
    assert_eq!(entries.len(), 2);
}

/// Test entries are sorted by start time and renumbered from 1
#[test]
fn test_parse_srt_string_withOutOfOrderEntries_shouldSortAndRenumber() {
    let srt_content =
        "7\n00:00:10,000 --> 00:00:11,000\nLater\n\n3\n00:00:01,000 --> 00:00:02,000\nEarlier\n";

    let entries = parse_srt_string(srt_content).unwrap();
    assert_eq!(entries[0].text, "Earlier");
    assert_eq!(entries[0].seq_num, 1);
    assert_eq!(entries[1].text, "Later");
    assert_eq!(entries[1].seq_num, 2);
}

/// Test a non-integer cue number fails the parse
#[test]
fn test_parse_srt_string_withBadCueNumber_shouldFail() {
    let srt_content = "one\n00:00:01,000 --> 00:00:02,000\nHello\n";
    let err = parse_srt_string(srt_content).unwrap_err();
    assert!(matches!(err, ParseError::BadCueNumber { block: 1, .. }));
}

/// Test a malformed timestamp line fails the parse
#[test]
fn test_parse_srt_string_withBadTimestamp_shouldFail() {
    let srt_content = "1\n00:00:01.000 --> 00:00:02,000\nHello\n";
    let err = parse_srt_string(srt_content).unwrap_err();
    assert!(matches!(err, ParseError::BadTimestamp { block: 1, .. }));
}

/// Test a block without text fails the parse
#[test]
fn test_parse_srt_string_withMissingText_shouldFail() {
    let srt_content = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:03,000 --> 00:00:04,000\nOk\n";
    let err = parse_srt_string(srt_content).unwrap_err();
    assert!(matches!(err, ParseError::MissingText { block: 1 }));
}

/// Test empty input fails with NoBlocks
#[test]
fn test_parse_srt_string_withEmptyInput_shouldFail() {
    assert_eq!(parse_srt_string("").unwrap_err(), ParseError::NoBlocks);
    assert_eq!(parse_srt_string("\n\n\n").unwrap_err(), ParseError::NoBlocks);
}

/// Test the ad filter drops promotional cues without renumbering
#[test]
fn test_strip_promotional_entries_withAdCues_shouldDropAndKeepOrder() {
    let entries = vec![
        SubtitleEntry::new(1, 0, 1000, "Real dialogue".to_string()),
        SubtitleEntry::new(2, 1000, 2000, "Subtitles by OpenSubtitles.org".to_string()),
        SubtitleEntry::new(3, 2000, 3000, "More dialogue".to_string()),
        SubtitleEntry::new(4, 3000, 4000, "Visit osdb.link/deal today".to_string()),
    ];

    let kept = strip_promotional_entries(entries);
    assert_eq!(kept.len(), 2);
    // relative order preserved, ids untouched until serialization
    assert_eq!(kept[0].seq_num, 1);
    assert_eq!(kept[1].seq_num, 3);
}

/// Test serialization produces the exact SRT shape
#[test]
fn test_to_srt_string_withEntries_shouldUseExactFormat() {
    let track = SubtitleTrack {
        entries: vec![
            SubtitleEntry::new(1, 1000, 2000, "One".to_string()),
            SubtitleEntry::new(3, 3000, 4000, "Two\nlines".to_string()),
        ],
        language: "en".to_string(),
    };

    let srt = track.to_srt_string();
    assert_eq!(
        srt,
        "1\n00:00:01,000 --> 00:00:02,000\nOne\n\n2\n00:00:03,000 --> 00:00:04,000\nTwo\nlines\n"
    );
    assert!(srt.ends_with('\n'));
}

/// Test parse and serialize round-trip on well-formed input
#[test]
fn test_parse_serialize_roundTrip_shouldPreserveCues() {
    let track = SubtitleTrack {
        entries: vec![
            SubtitleEntry::new(1, 1000, 2000, "First cue".to_string()),
            SubtitleEntry::new(2, 2500, 4000, "Second cue\nwith two lines".to_string()),
            SubtitleEntry::new(3, 5000, 6000, "Third cue".to_string()),
        ],
        language: "en".to_string(),
    };

    let reparsed = parse_srt_string(&track.to_srt_string()).unwrap();
    assert_eq!(reparsed, track.entries);
}

/// Test from_srt_text combines parsing and scrubbing
#[test]
fn test_from_srt_text_withAdCue_shouldScrub() {
    let srt_content = "1\n00:00:01,000 --> 00:00:02,000\nReal line\n\n2\n00:00:03,000 --> 00:00:04,000\nOpenSubtitles.com rated 10/10\n";

    let track = SubtitleTrack::from_srt_text(srt_content, "en".to_string()).unwrap();
    assert_eq!(track.len(), 1);
    assert_eq!(track.entries[0].text, "Real line");
}
