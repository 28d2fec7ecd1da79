use std::fmt;

use log::{debug, warn};

use crate::errors::ParseError;

// @module: SRT cue parsing, promotional-insert scrubbing and serialization

/// Substrings that mark a cue as a promotional insert
pub const AD_KEYWORDS: &[&str] = &["OpenSubtitles.org", "OpenSubtitles.com", "osdb.link"];

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// An ordered sequence of cues in one language
#[derive(Debug, Clone)]
pub struct SubtitleTrack {
    /// List of subtitle entries, non-decreasing in start time
    pub entries: Vec<SubtitleEntry>,

    /// Track language (ISO code as supplied by the catalog)
    pub language: String,
}

impl SubtitleTrack {
    /// Create an empty track
    pub fn new(language: String) -> Self {
        SubtitleTrack {
            entries: Vec::new(),
            language,
        }
    }

    /// Parse SRT text into a track and scrub promotional inserts.
    ///
    /// Parsing is strict per block; scrubbing afterwards preserves cue order
    /// and does not renumber — ids are reassigned at serialization only.
    pub fn from_srt_text(content: &str, language: String) -> Result<Self, ParseError> {
        let entries = parse_srt_string(content)?;
        let kept = strip_promotional_entries(entries);
        Ok(SubtitleTrack {
            entries: kept,
            language,
        })
    }

    /// Number of cues in the track
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the track has no cues
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to SRT with contiguous 1-based ids, a blank line between
    /// cues and a trailing newline after the final cue
    pub fn to_srt_string(&self) -> String {
        let mut out = String::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&format!(
                "{}\n{} --> {}\n{}\n",
                index + 1,
                entry.format_start_time(),
                entry.format_end_time(),
                entry.text
            ));
        }
        out
    }
}

/// Parse SRT format text into subtitle entries.
///
/// Line endings are normalized first, then lines are accumulated into blocks
/// separated by blank lines — a line of pure whitespace counts as blank, as
/// real-world files often pad their separators. Every block must carry a cue
/// number line, a timestamp line and at least one text line; a block that
/// violates the grammar fails the whole parse. Output is sorted by start
/// time and renumbered from 1.
pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, ParseError> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let normalized = normalized.strip_prefix('\u{FEFF}').unwrap_or(&normalized);

    let mut entries = Vec::new();
    let mut block_index = 0usize;
    let mut block_lines: Vec<&str> = Vec::new();

    // The trailing empty line flushes the final block
    for line in normalized.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !block_lines.is_empty() {
                block_index += 1;
                parse_block(&block_lines, block_index, &mut entries)?;
                block_lines.clear();
            }
            continue;
        }
        block_lines.push(line);
    }

    if entries.is_empty() {
        return Err(ParseError::NoBlocks);
    }

    // Sort by start time to ensure correct order
    entries.sort_by_key(|entry| entry.start_time_ms);

    // Renumber entries to ensure sequential order
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.seq_num = i + 1;
    }

    Ok(entries)
}

/// Parse one accumulated block: cue number line, timestamp line, text lines.
///
/// A cue whose end precedes its start is dropped with a warning rather than
/// failing the file.
fn parse_block(
    lines: &[&str],
    block_index: usize,
    entries: &mut Vec<SubtitleEntry>,
) -> Result<(), ParseError> {
    let id_line = lines.first().copied().unwrap_or("");
    if id_line.trim().parse::<usize>().is_err() {
        return Err(ParseError::BadCueNumber {
            block: block_index,
            found: id_line.trim().to_string(),
        });
    }

    let timestamp_line = lines.get(1).copied().unwrap_or("");
    let (start_time_ms, end_time_ms) = parse_timestamp_line(timestamp_line)
        .map_err(|(column, reason)| ParseError::BadTimestamp {
            block: block_index,
            column,
            reason,
        })?;

    let text = if lines.len() > 2 {
        lines[2..].join("\n").trim().to_string()
    } else {
        String::new()
    };
    if text.is_empty() {
        return Err(ParseError::MissingText { block: block_index });
    }

    if end_time_ms < start_time_ms {
        warn!(
            "skipping cue in block {} with end before start ({} < {})",
            block_index, end_time_ms, start_time_ms
        );
        return Ok(());
    }

    entries.push(SubtitleEntry::new(0, start_time_ms, end_time_ms, text));
    Ok(())
}

/// Drop cues whose text contains any ad keyword, preserving relative order
pub fn strip_promotional_entries(entries: Vec<SubtitleEntry>) -> Vec<SubtitleEntry> {
    let before = entries.len();
    let kept: Vec<SubtitleEntry> = entries
        .into_iter()
        .filter(|entry| !AD_KEYWORDS.iter().any(|keyword| entry.text.contains(keyword)))
        .collect();

    let dropped = before - kept.len();
    if dropped > 0 {
        debug!("scrubbed {dropped} promotional cue(s)");
    }
    kept
}

/// Scan a timestamp line of the form `HH:MM:SS,mmm --> HH:MM:SS,mmm`.
///
/// Hand-written so the error carries the exact column where scanning
/// stopped. Exactly two digits for hours, minutes and seconds and three for
/// milliseconds; anything after the second endpoint must be whitespace-led.
fn parse_timestamp_line(line: &str) -> Result<(u64, u64), (usize, &'static str)> {
    let bytes = line.as_bytes();
    let mut pos = 0usize;

    let start = scan_endpoint(bytes, &mut pos)?;

    for expected in b" --> " {
        match bytes.get(pos) {
            Some(b) if b == expected => pos += 1,
            _ => return Err((pos, "expected ' --> ' separator")),
        }
    }

    let end = scan_endpoint(bytes, &mut pos)?;

    match bytes.get(pos) {
        None => Ok((start, end)),
        Some(b' ') | Some(b'\t') => Ok((start, end)),
        Some(_) => Err((pos, "trailing garbage after end timestamp")),
    }
}

/// Scan one `HH:MM:SS,mmm` endpoint starting at `pos`
fn scan_endpoint(bytes: &[u8], pos: &mut usize) -> Result<u64, (usize, &'static str)> {
    let hours = scan_digits(bytes, pos, 2, "expected 2-digit hours")?;
    expect_byte(bytes, pos, b':', "expected ':' after hours")?;
    let minutes = scan_digits(bytes, pos, 2, "expected 2-digit minutes")?;
    expect_byte(bytes, pos, b':', "expected ':' after minutes")?;
    let seconds = scan_digits(bytes, pos, 2, "expected 2-digit seconds")?;
    expect_byte(bytes, pos, b',', "expected ',' before milliseconds")?;
    let millis = scan_digits(bytes, pos, 3, "expected 3-digit milliseconds")?;

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Scan exactly `count` ASCII digits; one more digit is as fatal as one less
fn scan_digits(
    bytes: &[u8],
    pos: &mut usize,
    count: usize,
    what: &'static str,
) -> Result<u64, (usize, &'static str)> {
    let mut value = 0u64;
    for _ in 0..count {
        match bytes.get(*pos) {
            Some(b @ b'0'..=b'9') => {
                value = value * 10 + u64::from(b - b'0');
                *pos += 1;
            }
            _ => return Err((*pos, what)),
        }
    }
    if matches!(bytes.get(*pos), Some(b'0'..=b'9')) {
        return Err((*pos, what));
    }
    Ok(value)
}

fn expect_byte(
    bytes: &[u8],
    pos: &mut usize,
    expected: u8,
    what: &'static str,
) -> Result<(), (usize, &'static str)> {
    match bytes.get(*pos) {
        Some(b) if *b == expected => {
            *pos += 1;
            Ok(())
        }
        _ => Err((*pos, what)),
    }
}
