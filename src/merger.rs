use log::debug;

use crate::subtitle_processor::SubtitleEntry;

// @module: Time-based cue merging — align a translation track onto the main
// track and emit bilingual cues

/// Default start-time proximity for pairing cues, in milliseconds
pub const DEFAULT_MERGE_THRESHOLD_MS: u64 = 500;

/// Result of merging a translation track onto a main track
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// One cue per main cue, ids and timings preserved
    pub entries: Vec<SubtitleEntry>,
    /// How many cues received a translation line
    pub matched: usize,
}

/// Merge a translation cue sequence onto the main sequence.
///
/// The output has exactly one cue per main cue with the main ids and timings
/// untouched. Where a time-aligned counterpart exists the cue text becomes
/// the flattened main line with the flattened translation line in italics
/// beneath it; otherwise the flattened main line stands alone.
///
/// The scan keeps a monotonic cursor into the translation sequence, so total
/// work is linear for realistically ordered inputs.
pub fn merge(
    main: &[SubtitleEntry],
    translation: &[SubtitleEntry],
    threshold_ms: u64,
) -> MergeResult {
    let mut entries = Vec::with_capacity(main.len());
    let mut matched = 0usize;
    let mut trans_index = 0usize;

    for main_cue in main {
        let mut best: Option<(usize, u64)> = None;

        let mut i = trans_index;
        while i < translation.len() {
            let trans_cue = &translation[i];

            // The cursor only moves forward, and only over cues that ended
            // well before the current main cue started
            if i == trans_index
                && trans_cue.end_time_ms + 2 * threshold_ms < main_cue.start_time_ms
            {
                trans_index = i + 1;
                i += 1;
                continue;
            }

            // Past this point no overlap or proximity test can succeed,
            // whether or not a candidate was already found
            if trans_cue.start_time_ms > main_cue.end_time_ms + threshold_ms {
                break;
            }

            if is_candidate(main_cue, trans_cue, threshold_ms) {
                let diff = main_cue.start_time_ms.abs_diff(trans_cue.start_time_ms);
                best = match best {
                    Some((_, best_diff)) if diff < best_diff => Some((i, diff)),
                    Some(current) => Some(current),
                    None => Some((i, diff)),
                };
            }

            i += 1;
        }

        let main_line = flatten(&main_cue.text);
        let text = match best {
            Some((index, _)) => {
                let trans_line = flatten(&translation[index].text);
                if trans_line.is_empty() {
                    main_line
                } else {
                    matched += 1;
                    format!("{main_line}\n<i>{trans_line}</i>")
                }
            }
            None => main_line,
        };

        entries.push(SubtitleEntry::new(
            main_cue.seq_num,
            main_cue.start_time_ms,
            main_cue.end_time_ms,
            text,
        ));
    }

    debug!(
        "merged {} of {} cues against {} translation cues",
        matched,
        entries.len(),
        translation.len()
    );

    MergeResult { entries, matched }
}

/// The five pairing tests: four interval relations plus start proximity
fn is_candidate(main: &SubtitleEntry, trans: &SubtitleEntry, threshold_ms: u64) -> bool {
    let starts_inside =
        trans.start_time_ms >= main.start_time_ms && trans.start_time_ms < main.end_time_ms;
    let ends_inside =
        trans.end_time_ms > main.start_time_ms && trans.end_time_ms <= main.end_time_ms;
    let fully_within =
        trans.start_time_ms >= main.start_time_ms && trans.end_time_ms <= main.end_time_ms;
    let contains_main =
        trans.start_time_ms <= main.start_time_ms && trans.end_time_ms >= main.end_time_ms;
    let close_start = main.start_time_ms.abs_diff(trans.start_time_ms) < threshold_ms;

    starts_inside || ends_inside || fully_within || contains_main || close_start
}

/// Collapse a cue text to a single tag-free line
fn flatten(text: &str) -> String {
    let stripped = strip_html(text);
    stripped
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// Remove everything between `<` and `>`; tolerant of attributes, hostile to
/// everything else
fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' if !in_tag => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
