//! Longest-common-subsequence alignment over token sequences.

use crate::{ChangeKind, Segment};

/// Append text to the segment list, merging into the previous segment when
/// it has the same kind.
pub(crate) fn push_merged(segments: &mut Vec<Segment>, kind: ChangeKind, text: &str) {
    if let Some(last) = segments.last_mut() {
        if last.kind == kind {
            last.text.push_str(text);
            return;
        }
    }
    segments.push(Segment::new(kind, text));
}

/// Align two token sequences with classic O(n*m) dynamic programming over
/// token equality, and emit merged delete/add/equal segments in document
/// order.
///
/// The table is filled bottom-up so `table[i][j]` holds the LCS length of
/// `old[i..]` and `new[j..]`; the forward walk then prefers deletions over
/// additions on ties, which keeps old-only runs ahead of new-only runs.
pub(crate) fn align(old: &[&str], new: &[&str]) -> Vec<Segment> {
    let n = old.len();
    let m = new.len();
    let width = m + 1;

    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if old[i] == new[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut segments = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < n && j < m {
        if old[i] == new[j] {
            push_merged(&mut segments, ChangeKind::Equal, old[i]);
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            push_merged(&mut segments, ChangeKind::Delete, old[i]);
            i += 1;
        } else {
            push_merged(&mut segments, ChangeKind::Add, new[j]);
            j += 1;
        }
    }
    while i < n {
        push_merged(&mut segments, ChangeKind::Delete, old[i]);
        i += 1;
    }
    while j < m {
        push_merged(&mut segments, ChangeKind::Add, new[j]);
        j += 1;
    }

    segments
}
