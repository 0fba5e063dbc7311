//! Word-level and field-level diff engine for redline.
//!
//! This crate is pure computation: no I/O, no async, and no failure path.
//! Both entry points are total over any pair of inputs, including empty
//! ones.
//!
//! - [`diff`] compares two texts at word granularity using a longest
//!   common subsequence alignment over whitespace-preserving tokens.
//! - [`diff_fields`] compares two structured field maps and reports
//!   added, deleted, and modified fields.
//!
//! # Example
//!
//! ```
//! use redline_diff::{diff, ChangeKind};
//!
//! let result = diff("hello world", "hello there world");
//! assert_eq!(result.added_words, 1);
//! assert_eq!(result.removed_words, 0);
//!
//! // Concatenating non-delete segments reproduces the new text.
//! let new: String = result
//!     .changes
//!     .iter()
//!     .filter(|s| s.kind != ChangeKind::Delete)
//!     .map(|s| s.text.as_str())
//!     .collect();
//! assert_eq!(new, "hello there world");
//! ```

mod fields;
mod lcs;
mod token;

pub use fields::{diff_fields, summarize, ChangeSummary, FieldChange, FieldChangeKind};
pub use token::{tokenize, word_count};

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

/// The kind of a diff segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Text present in both versions.
    Equal,
    /// Text present only in the new version.
    Add,
    /// Text present only in the old version.
    Delete,
}

/// A contiguous run of text with a single change kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Whether this run is unchanged, added, or deleted.
    pub kind: ChangeKind,
    /// The exact text of the run, whitespace included.
    pub text: String,
}

impl Segment {
    pub fn new(kind: ChangeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// The result of a word-level diff.
///
/// Concatenating the text of all segments whose kind is not
/// [`ChangeKind::Delete`] reproduces the new text; concatenating all
/// segments whose kind is not [`ChangeKind::Add`] reproduces the old text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Segments covering the full reconstructed sequence, in document order.
    pub changes: Vec<Segment>,
    /// Number of words in `add` segments.
    pub added_words: usize,
    /// Number of words in `delete` segments.
    pub removed_words: usize,
}

impl DiffResult {
    fn from_segments(changes: Vec<Segment>) -> Self {
        let added_words = changes
            .iter()
            .filter(|s| s.kind == ChangeKind::Add)
            .map(|s| word_count(&s.text))
            .sum();
        let removed_words = changes
            .iter()
            .filter(|s| s.kind == ChangeKind::Delete)
            .map(|s| word_count(&s.text))
            .sum();
        Self {
            changes,
            added_words,
            removed_words,
        }
    }

    /// Whether the two texts were identical.
    pub fn is_unchanged(&self) -> bool {
        self.changes.iter().all(|s| s.kind == ChangeKind::Equal)
    }

    /// Reconstruct the old text from the segments.
    pub fn old_text(&self) -> String {
        self.changes
            .iter()
            .filter(|s| s.kind != ChangeKind::Add)
            .map(|s| s.text.as_str())
            .collect()
    }

    /// Reconstruct the new text from the segments.
    pub fn new_text(&self) -> String {
        self.changes
            .iter()
            .filter(|s| s.kind != ChangeKind::Delete)
            .map(|s| s.text.as_str())
            .collect()
    }
}

/// Tuning knobs for the word-level diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Maximum token count (per side) for the O(n*m) LCS table.
    ///
    /// The table costs roughly `4 * max_tokens^2` bytes while the diff
    /// runs; the default keeps that under ~16 MB. Above this limit the
    /// engine falls back to a coarser line-level diff, which is linear
    /// in memory. The segment model and the round-trip guarantee are
    /// identical on both paths.
    pub max_tokens: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self { max_tokens: 2000 }
    }
}

/// Compute a word-level diff between two texts with default options.
pub fn diff(old: &str, new: &str) -> DiffResult {
    diff_with_options(old, new, &DiffOptions::default())
}

/// Compute a word-level diff between two texts.
///
/// Tokens are maximal runs of non-whitespace or whitespace, so the
/// segments reconstruct both inputs exactly. If either side exceeds
/// `options.max_tokens` tokens, a line-level diff is produced instead.
pub fn diff_with_options(old: &str, new: &str, options: &DiffOptions) -> DiffResult {
    if old == new {
        if old.is_empty() {
            return DiffResult::from_segments(Vec::new());
        }
        return DiffResult::from_segments(vec![Segment::new(ChangeKind::Equal, old)]);
    }
    if old.is_empty() {
        return DiffResult::from_segments(vec![Segment::new(ChangeKind::Add, new)]);
    }
    if new.is_empty() {
        return DiffResult::from_segments(vec![Segment::new(ChangeKind::Delete, old)]);
    }

    let old_tokens = tokenize(old);
    let new_tokens = tokenize(new);

    let segments = if old_tokens.len() > options.max_tokens || new_tokens.len() > options.max_tokens
    {
        line_segments(old, new)
    } else {
        lcs::align(&old_tokens, &new_tokens)
    };

    DiffResult::from_segments(segments)
}

/// Coarse line-level diff used when the inputs are too large for the
/// word-level LCS table.
fn line_segments(old: &str, new: &str) -> Vec<Segment> {
    let text_diff = TextDiff::from_lines(old, new);
    let mut segments: Vec<Segment> = Vec::new();

    for change in text_diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => ChangeKind::Equal,
            ChangeTag::Insert => ChangeKind::Add,
            ChangeTag::Delete => ChangeKind::Delete,
        };
        lcs::push_merged(&mut segments, kind, change.value());
    }

    segments
}
