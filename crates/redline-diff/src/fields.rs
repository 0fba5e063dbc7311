//! Field-set comparison for structured document fields.

use crate::word_count;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// The kind of a field change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldChangeKind {
    /// Field present only in the new map.
    Add,
    /// Field present only in the old map.
    Delete,
    /// Field present in both maps with differing values.
    Modify,
}

/// A single change between two field maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub kind: FieldChangeKind,
    /// Field identifier.
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Aggregate summary over a set of field changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub total: usize,
    pub additions: usize,
    pub deletions: usize,
    pub modifications: usize,
    pub words_added: usize,
    pub words_deleted: usize,
}

/// Compare two field maps.
///
/// Every key present in exactly one map yields exactly one add or delete
/// change; every key present in both with differing values yields exactly
/// one modify change; keys with equal values yield no change. Changes are
/// returned sorted by field name, and callers may rely on that order.
pub fn diff_fields(
    old: &HashMap<String, String>,
    new: &HashMap<String, String>,
) -> Vec<FieldChange> {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    let mut changes = Vec::new();
    for key in keys {
        match (old.get(key), new.get(key)) {
            (Some(old_value), None) => changes.push(FieldChange {
                kind: FieldChangeKind::Delete,
                field: key.clone(),
                old_value: Some(old_value.clone()),
                new_value: None,
            }),
            (None, Some(new_value)) => changes.push(FieldChange {
                kind: FieldChangeKind::Add,
                field: key.clone(),
                old_value: None,
                new_value: Some(new_value.clone()),
            }),
            (Some(old_value), Some(new_value)) if old_value != new_value => {
                changes.push(FieldChange {
                    kind: FieldChangeKind::Modify,
                    field: key.clone(),
                    old_value: Some(old_value.clone()),
                    new_value: Some(new_value.clone()),
                });
            }
            _ => {}
        }
    }

    changes
}

/// Summarize a set of field changes.
///
/// For modify changes only the word-count *difference* between old and new
/// values is attributed: an excess counts as added words, a deficit as
/// deleted words, never both. Added and deleted fields contribute their
/// full value's word count.
pub fn summarize(changes: &[FieldChange]) -> ChangeSummary {
    let mut summary = ChangeSummary {
        total: changes.len(),
        ..Default::default()
    };

    for change in changes {
        let old_words = change.old_value.as_deref().map_or(0, word_count);
        let new_words = change.new_value.as_deref().map_or(0, word_count);

        match change.kind {
            FieldChangeKind::Add => {
                summary.additions += 1;
                summary.words_added += new_words;
            }
            FieldChangeKind::Delete => {
                summary.deletions += 1;
                summary.words_deleted += old_words;
            }
            FieldChangeKind::Modify => {
                summary.modifications += 1;
                if new_words > old_words {
                    summary.words_added += new_words - old_words;
                } else {
                    summary.words_deleted += old_words - new_words;
                }
            }
        }
    }

    summary
}
