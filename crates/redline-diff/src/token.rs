//! Whitespace-preserving tokenization.

/// Split text into maximal runs of non-whitespace or whitespace.
///
/// Whitespace runs are kept as their own tokens so that concatenating the
/// token sequence reproduces the input byte for byte. This is what lets
/// diff segments reconstruct both inputs exactly.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_whitespace: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let is_ws = c.is_whitespace();
        match in_whitespace {
            None => in_whitespace = Some(is_ws),
            Some(prev) if prev != is_ws => {
                tokens.push(&text[start..i]);
                start = i;
                in_whitespace = Some(is_ws);
            }
            Some(_) => {}
        }
    }

    if in_whitespace.is_some() {
        tokens.push(&text[start..]);
    }

    tokens
}

/// Count the words in a text (maximal runs of non-whitespace).
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
