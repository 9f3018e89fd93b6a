//! Fixed-width text splitting for the speech service's request ceiling.

/// Per-request character ceiling of the speech endpoint, markup included
pub const CHAR_LIMIT: usize = 2000;

/// Split `text` into pieces of at most `limit` characters.
///
/// The split ignores word and sentence boundaries; the pieces concatenate
/// back to exactly `text`. Empty text yields no pieces. Lengths count
/// Unicode scalar values so no piece ends inside a code point.
pub fn chunk_text(text: &str, limit: usize) -> Vec<&str> {
    assert!(limit > 0, "chunk limit must be positive");

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == limit {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}
