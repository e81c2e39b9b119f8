/// Maximum characters handed to the model in one call
pub const MAX_CHUNK_CHARS: usize = 1000;

/// A contiguous slice of the extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub index: usize,
    /// Byte offset of the chunk in the source text
    pub start: usize,
    pub text: &'a str,
}

impl<'a> Chunk<'a> {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits `text` into consecutive chunks of at most `max_chars` characters.
///
/// Purely positional: sentence and word boundaries are ignored. Chunks never
/// overlap and concatenating them gives back `text`. Returns no chunks for
/// empty input or a zero `max_chars`.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<Chunk<'_>> {
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars_in_chunk = 0;

    for (offset, _) in text.char_indices() {
        if chars_in_chunk == max_chars {
            chunks.push(Chunk {
                index: chunks.len(),
                start,
                text: &text[start..offset],
            });
            start = offset;
            chars_in_chunk = 0;
        }
        chars_in_chunk += 1;
    }

    chunks.push(Chunk {
        index: chunks.len(),
        start,
        text: &text[start..],
    });

    chunks
}
