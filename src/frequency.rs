use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::stopwords::Stopwords;

/// Words shorter than this are dropped
pub const MIN_WORD_CHARS: usize = 3;

/// Bars shown in the frequency chart
pub const TOP_WORDS: usize = 10;

/// Any Unicode punctuation (`\p{P}`) plus the ASCII symbols `[:punct:]` adds
const PUNCTUATION_PATTERN: &str = r"[\p{P}[:punct:]]";

fn punctuation() -> &'static Regex {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    PUNCTUATION.get_or_init(|| Regex::new(PUNCTUATION_PATTERN).expect("punctuation pattern is valid"))
}

pub fn is_punctuation(c: char) -> bool {
    let mut buf = [0u8; 4];
    punctuation().is_match(c.encode_utf8(&mut buf))
}

/// Lowercases, removes punctuation and splits on whitespace.
///
/// Punctuation is deleted rather than replaced, so "don't" becomes "dont"
/// and "state-of-the-art" becomes one token.
pub fn normalize_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = punctuation().replace_all(&lowered, "");
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Word counts in first-occurrence order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFrequencyTable {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl WordFrequencyTable {
    /// Counts the summary's words that are not stopwords and have at least
    /// [`MIN_WORD_CHARS`] characters.
    pub fn from_summary(summary: &str, stopwords: &Stopwords) -> Self {
        let mut table = Self::default();
        for token in normalize_tokens(summary) {
            if token.chars().count() < MIN_WORD_CHARS || stopwords.contains(&token) {
                continue;
            }
            table.add(token);
        }
        table
    }

    fn add(&mut self, word: String) {
        match self.index.get(&word) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(word.clone(), self.entries.len());
                self.entries.push((word, 1));
            }
        }
    }

    pub fn count(&self, word: &str) -> usize {
        self.index.get(word).map_or(0, |&pos| self.entries[pos].1)
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(w, n)| (w.as_str(), *n))
    }

    /// The `n` most frequent words, highest count first.
    ///
    /// Equal counts keep first-occurrence order in the summary.
    pub fn top_n(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
