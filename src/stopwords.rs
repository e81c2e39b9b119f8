use std::collections::HashSet;
use std::path::Path;

use crate::error::StartupError;

/// English stopword corpus (NLTK list), one word per line
const ENGLISH: &str = include_str!("../assets/stopwords_english.txt");

/// Words excluded from frequency analysis
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    pub fn english() -> Self {
        Self::parse(ENGLISH)
    }

    /// Blank lines and `#` comments are ignored, words are lowercased.
    pub fn parse(contents: &str) -> Self {
        let words = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Self { words }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| StartupError::Stopwords {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self::parse(&contents))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_english_corpus() {
        let stopwords = Stopwords::english();
        assert_eq!(stopwords.len(), 179);
        for word in ["the", "and", "should've", "ourselves", "won't"] {
            assert!(stopwords.contains(word), "{}", word);
        }
        assert!(!stopwords.contains("summary"));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let stopwords = Stopwords::parse("# custom list\n\nFoo\n  bar  \n");
        assert_eq!(stopwords.len(), 2);
        assert!(stopwords.contains("foo"));
        assert!(stopwords.contains("bar"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        std::fs::write(&path, "lorem\nipsum\n").unwrap();

        let stopwords = Stopwords::from_file(&path).unwrap();
        assert!(stopwords.contains("ipsum"));
    }

    #[test]
    fn test_missing_file_is_startup_error() {
        let dir = tempdir().unwrap();
        let err = Stopwords::from_file(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, StartupError::Stopwords { .. }));
    }
}
