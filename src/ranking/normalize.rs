//! Description text normalization.
//!
//! Separator punctuation becomes whitespace, every other non-alphanumeric
//! character is dropped, the text is split on whitespace, lowercased, and
//! stop words are removed. Re-normalizing the output is a no-op.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Punctuation that separates words rather than being part of them.
static SEPARATOR_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['";:,./?\\\-]"#).expect("valid regex"));

/// Built-in English stop words.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "etc", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "must", "my", "myself", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "us", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
    "your", "yours", "yourself", "yourselves",
];

/// Ordered, lowercase, punctuation-free, stop-word-free description tokens.
///
/// Order is kept for display only; matching treats the tokens as a multiset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDescription {
    tokens: Vec<String>,
}

impl NormalizedDescription {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    /// Number of tokens, duplicates included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.tokens.iter()
    }

    /// Distinct tokens in first-seen order.
    pub fn distinct(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tokens
            .iter()
            .filter(|token| seen.insert(token.as_str()))
            .cloned()
            .collect()
    }

    /// Tokens joined back into a single line.
    pub fn joined(&self) -> String {
        self.tokens.join(" ")
    }
}

impl<'a> IntoIterator for &'a NormalizedDescription {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Converts raw description text into [`NormalizedDescription`] tokens.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stop_words: HashSet<String>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().map(|word| (*word).to_string()).collect(),
        }
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add stop words on top of the built-in set. Entries are normalized the
    /// same way description words are, so "Don't" blocks "don" and "t".
    #[must_use]
    pub fn with_extra_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            for token in split_words(word.as_ref()) {
                self.stop_words.insert(token);
            }
        }
        self
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    pub fn normalize(&self, text: &str) -> NormalizedDescription {
        let tokens = split_words(text)
            .into_iter()
            .filter(|token| !self.stop_words.contains(token))
            .collect();
        NormalizedDescription { tokens }
    }

    /// Normalize an already tokenized sequence.
    pub fn normalize_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> NormalizedDescription {
        let joined = tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        self.normalize(&joined)
    }
}

// Lowercasing runs before the character filter: some uppercase letters fold
// into a letter plus a combining mark, and the mark must be stripped here or
// a second pass would strip it and change the token.
fn split_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let spaced = SEPARATOR_PUNCTUATION.replace_all(&lowered, " ");
    let stripped: String = spaced
        .chars()
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace())
        .collect();
    stripped.split_whitespace().map(str::to_string).collect()
}
