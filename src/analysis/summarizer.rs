use super::tokenizer::Tokenizer;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

lazy_static! {
    // Unicode-aware: \w covers Hangul syllables.
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").unwrap();
}

pub const SUMMARY_SEPARATOR: &str = ", ";

/// Removes every character that is neither a word character nor whitespace.
pub fn strip_punctuation(text: &str) -> String {
    NON_WORD.replace_all(text, "").into_owned()
}

/// Word frequencies that remember the order in which words were first seen.
#[derive(Default)]
struct FrequencyTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    fn add(&mut self, word: String) {
        match self.index.get(&word) {
            Some(&position) => self.entries[position].1 += 1,
            None => {
                self.index.insert(word.clone(), self.entries.len());
                self.entries.push((word, 1));
            }
        }
    }

    /// Most frequent first. Ties keep first-occurrence order.
    fn into_ranked(self) -> Vec<(String, usize)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

/// Turns a batch of review texts into a ranked keyword summary.
pub struct Summarizer<T: Tokenizer> {
    tokenizer: T,
}

impl<T: Tokenizer> Summarizer<T> {
    pub fn new(tokenizer: T) -> Self {
        Self { tokenizer }
    }

    /// Up to `top_n` (word, count) pairs, most frequent first.
    ///
    /// Only nouns, verbs and adjectives are counted; verbs and adjectives are
    /// counted by their dictionary form. Equal counts are ordered by the first
    /// time the word appeared across `texts`. Texts the tokenizer rejects are
    /// skipped with a warning.
    pub fn top_words<S: AsRef<str>>(&self, texts: &[S], top_n: usize) -> Vec<(String, usize)> {
        if top_n == 0 {
            return vec![];
        }
        let mut table = FrequencyTable::default();
        for (index, text) in texts.iter().enumerate() {
            let cleaned = strip_punctuation(text.as_ref());
            match self.tokenizer.tokenize(&cleaned) {
                Ok(tokens) => tokens
                    .into_iter()
                    .filter(|token| token.pos.is_content_word())
                    .for_each(|token| table.add(token.lemma)),
                Err(err) => warn!("Skipping text #{} in summary: {}", index, err),
            }
        }
        let mut ranked = table.into_ranked();
        ranked.truncate(top_n);
        ranked
    }

    /// The `top_n` most frequent words joined by `", "`. Empty when no
    /// content word was found.
    pub fn summarize<S: AsRef<str>>(&self, texts: &[S], top_n: usize) -> String {
        self.top_words(texts, top_n)
            .into_iter()
            .map(|(word, _)| word)
            .collect::<Vec<_>>()
            .join(SUMMARY_SEPARATOR)
    }
}
