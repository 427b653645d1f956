use serde::Serialize;
use thiserror::Error;

/// Grammatical category assigned to a token by a morphological analyzer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Determiner,
    Conjunction,
    Exclamation,
    Pronoun,
    /// Postpositional particle (josa).
    Josa,
    Number,
    /// Latin-script word.
    Alpha,
    Foreign,
    Unknown,
}

impl PartOfSpeech {
    /// Categories that carry meaning for keyword summaries.
    pub fn is_content_word(&self) -> bool {
        matches!(
            self,
            PartOfSpeech::Noun | PartOfSpeech::Verb | PartOfSpeech::Adjective
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct Token {
    /// Dictionary form: nouns as written, predicates as `stem + 다`.
    pub lemma: String,
    pub pos: PartOfSpeech,
}

impl Token {
    pub fn new(lemma: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self {
            lemma: lemma.into(),
            pos,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Text contains decomposed Hangul jamo at char {0}, expected precomposed syllables")]
    DecomposedHangul(usize),

    #[error("Text too long: {0} chars (max: {1})")]
    TooLong(usize, usize),
}

/// A morphological analyzer: splits text into lemmatized, categorized tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError>;
}

impl<T: Tokenizer + ?Sized> Tokenizer for Box<T> {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError> {
        (**self).tokenize(text)
    }
}

impl<T: Tokenizer + ?Sized> Tokenizer for std::sync::Arc<T> {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError> {
        (**self).tokenize(text)
    }
}
