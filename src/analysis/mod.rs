//! Review text analysis: morphological tokenization, keyword summaries and
//! per-sentiment aggregation.

mod aggregator;
pub mod hangul;
mod korean;
mod summarizer;
mod tokenizer;

pub use aggregator::{Aggregator, Review, SentimentBreakdown, DEFAULT_SUMMARY_SIZE};
pub use korean::{KoreanTokenizer, DEFAULT_MAX_TEXT_CHARS};
pub use summarizer::{strip_punctuation, Summarizer, SUMMARY_SEPARATOR};
pub use tokenizer::{PartOfSpeech, Token, TokenizeError, Tokenizer};
