use super::summarizer::Summarizer;
use super::tokenizer::Tokenizer;
use crate::catalog_store::{Sentiment, SentimentSummary};

/// Number of keywords kept per sentiment class when nothing else is configured.
pub const DEFAULT_SUMMARY_SIZE: usize = 10;

/// A single review as read from the dataset. Only lives during ingestion.
#[derive(Clone, Debug, PartialEq)]
pub struct Review {
    pub text: String,
    pub sentiment: Sentiment,
}

impl Review {
    pub fn new(text: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            text: text.into(),
            sentiment,
        }
    }
}

/// Per-sentiment summaries of one movie's reviews.
///
/// Always holds positive then negative first, followed by any other label in
/// the order it was first seen.
#[derive(Clone, Debug, PartialEq)]
pub struct SentimentBreakdown {
    summaries: Vec<SentimentSummary>,
}

impl SentimentBreakdown {
    pub fn get(&self, sentiment: &Sentiment) -> Option<&SentimentSummary> {
        self.summaries
            .iter()
            .find(|s| &s.classification == sentiment)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SentimentSummary> {
        self.summaries.iter()
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn into_summaries(self) -> Vec<SentimentSummary> {
        self.summaries
    }
}

pub struct Aggregator<T: Tokenizer> {
    summarizer: Summarizer<T>,
    top_n: usize,
}

impl<T: Tokenizer> Aggregator<T> {
    pub fn new(summarizer: Summarizer<T>, top_n: usize) -> Self {
        Self { summarizer, top_n }
    }

    /// Groups `reviews` by sentiment, summarizing each group and computing its
    /// share of all reviews. With no reviews every ratio is 0.
    pub fn aggregate(&self, reviews: &[Review]) -> SentimentBreakdown {
        let mut groups: Vec<(Sentiment, Vec<&str>)> = vec![
            (Sentiment::Positive, vec![]),
            (Sentiment::Negative, vec![]),
        ];
        for review in reviews {
            match groups.iter_mut().find(|(s, _)| *s == review.sentiment) {
                Some((_, texts)) => texts.push(review.text.as_str()),
                None => groups.push((review.sentiment.clone(), vec![review.text.as_str()])),
            }
        }

        let total = reviews.len();
        let summaries = groups
            .into_iter()
            .map(|(classification, texts)| {
                let ratio = if total == 0 {
                    0.0
                } else {
                    texts.len() as f64 / total as f64
                };
                SentimentSummary {
                    classification,
                    ratio,
                    summary: self.summarizer.summarize(&texts, self.top_n),
                }
            })
            .collect();
        SentimentBreakdown { summaries }
    }
}
