// NLP pipelines for PolicyPulse
pub mod keywords;
pub mod sentiment;
pub mod stopwords;
pub mod summarization;

use anyhow::Result;

pub use keywords::KeywordExtractor;
pub use sentiment::{LexiconClassifier, Sentiment};
pub use summarization::ExtractiveSummarizer;

/// Assigns one label from a fixed set plus a confidence in [0, 1].
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Sentiment>;
}

/// Produces a summary of roughly `min_length..=max_length` words.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> Result<String>;
}
