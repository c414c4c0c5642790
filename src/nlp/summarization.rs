// Text summarization using an extractive approach.
// Sentences are scored by content-word frequency and picked until a word
// budget derived from the requested min/max lengths is spent.
use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use super::Summarizer;

static SENTENCE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+(?:[.!?]+|$)").unwrap());

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z0-9']+").unwrap());

// Common stop words to filter out when scoring sentences
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
        "has", "he", "in", "is", "it", "its", "of", "on", "that", "the",
        "to", "was", "will", "with", "this", "but", "they", "have",
        "had", "what", "when", "where", "who", "which", "why", "how",
    ]
    .iter()
    .copied()
    .collect()
});

#[derive(Debug, Clone, Default)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }
}

impl Summarizer for ExtractiveSummarizer {
    fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> Result<String> {
        if min_length > max_length {
            bail!("summary min_length {} exceeds max_length {}", min_length, max_length);
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            bail!("no content to summarize");
        }

        // Half the input, kept inside [min, max] and strictly below the input length.
        let budget = (words.len() / 2)
            .clamp(min_length, max_length)
            .min(words.len() - 1)
            .max(1);

        let sentences: Vec<&str> = SENTENCE_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .collect();

        if sentences.is_empty() {
            return Ok(words[..budget].join(" "));
        }

        let ranked = rank_sentences(&sentences);

        let mut selected: Vec<usize> = Vec::new();
        let mut used = 0;
        for &(idx, _) in &ranked {
            let len = sentences[idx].split_whitespace().count();
            if len > 0 && used + len <= budget {
                selected.push(idx);
                used += len;
            }
        }

        if used >= min_length.min(budget) && !selected.is_empty() {
            // Sort selected sentences by their original order
            selected.sort();
            let summary = selected
                .iter()
                .map(|&idx| sentences[idx])
                .collect::<Vec<_>>()
                .join(" ");
            if summary.len() < text.len() {
                return Ok(summary);
            }
        }

        // Sentences too long for the budget: cut the best-ranked material instead.
        let truncated: Vec<&str> = ranked
            .iter()
            .flat_map(|&(idx, _)| sentences[idx].split_whitespace())
            .take(budget)
            .collect();
        Ok(truncated.join(" "))
    }
}

/// Sentence indices ordered by descending score; ties keep document order.
fn rank_sentences(sentences: &[&str]) -> Vec<(usize, f32)> {
    // Calculate word frequencies (excluding stop words)
    let mut word_freq: HashMap<String, usize> = HashMap::new();
    for sentence in sentences {
        for word in WORD_PATTERN.find_iter(sentence) {
            let word_str = word.as_str().to_lowercase();
            if !STOP_WORDS.contains(word_str.as_str()) && word_str.len() > 2 {
                *word_freq.entry(word_str).or_insert(0) += 1;
            }
        }
    }

    let max_freq = word_freq.values().max().copied().unwrap_or(1) as f32;

    let mut scores: Vec<(usize, f32)> = sentences
        .iter()
        .enumerate()
        .map(|(idx, sentence)| {
            let words: Vec<_> = WORD_PATTERN.find_iter(sentence).collect();
            let mut score: f32 = words
                .iter()
                .filter_map(|w| word_freq.get(&w.as_str().to_lowercase()))
                .map(|&freq| freq as f32 * 100.0 / max_freq)
                .sum();

            // Normalize by sentence length to avoid bias toward long sentences
            if !words.is_empty() {
                score /= words.len() as f32;
            }

            // Opening sentences tend to carry the key point
            if idx == 0 {
                score *= 1.5;
            }
            (idx, score)
        })
        .collect();

    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_TEXT: &str = "Natural language processing is a field of artificial intelligence \
        that focuses on the interaction between computers and humans through \
        natural language. The ultimate objective of NLP is to read, decipher, \
        understand, and make sense of the human languages in a manner that is valuable. \
        NLP combines computational linguistics with statistical models and machine learning. \
        Applications include translation, sentiment analysis, and chatbots.";

    fn word_count(s: &str) -> usize {
        s.split_whitespace().count()
    }

    #[test]
    fn test_summarize_text_content() {
        let summary = ExtractiveSummarizer::new().summarize(LONG_TEXT, 15, 60).unwrap();
        assert!(!summary.is_empty());
        assert!(summary.len() < LONG_TEXT.len());
        let words = word_count(&summary);
        assert!(words >= 15 && words <= 60, "{words} words: {summary}");
    }

    #[test]
    fn test_selected_sentences_keep_document_order() {
        let summary = ExtractiveSummarizer::new().summarize(LONG_TEXT, 15, 60).unwrap();
        if let (Some(a), Some(b)) = (summary.find("Natural"), summary.find("NLP combines")) {
            assert!(a < b);
        }
    }

    #[test]
    fn test_single_long_sentence_is_truncated() {
        let text = (0..45).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let summary = ExtractiveSummarizer::new().summarize(&text, 15, 60).unwrap();
        assert_eq!(word_count(&summary), 22);
        assert!(text.starts_with(&summary));
    }

    #[test]
    fn test_budget_is_capped_at_max_length() {
        let sentence = "The committee reviewed the proposal for the new public transit line carefully. ";
        let text = sentence.repeat(30);
        let summary = ExtractiveSummarizer::new().summarize(&text, 15, 60).unwrap();
        assert!(word_count(&summary) <= 60);
        assert!(word_count(&summary) >= 15);
    }

    #[test]
    fn test_text_without_sentence_characters() {
        let text = "... ".repeat(40);
        let summary = ExtractiveSummarizer::new().summarize(&text, 15, 60).unwrap();
        assert_eq!(word_count(&summary), 20);
        assert!(summary.len() < text.len());
    }

    #[test]
    fn test_summarize_empty_text() {
        assert!(ExtractiveSummarizer::new().summarize("   ", 15, 60).is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(ExtractiveSummarizer::new().summarize(LONG_TEXT, 60, 15).is_err());
    }
}
