// Sentiment classification using a lexicon-based approach.
// Output mirrors a binary SST-2 style classifier: one of two labels plus the
// share of sentiment mass that backs it.
use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use super::SentimentClassifier;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f32,
}

// Positive words lexicon
static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "good", "great", "excellent", "wonderful", "fantastic", "amazing", "awesome",
        "love", "loved", "happy", "joy", "pleased", "delighted", "satisfied", "perfect",
        "beautiful", "brilliant", "outstanding", "superb", "magnificent", "marvelous",
        "terrific", "fabulous", "exceptional", "impressive", "remarkable", "best",
        "better", "positive", "advantage", "benefit", "beneficial", "success", "successful",
        "win", "winner", "winning", "accomplished", "achievement", "triumph",
        "enjoy", "pleasant", "comfortable", "excited", "exciting", "thrilled",
        "approve", "approved", "approval", "like", "liked", "favorite", "prefer",
        "support", "supportive", "helpful", "fair", "clear", "effective", "efficient",
        "improve", "improved", "improvement", "welcome", "thank", "thanks", "grateful",
    ]
    .iter()
    .copied()
    .collect()
});

// Negative words lexicon
static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse",
        "hate", "angry", "sad", "upset", "disappointed", "dissatisfied", "unhappy",
        "fail", "failure", "failed", "problem", "issue", "wrong", "error",
        "difficult", "hard", "tough", "struggle", "struggling", "broken",
        "pain", "painful", "hurt", "hurting", "damage", "damaged", "disaster",
        "negative", "loss", "lose", "losing", "lost", "defeat", "defeated",
        "reject", "rejected", "rejection", "dislike", "disliked", "unpleasant",
        "uncomfortable", "disappointing", "frustrate", "frustrated", "frustrating",
        "unfair", "confusing", "useless", "harmful", "burden", "expensive", "oppose",
        "concern", "concerned", "worried", "waste", "slow", "unclear", "ineffective",
    ]
    .iter()
    .copied()
    .collect()
});

// Intensifiers
static INTENSIFIERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["very", "extremely", "absolutely", "really", "incredibly", "highly", "totally"]
        .iter()
        .copied()
        .collect()
});

// Negation words
static NEGATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "not", "no", "never", "nothing", "nobody", "nowhere", "neither", "nor", "none",
        "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't", "can't", "won't",
    ]
    .iter()
    .copied()
    .collect()
});

pub const DEFAULT_NEGATIVE_LABEL: &str = "NEGATIVE";
pub const DEFAULT_POSITIVE_LABEL: &str = "POSITIVE";

#[derive(Debug, Deserialize)]
struct ModelConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    negative_label: String,
    positive_label: String,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::with_labels(DEFAULT_NEGATIVE_LABEL, DEFAULT_POSITIVE_LABEL)
    }
}

impl LexiconClassifier {
    pub fn with_labels(negative: &str, positive: &str) -> Self {
        Self {
            negative_label: negative.to_string(),
            positive_label: positive.to_string(),
        }
    }

    /// Builds a classifier whose labels come from the model directory's
    /// `config.json`. A missing directory falls back to the default labels;
    /// a present but unreadable config is an error.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let config_path = model_dir.join("config.json");
        if !config_path.exists() {
            warn!(
                "no sentiment model config at {}, using default labels",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: ModelConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let negative = config
            .id2label
            .get("0")
            .ok_or_else(|| anyhow!("{} has no label for id 0", config_path.display()))?;
        let positive = config
            .id2label
            .get("1")
            .ok_or_else(|| anyhow!("{} has no label for id 1", config_path.display()))?;

        info!("sentiment labels from {}: {} / {}", config_path.display(), negative, positive);
        Ok(Self::with_labels(negative, positive))
    }

    pub fn labels(&self) -> [&str; 2] {
        [self.negative_label.as_str(), self.positive_label.as_str()]
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment> {
        let (positive_score, negative_score) = score_text(text);
        let total_score = positive_score + negative_score;

        let sentiment = if total_score == 0.0 {
            Sentiment {
                label: self.positive_label.clone(),
                score: 0.5,
            }
        } else if positive_score >= negative_score {
            Sentiment {
                label: self.positive_label.clone(),
                score: positive_score / total_score,
            }
        } else {
            Sentiment {
                label: self.negative_label.clone(),
                score: negative_score / total_score,
            }
        };

        Ok(sentiment)
    }
}

/// Returns the (positive, negative) sentiment mass of `text`.
fn score_text(text: &str) -> (f32, f32) {
    let words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    let mut positive_score = 0.0;
    let mut negative_score = 0.0;

    for (i, word) in words.iter().enumerate() {
        let mut multiplier = 1.0;

        if i > 0 && INTENSIFIERS.contains(words[i - 1].as_str()) {
            multiplier = 1.5;
        }

        // Negation reaches back two words so "not very good" still flips.
        let is_negated = (i > 0 && NEGATIONS.contains(words[i - 1].as_str()))
            || (i > 1 && NEGATIONS.contains(words[i - 2].as_str()));

        if POSITIVE_WORDS.contains(word.as_str()) {
            if is_negated {
                negative_score += multiplier;
            } else {
                positive_score += multiplier;
            }
        } else if NEGATIVE_WORDS.contains(word.as_str()) {
            if is_negated {
                positive_score += multiplier;
            } else {
                negative_score += multiplier;
            }
        }
    }

    (positive_score, negative_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn classify(text: &str) -> Sentiment {
        LexiconClassifier::default().classify(text).unwrap()
    }

    #[test]
    fn test_analyze_sentiment_positive() {
        let sentiment = classify("This is a wonderful day! I'm feeling great and happy!");
        assert_eq!(sentiment.label, "POSITIVE");
        assert_eq!(sentiment.score, 1.0);
    }

    #[test]
    fn test_analyze_sentiment_negative() {
        let sentiment = classify("This is terrible and awful. I hate it!");
        assert_eq!(sentiment.label, "NEGATIVE");
        assert!(sentiment.score > 0.5);
    }

    #[test]
    fn test_no_evidence_is_positive_at_half() {
        let sentiment = classify("The sky is blue. The grass is green.");
        assert_eq!(sentiment.label, "POSITIVE");
        assert_eq!(sentiment.score, 0.5);
    }

    #[test]
    fn test_negation_handling() {
        let sentiment = classify("This is not good at all.");
        assert_eq!(sentiment.label, "NEGATIVE");
    }

    #[test]
    fn test_intensifier_outweighs_plain_word() {
        // "very good" = 1.5 positive against 1.0 negative
        let sentiment = classify("very good but slow");
        assert_eq!(sentiment.label, "POSITIVE");
        assert!((sentiment.score - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_score_always_in_unit_interval() {
        for text in ["", "bad bad good", "great", "not not not", "!!!"] {
            let sentiment = classify(text);
            assert!((0.0..=1.0).contains(&sentiment.score), "{text}");
        }
    }

    #[test]
    fn test_load_labels_from_model_config() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("config.json"),
            r#"{"id2label": {"0": "NEG", "1": "POS"}, "architectures": ["X"]}"#,
        )?;

        let classifier = LexiconClassifier::load(dir.path())?;
        assert_eq!(classifier.labels(), ["NEG", "POS"]);
        assert_eq!(classifier.classify("awful")?.label, "NEG");
        Ok(())
    }

    #[test]
    fn test_load_without_model_uses_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let classifier = LexiconClassifier::load(&dir.path().join("missing"))?;
        assert_eq!(classifier.labels(), ["NEGATIVE", "POSITIVE"]);
        Ok(())
    }

    #[test]
    fn test_load_config_missing_labels_is_error() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("config.json"), r#"{"id2label": {"0": "NEG"}}"#)?;
        assert!(LexiconClassifier::load(dir.path()).is_err());
        Ok(())
    }
}
