// Runs every pipeline over one piece of text and assembles the result.
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{AnalysisSettings, ModelSettings};
use crate::nlp::{
    ExtractiveSummarizer, KeywordExtractor, LexiconClassifier, SentimentClassifier, Summarizer,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub sentiment: String,
    pub confidence: f32,
    pub summary: String,
    pub keywords: Vec<String>,
}

/// Pipelines are built once and shared read-only by every request.
#[derive(Clone)]
pub struct Analyzer {
    classifier: Arc<dyn SentimentClassifier>,
    summarizer: Arc<dyn Summarizer>,
    keywords: KeywordExtractor,
    settings: AnalysisSettings,
}

impl Analyzer {
    pub fn new(
        classifier: Arc<dyn SentimentClassifier>,
        summarizer: Arc<dyn Summarizer>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            keywords: KeywordExtractor::new(settings.num_keywords),
            classifier,
            summarizer,
            settings,
        }
    }

    /// Loads the pipelines described by `models`.
    pub fn load(models: &ModelSettings, settings: AnalysisSettings) -> Result<Self> {
        let sentiment_path = models.sentiment_path();
        info!("Loading sentiment analysis model from {}", sentiment_path.display());
        let classifier = LexiconClassifier::load(&sentiment_path)?;
        info!("Sentiment model loaded.");

        info!("Loading summarization model ({})", models.summarizer);
        let summarizer = ExtractiveSummarizer::new();
        info!("Summarization model loaded.");

        Ok(Self::new(Arc::new(classifier), Arc::new(summarizer), settings))
    }

    pub fn analyze(&self, text: &str) -> Result<Analysis> {
        let summary = if text.split_whitespace().count() > self.settings.summary_word_threshold {
            self.summarizer.summarize(
                text,
                self.settings.summary_min_length,
                self.settings.summary_max_length,
            )?
        } else {
            text.to_string()
        };

        let sentiment = self.classifier.classify(text)?;
        let keywords = self.keywords.extract(text);

        Ok(Analysis {
            sentiment: sentiment.label,
            confidence: sentiment.score,
            summary,
            keywords,
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(
            Arc::new(LexiconClassifier::default()),
            Arc::new(ExtractiveSummarizer::new()),
            AnalysisSettings::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::Sentiment;
    use anyhow::anyhow;
    use tempfile::TempDir;

    const LONG_COMMENT: &str = "The proposed zoning change would allow taller buildings near the \
        transit corridor. Residents worry about parking and traffic on narrow streets. \
        Several speakers praised the plan for adding affordable housing units. \
        The council should publish a traffic study before the final vote next month.";

    struct FailingSummarizer;

    impl Summarizer for FailingSummarizer {
        fn summarize(&self, _text: &str, _min: usize, _max: usize) -> Result<String> {
            Err(anyhow!("model exploded"))
        }
    }

    struct FixedClassifier;

    impl SentimentClassifier for FixedClassifier {
        fn classify(&self, _text: &str) -> Result<Sentiment> {
            Ok(Sentiment {
                label: "LABEL_1".to_string(),
                score: 0.99,
            })
        }
    }

    #[test]
    fn test_short_text_is_its_own_summary() -> Result<()> {
        let text = "I love the new bike lanes on Main Street.";
        let analysis = Analyzer::default().analyze(text)?;
        assert_eq!(analysis.summary, text);
        assert_eq!(analysis.sentiment, "POSITIVE");
        Ok(())
    }

    #[test]
    fn test_threshold_is_inclusive() -> Result<()> {
        let text = vec!["word"; 30].join(" ");
        let analysis = Analyzer::default().analyze(&text)?;
        assert_eq!(analysis.summary, text);
        Ok(())
    }

    #[test]
    fn test_long_text_is_summarized() -> Result<()> {
        assert!(LONG_COMMENT.split_whitespace().count() > 30);
        let analysis = Analyzer::default().analyze(LONG_COMMENT)?;
        assert!(!analysis.summary.is_empty());
        assert!(analysis.summary.len() < LONG_COMMENT.len());
        assert!(analysis.keywords.len() <= 7);
        assert_eq!(analysis.keywords[0], "traffic");
        assert!((0.0..=1.0).contains(&analysis.confidence));
        Ok(())
    }

    #[test]
    fn test_summarizer_failure_propagates() {
        let analyzer = Analyzer::new(
            Arc::new(LexiconClassifier::default()),
            Arc::new(FailingSummarizer),
            AnalysisSettings::default(),
        );
        assert!(analyzer.analyze(LONG_COMMENT).is_err());
        // Short input never reaches the summarizer.
        assert!(analyzer.analyze("fine").is_ok());
    }

    #[test]
    fn test_classifier_label_passes_through() -> Result<()> {
        let analyzer = Analyzer::new(
            Arc::new(FixedClassifier),
            Arc::new(ExtractiveSummarizer::new()),
            AnalysisSettings::default(),
        );
        let analysis = analyzer.analyze("anything")?;
        assert_eq!(analysis.sentiment, "LABEL_1");
        assert_eq!(analysis.confidence, 0.99);
        Ok(())
    }

    #[test]
    fn test_load_without_downloaded_models() -> Result<()> {
        let dir = TempDir::new()?;
        let models = ModelSettings {
            dir: dir.path().to_path_buf(),
            ..ModelSettings::default()
        };
        let analyzer = Analyzer::load(&models, AnalysisSettings::default())?;
        assert_eq!(analyzer.analyze("terrible idea")?.sentiment, "NEGATIVE");
        Ok(())
    }

    #[test]
    fn test_serializes_four_fields() -> Result<()> {
        let analysis = Analyzer::default().analyze("Parks parks budget")?;
        let value = serde_json::to_value(&analysis)?;
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        for key in ["sentiment", "confidence", "summary", "keywords"] {
            assert!(obj.contains_key(key));
        }
        Ok(())
    }
}
