// Runtime settings: server address, model locations and analysis limits.
// Every field has a default so a partial (or missing) YAML file is fine.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub models: ModelSettings,
    pub analysis: AnalysisSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body. Whole extracted documents get posted.
    pub max_body_bytes: usize,
}

pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub dir: PathBuf,
    pub sentiment: String,
    pub summarizer: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            sentiment: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            summarizer: "facebook/bart-large-cnn".to_string(),
        }
    }
}

impl ModelSettings {
    pub fn sentiment_path(&self) -> PathBuf {
        self.dir.join(&self.sentiment)
    }

    pub fn summarizer_path(&self) -> PathBuf {
        self.dir.join(&self.summarizer)
    }

    /// Repository ids in download order.
    pub fn repo_ids(&self) -> Vec<&str> {
        vec![self.sentiment.as_str(), self.summarizer.as_str()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Inputs with at most this many words are returned as their own summary.
    pub summary_word_threshold: usize,
    pub summary_min_length: usize,
    pub summary_max_length: usize,
    pub num_keywords: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            summary_word_threshold: 30,
            summary_min_length: 15,
            summary_max_length: 60,
            num_keywords: 7,
        }
    }
}

impl Settings {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(settings)
    }

    /// Rejects settings the pipelines cannot run with.
    pub fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        if analysis.summary_min_length > analysis.summary_max_length {
            bail!(
                "summary_min_length {} exceeds summary_max_length {}",
                analysis.summary_min_length,
                analysis.summary_max_length
            );
        }
        if analysis.summary_max_length == 0 {
            bail!("summary_max_length must be at least 1");
        }
        if analysis.num_keywords == 0 {
            bail!("num_keywords must be at least 1");
        }
        if self.server.max_body_bytes == 0 {
            bail!("max_body_bytes must be at least 1");
        }
        Ok(())
    }

    /// Loads `path` when given, otherwise falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
