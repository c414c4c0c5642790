// Model provisioning: mirrors Hugging Face model snapshots into the local
// models directory so the service can start without network access.
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde::Deserialize;

use crate::config::ModelSettings;

pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

#[derive(Debug, Deserialize)]
struct ModelInfo {
    #[serde(default)]
    siblings: Vec<Sibling>,
}

#[derive(Debug, Deserialize)]
struct Sibling {
    rfilename: String,
}

pub struct ModelFetcher {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl ModelFetcher {
    /// Honors `HF_ENDPOINT` and `HF_TOKEN` like the Hugging Face tooling does.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("HF_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let token = std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty());
        Self::new(&endpoint, token)
    }

    pub fn new(endpoint: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn list_files(&self, repo_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/api/models/{}", self.endpoint, repo_id);
        let response = self
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;
        if !response.status().is_success() {
            bail!("listing {} failed with status {}", repo_id, response.status());
        }
        let info: ModelInfo = response.json().await?;
        Ok(info.siblings.into_iter().map(|s| s.rfilename).collect())
    }

    /// Streams one file to `dest`, returning the number of bytes written.
    pub async fn download_file(&self, repo_id: &str, file: &str, dest: &Path) -> Result<u64> {
        let url = format!("{}/{}/resolve/main/{}", self.endpoint, repo_id, file);
        let mut response = self
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;
        if !response.status().is_success() {
            bail!("downloading {} failed with status {}", url, response.status());
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let partial = PathBuf::from(format!("{}.part", dest.display()));

        let pb = match response.content_length() {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::no_length(),
        };
        pb.set_style(
            ProgressStyle::with_template("{msg} {wide_bar} {bytes}/{total_bytes}")?
                .progress_chars("=>-"),
        );
        pb.set_message(file.to_string());

        let mut out = File::create(&partial)?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk)?;
            written += chunk.len() as u64;
            pb.set_position(written);
        }
        out.flush()?;
        drop(out);
        fs::rename(&partial, dest)?;
        pb.finish_and_clear();
        Ok(written)
    }

    /// Downloads every file of `repo_id` into `local_dir`. Files already
    /// present are kept unless `force` is set. Returns how many were fetched.
    pub async fn snapshot_download(&self, repo_id: &str, local_dir: &Path, force: bool) -> Result<usize> {
        let files = self.list_files(repo_id).await?;
        let mut fetched = 0;
        for file in files {
            let dest = local_path_for(local_dir, &file)?;
            if dest.exists() && !force {
                info!("{} already present, skipping", dest.display());
                continue;
            }
            let bytes = self.download_file(repo_id, &file, &dest).await?;
            info!("downloaded {} ({} bytes)", dest.display(), bytes);
            fetched += 1;
        }
        Ok(fetched)
    }
}

/// Resolves a repository file name under `local_dir`, refusing absolute
/// paths and parent-directory components.
pub fn local_path_for(local_dir: &Path, file: &str) -> Result<PathBuf> {
    let relative = Path::new(file);
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if file.is_empty() || !safe {
        return Err(anyhow!("refusing unsafe repository path {:?}", file));
    }
    Ok(local_dir.join(relative))
}

pub async fn fetch_models(fetcher: &ModelFetcher, models: &ModelSettings, force: bool) -> Result<()> {
    for repo_id in models.repo_ids() {
        println!("Downloading {}...", repo_id);
        let local_dir = models.dir.join(repo_id);
        let fetched = fetcher.snapshot_download(repo_id, &local_dir, force).await?;
        println!("Finished downloading {} ({} files).", repo_id, fetched);
    }
    println!("\nAll models downloaded successfully!");
    Ok(())
}
