//! Local mirror of a remote spreadsheet dataset.
//!
//! Unrelated to the transcription pipeline: a single remote resource is
//! cached on disk and refreshed when the copy is older than a configured
//! age. Freshness is judged purely by the cache file's mtime.

use crate::error::{KathaError, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Cached fetcher for one remote dataset file.
pub struct DatasetMirror {
    url: String,
    cache_path: PathBuf,
    max_age: Duration,
}

impl DatasetMirror {
    pub fn new(url: &str, cache_path: PathBuf, max_age: Duration) -> Self {
        Self {
            url: url.to_string(),
            cache_path,
            max_age,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Whether the cached copy exists and is younger than the max age.
    pub fn is_fresh(&self) -> bool {
        let Ok(metadata) = std::fs::metadata(&self.cache_path) else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        match modified.elapsed() {
            Ok(age) => age < self.max_age,
            // mtime in the future (clock skew); treat as fresh
            Err(_) => true,
        }
    }

    /// Return the local dataset path, downloading a new copy first if the
    /// cached one is missing or stale. A fresh cache never touches the
    /// network.
    pub async fn fetch(&self, progress: bool) -> Result<PathBuf> {
        if self.is_fresh() {
            if progress {
                eprintln!("Dataset cache is fresh: {}", self.cache_path.display());
            }
            return Ok(self.cache_path.clone());
        }

        self.refresh(progress).await?;
        Ok(self.cache_path.clone())
    }

    /// Download the dataset into the cache, replacing any stale copy.
    ///
    /// Streams into a `.part` file and renames into place so a failed
    /// download never clobbers the previous cache.
    async fn refresh(&self, progress: bool) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| fetch_error(format!("Failed to create cache directory: {e}")))?;
        }

        if progress {
            eprintln!("Fetching dataset from {}...", self.url);
        }

        let client = reqwest::Client::new();
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| fetch_error(format!("Failed to start download: {e}")))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!(
                "Download failed with status: {}",
                response.status()
            )));
        }

        let total_size = response.content_length().unwrap_or(0);
        let pb = if progress {
            let pb = ProgressBar::new(total_size);
            pb.set_style(
                // SAFETY: hardcoded template string — always valid
                #[allow(clippy::expect_used)]
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("hardcoded progress bar template")
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let part_path = self.cache_path.with_extension("part");
        let mut stream = response.bytes_stream();
        let mut file = std::fs::File::create(&part_path)
            .map_err(|e| fetch_error(format!("Failed to create cache file: {e}")))?;

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| fetch_error(format!("Failed to read download chunk: {e}")))?;
            file.write_all(&chunk)
                .map_err(|e| fetch_error(format!("Failed to write cache file: {e}")))?;
            if let Some(ref pb) = pb {
                pb.inc(chunk.len() as u64);
            }
        }
        drop(file);

        if let Some(pb) = pb {
            pb.finish_with_message("Downloaded");
        }

        std::fs::rename(&part_path, &self.cache_path)
            .map_err(|e| fetch_error(format!("Failed to move cache into place: {e}")))?;

        if progress {
            eprintln!("Dataset cached to {}", self.cache_path.display());
        }

        Ok(())
    }
}

fn fetch_error(message: String) -> KathaError {
    KathaError::DatasetFetch { message }
}
