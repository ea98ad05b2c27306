//! TOML configuration for the pipeline, service, and dataset mirror.

use crate::defaults;
use crate::error::{KathaError, Result};
use crate::pipeline::runner::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineSection,
    pub stt: SttSection,
    pub service: ServiceSection,
    pub dataset: DatasetSection,
}

/// Chunking and dispatch parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineSection {
    pub chunk_length_ms: u64,
    pub overlap_ms: u64,
    pub worker_count: usize,
    pub noise_calibration_ms: u64,
}

/// External speech-to-text collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttSection {
    /// HTTP endpoint accepting WAV bodies.
    pub endpoint: String,
    /// Language hint forwarded to the recognizer, if any.
    pub language: Option<String>,
}

/// Service boundary for the web front end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceSection {
    /// Unix socket path; derived from the runtime dir when unset.
    pub socket: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub max_upload_bytes: u64,
}

/// Remote dataset mirror.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetSection {
    pub url: Option<String>,
    pub cache_file: PathBuf,
    pub max_age_secs: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            chunk_length_ms: defaults::CHUNK_LENGTH_MS,
            overlap_ms: defaults::OVERLAP_MS,
            worker_count: defaults::WORKER_COUNT,
            noise_calibration_ms: defaults::NOISE_CALIBRATION_MS,
        }
    }
}

impl Default for SttSection {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8085/transcribe".to_string(),
            language: None,
        }
    }
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            socket: None,
            output_dir: PathBuf::from("outputs"),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
        }
    }
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            url: None,
            cache_file: PathBuf::from("dataset_cache.xlsx"),
            max_age_secs: defaults::DATASET_MAX_AGE_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields use default values; invalid TOML is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|_| KathaError::ConfigFileNotFound {
                path: path.display().to_string(),
            })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, or return defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Default location: `~/.config/katha/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("katha")
            .join("config.toml")
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.chunk_length_ms == 0 {
            return Err(invalid("pipeline.chunk_length_ms", "must be positive"));
        }
        if self.pipeline.overlap_ms >= self.pipeline.chunk_length_ms {
            return Err(invalid(
                "pipeline.overlap_ms",
                "must be smaller than chunk_length_ms",
            ));
        }
        if self.pipeline.worker_count == 0 {
            return Err(invalid("pipeline.worker_count", "must be at least 1"));
        }
        Ok(())
    }

    /// Pipeline parameters for one run; persistence is decided per call.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            chunk_length_ms: self.pipeline.chunk_length_ms,
            overlap_ms: self.pipeline.overlap_ms,
            worker_count: self.pipeline.worker_count,
            noise_calibration_ms: self.pipeline.noise_calibration_ms,
            persist_to: None,
        }
    }
}

fn invalid(key: &str, message: &str) -> KathaError {
    KathaError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
