//! Pipeline façade: normalize → split → dispatch → assemble.

use crate::audio::decode;
use crate::defaults;
use crate::error::{KathaError, Result};
use crate::output;
use crate::pipeline::transcriber::ChunkTranscriber;
use crate::pipeline::{assembler, chunker, dispatcher};
use crate::stt::recognizer::SpeechToText;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Parameters for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Window size per chunk in milliseconds.
    pub chunk_length_ms: u64,
    /// Overlap between consecutive windows in milliseconds.
    pub overlap_ms: u64,
    /// Concurrency bound for the dispatcher.
    pub worker_count: usize,
    /// Leading window profiled per chunk for the noise floor; 0 disables.
    pub noise_calibration_ms: u64,
    /// Optional destination for the transcript as UTF-8 text.
    pub persist_to: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_length_ms: defaults::CHUNK_LENGTH_MS,
            overlap_ms: defaults::OVERLAP_MS,
            worker_count: defaults::WORKER_COUNT,
            noise_calibration_ms: defaults::NOISE_CALIBRATION_MS,
            persist_to: None,
        }
    }
}

/// Outcome of a successful run.
///
/// Persistence failure does not invalidate a successful transcription:
/// the transcript is always present here, and a failed save is reported
/// next to it instead of replacing it.
#[derive(Debug)]
pub struct PipelineOutput {
    pub transcript: String,
    pub persist_error: Option<KathaError>,
}

/// Transcribe `input` end to end.
///
/// Only decoding failures (and invalid chunking parameters) abort the
/// run. Per-chunk failures degrade to gaps in the transcript: the caller
/// receives either a complete transcript, possibly with gaps, or a
/// single fatal error — never a list of failed chunks.
pub fn run_pipeline(
    input: &Path,
    recognizer: Arc<dyn SpeechToText>,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    // Scratch holds the canonical WAV and per-chunk files; the guard
    // removes all of it on success and failure paths alike.
    let scratch = ScratchDir::create()?;

    let buffer = Arc::new(decode::normalize(input, scratch.path())?);
    let chunks = chunker::split(&buffer, config.chunk_length_ms, config.overlap_ms)?;

    let worker_count = config.worker_count.max(1);
    output::run_started(chunks.len(), worker_count.min(chunks.len().max(1)));

    let transcriber = ChunkTranscriber::new(recognizer, scratch.path().to_path_buf())
        .with_calibration_ms(config.noise_calibration_ms);
    let results = dispatcher::run(chunks, worker_count, |chunk| transcriber.transcribe(chunk));

    let transcript = assembler::assemble(results);

    let persist_error = config
        .persist_to
        .as_deref()
        .and_then(|path| persist(path, &transcript).err());

    Ok(PipelineOutput {
        transcript,
        persist_error,
    })
}

/// Write the transcript as UTF-8 text.
fn persist(path: &Path, transcript: &str) -> Result<()> {
    std::fs::write(path, transcript).map_err(|e| KathaError::Persist {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Per-run scratch directory, removed on drop.
///
/// Named from the process id and a timestamp so concurrent runs in the
/// same process tree never share scratch space.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create() -> Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let path = std::env::temp_dir().join(format!("katha-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            eprintln!(
                "katha: failed to remove scratch directory {}: {e}",
                self.path.display()
            );
        }
    }
}
