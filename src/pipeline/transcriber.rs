//! Transcribes a single chunk; the per-chunk failure domain.
//!
//! `transcribe` never fails: every failure mode degrades to an empty
//! result so one bad chunk cannot take down the run. The chunk is
//! materialized as a uniquely-named scratch WAV for the recognizer and
//! removed on every exit path by an RAII guard.

use crate::audio::wav::write_wav;
use crate::defaults;
use crate::output;
use crate::pipeline::types::{Chunk, ChunkResult};
use crate::stt::recognizer::{SpeechToText, SttError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How a chunk failed, for diagnostics only; the result set cannot
/// express the difference.
enum ChunkFailure {
    NoSpeech,
    Service(String),
    Unexpected(String),
}

/// Transcriber for one chunk at a time.
///
/// Shared read-only across dispatcher workers; all per-call state lives
/// on the stack or in the scratch directory.
pub struct ChunkTranscriber {
    recognizer: Arc<dyn SpeechToText>,
    scratch_dir: PathBuf,
    calibration_ms: u64,
}

impl ChunkTranscriber {
    pub fn new(recognizer: Arc<dyn SpeechToText>, scratch_dir: PathBuf) -> Self {
        Self {
            recognizer,
            scratch_dir,
            calibration_ms: defaults::NOISE_CALIBRATION_MS,
        }
    }

    /// Override the leading window profiled for the noise floor.
    /// Zero disables calibration.
    pub fn with_calibration_ms(mut self, calibration_ms: u64) -> Self {
        self.calibration_ms = calibration_ms;
        self
    }

    /// Transcribe one chunk. Never fails; failures become empty results.
    pub fn transcribe(&self, chunk: &Chunk) -> ChunkResult {
        let offset_ms = chunk.offset_ms();
        match self.try_transcribe(chunk) {
            Ok(text) => {
                output::chunk_done(offset_ms);
                ChunkResult::new(offset_ms, text)
            }
            Err(ChunkFailure::NoSpeech) => {
                output::chunk_no_speech(offset_ms);
                ChunkResult::empty(offset_ms)
            }
            Err(ChunkFailure::Service(message)) => {
                output::chunk_service_error(offset_ms, &message);
                ChunkResult::empty(offset_ms)
            }
            Err(ChunkFailure::Unexpected(message)) => {
                output::chunk_unexpected(offset_ms, &message);
                ChunkResult::empty(offset_ms)
            }
        }
    }

    fn try_transcribe(&self, chunk: &Chunk) -> Result<String, ChunkFailure> {
        let noise_floor = noise_floor(chunk.samples(), chunk.sample_rate(), self.calibration_ms);

        let scratch = ScratchWav::create(
            &self.scratch_dir,
            chunk.offset_ms(),
            chunk.samples(),
            chunk.sample_rate(),
        )
        .map_err(|e| ChunkFailure::Unexpected(e.to_string()))?;

        match self.recognizer.recognize(scratch.path(), noise_floor) {
            Ok(text) => Ok(text),
            Err(SttError::NoSpeech) => Err(ChunkFailure::NoSpeech),
            Err(SttError::Service { message }) => Err(ChunkFailure::Service(message)),
        }
    }
}

/// Scratch WAV file with guaranteed removal.
///
/// Named by chunk offset, which is unique per run, so concurrent workers
/// never collide inside the shared scratch directory.
struct ScratchWav {
    path: PathBuf,
}

impl ScratchWav {
    fn create(
        dir: &Path,
        offset_ms: u64,
        samples: &[i16],
        sample_rate: u32,
    ) -> crate::error::Result<Self> {
        let path = dir.join(format!("chunk_{offset_ms}.wav"));
        write_wav(&path, samples, sample_rate)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchWav {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            eprintln!("katha: failed to remove scratch file {}: {e}", self.path.display());
        }
    }
}

/// RMS of the chunk's leading window, normalized to 0.0..1.0.
///
/// A cheap local profile the recognizer can use as an energy threshold
/// hint; computed per chunk, no retries, `None` when disabled.
fn noise_floor(samples: &[i16], sample_rate: u32, window_ms: u64) -> Option<f32> {
    if window_ms == 0 || samples.is_empty() {
        return None;
    }
    let window = ((window_ms * sample_rate as u64 / 1000) as usize).min(samples.len());
    let sum_squares: f64 = samples[..window]
        .iter()
        .map(|&s| {
            let normalized = s as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();
    Some((sum_squares / window as f64).sqrt() as f32)
}
