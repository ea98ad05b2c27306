//! Default configuration constants for katha.
//!
//! Shared across the pipeline, service, and CLI so the three surfaces
//! cannot drift apart.

/// Canonical audio sample rate in Hz.
///
/// 16kHz mono is the standard input for speech recognition and keeps
/// chunk scratch files small.
pub const SAMPLE_RATE: u32 = 16000;

/// Default chunk window length in milliseconds (30 seconds).
///
/// Smaller chunks parallelize better but cost more recognizer calls.
pub const CHUNK_LENGTH_MS: u64 = 30_000;

/// Default overlap between consecutive chunks in milliseconds.
///
/// The overlap exists so words spoken across a chunk boundary are not
/// truncated in both neighbors. Words inside the overlapped region may
/// be transcribed twice; see the chunker docs.
pub const OVERLAP_MS: u64 = 500;

/// Default number of concurrent transcription workers.
///
/// Workers block on the network-bound recognizer call, so this bounds
/// in-flight requests rather than CPU use. 4-8 is the useful range.
pub const WORKER_COUNT: usize = 4;

/// Leading window profiled for the per-chunk noise floor, in milliseconds.
///
/// Set to 0 to disable calibration entirely.
pub const NOISE_CALIBRATION_MS: u64 = 200;

/// Container extensions accepted at the service boundary.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg", "flac"];

/// Suffix appended to the input's base name for the persisted transcript.
pub const TRANSCRIPT_SUFFIX: &str = "_transcription.txt";

/// Default dataset cache freshness window in seconds (one hour).
pub const DATASET_MAX_AGE_SECS: u64 = 3600;

/// Default maximum upload size accepted by the service, in bytes (500 MB).
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;
