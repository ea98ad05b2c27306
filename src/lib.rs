//! katha - Parallel chunked transcription for long audio recordings
//!
//! Splits a recording into overlapping time windows, transcribes them
//! concurrently against an external speech-to-text service, and
//! reassembles the results into an ordered transcript.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod defaults;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod service;
pub mod stt;

// Core pipeline
pub use pipeline::runner::{PipelineConfig, PipelineOutput, run_pipeline};
pub use pipeline::types::{Chunk, ChunkResult};

// Collaborator seam (real backend + mock)
pub use stt::recognizer::{MockRecognizer, SpeechToText, SttError};
pub use stt::remote::RemoteRecognizer;

// Error handling
pub use error::{KathaError, Result};

// Config
pub use config::Config;
