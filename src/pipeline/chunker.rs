//! Splits canonical audio into overlapping time windows.
//!
//! Windows are emitted in strictly increasing offset order and together
//! cover every sample. Consecutive windows share `overlap_ms` of source
//! time so words at a boundary are not truncated in both neighbors; any
//! word spoken inside the overlap may appear twice in the transcript —
//! that duplication is accepted, not resolved here.

use crate::audio::buffer::AudioBuffer;
use crate::error::{KathaError, Result};
use crate::pipeline::types::Chunk;
use std::sync::Arc;

/// Split `buffer` into overlapping chunks of `chunk_length_ms`.
///
/// The final chunk is clipped to the buffer end and may be shorter than
/// `chunk_length_ms`; a buffer no longer than one window yields exactly
/// one chunk. An empty buffer yields no chunks.
///
/// # Errors
/// Returns [`KathaError::Chunking`] unless `0 <= overlap_ms < chunk_length_ms`.
pub fn split(
    buffer: &Arc<AudioBuffer>,
    chunk_length_ms: u64,
    overlap_ms: u64,
) -> Result<Vec<Chunk>> {
    if chunk_length_ms == 0 {
        return Err(chunking_error("chunk length must be positive"));
    }
    if overlap_ms >= chunk_length_ms {
        return Err(chunking_error(&format!(
            "overlap ({overlap_ms}ms) must be smaller than chunk length ({chunk_length_ms}ms)"
        )));
    }

    let duration_ms = buffer.duration_ms();
    let step_ms = chunk_length_ms - overlap_ms;

    let mut chunks = Vec::new();
    let mut offset_ms = 0;
    while offset_ms < duration_ms {
        let start = buffer.sample_index(offset_ms);
        let end = buffer.sample_index(offset_ms + chunk_length_ms);
        chunks.push(Chunk::new(offset_ms, Arc::clone(buffer), start..end));
        // A window that already reaches the buffer end is the last one;
        // stepping again would emit a redundant tail chunk inside the overlap.
        if offset_ms + chunk_length_ms >= duration_ms {
            break;
        }
        offset_ms += step_ms;
    }

    Ok(chunks)
}

fn chunking_error(message: &str) -> KathaError {
    KathaError::Chunking {
        message: message.to_string(),
    }
}
