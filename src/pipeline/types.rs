//! Shared pipeline data types.

use crate::audio::buffer::AudioBuffer;
use std::ops::Range;
use std::sync::Arc;

/// A time-bounded slice of the source audio, the unit of parallel work.
///
/// Chunks are read-only views into one shared [`AudioBuffer`], so
/// concurrent workers never copy or mutate source audio. The start
/// offset is the chunk's identity: unique per run and the sole ordering
/// key at reassembly.
#[derive(Debug, Clone)]
pub struct Chunk {
    offset_ms: u64,
    buffer: Arc<AudioBuffer>,
    range: Range<usize>,
}

impl Chunk {
    pub fn new(offset_ms: u64, buffer: Arc<AudioBuffer>, range: Range<usize>) -> Self {
        debug_assert!(range.end <= buffer.samples().len());
        Self {
            offset_ms,
            buffer,
            range,
        }
    }

    /// Start offset in milliseconds from the beginning of the recording.
    pub fn offset_ms(&self) -> u64 {
        self.offset_ms
    }

    pub fn samples(&self) -> &[i16] {
        &self.buffer.samples()[self.range.clone()]
    }

    pub fn sample_rate(&self) -> u32 {
        self.buffer.sample_rate()
    }

    pub fn duration_ms(&self) -> u64 {
        self.range.len() as u64 * 1000 / self.buffer.sample_rate() as u64
    }
}

/// Outcome of transcribing one chunk.
///
/// Empty text means "no contribution": genuine silence and recovered
/// per-chunk failures are indistinguishable at this layer. The logs keep
/// the distinction.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkResult {
    pub offset_ms: u64,
    pub text: String,
}

impl ChunkResult {
    pub fn new(offset_ms: u64, text: impl Into<String>) -> Self {
        Self {
            offset_ms,
            text: text.into(),
        }
    }

    /// An empty result: the chunk contributes nothing to the transcript.
    pub fn empty(offset_ms: u64) -> Self {
        Self::new(offset_ms, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_exposes_its_slice() {
        let buffer = Arc::new(AudioBuffer::new((0..100).map(|i| i as i16).collect(), 16_000));
        let chunk = Chunk::new(0, buffer, 10..20);
        assert_eq!(chunk.samples(), (10..20).map(|i| i as i16).collect::<Vec<_>>());
    }

    #[test]
    fn chunk_duration_from_range() {
        let buffer = Arc::new(AudioBuffer::new(vec![0; 32_000], 16_000));
        let chunk = Chunk::new(1000, buffer, 16_000..32_000);
        assert_eq!(chunk.duration_ms(), 1000);
        assert_eq!(chunk.offset_ms(), 1000);
    }

    #[test]
    fn chunks_share_one_buffer() {
        let buffer = Arc::new(AudioBuffer::new(vec![7; 1000], 16_000));
        let a = Chunk::new(0, buffer.clone(), 0..600);
        let b = Chunk::new(30, buffer.clone(), 400..1000);
        // Overlapping views over the same allocation
        assert_eq!(Arc::strong_count(&buffer), 3);
        assert_eq!(a.samples()[599], b.samples()[0]);
    }

    #[test]
    fn empty_result_has_no_text() {
        let result = ChunkResult::empty(29_500);
        assert_eq!(result.offset_ms, 29_500);
        assert!(result.text.is_empty());
    }
}
