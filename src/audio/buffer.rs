//! Canonical decoded audio buffer.

/// Decoded audio in canonical form: mono 16-bit PCM at a known rate.
///
/// Created once per pipeline run and shared read-only between chunks;
/// never mutated after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wrap decoded samples.
    ///
    /// # Panics
    /// Panics if `sample_rate` is zero.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        assert!(sample_rate > 0, "sample rate must be positive");
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total duration in milliseconds, rounded down.
    pub fn duration_ms(&self) -> u64 {
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    /// Convert a millisecond position to a sample index, clamped to the end.
    pub fn sample_index(&self, position_ms: u64) -> usize {
        let index = position_ms * self.sample_rate as u64 / 1000;
        (index as usize).min(self.samples.len())
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
