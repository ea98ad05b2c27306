//! WAV reading and writing in the canonical format.
//!
//! Arbitrary sample rates and channel counts are accepted on the way in;
//! everything is downmixed to mono and resampled to the canonical rate.

use crate::audio::buffer::AudioBuffer;
use crate::defaults::SAMPLE_RATE;
use crate::error::{KathaError, Result};
use std::io::Read;
use std::path::Path;

/// Read a WAV stream into a canonical [`AudioBuffer`].
pub fn read_wav(reader: Box<dyn Read + Send>) -> Result<AudioBuffer> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| KathaError::Other(format!(
        "Failed to parse WAV data: {e}"
    )))?;

    let spec = wav_reader.spec();
    let source_rate = spec.sample_rate;
    let source_channels = spec.channels.max(1) as usize;

    let raw_samples: Vec<i16> = wav_reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| KathaError::Other(format!("Failed to read WAV samples: {e}")))?;

    let mono_samples = downmix(&raw_samples, source_channels);

    let samples = if source_rate == SAMPLE_RATE {
        mono_samples
    } else {
        resample(&mono_samples, source_rate, SAMPLE_RATE)
    };

    Ok(AudioBuffer::new(samples, SAMPLE_RATE))
}

/// Read a WAV file from disk into a canonical [`AudioBuffer`].
pub fn read_wav_file(path: &Path) -> Result<AudioBuffer> {
    let file = std::fs::File::open(path)?;
    read_wav(Box::new(std::io::BufReader::new(file)))
}

/// Write mono samples as a 16-bit PCM WAV file.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| KathaError::Other(format!("Failed to create WAV file: {e}")))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| KathaError::Other(format!("Failed to write WAV sample: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| KathaError::Other(format!("Failed to finalize WAV file: {e}")))?;
    Ok(())
}

/// Average interleaved frames down to mono.
fn downmix(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
