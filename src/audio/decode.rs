//! Format normalization: arbitrary container in, canonical buffer out.
//!
//! WAV input is parsed directly. Anything else is converted by `ffmpeg`
//! into an intermediate canonical WAV inside the run's scratch directory;
//! the caller owns scratch cleanup.

use crate::audio::buffer::AudioBuffer;
use crate::audio::wav::read_wav_file;
use crate::defaults::SAMPLE_RATE;
use crate::error::{KathaError, Result};
use std::path::Path;
use std::process::Command;

/// Decode `input` into a canonical mono buffer.
///
/// Fails with [`KathaError::Decode`] if the input cannot be parsed as
/// audio; this is the only error that aborts a pipeline run.
pub fn normalize(input: &Path, scratch_dir: &Path) -> Result<AudioBuffer> {
    if !input.is_file() {
        return Err(decode_error(input, "input file does not exist"));
    }

    if has_extension(input, "wav") {
        return read_wav_file(input).map_err(|e| decode_error(input, &e.to_string()));
    }

    let canonical = scratch_dir.join("normalized.wav");
    convert_to_wav(input, &canonical)?;
    read_wav_file(&canonical).map_err(|e| decode_error(input, &e.to_string()))
}

/// Convert any container `ffmpeg` understands into a canonical WAV file.
fn convert_to_wav(input: &Path, output: &Path) -> Result<()> {
    let result = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(input)
        .args(["-ac", "1", "-ar", &SAMPLE_RATE.to_string(), "-f", "wav"])
        .arg(output)
        .output();

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let detail = stderr.lines().last().unwrap_or("unknown ffmpeg failure");
            Err(decode_error(input, &format!("ffmpeg failed: {detail}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(decode_error(
            input,
            "ffmpeg not found (required for non-WAV input)",
        )),
        Err(e) => Err(decode_error(input, &format!("failed to run ffmpeg: {e}"))),
    }
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}

fn decode_error(path: &Path, message: &str) -> KathaError {
    KathaError::Decode {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}
