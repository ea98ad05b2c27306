//! Shared event rendering for terminal output.
//!
//! The transcript cannot express why a chunk contributed nothing, so the
//! distinction between failure kinds lives here: every diagnostic carries
//! the chunk offset so a failed chunk can be reprocessed later.

use std::io::{self, Write};

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Render a chunk offset as seconds, e.g. `29.5s`, `59s`.
pub fn format_offset(offset_ms: u64) -> String {
    if offset_ms % 1000 == 0 {
        format!("{}s", offset_ms / 1000)
    } else {
        format!("{:.1}s", offset_ms as f64 / 1000.0)
    }
}

/// Announce the start of a dispatch round.
pub fn run_started(chunk_count: usize, worker_count: usize) {
    eprintln!("{DIM}transcribing {chunk_count} chunks with {worker_count} workers{RESET}");
}

/// A chunk produced text.
pub fn chunk_done(offset_ms: u64) {
    eprintln!("{GREEN}✓{RESET} chunk {} transcribed", format_offset(offset_ms));
}

/// The recognizer found no speech in a chunk.
pub fn chunk_no_speech(offset_ms: u64) {
    eprintln!(
        "{DIM}-{RESET} chunk {}: no speech detected",
        format_offset(offset_ms)
    );
}

/// The external recognizer failed for a chunk (network, quota, bad response).
pub fn chunk_service_error(offset_ms: u64, message: &str) {
    eprintln!(
        "{YELLOW}✗{RESET} chunk {}: service error - {message}",
        format_offset(offset_ms)
    );
}

/// A chunk failed in a way the transcriber did not anticipate.
pub fn chunk_unexpected(offset_ms: u64, message: &str) {
    eprintln!(
        "{RED}✗{RESET} chunk {}: error - {message}",
        format_offset(offset_ms)
    );
}

/// A chunk transcription panicked and was dropped at the dispatcher boundary.
pub fn chunk_panicked(offset_ms: u64) {
    eprintln!(
        "{RED}✗{RESET} chunk {}: worker panicked, result dropped",
        format_offset(offset_ms)
    );
}

/// Print the finished transcript between rules, like the run summary.
pub fn print_transcript(transcript: &str) {
    let mut stdout = io::stdout().lock();
    // Ignore broken pipes on the summary path
    let _ = writeln!(stdout, "{DIM}--- transcription complete ---{RESET}");
    let _ = writeln!(stdout, "{transcript}");
    let _ = writeln!(stdout, "{DIM}------------------------------{RESET}");
}
