//! Bounded worker pool running chunk transcriptions concurrently.
//!
//! All chunks are submitted up front on a shared job channel; each
//! worker pulls one chunk at a time and calls the transcriber
//! synchronously, blocking on the network-bound recognizer call.
//! Completions are collected in whatever order they finish — ordering is
//! re-established later by the assembler, never here.

use crate::output;
use crate::pipeline::types::{Chunk, ChunkResult};
use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// Run `transcribe` over every chunk with at most `worker_count` workers.
///
/// Returns one result per chunk, unordered, once every submitted chunk
/// has reported; there is no partial or early return. A transcription
/// that panics past the transcriber's own handling is caught here,
/// logged, and dropped — its siblings are unaffected, so the returned
/// set may be smaller than the input.
pub fn run<F>(chunks: Vec<Chunk>, worker_count: usize, transcribe: F) -> Vec<ChunkResult>
where
    F: Fn(&Chunk) -> ChunkResult + Sync,
{
    if chunks.is_empty() {
        return Vec::new();
    }
    let worker_count = worker_count.clamp(1, chunks.len());

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<Chunk>();
    for chunk in chunks {
        // Receiver outlives this loop, send cannot fail
        let _ = job_tx.send(chunk);
    }
    drop(job_tx);

    let (result_tx, result_rx) = crossbeam_channel::unbounded::<ChunkResult>();
    let transcribe = &transcribe;

    thread::scope(|scope| {
        for _ in 0..worker_count {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok(chunk) = job_rx.recv() {
                    let offset_ms = chunk.offset_ms();
                    match panic::catch_unwind(AssertUnwindSafe(|| transcribe(&chunk))) {
                        Ok(result) => {
                            let _ = result_tx.send(result);
                        }
                        Err(_) => output::chunk_panicked(offset_ms),
                    }
                }
            });
        }
    });
    drop(result_tx);

    result_rx.iter().collect()
}
