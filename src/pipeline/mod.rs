//! The chunked transcription pipeline.
//!
//! normalize → split → dispatch → assemble, with ordering re-established
//! only at the assembly step via each chunk's start offset.

pub mod assembler;
pub mod chunker;
pub mod dispatcher;
pub mod runner;
pub mod transcriber;
pub mod types;
