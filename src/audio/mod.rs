//! Canonical audio representation and decoding.

pub mod buffer;
pub mod decode;
pub mod wav;
