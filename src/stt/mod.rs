//! Speech-to-text collaborator boundary.

pub mod recognizer;
pub mod remote;

pub use recognizer::{MockRecognizer, SpeechToText, SttError};
pub use remote::RemoteRecognizer;
