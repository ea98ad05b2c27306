//! JSON message protocol between the web front end and the service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Requests sent by the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Transcribe an uploaded audio file. `path` points at the upload on
    /// local disk; the service deletes it once the run finishes.
    Transcribe { path: PathBuf },
    /// Resolve a previously persisted transcript by its base name.
    Download { name: String },
    /// Service readiness check.
    Status,
}

impl Request {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Responses sent back to the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Transcription finished. `download` is the transcript's base name,
    /// resolvable later through [`Request::Download`].
    Transcript { text: String, download: String },
    /// A persisted transcript resolved to a local file.
    File { path: PathBuf },
    /// Service status.
    Status { ready: bool, recognizer: String },
    /// The request failed.
    Error { message: String },
}

impl Response {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
