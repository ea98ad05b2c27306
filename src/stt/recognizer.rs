//! The seam to the external speech-to-text collaborator.

use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Typed failures the collaborator can report for a single chunk.
///
/// Anything else that goes wrong around the call (scratch I/O, panics)
/// is classified as unexpected by the chunk transcriber, not here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SttError {
    /// The collaborator understood the audio but found no speech in it.
    #[error("no recognizable speech in audio")]
    NoSpeech,

    /// The collaborator itself failed: network, quota, malformed response.
    #[error("speech service error: {message}")]
    Service { message: String },
}

/// Trait for speech-to-text recognition over one chunk.
///
/// The caller materializes the chunk as a mono WAV file and hands over
/// the path; implementations decide how to feed it to the actual engine.
pub trait SpeechToText: Send + Sync {
    /// Recognize speech in a mono WAV file.
    ///
    /// # Arguments
    /// * `wav` - Path to a mono 16-bit PCM WAV file of bounded duration
    /// * `noise_floor` - Optional RMS (0.0..1.0) of the chunk's leading
    ///   silence, for engines that accept an energy threshold hint
    fn recognize(&self, wav: &Path, noise_floor: Option<f32>) -> Result<String, SttError>;

    /// Name of the backing engine, for diagnostics.
    fn name(&self) -> &str;
}

/// Implement SpeechToText for Arc<T> to allow sharing across workers.
impl<T: SpeechToText + ?Sized> SpeechToText for Arc<T> {
    fn recognize(&self, wav: &Path, noise_floor: Option<f32>) -> Result<String, SttError> {
        (**self).recognize(wav, noise_floor)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock recognizer for testing.
#[derive(Debug)]
pub struct MockRecognizer {
    name: String,
    response: String,
    failure: Option<SttError>,
    noise_floors: Mutex<Vec<Option<f32>>>,
}

impl MockRecognizer {
    /// Create a mock that answers every call with `"mock transcription"`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            response: "mock transcription".to_string(),
            failure: None,
            noise_floors: Mutex::new(Vec::new()),
        }
    }

    /// Configure the mock to return a specific response.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail every call with the given error.
    pub fn with_failure(mut self, failure: SttError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Noise-floor hints received so far, in call order.
    pub fn seen_noise_floors(&self) -> Vec<Option<f32>> {
        self.noise_floors.lock().unwrap().clone()
    }
}

impl SpeechToText for MockRecognizer {
    fn recognize(&self, _wav: &Path, noise_floor: Option<f32>) -> Result<String, SttError> {
        self.noise_floors.lock().unwrap().push(noise_floor);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.response.clone()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn mock_returns_configured_response() {
        let mock = MockRecognizer::new("test-engine").with_response("hello world");
        let result = mock.recognize(&PathBuf::from("/tmp/chunk_0.wav"), None);
        assert_eq!(result.unwrap(), "hello world");
    }

    #[test]
    fn mock_returns_configured_failure() {
        let mock = MockRecognizer::new("test-engine").with_failure(SttError::NoSpeech);
        let result = mock.recognize(&PathBuf::from("/tmp/chunk_0.wav"), None);
        assert_eq!(result.unwrap_err(), SttError::NoSpeech);
    }

    #[test]
    fn mock_records_noise_floor_hints() {
        let mock = MockRecognizer::new("test-engine");
        let path = PathBuf::from("/tmp/chunk_0.wav");
        mock.recognize(&path, Some(0.01)).unwrap();
        mock.recognize(&path, None).unwrap();
        assert_eq!(mock.seen_noise_floors(), vec![Some(0.01), None]);
    }

    #[test]
    fn trait_is_object_safe() {
        let recognizer: Box<dyn SpeechToText> =
            Box::new(MockRecognizer::new("boxed").with_response("boxed test"));
        assert_eq!(recognizer.name(), "boxed");
        let result = recognizer.recognize(&PathBuf::from("/tmp/x.wav"), None);
        assert_eq!(result.unwrap(), "boxed test");
    }

    #[test]
    fn arc_forwarding_shares_one_mock() {
        let mock = Arc::new(MockRecognizer::new("shared"));
        let as_trait: Arc<dyn SpeechToText> = mock.clone();
        as_trait
            .recognize(&PathBuf::from("/tmp/x.wav"), Some(0.5))
            .unwrap();
        assert_eq!(mock.seen_noise_floors(), vec![Some(0.5)]);
    }

    #[test]
    fn service_error_display() {
        let error = SttError::Service {
            message: "quota exceeded".to_string(),
        };
        assert_eq!(error.to_string(), "speech service error: quota exceeded");
    }
}
