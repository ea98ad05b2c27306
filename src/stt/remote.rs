//! HTTP-backed speech recognizer.
//!
//! Posts the chunk's WAV bytes to a transcription endpoint and decodes a
//! JSON `{"text": "..."}` body. Workers call this synchronously, so the
//! blocking client is used; no request timeout is set here — whatever
//! limit the service enforces is the only budget.

use crate::stt::recognizer::{SpeechToText, SttError};
use serde::Deserialize;
use std::path::Path;

/// Status the endpoint uses to report "understood, but no speech".
const NO_SPEECH_STATUS: u16 = 422;

#[derive(Debug, Deserialize)]
struct RecognizeBody {
    text: String,
}

/// Recognizer that talks to a remote transcription service over HTTP.
pub struct RemoteRecognizer {
    endpoint: String,
    language: Option<String>,
    client: reqwest::blocking::Client,
}

impl RemoteRecognizer {
    /// Create a recognizer for the given endpoint URL.
    pub fn new(endpoint: &str, language: Option<&str>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            language: language.map(str::to_string),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn service_error(message: String) -> SttError {
        SttError::Service { message }
    }
}

impl SpeechToText for RemoteRecognizer {
    fn recognize(&self, wav: &Path, noise_floor: Option<f32>) -> Result<String, SttError> {
        let bytes = std::fs::read(wav)
            .map_err(|e| Self::service_error(format!("failed to read chunk audio: {e}")))?;

        let url = request_url(&self.endpoint, self.language.as_deref(), noise_floor)?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(bytes)
            .send()
            .map_err(|e| Self::service_error(format!("request failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == NO_SPEECH_STATUS {
            return Err(SttError::NoSpeech);
        }
        if !status.is_success() {
            return Err(Self::service_error(format!(
                "endpoint returned status {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| Self::service_error(format!("failed to read response: {e}")))?;
        parse_success_body(&body)
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}

/// Build the request URL, carrying the language and noise-floor hints as
/// query parameters.
fn request_url(
    endpoint: &str,
    language: Option<&str>,
    noise_floor: Option<f32>,
) -> Result<reqwest::Url, SttError> {
    let mut params: Vec<(&str, String)> = Vec::new();
    if let Some(language) = language {
        params.push(("language", language.to_string()));
    }
    if let Some(floor) = noise_floor {
        params.push(("noise_floor", floor.to_string()));
    }

    let parsed = if params.is_empty() {
        reqwest::Url::parse(endpoint)
    } else {
        reqwest::Url::parse_with_params(endpoint, &params)
    };
    parsed.map_err(|e| SttError::Service {
        message: format!("invalid endpoint URL: {e}"),
    })
}

/// Decode the success body. Anything that is not `{"text": ...}` is a
/// malformed response, which counts as a service failure.
fn parse_success_body(body: &str) -> Result<String, SttError> {
    serde_json::from_str::<RecognizeBody>(body)
        .map(|b| b.text)
        .map_err(|e| SttError::Service {
            message: format!("malformed response body: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::write_wav;
    use crate::defaults::SAMPLE_RATE;

    #[test]
    fn request_url_carries_both_hints() {
        let url = request_url("http://stt.local/transcribe", Some("en"), Some(0.02)).unwrap();
        assert_eq!(url.path(), "/transcribe");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("language".to_string(), "en".to_string()),
                ("noise_floor".to_string(), "0.02".to_string()),
            ]
        );
    }

    #[test]
    fn request_url_without_hints_has_no_query() {
        let url = request_url("http://stt.local/transcribe", None, None).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn request_url_rejects_a_malformed_endpoint() {
        let error = request_url("not a url", Some("en"), None).unwrap_err();
        assert!(matches!(error, SttError::Service { .. }));
    }

    #[test]
    fn parse_success_body_extracts_text() {
        let text = parse_success_body(r#"{"text": "hello world"}"#).unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn parse_success_body_allows_empty_text() {
        let text = parse_success_body(r#"{"text": ""}"#).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn parse_malformed_body_is_service_error() {
        let error = parse_success_body("<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(error, SttError::Service { .. }));
    }

    #[test]
    fn unreachable_endpoint_is_service_error() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("chunk_0.wav");
        write_wav(&wav, &[0i16; 160], SAMPLE_RATE).unwrap();

        // Port 9 (discard) is never listening locally
        let recognizer = RemoteRecognizer::new("http://127.0.0.1:9/transcribe", Some("en"));
        let error = recognizer.recognize(&wav, Some(0.02)).unwrap_err();
        assert!(matches!(error, SttError::Service { .. }));
    }

    #[test]
    fn missing_chunk_file_is_service_error() {
        let recognizer = RemoteRecognizer::new("http://127.0.0.1:9/transcribe", None);
        let error = recognizer
            .recognize(Path::new("/nonexistent/chunk_0.wav"), None)
            .unwrap_err();
        assert!(matches!(error, SttError::Service { .. }));
    }

    #[test]
    fn name_is_the_endpoint() {
        let recognizer = RemoteRecognizer::new("http://stt.local/transcribe", None);
        assert_eq!(recognizer.name(), "http://stt.local/transcribe");
    }
}
