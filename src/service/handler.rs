//! Request handling for the transcription service.

use crate::defaults::{ALLOWED_EXTENSIONS, TRANSCRIPT_SUFFIX};
use crate::error::Result;
use crate::pipeline::runner::{self, PipelineConfig};
use crate::service::protocol::{Request, Response};
use crate::service::server::RequestHandler;
use crate::stt::recognizer::SpeechToText;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Handler that runs the pipeline on uploaded files and serves
/// persisted transcripts by name.
pub struct TranscribeHandler {
    recognizer: Arc<dyn SpeechToText>,
    output_dir: PathBuf,
    pipeline: PipelineConfig,
    max_upload_bytes: u64,
}

impl TranscribeHandler {
    /// Create a handler persisting transcripts under `output_dir`.
    ///
    /// Any `persist_to` in `pipeline` is ignored; the destination is
    /// derived per upload from its base name.
    pub fn new(
        recognizer: Arc<dyn SpeechToText>,
        output_dir: PathBuf,
        pipeline: PipelineConfig,
        max_upload_bytes: u64,
    ) -> Result<Self> {
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            recognizer,
            output_dir,
            pipeline,
            max_upload_bytes,
        })
    }

    async fn transcribe(&self, upload: PathBuf) -> Response {
        let Some(file_name) = sanitized_file_name(&upload) else {
            return Response::Error {
                message: "invalid upload file name".to_string(),
            };
        };

        if !has_allowed_extension(&file_name) {
            return Response::Error {
                message: format!(
                    "invalid file type, allowed types: {}",
                    ALLOWED_EXTENSIONS.join(", ")
                ),
            };
        }

        let size = match std::fs::metadata(&upload) {
            Ok(metadata) if metadata.is_file() => metadata.len(),
            _ => {
                return Response::Error {
                    message: format!("uploaded file not found: {}", upload.display()),
                };
            }
        };
        if size > self.max_upload_bytes {
            return Response::Error {
                message: format!(
                    "upload exceeds the {} byte limit",
                    self.max_upload_bytes
                ),
            };
        }

        let download = transcript_name(&file_name);
        let config = PipelineConfig {
            persist_to: Some(self.output_dir.join(&download)),
            ..self.pipeline.clone()
        };

        let recognizer = Arc::clone(&self.recognizer);
        let input = upload.clone();
        let joined = tokio::task::spawn_blocking(move || {
            runner::run_pipeline(&input, recognizer, &config)
        })
        .await;

        // The upload is consumed by the run, success or not
        if let Err(e) = std::fs::remove_file(&upload)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            eprintln!("katha: failed to remove upload {}: {e}", upload.display());
        }

        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                return Response::Error {
                    message: format!("transcription task failed: {e}"),
                };
            }
        };

        match result {
            Ok(output) => {
                if let Some(persist_error) = &output.persist_error {
                    eprintln!("katha: {persist_error}");
                }
                Response::Transcript {
                    text: output.transcript,
                    download,
                }
            }
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    fn download(&self, name: &str) -> Response {
        let Some(safe) = sanitize_download_name(name) else {
            return Response::Error {
                message: "invalid transcript name".to_string(),
            };
        };

        let path = self.output_dir.join(safe);
        if path.is_file() {
            Response::File { path }
        } else {
            Response::Error {
                message: format!("transcript not found: {name}"),
            }
        }
    }
}

#[async_trait::async_trait]
impl RequestHandler for TranscribeHandler {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Transcribe { path } => self.transcribe(path).await,
            Request::Download { name } => self.download(&name),
            Request::Status => Response::Status {
                ready: true,
                recognizer: self.recognizer.name().to_string(),
            },
        }
    }
}

/// Reduce an upload path to its final component, rejecting empty names.
fn sanitized_file_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

fn has_allowed_extension(file_name: &str) -> bool {
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return false;
    };
    let extension = extension.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&extension.as_str())
}

/// Deterministic transcript name from the upload's base name.
fn transcript_name(file_name: &str) -> String {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(s, _)| s);
    format!("{stem}{TRANSCRIPT_SUFFIX}")
}

/// Accept only plain base names for downloads; anything that could
/// escape the output directory is rejected outright.
fn sanitize_download_name(name: &str) -> Option<&str> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::write_wav;
    use crate::defaults::SAMPLE_RATE;
    use crate::stt::recognizer::MockRecognizer;

    fn handler_in(dir: &Path, recognizer: MockRecognizer) -> TranscribeHandler {
        let pipeline = PipelineConfig {
            chunk_length_ms: 1000,
            overlap_ms: 100,
            worker_count: 2,
            ..PipelineConfig::default()
        };
        TranscribeHandler::new(
            Arc::new(recognizer),
            dir.join("outputs"),
            pipeline,
            crate::defaults::MAX_UPLOAD_BYTES,
        )
        .unwrap()
    }

    fn tiny_handler(dir: &Path, max_upload_bytes: u64) -> TranscribeHandler {
        TranscribeHandler::new(
            Arc::new(MockRecognizer::new("mock")),
            dir.join("outputs"),
            PipelineConfig::default(),
            max_upload_bytes,
        )
        .unwrap()
    }

    fn upload_wav(dir: &Path, name: &str, duration_ms: u64) -> PathBuf {
        let path = dir.join(name);
        let samples = (duration_ms * SAMPLE_RATE as u64 / 1000) as usize;
        write_wav(&path, &vec![1000i16; samples], SAMPLE_RATE).unwrap();
        path
    }

    #[tokio::test]
    async fn transcribe_returns_text_and_download_reference() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_in(dir.path(), MockRecognizer::new("mock").with_response("ok"));
        let upload = upload_wav(dir.path(), "talk.wav", 1500);

        let response = handler
            .handle(Request::Transcribe {
                path: upload.clone(),
            })
            .await;

        let Response::Transcript { text, download } = response else {
            panic!("expected transcript, got {response:?}");
        };
        assert_eq!(text, "ok ok");
        assert_eq!(download, "talk_transcription.txt");
        // Transcript persisted, upload consumed
        assert_eq!(
            std::fs::read_to_string(dir.path().join("outputs").join(&download)).unwrap(),
            text
        );
        assert!(!upload.exists());
    }

    #[tokio::test]
    async fn transcribe_rejects_disallowed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_in(dir.path(), MockRecognizer::new("mock"));
        let upload = dir.path().join("notes.txt");
        std::fs::write(&upload, b"plain text").unwrap();

        let response = handler
            .handle(Request::Transcribe {
                path: upload.clone(),
            })
            .await;

        let Response::Error { message } = response else {
            panic!("expected error, got {response:?}");
        };
        assert!(message.contains("invalid file type"));
        // Rejected uploads are left alone
        assert!(upload.exists());
    }

    #[tokio::test]
    async fn transcribe_rejects_oversized_upload() {
        let dir = tempfile::tempdir().unwrap();
        let handler = tiny_handler(dir.path(), 64);
        let upload = upload_wav(dir.path(), "big.wav", 1000);

        let response = handler
            .handle(Request::Transcribe {
                path: upload.clone(),
            })
            .await;

        let Response::Error { message } = response else {
            panic!("expected error, got {response:?}");
        };
        assert!(message.contains("byte limit"));
        assert!(upload.exists());
    }

    #[tokio::test]
    async fn transcribe_reports_missing_upload() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_in(dir.path(), MockRecognizer::new("mock"));

        let response = handler
            .handle(Request::Transcribe {
                path: dir.path().join("gone.wav"),
            })
            .await;
        assert!(matches!(response, Response::Error { .. }));
    }

    #[tokio::test]
    async fn undecodable_upload_is_an_error_and_is_consumed() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_in(dir.path(), MockRecognizer::new("mock"));
        let upload = dir.path().join("broken.wav");
        std::fs::write(&upload, b"not audio at all").unwrap();

        let response = handler
            .handle(Request::Transcribe {
                path: upload.clone(),
            })
            .await;
        assert!(matches!(response, Response::Error { .. }));
        assert!(!upload.exists());
    }

    #[tokio::test]
    async fn download_resolves_persisted_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_in(dir.path(), MockRecognizer::new("mock").with_response("ok"));
        let upload = upload_wav(dir.path(), "lecture.wav", 1000);

        handler.handle(Request::Transcribe { path: upload }).await;
        let response = handler
            .handle(Request::Download {
                name: "lecture_transcription.txt".to_string(),
            })
            .await;

        let Response::File { path } = response else {
            panic!("expected file, got {response:?}");
        };
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn download_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_in(dir.path(), MockRecognizer::new("mock"));

        for name in ["../secret.txt", "a/b.txt", ".hidden", ""] {
            let response = handler
                .handle(Request::Download {
                    name: name.to_string(),
                })
                .await;
            assert!(matches!(response, Response::Error { .. }), "name: {name}");
        }
    }

    #[tokio::test]
    async fn download_of_unknown_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_in(dir.path(), MockRecognizer::new("mock"));

        let response = handler
            .handle(Request::Download {
                name: "never_made.txt".to_string(),
            })
            .await;
        assert!(matches!(response, Response::Error { .. }));
    }

    #[tokio::test]
    async fn status_reports_recognizer_name() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler_in(dir.path(), MockRecognizer::new("test-engine"));

        let response = handler.handle(Request::Status).await;
        assert_eq!(
            response,
            Response::Status {
                ready: true,
                recognizer: "test-engine".to_string(),
            }
        );
    }

    #[test]
    fn transcript_name_is_deterministic() {
        assert_eq!(transcript_name("talk.mp3"), "talk_transcription.txt");
        assert_eq!(transcript_name("a.b.flac"), "a.b_transcription.txt");
        assert_eq!(transcript_name("noext"), "noext_transcription.txt");
    }

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert!(has_allowed_extension("talk.MP3"));
        assert!(has_allowed_extension("talk.wav"));
        assert!(!has_allowed_extension("talk.exe"));
        assert!(!has_allowed_extension("talk"));
    }
}
