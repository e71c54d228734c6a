use crate::backend_trait::SpeechBackend;
use crate::proto::{
    recognize_request::AudioSource, RecognizeRequest, RecognizeResponse,
    SpeechRecognitionAlternative, SpeechRecognitionResult, StreamingRecognitionResult,
    StreamingRecognizeRequest, StreamingRecognizeResponse,
};
use crate::session::{StreamingSession, REQUEST_BUFFER};
use async_trait::async_trait;
use speechprobe_core::{AppConfig, SpeechError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Offline backend that describes the audio it receives instead of recognizing it.
///
/// Streams answer every audio chunk with one final result and end cleanly once
/// the send side closes or no request arrives within the idle timeout.
pub struct NullBackend {
    idle_timeout: Duration,
    initialized: AtomicBool,
    audio_bytes: std::sync::Arc<AtomicUsize>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            initialized: AtomicBool::new(false),
            audio_bytes: std::sync::Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Total audio bytes seen across all calls.
    pub fn audio_bytes(&self) -> usize {
        self.audio_bytes.load(Ordering::Relaxed)
    }

    fn ensure_initialized(&self) -> Result<(), SpeechError> {
        if self.initialized.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(SpeechError::NotInitialized)
        }
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn alternative(len: usize) -> SpeechRecognitionAlternative {
    SpeechRecognitionAlternative {
        transcript: format!("[null] {len} bytes"),
        confidence: 1.0,
    }
}

#[async_trait]
impl SpeechBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    async fn initialize(&mut self, _config: &AppConfig) -> Result<(), SpeechError> {
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    async fn recognize(&self, request: RecognizeRequest) -> Result<RecognizeResponse, SpeechError> {
        self.ensure_initialized()?;
        let len = match request.audio_source {
            Some(AudioSource::Content(ref content)) => content.len(),
            Some(AudioSource::Uri(_)) | None => {
                return Err(SpeechError::RequestFailed("no inline audio content".to_string()))
            }
        };
        self.audio_bytes.fetch_add(len, Ordering::Relaxed);
        Ok(RecognizeResponse {
            results: vec![SpeechRecognitionResult {
                alternatives: vec![alternative(len)],
                ..Default::default()
            }],
        })
    }

    async fn streaming_recognize(
        &self,
        initial: StreamingRecognizeRequest,
    ) -> Result<StreamingSession, SpeechError> {
        self.ensure_initialized()?;
        if !initial.is_config() {
            return Err(SpeechError::StreamOpenFailed(
                "first request must carry the streaming config".to_string(),
            ));
        }

        let (req_tx, mut req_rx) = mpsc::channel::<StreamingRecognizeRequest>(REQUEST_BUFFER);
        let (resp_tx, resp_rx) =
            mpsc::channel::<Result<StreamingRecognizeResponse, SpeechError>>(REQUEST_BUFFER);
        let idle_timeout = self.idle_timeout;
        let total = std::sync::Arc::clone(&self.audio_bytes);

        tokio::spawn(async move {
            loop {
                let request = match tokio::time::timeout(idle_timeout, req_rx.recv()).await {
                    Ok(Some(request)) => request,
                    Ok(None) => {
                        tracing::trace!("NullBackend send side closed");
                        break;
                    }
                    Err(_) => {
                        tracing::trace!("NullBackend idle timeout");
                        break;
                    }
                };
                let Some(chunk) = request.audio_bytes() else {
                    continue;
                };
                total.fetch_add(chunk.len(), Ordering::Relaxed);
                let response = StreamingRecognizeResponse {
                    results: vec![StreamingRecognitionResult {
                        alternatives: vec![alternative(chunk.len())],
                        is_final: true,
                        ..Default::default()
                    }],
                    ..Default::default()
                };
                if resp_tx.send(Ok(response)).await.is_err() {
                    break;
                }
            }
        });

        Ok(StreamingSession::new(req_tx, resp_rx))
    }

    async fn close(&self) -> Result<(), SpeechError> {
        self.initialized.store(false, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::RecognitionConfig;
    use bytes::Bytes;
    use speechprobe_core::CliFlags;
    use std::path::PathBuf;

    fn test_config() -> AppConfig {
        let flags = CliFlags {
            wav_in: Some(PathBuf::from("capture.wav")),
            backend: "null".to_string(),
            ..CliFlags::default()
        };
        AppConfig::resolve(flags, |key| match key {
            "GOOGLE_PROJECT_ID" => Some("p".to_string()),
            "RECOGNIZER_ID" => Some("r".to_string()),
            _ => None,
        })
        .unwrap()
    }

    async fn ready_backend(idle: Duration) -> NullBackend {
        let mut backend = NullBackend::with_idle_timeout(idle);
        backend.initialize(&test_config()).await.unwrap();
        backend
    }

    fn config_request() -> StreamingRecognizeRequest {
        StreamingRecognizeRequest::config(
            "projects/p/locations/global/recognizers/r",
            RecognitionConfig::default(),
        )
    }

    #[test]
    fn test_null_backend_name() {
        assert_eq!(NullBackend::new().name(), "null");
    }

    #[tokio::test]
    async fn test_null_backend_requires_initialize() {
        let backend = NullBackend::new();
        assert!(matches!(
            backend.recognize(RecognizeRequest::default()).await,
            Err(SpeechError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_null_backend_recognize_describes_payload() {
        let backend = ready_backend(DEFAULT_IDLE_TIMEOUT).await;
        let request = RecognizeRequest {
            audio_source: Some(AudioSource::Content(Bytes::from(vec![0u8; 480]))),
            ..Default::default()
        };
        let response = backend.recognize(request).await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].alternatives[0].transcript, "[null] 480 bytes");
        assert_eq!(backend.audio_bytes(), 480);
    }

    #[tokio::test]
    async fn test_null_backend_recognize_without_content_fails() {
        let backend = ready_backend(DEFAULT_IDLE_TIMEOUT).await;
        assert!(matches!(
            backend.recognize(RecognizeRequest::default()).await,
            Err(SpeechError::RequestFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_null_backend_stream_rejects_audio_first() {
        let backend = ready_backend(DEFAULT_IDLE_TIMEOUT).await;
        let result = backend
            .streaming_recognize(StreamingRecognizeRequest::audio(Bytes::from_static(b"x")))
            .await;
        assert!(matches!(result, Err(SpeechError::StreamOpenFailed(_))));
    }

    #[tokio::test]
    async fn test_null_backend_stream_echoes_chunks_and_ends_on_close() {
        let backend = ready_backend(Duration::from_secs(5)).await;
        let session = backend.streaming_recognize(config_request()).await.unwrap();
        let (sender, mut responses) = session.split();

        sender.send_audio(Bytes::from(vec![0u8; 100])).await.unwrap();
        let response = responses.next_response().await.unwrap().unwrap();
        assert_eq!(response.results[0].alternatives[0].transcript, "[null] 100 bytes");
        assert!(response.results[0].is_final);

        sender.close();
        assert!(responses.next_response().await.unwrap().is_none());
        assert_eq!(backend.audio_bytes(), 100);
    }

    #[tokio::test]
    async fn test_null_backend_stream_ends_after_idle_timeout() {
        let backend = ready_backend(Duration::from_millis(50)).await;
        let session = backend.streaming_recognize(config_request()).await.unwrap();
        let (_sender, mut responses) = session.split();

        let end = tokio::time::timeout(Duration::from_secs(2), responses.next_response())
            .await
            .expect("idle timeout did not end the stream");
        assert!(end.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_null_backend_close_uninitializes() {
        let backend = ready_backend(DEFAULT_IDLE_TIMEOUT).await;
        backend.close().await.unwrap();
        assert!(matches!(
            backend.streaming_recognize(config_request()).await,
            Err(SpeechError::NotInitialized)
        ));
    }

    #[test]
    fn test_null_backend_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NullBackend>();
    }
}
