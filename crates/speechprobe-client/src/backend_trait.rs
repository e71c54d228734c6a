use crate::proto::{RecognizeRequest, RecognizeResponse, StreamingRecognizeRequest};
use crate::session::StreamingSession;
use async_trait::async_trait;
use speechprobe_core::{AppConfig, SpeechError};

/// A speech recognition service the transcription paths talk to.
///
/// Backends are created through [`BackendRegistry`](crate::BackendRegistry),
/// initialised once, and released with [`close`](Self::close).
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Registry name of this backend (e.g. `"grpc"`, `"null"`).
    fn name(&self) -> &str;
    /// Establish the client handle from resolved configuration.
    async fn initialize(&mut self, config: &AppConfig) -> Result<(), SpeechError>;
    /// Single request, single response recognition.
    async fn recognize(&self, request: RecognizeRequest) -> Result<RecognizeResponse, SpeechError>;
    /// Open a bidirectional session whose first message is `initial`.
    async fn streaming_recognize(
        &self,
        initial: StreamingRecognizeRequest,
    ) -> Result<StreamingSession, SpeechError>;
    /// Release the client handle. Further calls fail with `NotInitialized`.
    async fn close(&self) -> Result<(), SpeechError>;
}
