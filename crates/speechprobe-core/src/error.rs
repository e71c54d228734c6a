use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GOOGLE_PROJECT_ID environment variable is not set")]
    MissingProjectId,

    #[error("RECOGNIZER_ID environment variable is not set")]
    MissingRecognizerId,

    #[error("WAV input path is not set")]
    MissingInputPath,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to read audio file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse WAV header: {0}")]
    WavParse(String),
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech backend not found: {0}")]
    BackendNotFound(String),

    #[error("speech backend not initialized")]
    NotInitialized,

    #[error("failed to connect to speech service: {0}")]
    ConnectionFailed(String),

    #[error("recognize request failed: {0}")]
    RequestFailed(String),

    #[error("failed to open streaming session: {0}")]
    StreamOpenFailed(String),

    #[error("failed to send on stream: {0}")]
    SendFailed(String),

    #[error("failed to receive from stream: {0}")]
    ReceiveFailed(String),
}

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("no results in response")]
    NoResults,

    #[error("no alternatives in result")]
    NoAlternatives,

    #[error("failed to send audio chunk: {0}")]
    SendAudio(#[source] SpeechError),

    #[error("failed to receive transcription: {0}")]
    ReceiveTranscription(#[source] SpeechError),

    #[error("transcription task failed: {0}")]
    TaskFailed(String),

    #[error(transparent)]
    Speech(#[from] SpeechError),
}
