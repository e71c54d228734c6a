use crate::request::streaming_config_request;
use speechprobe_client::{AudioSender, ResponseStream, SpeechBackend, StreamingSession};
use speechprobe_core::{AppConfig, AudioPayload, TranscribeError, Transcript};
use std::time::Duration;
use tokio::sync::mpsc;

pub const CHUNK_SIZE: usize = 8192;
pub const CHUNK_DELAY: Duration = Duration::from_millis(200);

/// Room for one error from each task, so neither blocks on exit.
const ERROR_CHANNEL_CAPACITY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingOptions {
    pub chunk_size: usize,
    pub chunk_delay: Duration,
}

impl Default for StreamingOptions {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            chunk_delay: CHUNK_DELAY,
        }
    }
}

/// Drives one full-duplex recognition session over an in-memory payload.
///
/// A send task paces fixed-size chunks into the session while a receive task
/// reads responses; both report failures on a shared bounded channel that the
/// caller of [`run`](Self::run) waits on. The send side is closed and the
/// backend released only after that wait ends.
///
/// Transcripts are logged and also forwarded to the receiver returned by
/// [`take_transcript_receiver`](Self::take_transcript_receiver).
pub struct StreamingTranscriber {
    options: StreamingOptions,
    transcript_tx: mpsc::UnboundedSender<Transcript>,
    transcript_rx: Option<mpsc::UnboundedReceiver<Transcript>>,
}

impl StreamingTranscriber {
    pub fn new(options: StreamingOptions) -> Self {
        let (transcript_tx, transcript_rx) = mpsc::unbounded_channel();
        Self {
            options,
            transcript_tx,
            transcript_rx: Some(transcript_rx),
        }
    }

    pub fn options(&self) -> StreamingOptions {
        self.options
    }

    pub fn take_transcript_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<Transcript>> {
        self.transcript_rx.take()
    }

    /// Open a session, exchange the whole payload, then close everything.
    ///
    /// Returns `Ok(())` once both tasks have finished without error. The
    /// first reported error ends the exchange and is returned as-is.
    pub async fn run(
        &self,
        backend: &dyn SpeechBackend,
        config: &AppConfig,
        audio: &AudioPayload,
    ) -> Result<(), TranscribeError> {
        tracing::info!(
            recognizer = %config.recognizer_name(),
            language = %config.primary_lang,
            "opening streaming session"
        );
        let outcome = match backend
            .streaming_recognize(streaming_config_request(config))
            .await
        {
            Ok(session) => self.exchange(session, audio).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = backend.close().await {
            tracing::warn!("failed to close speech client: {e}");
        }
        outcome
    }

    async fn exchange(
        &self,
        session: StreamingSession,
        audio: &AudioPayload,
    ) -> Result<(), TranscribeError> {
        let (sender, responses) = session.split();
        let (error_tx, mut error_rx) = mpsc::channel(ERROR_CHANNEL_CAPACITY);

        let send_handle = tokio::spawn(send_audio(
            sender.clone(),
            audio.clone(),
            self.options,
            error_tx.clone(),
        ));
        let recv_handle = tokio::spawn(receive_transcripts(
            responses,
            self.transcript_tx.clone(),
            error_tx,
        ));

        // Closed channel: both tasks finished cleanly.
        let mut outcome = match error_rx.recv().await {
            Some(err) => {
                send_handle.abort();
                recv_handle.abort();
                Err(err)
            }
            None => Ok(()),
        };

        for handle in [send_handle, recv_handle] {
            if let Err(e) = handle.await {
                if e.is_panic() && outcome.is_ok() {
                    outcome = Err(TranscribeError::TaskFailed(e.to_string()));
                }
            }
        }

        sender.close();
        tracing::debug!("stream send side closed");
        outcome
    }
}

impl Default for StreamingTranscriber {
    fn default() -> Self {
        Self::new(StreamingOptions::default())
    }
}

async fn send_audio(
    sender: AudioSender,
    audio: AudioPayload,
    options: StreamingOptions,
    error_tx: mpsc::Sender<TranscribeError>,
) {
    let total = audio.chunk_count(options.chunk_size);
    for (index, chunk) in audio.chunks(options.chunk_size).enumerate() {
        let len = chunk.len();
        if let Err(e) = sender.send_audio(chunk).await {
            let _ = error_tx.send(TranscribeError::SendAudio(e)).await;
            return;
        }
        tracing::debug!(chunk = index + 1, total, bytes = len, "sent audio chunk");
        if index + 1 < total {
            tokio::time::sleep(options.chunk_delay).await;
        }
    }
    tracing::info!(chunks = total, bytes = audio.len(), "finished sending audio");
}

async fn receive_transcripts(
    mut responses: Box<dyn ResponseStream>,
    transcript_tx: mpsc::UnboundedSender<Transcript>,
    error_tx: mpsc::Sender<TranscribeError>,
) {
    loop {
        tracing::debug!("Waiting for transcription response...");
        let response = match responses.next_response().await {
            Ok(Some(response)) => response,
            Ok(None) => {
                tracing::info!("Stream ended with EOF");
                return;
            }
            Err(e) => {
                let _ = error_tx
                    .send(TranscribeError::ReceiveTranscription(e))
                    .await;
                return;
            }
        };

        tracing::debug!(response = ?response, "Received transcription response");

        let Some(result) = response.results.first() else {
            tracing::debug!(
                event = ?response.speech_event_type(),
                "No results in response"
            );
            continue;
        };
        let Some(alt) = result.alternatives.first() else {
            tracing::warn!("Received empty alternatives");
            continue;
        };

        tracing::info!(
            confidence = alt.confidence,
            is_final = result.is_final,
            stability = result.stability,
            language = %result.language_code,
            "Transcription: {:?}",
            alt.transcript
        );
        let _ = transcript_tx.send(Transcript {
            text: alt.transcript.clone(),
            confidence: alt.confidence,
            is_final: result.is_final,
        });
    }
}
