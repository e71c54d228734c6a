use crate::request::one_shot_request;
use speechprobe_client::proto::RecognizeResponse;
use speechprobe_client::SpeechBackend;
use speechprobe_core::{AppConfig, AudioPayload, TranscribeError, Transcript};

/// Send the whole payload in one request and return the top alternative.
///
/// The backend is closed before returning, whatever the outcome.
pub async fn transcribe_one_shot(
    backend: &dyn SpeechBackend,
    config: &AppConfig,
    audio: &AudioPayload,
) -> Result<Transcript, TranscribeError> {
    let request = one_shot_request(config, audio);

    tracing::info!(bytes = audio.len(), "Sending one-shot recognition request...");
    let response = backend.recognize(request).await;

    if let Err(e) = backend.close().await {
        tracing::warn!("failed to close speech client: {e}");
    }

    let transcript = first_transcript(&response?)?;
    tracing::info!(
        confidence = transcript.confidence,
        "One-shot recognition succeeded: {:?}",
        transcript.text
    );
    Ok(transcript)
}

/// First alternative of the first result.
pub fn first_transcript(response: &RecognizeResponse) -> Result<Transcript, TranscribeError> {
    let result = response.results.first().ok_or(TranscribeError::NoResults)?;
    let alt = result
        .alternatives
        .first()
        .ok_or(TranscribeError::NoAlternatives)?;
    Ok(Transcript {
        text: alt.transcript.clone(),
        confidence: alt.confidence,
        is_final: true,
    })
}
