use crate::proto::{StreamingRecognizeRequest, StreamingRecognizeResponse};
use async_trait::async_trait;
use bytes::Bytes;
use speechprobe_core::SpeechError;
use tokio::sync::mpsc;

/// Requests buffered between the sender and the transport before `send` waits.
pub const REQUEST_BUFFER: usize = 4;

/// Inbound half of a streaming session.
///
/// `Ok(None)` is the service's clean end-of-stream.
#[async_trait]
pub trait ResponseStream: Send {
    async fn next_response(&mut self) -> Result<Option<StreamingRecognizeResponse>, SpeechError>;
}

#[async_trait]
impl ResponseStream for mpsc::Receiver<Result<StreamingRecognizeResponse, SpeechError>> {
    async fn next_response(&mut self) -> Result<Option<StreamingRecognizeResponse>, SpeechError> {
        self.recv().await.transpose()
    }
}

/// Outbound half of a streaming session.
///
/// Cloning shares the same request stream; the service sees the send side
/// closed only once every clone has been dropped or [`close`](Self::close)d.
#[derive(Clone)]
pub struct AudioSender {
    tx: mpsc::Sender<StreamingRecognizeRequest>,
}

impl AudioSender {
    pub async fn send_audio(&self, chunk: Bytes) -> Result<(), SpeechError> {
        tracing::debug!("Sending audio chunk: {} bytes", chunk.len());
        self.tx
            .send(StreamingRecognizeRequest::audio(chunk))
            .await
            .map_err(|_| SpeechError::SendFailed("request stream closed".to_string()))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Release this handle's share of the send side.
    pub fn close(self) {
        drop(self.tx);
    }
}

/// A bidirectional recognition session already primed with its configuration.
pub struct StreamingSession {
    sender: AudioSender,
    responses: Box<dyn ResponseStream>,
}

impl StreamingSession {
    pub fn new(
        requests: mpsc::Sender<StreamingRecognizeRequest>,
        responses: impl ResponseStream + 'static,
    ) -> Self {
        Self {
            sender: AudioSender { tx: requests },
            responses: Box::new(responses),
        }
    }

    /// Separate the halves so each direction can be driven by its own task.
    pub fn split(self) -> (AudioSender, Box<dyn ResponseStream>) {
        (self.sender, self.responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::StreamingRecognitionResult;

    fn make_session() -> (
        StreamingSession,
        mpsc::Receiver<StreamingRecognizeRequest>,
        mpsc::Sender<Result<StreamingRecognizeResponse, SpeechError>>,
    ) {
        let (req_tx, req_rx) = mpsc::channel(REQUEST_BUFFER);
        let (resp_tx, resp_rx) = mpsc::channel(REQUEST_BUFFER);
        (StreamingSession::new(req_tx, resp_rx), req_rx, resp_tx)
    }

    #[tokio::test]
    async fn test_send_audio_reaches_request_stream() {
        let (session, mut req_rx, _resp_tx) = make_session();
        let (sender, _responses) = session.split();
        sender.send_audio(Bytes::from_static(b"pcm")).await.unwrap();
        let req = req_rx.recv().await.unwrap();
        assert_eq!(req.audio_bytes().unwrap().as_ref(), b"pcm");
    }

    #[tokio::test]
    async fn test_send_audio_after_transport_gone_fails() {
        let (session, req_rx, _resp_tx) = make_session();
        let (sender, _responses) = session.split();
        drop(req_rx);
        assert!(sender.is_closed());
        match sender.send_audio(Bytes::from_static(b"pcm")).await {
            Err(SpeechError::SendFailed(_)) => {}
            other => panic!("expected SendFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_all_clones_ends_request_stream() {
        let (session, mut req_rx, _resp_tx) = make_session();
        let (sender, _responses) = session.split();
        let clone = sender.clone();
        sender.close();
        clone.send_audio(Bytes::from_static(b"x")).await.unwrap();
        clone.close();
        assert!(req_rx.recv().await.is_some());
        assert!(req_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_response_stream_yields_then_ends() {
        let (session, _req_rx, resp_tx) = make_session();
        let (_sender, mut responses) = session.split();
        resp_tx
            .send(Ok(StreamingRecognizeResponse {
                results: vec![StreamingRecognitionResult::default()],
                ..Default::default()
            }))
            .await
            .unwrap();
        drop(resp_tx);

        let first = responses.next_response().await.unwrap().unwrap();
        assert_eq!(first.results.len(), 1);
        assert!(responses.next_response().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_response_stream_surfaces_errors() {
        let (session, _req_rx, resp_tx) = make_session();
        let (_sender, mut responses) = session.split();
        resp_tx
            .send(Err(SpeechError::ReceiveFailed("reset".to_string())))
            .await
            .unwrap();
        match responses.next_response().await {
            Err(SpeechError::ReceiveFailed(msg)) => assert_eq!(msg, "reset"),
            other => panic!("expected ReceiveFailed, got {other:?}"),
        }
    }
}
