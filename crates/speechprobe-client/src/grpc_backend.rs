use crate::backend_trait::SpeechBackend;
use crate::proto::{
    RecognizeRequest, RecognizeResponse, StreamingRecognizeRequest, StreamingRecognizeResponse,
};
use crate::session::{ResponseStream, StreamingSession, REQUEST_BUFFER};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use speechprobe_core::{AppConfig, SpeechError};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

const RECOGNIZE_PATH: &str = "/google.cloud.speech.v2.Speech/Recognize";
const STREAMING_RECOGNIZE_PATH: &str = "/google.cloud.speech.v2.Speech/StreamingRecognize";
const ROUTING_HEADER: &str = "x-goog-request-params";

/// Unreserved characters stay literal in routing header values.
const ROUTING_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

type OpenCall = JoinHandle<
    Result<tonic::Response<tonic::Streaming<StreamingRecognizeResponse>>, tonic::Status>,
>;

/// Speech-to-Text v2 over gRPC.
pub struct GrpcBackend {
    channel: Mutex<Option<Channel>>,
    authorization: Option<MetadataValue<Ascii>>,
    routing: Option<MetadataValue<Ascii>>,
}

impl GrpcBackend {
    pub fn new() -> Self {
        Self {
            channel: Mutex::new(None),
            authorization: None,
            routing: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.channel
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    async fn client(&self) -> Result<tonic::client::Grpc<Channel>, SpeechError> {
        let channel = self
            .channel
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or(SpeechError::NotInitialized)?;
        let mut grpc = tonic::client::Grpc::new(channel);
        grpc.ready()
            .await
            .map_err(|e| SpeechError::ConnectionFailed(e.to_string()))?;
        Ok(grpc)
    }

    fn decorate<T>(&self, request: &mut tonic::Request<T>) {
        let metadata = request.metadata_mut();
        if let Some(ref auth) = self.authorization {
            metadata.insert("authorization", auth.clone());
        }
        if let Some(ref routing) = self.routing {
            metadata.insert(ROUTING_HEADER, routing.clone());
        }
    }
}

impl Default for GrpcBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn status_message(status: &tonic::Status) -> String {
    format!("{:?}: {}", status.code(), status.message())
}

/// Percent-encode a resource name for use as a routing header value.
fn encode_routing_value(value: &str) -> String {
    utf8_percent_encode(value, ROUTING_VALUE).to_string()
}

fn endpoint_for(url: &str) -> Result<Endpoint, SpeechError> {
    let endpoint = Channel::from_shared(url.to_string())
        .map_err(|e| SpeechError::ConnectionFailed(format!("invalid endpoint {url}: {e}")))?;
    if url.starts_with("https://") {
        endpoint
            .tls_config(ClientTlsConfig::new().with_native_roots())
            .map_err(|e| SpeechError::ConnectionFailed(e.to_string()))
    } else {
        Ok(endpoint)
    }
}

/// Inbound half of a `StreamingRecognize` call.
///
/// The call is opened in the background so audio can flow before the
/// service sends its response headers; the open outcome is observed on the
/// first read.
enum GrpcResponses {
    Opening(OpenCall),
    Open(tonic::Streaming<StreamingRecognizeResponse>),
    Closed,
}

impl Drop for GrpcResponses {
    fn drop(&mut self) {
        if let Self::Opening(call) = self {
            call.abort();
        }
    }
}

#[async_trait]
impl ResponseStream for GrpcResponses {
    async fn next_response(&mut self) -> Result<Option<StreamingRecognizeResponse>, SpeechError> {
        if let Self::Opening(call) = self {
            let opened = call.await;
            *self = Self::Closed;
            let response = match opened {
                Ok(Ok(response)) => response,
                Ok(Err(status)) => {
                    return Err(SpeechError::StreamOpenFailed(status_message(&status)))
                }
                Err(e) => return Err(SpeechError::StreamOpenFailed(e.to_string())),
            };
            tracing::debug!("streaming call accepted by service");
            *self = Self::Open(response.into_inner());
        }

        match self {
            Self::Open(stream) => stream
                .message()
                .await
                .map_err(|status| SpeechError::ReceiveFailed(status_message(&status))),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl SpeechBackend for GrpcBackend {
    fn name(&self) -> &str {
        "grpc"
    }

    async fn initialize(&mut self, config: &AppConfig) -> Result<(), SpeechError> {
        self.authorization = match config.access_token {
            Some(ref token) => Some(
                format!("Bearer {token}")
                    .parse::<MetadataValue<Ascii>>()
                    .map_err(|_| {
                        SpeechError::ConnectionFailed("access token is not valid ASCII".to_string())
                    })?,
            ),
            None => {
                tracing::warn!("no access token configured, calls will be unauthenticated");
                None
            }
        };
        self.routing = format!("recognizer={}", encode_routing_value(&config.recognizer_name()))
            .parse::<MetadataValue<Ascii>>()
            .ok();

        let channel = endpoint_for(&config.endpoint)?
            .connect()
            .await
            .map_err(|e| SpeechError::ConnectionFailed(format!("{}: {e}", config.endpoint)))?;

        if let Ok(mut guard) = self.channel.lock() {
            *guard = Some(channel);
        }
        tracing::info!(endpoint = %config.endpoint, "connected to speech service");
        Ok(())
    }

    async fn recognize(&self, request: RecognizeRequest) -> Result<RecognizeResponse, SpeechError> {
        let mut grpc = self.client().await?;
        let mut request = tonic::Request::new(request);
        self.decorate(&mut request);

        let response = grpc
            .unary(
                request,
                PathAndQuery::from_static(RECOGNIZE_PATH),
                tonic::codec::ProstCodec::default(),
            )
            .await
            .map_err(|status| SpeechError::RequestFailed(status_message(&status)))?;
        Ok(response.into_inner())
    }

    async fn streaming_recognize(
        &self,
        initial: StreamingRecognizeRequest,
    ) -> Result<StreamingSession, SpeechError> {
        let mut grpc = self.client().await?;

        // Queue the configuration before the call so it leads the request
        // stream regardless of when the server sends its headers.
        let (tx, rx) = mpsc::channel(REQUEST_BUFFER);
        tx.send(initial)
            .await
            .map_err(|_| SpeechError::StreamOpenFailed("request stream closed".to_string()))?;

        let mut request = tonic::Request::new(ReceiverStream::new(rx));
        self.decorate(&mut request);

        let call = tokio::spawn(async move {
            grpc.streaming(
                request,
                PathAndQuery::from_static(STREAMING_RECOGNIZE_PATH),
                tonic::codec::ProstCodec::default(),
            )
            .await
        });

        Ok(StreamingSession::new(tx, GrpcResponses::Opening(call)))
    }

    async fn close(&self) -> Result<(), SpeechError> {
        if let Ok(mut guard) = self.channel.lock() {
            if guard.take().is_some() {
                tracing::debug!("speech client closed");
            }
        }
        Ok(())
    }
}
