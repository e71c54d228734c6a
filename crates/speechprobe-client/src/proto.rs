//! Subset of the `google.cloud.speech.v2` wire messages used by this client.
//!
//! Field tags match the published `cloud_speech.proto`; fields the client
//! never sets or reads are omitted and are skipped by the decoder.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AutoDetectDecodingConfig {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognitionConfig {
    #[prost(string, tag = "9")]
    pub model: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "10")]
    pub language_codes: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(oneof = "recognition_config::DecodingConfig", tags = "7")]
    pub decoding_config: ::core::option::Option<recognition_config::DecodingConfig>,
}

pub mod recognition_config {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum DecodingConfig {
        #[prost(message, tag = "7")]
        AutoDecodingConfig(super::AutoDetectDecodingConfig),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognizeRequest {
    #[prost(string, tag = "3")]
    pub recognizer: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "1")]
    pub config: ::core::option::Option<RecognitionConfig>,
    #[prost(oneof = "recognize_request::AudioSource", tags = "5, 6")]
    pub audio_source: ::core::option::Option<recognize_request::AudioSource>,
}

pub mod recognize_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum AudioSource {
        #[prost(bytes = "bytes", tag = "5")]
        Content(::prost::bytes::Bytes),
        #[prost(string, tag = "6")]
        Uri(::prost::alloc::string::String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SpeechRecognitionAlternative {
    #[prost(string, tag = "1")]
    pub transcript: ::prost::alloc::string::String,
    #[prost(float, tag = "2")]
    pub confidence: f32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SpeechRecognitionResult {
    #[prost(message, repeated, tag = "1")]
    pub alternatives: ::prost::alloc::vec::Vec<SpeechRecognitionAlternative>,
    #[prost(int32, tag = "2")]
    pub channel_tag: i32,
    #[prost(string, tag = "5")]
    pub language_code: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognizeResponse {
    #[prost(message, repeated, tag = "3")]
    pub results: ::prost::alloc::vec::Vec<SpeechRecognitionResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingRecognitionConfig {
    #[prost(message, optional, tag = "1")]
    pub config: ::core::option::Option<RecognitionConfig>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingRecognizeRequest {
    #[prost(string, tag = "3")]
    pub recognizer: ::prost::alloc::string::String,
    #[prost(oneof = "streaming_recognize_request::StreamingRequest", tags = "6, 5")]
    pub streaming_request: ::core::option::Option<streaming_recognize_request::StreamingRequest>,
}

pub mod streaming_recognize_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum StreamingRequest {
        #[prost(message, tag = "6")]
        StreamingConfig(super::StreamingRecognitionConfig),
        #[prost(bytes = "bytes", tag = "5")]
        Audio(::prost::bytes::Bytes),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingRecognitionResult {
    #[prost(message, repeated, tag = "1")]
    pub alternatives: ::prost::alloc::vec::Vec<SpeechRecognitionAlternative>,
    #[prost(bool, tag = "2")]
    pub is_final: bool,
    #[prost(float, tag = "3")]
    pub stability: f32,
    #[prost(int32, tag = "5")]
    pub channel_tag: i32,
    #[prost(string, tag = "6")]
    pub language_code: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingRecognizeResponse {
    #[prost(message, repeated, tag = "6")]
    pub results: ::prost::alloc::vec::Vec<StreamingRecognitionResult>,
    #[prost(enumeration = "SpeechEventType", tag = "3")]
    pub speech_event_type: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SpeechEventType {
    Unspecified = 0,
    EndOfSingleUtterance = 1,
    SpeechActivityBegin = 2,
    SpeechActivityEnd = 3,
}

impl StreamingRecognizeRequest {
    /// First message of a session: recognizer plus recognition settings.
    pub fn config(recognizer: impl Into<String>, config: RecognitionConfig) -> Self {
        Self {
            recognizer: recognizer.into(),
            streaming_request: Some(streaming_recognize_request::StreamingRequest::StreamingConfig(
                StreamingRecognitionConfig {
                    config: Some(config),
                },
            )),
        }
    }

    pub fn audio(chunk: ::prost::bytes::Bytes) -> Self {
        Self {
            recognizer: String::new(),
            streaming_request: Some(streaming_recognize_request::StreamingRequest::Audio(chunk)),
        }
    }

    pub fn audio_bytes(&self) -> Option<&::prost::bytes::Bytes> {
        match &self.streaming_request {
            Some(streaming_recognize_request::StreamingRequest::Audio(chunk)) => Some(chunk),
            _ => None,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self.streaming_request,
            Some(streaming_recognize_request::StreamingRequest::StreamingConfig(_))
        )
    }
}
