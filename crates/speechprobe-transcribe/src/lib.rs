pub mod one_shot;
pub mod request;
pub mod streaming;

pub use one_shot::{first_transcript, transcribe_one_shot};
pub use request::{one_shot_request, recognition_config, streaming_config_request};
pub use streaming::{StreamingOptions, StreamingTranscriber, CHUNK_DELAY, CHUNK_SIZE};
