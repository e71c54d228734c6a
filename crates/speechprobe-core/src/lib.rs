pub mod audio;
pub mod config;
pub mod error;
pub mod types;

pub use audio::{AudioPayload, WavInfo};
pub use config::{AppConfig, CliFlags};
pub use error::{AudioError, ConfigError, SpeechError, TranscribeError};
pub use types::{RecognitionMode, Transcript, RECOGNITION_MODEL};
