use speechprobe_client::proto::{
    recognition_config::DecodingConfig, recognize_request::AudioSource, AutoDetectDecodingConfig,
    RecognitionConfig, RecognizeRequest, StreamingRecognizeRequest,
};
use speechprobe_core::{AppConfig, AudioPayload, RECOGNITION_MODEL};

/// Recognition settings shared by both paths: auto-detected encoding, the
/// primary language and the fixed model.
pub fn recognition_config(primary_lang: &str) -> RecognitionConfig {
    RecognitionConfig {
        model: RECOGNITION_MODEL.to_string(),
        language_codes: vec![primary_lang.to_string()],
        decoding_config: Some(DecodingConfig::AutoDecodingConfig(AutoDetectDecodingConfig {})),
    }
}

pub fn streaming_config_request(config: &AppConfig) -> StreamingRecognizeRequest {
    StreamingRecognizeRequest::config(
        config.recognizer_name(),
        recognition_config(&config.primary_lang),
    )
}

pub fn one_shot_request(config: &AppConfig, audio: &AudioPayload) -> RecognizeRequest {
    RecognizeRequest {
        recognizer: config.recognizer_name(),
        config: Some(recognition_config(&config.primary_lang)),
        audio_source: Some(AudioSource::Content(audio.bytes().clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speechprobe_client::proto::streaming_recognize_request::StreamingRequest;
    use speechprobe_core::CliFlags;
    use std::path::PathBuf;

    fn test_config() -> AppConfig {
        let flags = CliFlags {
            wav_in: Some(PathBuf::from("capture.wav")),
            primary_lang: "fr-FR".to_string(),
            ..CliFlags::default()
        };
        AppConfig::resolve(flags, |key| match key {
            "GOOGLE_PROJECT_ID" => Some("proj".to_string()),
            "GOOGLE_REGION" => Some("us-central1".to_string()),
            "RECOGNIZER_ID" => Some("rec".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_recognition_config_fields() {
        let config = recognition_config("en-US");
        assert_eq!(config.model, "latest_long");
        assert_eq!(config.language_codes, vec!["en-US"]);
        assert!(matches!(
            config.decoding_config,
            Some(DecodingConfig::AutoDecodingConfig(_))
        ));
    }

    #[test]
    fn test_streaming_config_request() {
        let req = streaming_config_request(&test_config());
        assert_eq!(
            req.recognizer,
            "projects/proj/locations/us-central1/recognizers/rec"
        );
        match req.streaming_request {
            Some(StreamingRequest::StreamingConfig(streaming)) => {
                assert_eq!(streaming.config, Some(recognition_config("fr-FR")));
            }
            other => panic!("expected streaming config, got {other:?}"),
        }
    }

    #[test]
    fn test_one_shot_request_carries_full_payload() {
        let audio = AudioPayload::from_bytes(vec![3u8; 16384]);
        let req = one_shot_request(&test_config(), &audio);
        assert_eq!(req.recognizer, "projects/proj/locations/us-central1/recognizers/rec");
        assert_eq!(req.config, Some(recognition_config("fr-FR")));
        match req.audio_source {
            Some(AudioSource::Content(content)) => assert_eq!(content.len(), 16384),
            other => panic!("expected inline content, got {other:?}"),
        }
    }
}
