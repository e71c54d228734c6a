use anyhow::{Context, Result};
use clap::Parser;
use speechprobe_core::{AppConfig, AudioPayload, CliFlags, RecognitionMode};
use speechprobe_client::SpeechBackend;
use speechprobe_core::Transcript;
use speechprobe_transcribe::StreamingTranscriber;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "speechprobe",
    about = "Compare streaming and one-shot cloud speech recognition on a WAV file"
)]
struct Cli {
    /// Primary language code
    #[arg(long, default_value = speechprobe_core::config::DEFAULT_PRIMARY_LANG)]
    primary: String,

    /// Path to read WAV file from
    #[arg(long)]
    wav_in: Option<PathBuf>,

    /// Use one-shot recognition instead of streaming
    #[arg(long)]
    one_shot: bool,

    /// Speech backend to use ("grpc" or "null")
    #[arg(long, default_value = speechprobe_core::config::DEFAULT_BACKEND)]
    backend: String,

    /// Override the regional service endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Log filter, e.g. "debug" or "speechprobe_transcribe=trace"
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn flags(&self) -> CliFlags {
        CliFlags {
            primary_lang: self.primary.clone(),
            wav_in: self.wav_in.clone(),
            one_shot: self.one_shot,
            backend: self.backend.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    if let Err(e) = run(&cli).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::from_env(cli.flags()).context("Failed to load configuration")?;
    tracing::info!("Configuration: {config:?}");

    tracing::info!("Reading WAV file from {}", config.input_path.display());
    let audio = AudioPayload::read(&config.input_path)
        .with_context(|| format!("failed to read WAV file {:?}", config.input_path))?;

    match audio.wav_info() {
        Ok(info) => tracing::info!(
            bytes = audio.len(),
            sample_rate = info.sample_rate,
            channels = info.channels,
            bits_per_sample = info.bits_per_sample,
            duration_secs = info.duration_secs(),
            "loaded audio"
        ),
        Err(e) => tracing::warn!(
            bytes = audio.len(),
            "{e}; sending as-is for service-side format detection"
        ),
    }

    let registry = speechprobe_client::BackendRegistry::new();
    let mut backend = registry
        .create(&config.backend)
        .with_context(|| format!("available backends: {:?}", registry.list_backends()))?;
    backend
        .initialize(&config)
        .await
        .context("failed to create speech client")?;

    match config.mode {
        RecognitionMode::OneShot => {
            let transcript =
                speechprobe_transcribe::transcribe_one_shot(backend.as_ref(), &config, &audio)
                    .await
                    .context("Failed to handle one-shot WAV input")?;
            println!(
                "{:?} (confidence: {:.2})",
                transcript.text, transcript.confidence
            );
        }
        RecognitionMode::Streaming => {
            run_streaming(backend.as_ref(), &config, &audio, std::io::stdout())
                .await
                .context("Failed to handle streaming WAV input")?;
        }
    }

    tracing::info!("{} recognition finished", config.mode);
    Ok(())
}

fn print_transcript(out: &mut impl Write, t: &Transcript) -> std::io::Result<()> {
    writeln!(
        out,
        "{:?} (confidence: {:.2}, final: {})",
        t.text, t.confidence, t.is_final
    )
}

/// Run a streaming session, writing each surfaced transcript to `out`.
///
/// Transcripts already surfaced are written out even when the session fails.
async fn run_streaming<W>(
    backend: &dyn SpeechBackend,
    config: &AppConfig,
    audio: &AudioPayload,
    mut out: W,
) -> Result<(), speechprobe_core::TranscribeError>
where
    W: Write + Send + 'static,
{
    let mut transcriber = StreamingTranscriber::default();
    let printer = transcriber.take_transcript_receiver().map(move |mut rx| {
        tokio::spawn(async move {
            while let Some(t) = rx.recv().await {
                if let Err(e) = print_transcript(&mut out, &t) {
                    tracing::warn!("failed to write transcript: {e}");
                }
            }
        })
    });

    let outcome = transcriber.run(backend, config, audio).await;

    drop(transcriber);
    if let Some(printer) = printer {
        let _ = printer.await;
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use speechprobe_client::proto::{
        RecognizeRequest, RecognizeResponse, SpeechRecognitionAlternative,
        StreamingRecognitionResult, StreamingRecognizeRequest, StreamingRecognizeResponse,
    };
    use speechprobe_client::StreamingSession;
    use speechprobe_core::SpeechError;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Answers one transcript, then loses the connection.
    struct DroppingBackend;

    #[async_trait]
    impl SpeechBackend for DroppingBackend {
        fn name(&self) -> &str {
            "dropping"
        }

        async fn initialize(&mut self, _config: &AppConfig) -> Result<(), SpeechError> {
            Ok(())
        }

        async fn recognize(
            &self,
            _request: RecognizeRequest,
        ) -> Result<RecognizeResponse, SpeechError> {
            Err(SpeechError::RequestFailed("unused".to_string()))
        }

        async fn streaming_recognize(
            &self,
            _initial: StreamingRecognizeRequest,
        ) -> Result<StreamingSession, SpeechError> {
            let (req_tx, mut req_rx) = mpsc::channel(4);
            tokio::spawn(async move { while req_rx.recv().await.is_some() {} });

            let (resp_tx, resp_rx) =
                mpsc::channel::<Result<StreamingRecognizeResponse, SpeechError>>(4);
            resp_tx
                .try_send(Ok(StreamingRecognizeResponse {
                    results: vec![StreamingRecognitionResult {
                        alternatives: vec![SpeechRecognitionAlternative {
                            transcript: "partial words".to_string(),
                            confidence: 0.5,
                        }],
                        ..Default::default()
                    }],
                    ..Default::default()
                }))
                .unwrap();
            resp_tx
                .try_send(Err(SpeechError::ReceiveFailed("Unavailable: reset".to_string())))
                .unwrap();
            Ok(StreamingSession::new(req_tx, resp_rx))
        }

        async fn close(&self) -> Result<(), SpeechError> {
            Ok(())
        }
    }

    fn test_config() -> AppConfig {
        let flags = CliFlags {
            wav_in: Some(PathBuf::from("capture.wav")),
            ..CliFlags::default()
        };
        AppConfig::resolve(flags, |key| match key {
            "GOOGLE_PROJECT_ID" | "RECOGNIZER_ID" => Some("x".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_cli_flags_carry_arguments() {
        let cli = Cli::parse_from(["speechprobe", "--wav-in", "a.wav", "--one-shot"]);
        let flags = cli.flags();
        assert_eq!(flags.wav_in, Some(PathBuf::from("a.wav")));
        assert!(flags.one_shot);
        assert_eq!(flags.primary_lang, "en-US");
        assert_eq!(flags.backend, "grpc");
    }

    #[tokio::test]
    async fn test_run_streaming_writes_transcripts_before_failing() {
        let out = SharedBuf::default();
        let audio = AudioPayload::from_bytes(vec![0u8; 100]);

        let result = run_streaming(&DroppingBackend, &test_config(), &audio, out.clone()).await;
        assert!(matches!(
            result,
            Err(speechprobe_core::TranscribeError::ReceiveTranscription(_))
        ));

        let written = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "\"partial words\" (confidence: 0.50, final: false)\n");
    }
}
