use crate::error::ConfigError;
use crate::types::RecognitionMode;
use std::fmt;
use std::path::PathBuf;

pub const ENV_PROJECT_ID: &str = "GOOGLE_PROJECT_ID";
pub const ENV_REGION: &str = "GOOGLE_REGION";
pub const ENV_RECOGNIZER_ID: &str = "RECOGNIZER_ID";
pub const ENV_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";

pub const DEFAULT_REGION: &str = "global";
pub const DEFAULT_PRIMARY_LANG: &str = "en-US";
pub const DEFAULT_BACKEND: &str = "grpc";

/// Command-line inputs, before they are merged with the environment.
#[derive(Debug, Clone)]
pub struct CliFlags {
    pub primary_lang: String,
    pub wav_in: Option<PathBuf>,
    pub one_shot: bool,
    pub backend: String,
    pub endpoint: Option<String>,
}

impl Default for CliFlags {
    fn default() -> Self {
        Self {
            primary_lang: DEFAULT_PRIMARY_LANG.to_string(),
            wav_in: None,
            one_shot: false,
            backend: DEFAULT_BACKEND.to_string(),
            endpoint: None,
        }
    }
}

/// Fully resolved, immutable settings for one run.
#[derive(Clone, PartialEq)]
pub struct AppConfig {
    pub project_id: String,
    pub region: String,
    pub recognizer_id: String,
    pub primary_lang: String,
    pub input_path: PathBuf,
    pub mode: RecognitionMode,
    pub backend: String,
    pub endpoint: String,
    pub access_token: Option<String>,
}

impl AppConfig {
    /// Resolve configuration from the process environment and parsed flags.
    pub fn from_env(flags: CliFlags) -> Result<Self, ConfigError> {
        Self::resolve(flags, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an injectable environment lookup.
    ///
    /// Empty values count as unset. A missing region falls back to
    /// [`DEFAULT_REGION`]; every other required field fails with its own
    /// [`ConfigError`] variant.
    pub fn resolve<F>(flags: CliFlags, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.is_empty());

        let project_id = lookup(ENV_PROJECT_ID).ok_or(ConfigError::MissingProjectId)?;

        let region = match lookup(ENV_REGION) {
            Some(region) => region,
            None => {
                tracing::warn!(
                    "Missing {} environment variable, using {}",
                    ENV_REGION,
                    DEFAULT_REGION
                );
                DEFAULT_REGION.to_string()
            }
        };

        let recognizer_id = lookup(ENV_RECOGNIZER_ID).ok_or(ConfigError::MissingRecognizerId)?;

        let input_path = flags
            .wav_in
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingInputPath)?;

        let endpoint = flags
            .endpoint
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| regional_endpoint(&region));

        Ok(Self {
            project_id,
            region,
            recognizer_id,
            primary_lang: flags.primary_lang,
            input_path,
            mode: RecognitionMode::from_one_shot_flag(flags.one_shot),
            backend: flags.backend,
            endpoint,
            access_token: lookup(ENV_ACCESS_TOKEN),
        })
    }

    /// Resource name addressing the recognizer, as the service expects it.
    pub fn recognizer_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/recognizers/{}",
            self.project_id, self.region, self.recognizer_id
        )
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("project_id", &self.project_id)
            .field("region", &self.region)
            .field("recognizer_id", &self.recognizer_id)
            .field("primary_lang", &self.primary_lang)
            .field("input_path", &self.input_path)
            .field("mode", &self.mode)
            .field("backend", &self.backend)
            .field("endpoint", &self.endpoint)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Regional service endpoint, e.g. `https://europe-west4-speech.googleapis.com`.
pub fn regional_endpoint(region: &str) -> String {
    format!("https://{region}-speech.googleapis.com")
}
