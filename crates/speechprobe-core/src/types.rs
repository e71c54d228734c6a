/// Model requested for every recognition call.
pub const RECOGNITION_MODEL: &str = "latest_long";

/// One recognized hypothesis surfaced to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub confidence: f32,
    pub is_final: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognitionMode {
    #[default]
    Streaming,
    OneShot,
}

impl RecognitionMode {
    pub fn from_one_shot_flag(one_shot: bool) -> Self {
        if one_shot {
            Self::OneShot
        } else {
            Self::Streaming
        }
    }
}

impl std::fmt::Display for RecognitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Streaming => f.write_str("streaming"),
            Self::OneShot => f.write_str("one-shot"),
        }
    }
}
