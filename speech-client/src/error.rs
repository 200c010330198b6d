//! Error types for speech synthesis

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpeechError>;

#[derive(Debug, Error)]
pub enum SpeechError {
    /// The remote service reported quota or rate-limit exhaustion.
    /// The orchestrator latches this for the rest of the session.
    #[error("Speech quota exceeded: {message}")]
    QuotaExceeded { message: String },

    /// Any other remote/API failure. The remote path is retried on the
    /// next request.
    #[error("Speech API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// The response succeeded but carried no inline audio part
    #[error("Speech response contained no audio payload")]
    NoAudioPayload,

    /// The inline audio payload could not be decoded into PCM samples
    #[error("Failed to decode audio payload: {message}")]
    DecodeError { message: String },

    #[error("{provider} API key not found in environment variable {env_var}")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SpeechError {
    /// Whether this failure signals quota/rate-limit exhaustion.
    ///
    /// The remote service reports exhaustion either as HTTP 429 or as an
    /// error body mentioning RESOURCE_EXHAUSTED or quota.
    pub fn is_quota_exhaustion(&self) -> bool {
        match self {
            SpeechError::QuotaExceeded { .. } => true,
            SpeechError::ApiError {
                message,
                status_code,
            } => {
                *status_code == Some(429)
                    || message.contains("RESOURCE_EXHAUSTED")
                    || message.contains("quota")
            }
            _ => false,
        }
    }
}
