//! Gemini generative TTS backend
//!
//! Calls the generateContent endpoint with an audio response modality and
//! decodes the returned inline payload: base64 text wrapping raw
//! little-endian 16-bit PCM, 24 kHz mono.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::backend::{SpeechAudio, SpeechBackend, SpeechRequest};
use crate::error::{Result, SpeechError};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.5-flash-preview-tts";
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Sample format of the inline audio payload
const SAMPLE_RATE: u32 = 24_000;
const CHANNELS: u16 = 1;

/// Provider for the Gemini speech-generation API
pub struct GeminiTtsBackend {
    api_key: String,
    base_url: String,
    client: Client,
}

impl GeminiTtsBackend {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: API_BASE.to_string(),
            client: Client::new(),
        }
    }

    /// Create a backend reading the API key from GEMINI_API_KEY
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| SpeechError::MissingApiKey {
            provider: "Gemini".to_string(),
            env_var: API_KEY_ENV.to_string(),
        })?;
        Ok(Self::new(api_key))
    }

    /// Override the endpoint base URL (used by tests)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

/// Wrap the text in the fixed accent-steering instruction the voice model
/// expects
fn build_prompt(text: &str) -> String {
    format!("Speak the following text in a warm Saudi Arabic accent (ar-SA): {text}")
}

/// Classify a failed response: 429 and quota markers latch the fallback,
/// everything else is a transient API error
fn classify_failure(status_code: Option<u16>, message: String) -> SpeechError {
    if status_code == Some(429)
        || message.contains("RESOURCE_EXHAUSTED")
        || message.contains("quota")
    {
        SpeechError::QuotaExceeded { message }
    } else {
        SpeechError::ApiError {
            message,
            status_code,
        }
    }
}

/// Interpret raw bytes as little-endian 16-bit PCM samples
fn decode_pcm(data: &[u8]) -> Result<Vec<i16>> {
    if data.len() % 2 != 0 {
        return Err(SpeechError::DecodeError {
            message: format!("PCM payload has odd byte length {}", data.len()),
        });
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Extract and decode the inline audio part of a successful response body
fn parse_audio_response(body: &str) -> Result<SpeechAudio> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| SpeechError::ApiError {
            message: format!("Failed to parse response: {e}"),
            status_code: None,
        })?;

    let inline = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.inline_data)
        .ok_or(SpeechError::NoAudioPayload)?;

    let bytes = BASE64
        .decode(inline.data.as_bytes())
        .map_err(|e| SpeechError::DecodeError {
            message: format!("Invalid base64 audio payload: {e}"),
        })?;

    let samples = decode_pcm(&bytes)?;
    if samples.is_empty() {
        return Err(SpeechError::NoAudioPayload);
    }

    Ok(SpeechAudio {
        samples,
        sample_rate: SAMPLE_RATE,
        channels: CHANNELS,
    })
}

// Gemini API request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[async_trait]
impl SpeechBackend for GeminiTtsBackend {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: build_prompt(&request.text),
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: request.voice.clone(),
                        },
                    },
                },
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, MODEL);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::ApiError {
                message: format!("Request failed: {e}"),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    match error_response.error.status {
                        Some(api_status) => {
                            format!("{}: {}", api_status, error_response.error.message)
                        }
                        None => error_response.error.message,
                    }
                } else {
                    error_text
                };
            return Err(classify_failure(Some(status.as_u16()), message));
        }

        let text = response.text().await.map_err(|e| SpeechError::ApiError {
            message: format!("Failed to read response: {e}"),
            status_code: None,
        })?;

        parse_audio_response(&text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
