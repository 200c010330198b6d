// Speech backend trait and types

use async_trait::async_trait;

use crate::error::Result;

/// One request to render a line of text as speech
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// The line to speak (non-empty)
    pub text: String,
    /// Requested voice identity
    pub voice: String,
}

impl SpeechRequest {
    pub fn new(text: &str, voice: &str) -> Self {
        Self {
            text: text.to_string(),
            voice: voice.to_string(),
        }
    }
}

/// Decoded audio ready for playback: little-endian 16-bit PCM
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SpeechAudio {
    /// Number of frames (one sample per channel)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Playback duration in seconds: frames / sample rate
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

/// Which path produced a spoken utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechSource {
    Remote,
    Local,
}

/// Returned to the caller once playback has started; the caller never
/// waits for playback to finish
#[derive(Debug, Clone, Copy)]
pub struct SpeechResult {
    pub duration_seconds: f64,
    pub source: SpeechSource,
}

/// Speech backend trait - remote synthesis engines implement this
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Synthesize text into a playable PCM buffer
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio>;

    /// Backend name
    fn name(&self) -> &'static str;
}
