// Speech backend registry

pub mod gemini;
pub mod local;

use crate::backend::{SpeechAudio, SpeechBackend, SpeechRequest};
use crate::error::{Result, SpeechError};

/// Remote backends accepted by `create_backend`
pub const KNOWN_BACKENDS: &[&str] = &["gemini"];

/// Create a remote speech backend by name
pub fn create_backend(name: &str) -> Result<Box<dyn SpeechBackend>> {
    match name {
        "gemini" => Ok(Box::new(gemini::GeminiTtsBackend::from_env()?)),
        _ => Err(SpeechError::ConfigError(format!(
            "Unknown speech backend: {}. Available: {}",
            name,
            KNOWN_BACKENDS.join(", ")
        ))),
    }
}

/// Mock backend for testing orchestration behavior.
///
/// Counts synthesize calls so tests can assert that the quota latch
/// short-circuits the remote path.
pub struct MockBackend {
    respond: Box<dyn Fn() -> Result<SpeechAudio> + Send + Sync>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockBackend {
    pub fn always_succeeds(audio: SpeechAudio) -> Self {
        Self {
            respond: Box::new(move || Ok(audio.clone())),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn always_fails<F>(make_error: F) -> Self
    where
        F: Fn() -> SpeechError + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(move || Err(make_error())),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// How many times synthesize has been called
    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SpeechBackend for MockBackend {
    async fn synthesize(&self, _request: &SpeechRequest) -> Result<SpeechAudio> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        (self.respond)()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
