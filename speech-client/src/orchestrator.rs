//! Remote-first speech orchestration with quota latching
//!
//! `speak` decides between the remote and the on-device path, absorbs every
//! failure into a usable duration, and remembers quota exhaustion for the
//! rest of the session so later requests skip the doomed network call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

use crate::backend::{SpeechBackend, SpeechRequest, SpeechResult, SpeechSource};
use crate::backends::local::LocalSpeech;
use crate::playback;

/// Session-wide remote-exhaustion flag.
///
/// Transitions false -> true at most once and never resets within a
/// session. Constructed fresh per orchestrator so tests never share state.
#[derive(Debug, Clone, Default)]
pub struct QuotaState {
    exhausted: Arc<AtomicBool>,
}

impl QuotaState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }

    /// Latch the flag. Returns true only for the call that performed the
    /// false -> true transition.
    pub fn exhaust(&self) -> bool {
        self.exhausted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Single entry point for speaking a line of text
pub struct SpeechOrchestrator {
    remote: Option<Box<dyn SpeechBackend>>,
    local: LocalSpeech,
    quota: QuotaState,
    voice: String,
}

impl SpeechOrchestrator {
    pub fn new(
        remote: Option<Box<dyn SpeechBackend>>,
        local: LocalSpeech,
        quota: QuotaState,
        voice: &str,
    ) -> Self {
        Self {
            remote,
            local,
            quota,
            voice: voice.to_string(),
        }
    }

    /// Speak one line of text, remote first with transparent fallback.
    /// Always resolves, and the returned duration is positive for any
    /// input. Playback runs detached; this only awaits the path decision.
    pub async fn speak(&self, text: &str) -> SpeechResult {
        if self.quota.is_exhausted() {
            return self.speak_locally(text).await;
        }

        let Some(remote) = &self.remote else {
            return self.speak_locally(text).await;
        };

        let request = SpeechRequest::new(text, &self.voice);
        match remote.synthesize(&request).await {
            Ok(audio) => {
                let duration_seconds = audio.duration_seconds();
                playback::play(audio);
                SpeechResult {
                    duration_seconds,
                    source: SpeechSource::Remote,
                }
            }
            Err(e) if e.is_quota_exhaustion() => {
                if self.quota.exhaust() {
                    warn!("Remote speech quota exceeded, switching to the on-device voice: {e}");
                }
                self.speak_locally(text).await
            }
            Err(e) => {
                warn!("Remote speech synthesis failed, using the on-device voice once: {e}");
                self.speak_locally(text).await
            }
        }
    }

    async fn speak_locally(&self, text: &str) -> SpeechResult {
        let duration_seconds = self.local.speak(text).await;
        SpeechResult {
            duration_seconds,
            source: SpeechSource::Local,
        }
    }

    /// Whether the degraded speech path is latched for the rest of the
    /// session
    pub fn is_fallback_active(&self) -> bool {
        self.quota.is_exhausted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SpeechAudio;
    use crate::backends::MockBackend;
    use crate::error::SpeechError;
    use std::sync::Arc;

    fn one_second_audio() -> SpeechAudio {
        SpeechAudio {
            samples: vec![0; 24_000],
            sample_rate: 24_000,
            channels: 1,
        }
    }

    fn orchestrator_with(mock: Arc<MockBackend>) -> SpeechOrchestrator {
        SpeechOrchestrator::new(
            Some(Box::new(SharedBackend(mock))),
            LocalSpeech::unavailable(),
            QuotaState::new(),
            "Puck",
        )
    }

    /// Wrapper so tests can keep a handle on the mock's call counter
    struct SharedBackend(Arc<MockBackend>);

    #[async_trait::async_trait]
    impl SpeechBackend for SharedBackend {
        async fn synthesize(
            &self,
            request: &SpeechRequest,
        ) -> crate::error::Result<SpeechAudio> {
            self.0.synthesize(request).await
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    #[test]
    fn test_quota_state_latches_once() {
        let quota = QuotaState::new();
        assert!(!quota.is_exhausted());

        assert!(quota.exhaust());
        assert!(quota.is_exhausted());

        // Second latch attempt reports it already happened
        assert!(!quota.exhaust());
        assert!(quota.is_exhausted());
    }

    #[tokio::test]
    async fn test_remote_success_reports_remote_duration() {
        let mock = Arc::new(MockBackend::always_succeeds(one_second_audio()));
        let orchestrator = orchestrator_with(mock.clone());

        let result = orchestrator.speak("مرحبا يا بطل").await;

        assert_eq!(result.source, SpeechSource::Remote);
        assert_eq!(result.duration_seconds, 1.0);
        assert_eq!(mock.call_count(), 1);
        assert!(!orchestrator.is_fallback_active());
    }

    #[tokio::test]
    async fn test_quota_failure_latches_and_short_circuits() {
        let mock = Arc::new(MockBackend::always_fails(|| SpeechError::QuotaExceeded {
            message: "RESOURCE_EXHAUSTED".to_string(),
        }));
        let orchestrator = orchestrator_with(mock.clone());

        let first = orchestrator.speak("السؤال الأول").await;
        assert_eq!(first.source, SpeechSource::Local);
        assert!(first.duration_seconds > 0.0);
        assert!(orchestrator.is_fallback_active());
        assert_eq!(mock.call_count(), 1);

        // Every later request goes straight to the local path
        let second = orchestrator.speak("السؤال الثاني").await;
        assert_eq!(second.source, SpeechSource::Local);
        assert_eq!(mock.call_count(), 1);

        let third = orchestrator.speak("السؤال الثالث").await;
        assert_eq!(third.source, SpeechSource::Local);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_retries_remote_next_call() {
        let mock = Arc::new(MockBackend::always_fails(|| SpeechError::ApiError {
            message: "internal error".to_string(),
            status_code: Some(500),
        }));
        let orchestrator = orchestrator_with(mock.clone());

        let first = orchestrator.speak("سؤال").await;
        assert_eq!(first.source, SpeechSource::Local);
        assert!(!orchestrator.is_fallback_active());

        // The remote path is attempted again on the next request
        let second = orchestrator.speak("سؤال آخر").await;
        assert_eq!(second.source, SpeechSource::Local);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_audio_payload_is_transient() {
        let mock = Arc::new(MockBackend::always_fails(|| SpeechError::NoAudioPayload));
        let orchestrator = orchestrator_with(mock.clone());

        let result = orchestrator.speak("سؤال").await;
        assert_eq!(result.source, SpeechSource::Local);
        assert!(result.duration_seconds > 0.0);
        assert!(!orchestrator.is_fallback_active());
    }

    #[tokio::test]
    async fn test_without_remote_backend_uses_local() {
        let orchestrator = SpeechOrchestrator::new(
            None,
            LocalSpeech::unavailable(),
            QuotaState::new(),
            "Puck",
        );

        let result = orchestrator.speak("مرحبا").await;
        assert_eq!(result.source, SpeechSource::Local);
        assert!(result.duration_seconds > 0.0);
    }

    #[tokio::test]
    async fn test_duration_positive_for_empty_text() {
        let mock = Arc::new(MockBackend::always_fails(|| SpeechError::NoAudioPayload));
        let orchestrator = orchestrator_with(mock);

        let result = orchestrator.speak("").await;
        assert!(result.duration_seconds > 0.0);
    }
}
