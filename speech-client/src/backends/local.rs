//! On-device speech fallback
//!
//! Drives the espeak-ng synthesizer as the substitute voice when the remote
//! service is unavailable. This path never fails: with no synthesizer on
//! the machine the call still resolves to a duration estimate, just without
//! audio.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

/// Locale requested for every fallback utterance
const ARABIC_LOCALE: &str = "ar-sa";
/// Accepted when no exact-locale voice exists
const ARABIC_PREFIX: &str = "ar";
const FALLBACK_VOICE_NAMES: &[&str] = &["Arabic", "ar-SA", "ar-EG", "Laila", "Maged"];

/// Words per minute, slightly below the synthesizer default of 175 for
/// clarity
const SPEECH_RATE_WPM: u32 = 157;

/// Duration estimate used when no synthesizer exists (silent path)
const SILENT_FLOOR_SECONDS: f64 = 1.5;
const SILENT_SECONDS_PER_WORD: f64 = 0.45;

/// Duration estimate while the synthesizer is speaking; doubles as the
/// safety-timeout ceiling so a backend that never signals completion cannot
/// block the caller
const SPOKEN_FLOOR_SECONDS: f64 = 1.8;
const SPOKEN_SECONDS_PER_WORD: f64 = 0.5;

/// Grace added to the safety timeout so a completion signal racing the
/// estimate still wins
const TIMEOUT_GRACE: Duration = Duration::from_millis(100);

/// Poll cadence while waiting for the synthesizer process
const WAIT_POLL: Duration = Duration::from_millis(50);

/// An available synthesizer voice
#[derive(Debug, Clone)]
pub struct LocalVoice {
    pub name: String,
    pub language: Option<String>,
}

/// On-device fallback voice
pub struct LocalSpeech {
    binary: Option<PathBuf>,
    voice: Option<String>,
    /// The utterance currently playing, tagged with its generation so a
    /// superseded waiter never reaps a newer utterance
    current: Mutex<Option<(u64, Child)>>,
    generation: AtomicU64,
}

impl LocalSpeech {
    /// Probe for an on-device synthesizer and pick the best Arabic voice
    pub fn discover() -> Self {
        let binary = which::which("espeak-ng").ok();
        let voice = binary.as_deref().and_then(|bin| {
            let voices = list_voices(bin);
            select_voice(&voices, ARABIC_LOCALE).map(|v| v.name.clone())
        });

        match (&binary, &voice) {
            (Some(bin), Some(voice)) => {
                debug!("Local speech: {} with voice {}", bin.display(), voice)
            }
            (Some(bin), None) => debug!(
                "Local speech: {} with the default voice",
                bin.display()
            ),
            (None, _) => debug!("No on-device synthesizer found, speech will be silent"),
        }

        Self {
            binary,
            voice,
            current: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// A fallback with no synthesizer; resolves estimates without audio
    pub fn unavailable() -> Self {
        Self {
            binary: None,
            voice: None,
            current: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    /// Speak the text, resolving on the earlier of synthesizer completion
    /// or the estimated duration elapsing. Never fails; the returned
    /// duration is positive for any input.
    pub async fn speak(&self, text: &str) -> f64 {
        let words = word_count(text);
        let Some(binary) = &self.binary else {
            return silent_estimate(words);
        };

        let estimate = spoken_estimate(words);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Cancel any utterance still playing so speech never overlaps
        {
            let mut current = self.current.lock().await;
            if let Some((_, mut child)) = current.take() {
                let _ = child.start_kill();
            }
        }

        let mut cmd = Command::new(binary);
        if let Some(voice) = &self.voice {
            cmd.arg("-v").arg(voice);
        }
        cmd.arg("-s").arg(SPEECH_RATE_WPM.to_string());
        cmd.arg("--stdin");
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn {}: {e}", binary.display());
                return estimate;
            }
        };

        // Text goes over stdin; closing it starts the speech
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                debug!("Failed to write utterance text: {e}");
            }
        }

        {
            let mut current = self.current.lock().await;
            *current = Some((generation, child));
        }

        self.wait_for_completion(generation, estimate).await;
        estimate
    }

    /// Poll the current utterance until it exits, is superseded, or the
    /// safety timeout elapses
    async fn wait_for_completion(&self, generation: u64, estimate: f64) {
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs_f64(estimate) + TIMEOUT_GRACE;

        loop {
            {
                let mut current = self.current.lock().await;
                let exited = match current.as_mut() {
                    Some((owner, child)) if *owner == generation => match child.try_wait() {
                        Ok(Some(_)) | Err(_) => true,
                        Ok(None) => false,
                    },
                    // A newer utterance took over, or the slot was cleared
                    _ => return,
                };
                if exited {
                    current.take();
                    return;
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep(WAIT_POLL).await;
        }
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn silent_estimate(words: usize) -> f64 {
    (words as f64 * SILENT_SECONDS_PER_WORD).max(SILENT_FLOOR_SECONDS)
}

fn spoken_estimate(words: usize) -> f64 {
    (words as f64 * SPOKEN_SECONDS_PER_WORD).max(SPOKEN_FLOOR_SECONDS)
}

/// Query the synthesizer's voice listing (best effort)
fn list_voices(binary: &Path) -> Vec<LocalVoice> {
    let output = match std::process::Command::new(binary).arg("--voices").output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!("--voices failed with status: {}", output.status);
            return Vec::new();
        }
        Err(e) => {
            debug!("Failed to list voices: {e}");
            return Vec::new();
        }
    };

    parse_voice_list(&String::from_utf8_lossy(&output.stdout))
}

/// Parse voice list output from `espeak-ng --voices`
fn parse_voice_list(output: &str) -> Vec<LocalVoice> {
    let mut voices = Vec::new();

    // Format: "Pty Language Age/Gender VoiceName File Other Languages"
    // Example: " 5  ar   --/M   Arabic   sem/ar"
    for line in output.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }

        voices.push(LocalVoice {
            name: fields[3].to_string(),
            language: Some(fields[1].to_string()),
        });
    }

    voices
}

/// Pick the best-available voice for the locale: exact locale match first,
/// then an Arabic-language voice or a known Arabic voice name, otherwise
/// none (synthesizer default)
fn select_voice<'a>(voices: &'a [LocalVoice], locale: &str) -> Option<&'a LocalVoice> {
    voices
        .iter()
        .find(|v| {
            v.language
                .as_deref()
                .is_some_and(|lang| lang.eq_ignore_ascii_case(locale))
        })
        .or_else(|| {
            voices.iter().find(|v| {
                v.language
                    .as_deref()
                    .is_some_and(|lang| lang.starts_with(ARABIC_PREFIX))
                    || FALLBACK_VOICE_NAMES
                        .iter()
                        .any(|name| v.name.contains(name))
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, language: Option<&str>) -> LocalVoice {
        LocalVoice {
            name: name.to_string(),
            language: language.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_voice_list() {
        let output = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n\
                      \x20 5  af              --/M      Afrikaans          gmw/af\n\
                      \x20 5  ar              --/M      Arabic             sem/ar\n\
                      \x20 5  en-gb           --/M      English_(Great_Britain) gmw/en\n";
        let voices = parse_voice_list(output);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1].name, "Arabic");
        assert_eq!(voices[1].language, Some("ar".to_string()));
        assert_eq!(voices[2].language, Some("en-gb".to_string()));
    }

    #[test]
    fn test_parse_voice_list_skips_short_lines() {
        let voices = parse_voice_list("header\n\nbad line\n");
        assert!(voices.is_empty());
    }

    #[test]
    fn test_select_voice_prefers_exact_locale() {
        let voices = vec![
            voice("Arabic", Some("ar")),
            voice("Arabic_(Saudi)", Some("ar-sa")),
        ];
        let selected = select_voice(&voices, "ar-sa").unwrap();
        assert_eq!(selected.name, "Arabic_(Saudi)");
    }

    #[test]
    fn test_select_voice_falls_back_to_language_prefix() {
        let voices = vec![voice("English", Some("en-gb")), voice("Arabic", Some("ar"))];
        let selected = select_voice(&voices, "ar-sa").unwrap();
        assert_eq!(selected.name, "Arabic");
    }

    #[test]
    fn test_select_voice_matches_known_names() {
        let voices = vec![voice("English", Some("en")), voice("Laila", None)];
        let selected = select_voice(&voices, "ar-sa").unwrap();
        assert_eq!(selected.name, "Laila");
    }

    #[test]
    fn test_select_voice_none_when_no_match() {
        let voices = vec![voice("English", Some("en-gb"))];
        assert!(select_voice(&voices, "ar-sa").is_none());
    }

    #[test]
    fn test_silent_estimate_floor_and_scaling() {
        assert_eq!(silent_estimate(0), 1.5);
        assert_eq!(silent_estimate(2), 1.5);
        assert_eq!(silent_estimate(10), 4.5);
    }

    #[test]
    fn test_spoken_estimate_floor_and_scaling() {
        assert_eq!(spoken_estimate(0), 1.8);
        assert_eq!(spoken_estimate(3), 1.8);
        assert_eq!(spoken_estimate(10), 5.0);
    }

    #[tokio::test]
    async fn test_unavailable_resolves_to_silent_estimate() {
        let local = LocalSpeech::unavailable();
        assert!(!local.is_available());

        let duration = local.speak("كيف نحافظ على دقة المعلومات؟").await;
        assert_eq!(duration, silent_estimate(5));
        assert!(duration > 0.0);
    }

    #[tokio::test]
    async fn test_unavailable_empty_text_still_positive() {
        let local = LocalSpeech::unavailable();
        let duration = local.speak("").await;
        assert_eq!(duration, 1.5);
    }
}
