//! Caption reveal synchronized to speech
//!
//! A duration-driven animation clock: given a line of text and how long the
//! utterance lasts, reveal one word per tick. The engine never synthesizes
//! anything itself, so a real audio duration and a fallback estimate drive
//! it identically.

use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};

/// Minimum duration when reading a question aloud
pub const QUESTION_FLOOR_SECONDS: f64 = 0.5;
/// Minimum duration for feedback and result lines
pub const FEEDBACK_FLOOR_SECONDS: f64 = 1.5;

/// Handle to an in-flight reveal, awaitable by the caller. The engine keeps
/// its own cancellation handle, so a superseded reveal resolves early with
/// its remaining callbacks suppressed.
#[derive(Debug)]
pub struct RevealHandle {
    task: JoinHandle<()>,
}

impl RevealHandle {
    /// Wait until the reveal finishes or is cancelled
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

/// Word-by-word reveal engine. At most one reveal is active at a time;
/// starting a new one cancels the previous one first.
#[derive(Debug, Default)]
pub struct CaptionEngine {
    active: Option<AbortHandle>,
}

impl CaptionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start revealing `text` over `duration_seconds`. `on_update` receives
    /// each growing prefix; `on_done` fires once after the last word.
    pub fn start<U, D>(
        &mut self,
        text: &str,
        duration_seconds: f64,
        floor_seconds: f64,
        on_update: U,
        on_done: D,
    ) -> RevealHandle
    where
        U: FnMut(&str) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        self.cancel();
        let handle = reveal_words(text, duration_seconds, floor_seconds, on_update, on_done);
        self.active = Some(handle.task.abort_handle());
        handle
    }

    /// Cancel the active reveal, if any; cancellation is a first-class
    /// operation, not a side effect of starting the next reveal
    pub fn cancel(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.abort();
        }
    }
}

impl Drop for CaptionEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawn a reveal task. The cadence spreads the guarded duration evenly
/// across the words; `on_update` fires exactly once per word with the
/// prefix revealed so far, joined by single spaces.
pub fn reveal_words<U, D>(
    text: &str,
    duration_seconds: f64,
    floor_seconds: f64,
    mut on_update: U,
    on_done: D,
) -> RevealHandle
where
    U: FnMut(&str) + Send + 'static,
    D: FnOnce() + Send + 'static,
{
    let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    let delay = word_delay(duration_seconds, floor_seconds, words.len());

    let task = tokio::spawn(async move {
        let mut revealed = String::new();
        for (i, word) in words.iter().enumerate() {
            tokio::time::sleep(delay).await;
            if i > 0 {
                revealed.push(' ');
            }
            revealed.push_str(word);
            on_update(&revealed);
        }
        on_done();
    });

    RevealHandle { task }
}

/// Per-word delay: the duration, guarded below by the floor, split evenly.
/// The floor keeps a near-zero duration from collapsing into an unreadable
/// flash.
fn word_delay(duration_seconds: f64, floor_seconds: f64, word_count: usize) -> Duration {
    if word_count == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(duration_seconds.max(floor_seconds) / word_count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(&str) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let update = move |text: &str| sink.lock().unwrap().push(text.to_string());
        (seen, update)
    }

    #[test]
    fn test_word_delay_spreads_duration() {
        assert_eq!(word_delay(2.0, 0.5, 4), Duration::from_millis(500));
        assert_eq!(word_delay(3.0, 1.5, 10), Duration::from_millis(300));
    }

    #[test]
    fn test_word_delay_applies_floor_near_zero() {
        assert_eq!(word_delay(0.0, 0.5, 5), Duration::from_millis(100));
        assert_eq!(word_delay(0.1, 1.5, 3), Duration::from_millis(500));
    }

    #[test]
    fn test_word_delay_empty_text() {
        assert_eq!(word_delay(2.0, 0.5, 0), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_grows_by_single_spaced_prefixes() {
        let (seen, update) = recorder();
        let done_seen = seen.clone();

        let handle = reveal_words("سند معك يا بطل", 2.0, 0.5, update, move || {
            done_seen.lock().unwrap().push("<done>".to_string());
        });
        handle.wait().await;

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                "سند".to_string(),
                "سند معك".to_string(),
                "سند معك يا".to_string(),
                "سند معك يا بطل".to_string(),
                "<done>".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_count_matches_word_count() {
        let (seen, update) = recorder();
        let done = Arc::new(Mutex::new(0usize));
        let done_counter = done.clone();

        let handle = reveal_words("a b c d e f g", 1.4, 0.5, update, move || {
            *done_counter.lock().unwrap() += 1;
        });
        handle.wait().await;

        assert_eq!(seen.lock().unwrap().len(), 7);
        assert_eq!(*done.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_finishes_without_updates() {
        let (seen, update) = recorder();
        let done = Arc::new(Mutex::new(false));
        let done_flag = done.clone();

        let handle = reveal_words("", 2.0, 0.5, update, move || {
            *done_flag.lock().unwrap() = true;
        });
        handle.wait().await;

        assert!(seen.lock().unwrap().is_empty());
        assert!(*done.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_updates_before_first_tick() {
        let mut engine = CaptionEngine::new();
        let (seen, update) = recorder();

        // One word per hundred seconds
        engine.start("بطيء جدا ثلاث", 300.0, 0.5, update, || {});
        tokio::time::sleep(Duration::from_secs(50)).await;
        assert!(seen.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);

        engine.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_starting_new_reveal_cancels_previous() {
        let mut engine = CaptionEngine::new();

        let (first_seen, first_update) = recorder();
        let first_handle = engine.start("واحد اثنان ثلاثة", 300.0, 0.5, first_update, || {});

        // First word lands at t = 100s
        tokio::time::sleep(Duration::from_secs(101)).await;
        assert_eq!(first_seen.lock().unwrap().len(), 1);

        let (second_seen, second_update) = recorder();
        let done = Arc::new(Mutex::new(false));
        let done_flag = done.clone();
        let second_handle = engine.start("جديد كليا", 1.0, 0.5, second_update, move || {
            *done_flag.lock().unwrap() = true;
        });

        // The superseded reveal resolves without further updates
        first_handle.wait().await;
        second_handle.wait().await;
        tokio::time::sleep(Duration::from_secs(400)).await;

        assert_eq!(first_seen.lock().unwrap().len(), 1);
        assert_eq!(second_seen.lock().unwrap().len(), 2);
        assert!(*done.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_stale_callbacks() {
        let mut engine = CaptionEngine::new();

        let (seen, update) = recorder();
        let done = Arc::new(Mutex::new(false));
        let done_flag = done.clone();
        let handle = engine.start("كلمة أولى ثانية", 3.0, 0.5, update, move || {
            *done_flag.lock().unwrap() = true;
        });

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);

        engine.cancel();
        handle.wait().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(!*done.lock().unwrap());
    }
}
