//! Mascot expression state
//!
//! Mansour's expression is a closed state machine driven by quiz events
//! rather than ad hoc strings scattered across call sites.

use std::time::Duration;

/// How long the writing pose holds after a selection before reverting
pub const WRITING_HOLD: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MascotState {
    #[default]
    Idle,
    /// Scribbling right after the learner picks an option
    Writing,
    /// An utterance is in flight and the caption is revealing
    Talking,
    Happy,
    Sad,
    /// Results entrance after a passing score
    Celebrate,
}

impl MascotState {
    /// The learner picked an option while the answer is still open
    pub fn on_select(self) -> Self {
        MascotState::Writing
    }

    /// The writing hold elapsed; revert only when nothing was checked in
    /// the meantime
    pub fn on_writing_elapsed(self, is_checked: bool) -> Self {
        if self == MascotState::Writing && !is_checked {
            MascotState::Idle
        } else {
            self
        }
    }

    /// An utterance started speaking
    pub fn on_utterance_start(self) -> Self {
        MascotState::Talking
    }

    /// The caption reveal completed
    pub fn on_reveal_done(self) -> Self {
        MascotState::Idle
    }

    /// The answer was checked
    pub fn on_check(self, correct: bool) -> Self {
        if correct {
            MascotState::Happy
        } else {
            MascotState::Sad
        }
    }

    /// Entering the results screen
    pub fn on_results(passed: bool) -> Self {
        if passed {
            MascotState::Celebrate
        } else {
            MascotState::Happy
        }
    }

    /// Face shown next to the mascot's lines in the terminal
    pub fn face(self) -> &'static str {
        match self {
            MascotState::Idle => "🙂",
            MascotState::Writing => "✍️",
            MascotState::Talking => "🗣️",
            MascotState::Happy => "😄",
            MascotState::Sad => "😟",
            MascotState::Celebrate => "🎉",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_enters_writing() {
        assert_eq!(MascotState::Idle.on_select(), MascotState::Writing);
    }

    #[test]
    fn test_writing_reverts_to_idle_when_unchecked() {
        assert_eq!(
            MascotState::Writing.on_writing_elapsed(false),
            MascotState::Idle
        );
    }

    #[test]
    fn test_writing_holds_when_already_checked() {
        assert_eq!(
            MascotState::Writing.on_writing_elapsed(true),
            MascotState::Writing
        );
    }

    #[test]
    fn test_writing_timer_does_not_clobber_later_states() {
        // The hold timer may fire after a check already moved the mascot on
        assert_eq!(
            MascotState::Happy.on_writing_elapsed(true),
            MascotState::Happy
        );
        assert_eq!(MascotState::Sad.on_writing_elapsed(true), MascotState::Sad);
    }

    #[test]
    fn test_utterance_and_reveal_cycle() {
        let talking = MascotState::Idle.on_utterance_start();
        assert_eq!(talking, MascotState::Talking);
        assert_eq!(talking.on_reveal_done(), MascotState::Idle);

        // Talking overrides a feedback expression while speaking
        assert_eq!(MascotState::Happy.on_utterance_start(), MascotState::Talking);
    }

    #[test]
    fn test_check_maps_to_happy_or_sad() {
        assert_eq!(MascotState::Idle.on_check(true), MascotState::Happy);
        assert_eq!(MascotState::Writing.on_check(false), MascotState::Sad);
    }

    #[test]
    fn test_results_expression() {
        assert_eq!(MascotState::on_results(true), MascotState::Celebrate);
        assert_eq!(MascotState::on_results(false), MascotState::Happy);
    }
}
