//! Quiz progression state machine
//!
//! One attempt per shown question, one session per test. A question moves
//! Unanswered -> Selected -> Checked -> Advanced; the session tallies the
//! score and emits the final result for the pass/fail decision.

use crate::content::{PASS_THRESHOLD, Question, Test};
use crate::mascot::MascotState;

/// Fixed feedback lines spoken right after a check
pub const CORRECT_FEEDBACK: &str = "كفو يا بطل! إجابة صحيحة مية بالمية! 👏";
pub const INCORRECT_FEEDBACK: &str = "لا تشيل هم.. ركز في الجاي! 💪";

/// Mutable state for the question currently on screen
#[derive(Debug, Clone)]
pub struct QuestionAttempt {
    pub question_id: String,
    pub selected: Option<usize>,
    pub is_checked: bool,
    pub is_correct: Option<bool>,
}

impl QuestionAttempt {
    fn new(question: &Question) -> Self {
        Self {
            question_id: question.id.clone(),
            selected: None,
            is_checked: false,
            is_correct: None,
        }
    }
}

/// Outcome of checking the current answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    pub correct: bool,
    pub mascot: MascotState,
    pub feedback: &'static str,
}

/// What advancing past a checked answer leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Complete(TestResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestResult {
    pub score: u32,
    pub total: u32,
}

/// Follow-up action offered on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    NextLevel,
    Retry,
}

/// Final verdict for a completed test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub perfect: bool,
}

impl Verdict {
    /// A perfect score unlocks the shortcut to the next level; anything
    /// else offers a retry
    pub fn next_action(&self) -> NextAction {
        if self.perfect {
            NextAction::NextLevel
        } else {
            NextAction::Retry
        }
    }
}

/// Apply the pass threshold to a completed test
pub fn evaluate(result: TestResult) -> Verdict {
    if result.total == 0 {
        return Verdict {
            passed: false,
            perfect: false,
        };
    }
    Verdict {
        passed: result.score as f64 / result.total as f64 >= PASS_THRESHOLD,
        perfect: result.score == result.total,
    }
}

/// Spoken line for the results screen
pub fn result_feedback(verdict: Verdict) -> &'static str {
    if verdict.perfect {
        "كفووو يا بطل! نتيجة كاملة تبيض الوجه، أنت جاهز للمستوى اللي بعده! 🚀"
    } else if verdict.passed {
        "كفو يا بطل! رفعت راسي وفتحت المستوى الجديد.. لكن تقدر تجيب الكاملة!"
    } else {
        "بداية موفقة يا بطل، حاول مرة ثانية عشان تفتح مستويات جديدة! 💪"
    }
}

/// State for one run through a test
#[derive(Debug, Clone)]
pub struct TestSession {
    pub college_id: String,
    pub test_index: usize,
    test: Test,
    current: usize,
    correct_count: u32,
    attempt: QuestionAttempt,
}

impl TestSession {
    pub fn new(college_id: &str, test_index: usize, test: Test) -> Self {
        let attempt = QuestionAttempt::new(&test.questions[0]);
        Self {
            college_id: college_id.to_string(),
            test_index,
            test,
            current: 0,
            correct_count: 0,
            attempt,
        }
    }

    pub fn current_question(&self) -> &Question {
        &self.test.questions[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total_questions(&self) -> usize {
        self.test.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.correct_count
    }

    pub fn attempt(&self) -> &QuestionAttempt {
        &self.attempt
    }

    /// Record a selection. Rejected once the answer has been checked or
    /// when the index is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if self.attempt.is_checked || index >= self.current_question().options.len() {
            return false;
        }
        self.attempt.selected = Some(index);
        true
    }

    /// Check the selected answer. Returns None when nothing is selected or
    /// the answer was already checked, so a double check can never
    /// double-count the score.
    pub fn check(&mut self) -> Option<CheckOutcome> {
        if self.attempt.is_checked {
            return None;
        }
        let selected = self.attempt.selected?;

        let correct = selected == self.current_question().correct_answer_index;
        self.attempt.is_checked = true;
        self.attempt.is_correct = Some(correct);
        if correct {
            self.correct_count += 1;
        }

        Some(CheckOutcome {
            correct,
            mascot: MascotState::Idle.on_check(correct),
            feedback: if correct {
                CORRECT_FEEDBACK
            } else {
                INCORRECT_FEEDBACK
            },
        })
    }

    /// Move past a checked answer: reset the attempt for the next question,
    /// or complete the session after the last one
    pub fn advance(&mut self) -> Advance {
        if self.current + 1 < self.test.questions.len() {
            self.current += 1;
            self.attempt = QuestionAttempt::new(&self.test.questions[self.current]);
            Advance::Next
        } else {
            Advance::Complete(TestResult {
                score: self.correct_count,
                total: self.test.questions.len() as u32,
            })
        }
    }
}
