//! Persistent learner progress
//!
//! Hearts, experience points, and per-college unlocked test levels, stored
//! as JSON next to the config file. The quiz engine reports outcomes here
//! and never touches hearts or unlocks directly.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::SanadConfig;
use crate::content::{INITIAL_HEARTS, PASS_THRESHOLD, XP_PER_CORRECT};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgress {
    #[serde(default = "default_hearts")]
    pub hearts: i32,

    #[serde(default)]
    pub xp: u32,

    /// Highest unlocked test index per college; a missing entry means only
    /// the first test is playable
    #[serde(default)]
    pub unlocked_levels: HashMap<String, usize>,
}

fn default_hearts() -> i32 {
    INITIAL_HEARTS
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            hearts: INITIAL_HEARTS,
            xp: 0,
            unlocked_levels: HashMap::new(),
        }
    }
}

impl UserProgress {
    /// Get the progress file path
    pub fn state_path() -> Result<PathBuf> {
        Ok(SanadConfig::config_dir()?.join("progress.json"))
    }

    /// Load progress from file, returning the defaults if none exists
    pub fn load() -> Result<Self> {
        let path = Self::state_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read progress file: {}", path.display()))?;
            let progress: UserProgress = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse progress file: {}", path.display()))?;
            Ok(progress)
        } else {
            Ok(UserProgress::default())
        }
    }

    /// Save progress to file
    pub fn save(&self) -> Result<()> {
        let path = Self::state_path()?;

        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create progress directory: {}", dir.display())
                })?;
            }
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize progress")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write progress file: {}", path.display()))?;

        Ok(())
    }

    /// Record one answered question: correct answers earn experience, a
    /// wrong answer costs a heart (never below zero)
    pub fn submit_answer(&mut self, _college_id: &str, _test_index: usize, was_correct: bool) {
        if was_correct {
            self.xp += XP_PER_CORRECT;
        } else {
            self.hearts = (self.hearts - 1).max(0);
        }
    }

    /// Apply a completed test and report whether it passed. A pass unlocks
    /// the next test index for the college; unlocks only ever move forward.
    pub fn on_test_complete(
        &mut self,
        college_id: &str,
        test_index: usize,
        score: u32,
        total: u32,
    ) -> bool {
        let passed = total > 0 && score as f64 / total as f64 >= PASS_THRESHOLD;
        if passed {
            let unlocked = self
                .unlocked_levels
                .entry(college_id.to_string())
                .or_insert(0);
            *unlocked = (*unlocked).max(test_index + 1);
        }
        passed
    }

    /// Highest unlocked test index for a college
    pub fn unlocked_index(&self, college_id: &str) -> usize {
        self.unlocked_levels.get(college_id).copied().unwrap_or(0)
    }

    /// Whether the given test index is playable for the college
    pub fn is_unlocked(&self, college_id: &str, test_index: usize) -> bool {
        test_index <= self.unlocked_index(college_id)
    }
}
