use serde::{Deserialize, Serialize};

use crate::error::{BitextError, Result};

/// Configuration for [`ParagraphAligner`](super::ParagraphAligner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Minimum similarity for a paragraph match.
    pub threshold: f32,
    /// Base window size; the first window is one larger.
    pub default_window: usize,
    /// Largest window reached by backlog growth.
    pub max_window: usize,
    /// Consecutive stuck right-paragraphs before the full-chapter search.
    pub fallback_after: usize,
    /// The pair is abandoned once the stuck counter exceeds this value.
    pub give_up_after: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            default_window: 2,
            max_window: 10,
            fallback_after: 10,
            give_up_after: 20,
        }
    }
}

impl AlignConfig {
    /// Create a new aligner configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the paragraph match threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(-1.0, 1.0);
        self
    }

    /// Set the default and maximum window sizes.
    pub fn with_windows(mut self, default_window: usize, max_window: usize) -> Self {
        self.default_window = default_window;
        self.max_window = max_window;
        self
    }

    /// Set the stuck limits for the fallback search and for giving up.
    pub fn with_stuck_limits(mut self, fallback_after: usize, give_up_after: usize) -> Self {
        self.fallback_after = fallback_after;
        self.give_up_after = give_up_after;
        self
    }

    /// Checks that the window sizes and stuck limits are consistent.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::InvalidConfig` describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.max_window <= self.default_window {
            return Err(BitextError::InvalidConfig(format!(
                "max window {} must exceed default window {}",
                self.max_window, self.default_window
            )));
        }
        if self.fallback_after > self.give_up_after {
            return Err(BitextError::InvalidConfig(format!(
                "fallback after {} stuck paragraphs can never trigger before giving up after {}",
                self.fallback_after, self.give_up_after
            )));
        }
        Ok(())
    }
}
