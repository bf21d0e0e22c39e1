use serde::{Deserialize, Serialize};

use crate::error::{BitextError, Result};

/// Length window of the narrow pass, in percentage points of book length.
pub const NARROW_RANGE: f64 = 0.75;
/// Length window of the wide pass; wide enough to admit every chapter.
pub const WIDE_RANGE: f64 = 100.0;
/// Score at which a chapter pair is committed immediately.
pub const ACCEPT_THRESHOLD: f32 = 0.8;
/// Score at which a wide-pass pair becomes a resolution candidate.
pub const CANDIDATE_THRESHOLD: f32 = 0.7;

/// Configuration for [`ChapterMatcher`](super::ChapterMatcher).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Narrow-pass length window (± percentage points).
    pub narrow_range: f64,
    /// Wide-pass length window (± percentage points).
    pub wide_range: f64,
    /// Immediate acceptance threshold for the narrow and wide passes.
    pub accept_threshold: f32,
    /// Minimum score for a wide-pass pair to enter the resolution pass.
    pub candidate_threshold: f32,
    /// Paragraphs per abstract.
    pub abstract_paragraphs: usize,
    /// Paragraphs per right-chapter abstract in the wide pass.
    pub wide_abstract_paragraphs: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            narrow_range: NARROW_RANGE,
            wide_range: WIDE_RANGE,
            accept_threshold: ACCEPT_THRESHOLD,
            candidate_threshold: CANDIDATE_THRESHOLD,
            abstract_paragraphs: 10,
            wide_abstract_paragraphs: 15,
        }
    }
}

impl MatchConfig {
    /// Create a new matcher configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the narrow-pass length window.
    pub fn with_narrow_range(mut self, range: f64) -> Self {
        self.narrow_range = range.max(0.0);
        self
    }

    /// Set the wide-pass length window.
    pub fn with_wide_range(mut self, range: f64) -> Self {
        self.wide_range = range.max(0.0);
        self
    }

    /// Set the immediate acceptance threshold.
    pub fn with_accept_threshold(mut self, threshold: f32) -> Self {
        self.accept_threshold = threshold.clamp(-1.0, 1.0);
        self
    }

    /// Set the resolution candidate threshold.
    pub fn with_candidate_threshold(mut self, threshold: f32) -> Self {
        self.candidate_threshold = threshold.clamp(-1.0, 1.0);
        self
    }

    /// Set the abstract sizes of the narrow and wide passes.
    pub fn with_abstract_paragraphs(mut self, narrow: usize, wide: usize) -> Self {
        self.abstract_paragraphs = narrow;
        self.wide_abstract_paragraphs = wide;
        self
    }

    /// Checks that the thresholds and abstract sizes are consistent.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::InvalidConfig` describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.candidate_threshold > self.accept_threshold {
            return Err(BitextError::InvalidConfig(format!(
                "candidate threshold {} exceeds accept threshold {}",
                self.candidate_threshold, self.accept_threshold
            )));
        }
        if self.abstract_paragraphs == 0 || self.wide_abstract_paragraphs == 0 {
            return Err(BitextError::InvalidConfig(
                "abstracts need at least one paragraph".into(),
            ));
        }
        Ok(())
    }
}
