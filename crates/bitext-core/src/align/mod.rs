//! # Paragraph Alignment
//!
//! Aligns the paragraphs of one matched chapter pair. Right-paragraphs are
//! consumed strictly in order; each one is scored against a window of left
//! paragraphs around the left cursor (forward slice first, then the
//! backward slice). Unmatched right-paragraphs pile up in a backlog that
//! widens the window and is flushed onto the paragraph preceding the next
//! match. When matching stays stuck at the widest window the aligner
//! switches to a half-chapter search, and past a hard limit it abandons the
//! pair as bad-aligned.

pub mod config;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::similarity::{SimilarityModel, SimilarityScorer};
use crate::types::{AlignmentState, Chapter, SubjectRef};

pub use config::AlignConfig;

/// Summary of one chapter-pair alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentOutcome {
    /// Final state of the pair.
    pub state: AlignmentState,
    /// Alignable right-paragraphs in the pair.
    pub right_paragraphs: usize,
    /// Right-paragraphs matched directly above the threshold.
    pub matched: usize,
    /// Right-paragraphs attached in total, including backlog flushes.
    pub attached: usize,
    /// Whether the full-chapter search was used.
    pub used_fallback: bool,
}

/// Sliding-window paragraph aligner.
#[derive(Debug, Clone, Default)]
pub struct ParagraphAligner {
    config: AlignConfig,
}

impl ParagraphAligner {
    /// # Errors
    ///
    /// Returns `BitextError::InvalidConfig` if the configuration is
    /// inconsistent.
    pub fn new(config: AlignConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Aligns `right` onto `left`, attaching right-paragraphs as subjects of
    /// left paragraphs. `right_chapter` is the index of `right` in its book
    /// and is recorded in every [`SubjectRef`].
    ///
    /// On success `left` ends `Aligned` and every alignable right-paragraph
    /// is attached exactly once. If the aligner stays stuck beyond
    /// `give_up_after`, the partial assignment is discarded and `left` ends
    /// `BadAligned`.
    ///
    /// # Errors
    ///
    /// Only scorer failures are errors.
    pub fn align<M: SimilarityModel>(
        &self,
        left: &mut Chapter,
        right: &Chapter,
        right_chapter: usize,
        scorer: &SimilarityScorer<M>,
    ) -> Result<AlignmentOutcome> {
        let cfg = &self.config;
        let left_seq = alignable(left);
        let right_seq = alignable(right);

        info!(
            left = %left.name,
            right = %right.name,
            left_paragraphs = left_seq.len(),
            right_paragraphs = right_seq.len(),
            "aligning chapter pair"
        );

        let mut outcome = AlignmentOutcome {
            state: AlignmentState::NotAligned,
            right_paragraphs: right_seq.len(),
            matched: 0,
            attached: 0,
            used_fallback: false,
        };

        let Some(&last_left) = left_seq.last() else {
            outcome.state = if right_seq.is_empty() {
                AlignmentState::Aligned
            } else {
                warn!(left = %left.name, right = %right.name, "left chapter has no alignable paragraphs");
                AlignmentState::BadAligned
            };
            left.alignment = outcome.state;
            return Ok(outcome);
        };

        let subject = |paragraph: usize| SubjectRef::new(right_chapter, paragraph);
        let mut backlog: Vec<usize> = Vec::new();
        let mut cursor_left = 0usize;
        let mut cursor_right = 0usize;
        let mut stuck = 0usize;

        while cursor_right < right_seq.len() && cursor_left < left_seq.len() {
            let fallback = stuck >= cfg.fallback_after;
            let window = if fallback {
                left_seq.len() / 2
            } else {
                (cfg.default_window + 1 + 2 * backlog.len()).min(cfg.max_window)
            };
            outcome.used_fallback |= fallback;

            let right_para = right_seq[cursor_right];
            let right_text = &right.paragraphs[right_para].text;

            let forward = cursor_left..(cursor_left + window).min(left_seq.len());
            let backward = cursor_left.saturating_sub(window)..cursor_left;
            let mut accepted = None;
            for pos in forward.chain(backward) {
                let score = scorer.score(&left.paragraphs[left_seq[pos]].text, right_text)?;
                if score >= cfg.threshold {
                    accepted = Some((pos, score));
                    break;
                }
            }

            match accepted {
                Some((pos, score)) => {
                    let anchor = left_seq[pos.saturating_sub(1)];
                    for r in backlog.drain(..) {
                        left.paragraphs[anchor].add_subject(subject(r), 0.0);
                        outcome.attached += 1;
                    }
                    left.paragraphs[left_seq[pos]].add_subject(subject(right_para), score);
                    outcome.attached += 1;
                    outcome.matched += 1;

                    debug!(left = left_seq[pos], right = right_para, score, window, "paragraph matched");
                    cursor_left = pos + 1;
                    cursor_right += 1;
                    stuck = 0;
                }
                None => {
                    backlog.push(right_para);
                    cursor_right += 1;
                    if fallback || window >= cfg.max_window {
                        stuck += 1;
                    }
                    if stuck > cfg.give_up_after {
                        warn!(
                            left = %left.name,
                            right = %right.name,
                            stuck,
                            "paragraph alignment is stuck, skipping chapter pair"
                        );
                        left.reset();
                        left.alignment = AlignmentState::BadAligned;
                        outcome.state = AlignmentState::BadAligned;
                        outcome.attached = 0;
                        return Ok(outcome);
                    }
                }
            }
        }

        // Leftovers go to the last left paragraph so nothing is dropped.
        for r in backlog.drain(..).chain(right_seq[cursor_right..].iter().copied()) {
            left.paragraphs[last_left].add_subject(subject(r), 0.0);
            outcome.attached += 1;
        }

        left.alignment = AlignmentState::Aligned;
        outcome.state = AlignmentState::Aligned;
        info!(
            left = %left.name,
            matched = outcome.matched,
            attached = outcome.attached,
            "chapter pair aligned"
        );
        Ok(outcome)
    }
}

/// Indices of paragraphs that take part in alignment.
fn alignable(chapter: &Chapter) -> Vec<usize> {
    chapter
        .paragraphs
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_alignable())
        .map(|(i, _)| i)
        .collect()
}
