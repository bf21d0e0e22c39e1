//! # Chapter Matching
//!
//! Pairs the chapters of two editions of a book. Matching runs in three
//! passes:
//!
//! 1. **Narrow**: only right chapters whose share of the book length is
//!    within `narrow_range` points of the left chapter are scored; the first
//!    one reaching `accept_threshold` is committed.
//! 2. **Wide**: every remaining right chapter is scored against a longer
//!    abstract; the first one reaching `accept_threshold` is committed, and
//!    pairs reaching `candidate_threshold` are kept for later.
//! 3. **Resolution**: kept pairs are committed greedily by descending score
//!    while both sides are still free.

pub mod config;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BitextError, Result};
use crate::report::ChapterIssue;
use crate::similarity::{SimilarityModel, SimilarityScorer};
use crate::types::{Book, Chapter};

pub use config::MatchConfig;

/// A committed chapter pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Chapter index in the left (source) book.
    pub left: usize,
    /// Chapter index in the right (target) book.
    pub right: usize,
    /// Similarity of the two abstracts.
    pub score: f32,
}

/// Outcome of comparing the main chapter counts of two editions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterCountCheck {
    pub left: usize,
    pub right: usize,
}

impl ChapterCountCheck {
    /// `true` unless the counts differ by half of either book or more.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let gap = self.left.abs_diff(self.right);
        2 * gap < self.left && 2 * gap < self.right
    }
}

/// Chapter matcher state. Serializable so a finished match can be
/// checkpointed and restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterMatcher {
    config: MatchConfig,
    left_chapters: usize,
    right_chapters: usize,
    left_length: usize,
    right_length: usize,
    unmatched_left: Vec<usize>,
    remaining_right: Vec<usize>,
    matches: Vec<MatchRecord>,
    finished: bool,
}

impl ChapterMatcher {
    /// Creates a matcher over every chapter of both books.
    ///
    /// Working sets are ordered longest chapter first.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::InvalidConfig` if the configuration is
    /// inconsistent.
    pub fn new(left: &Book, right: &Book, config: MatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            left_chapters: left.chapters.len(),
            right_chapters: right.chapters.len(),
            left_length: left.length(),
            right_length: right.length(),
            unmatched_left: by_length_desc(left),
            remaining_right: by_length_desc(right),
            matches: Vec::new(),
            finished: false,
        })
    }

    /// Committed pairs, in commit order.
    #[must_use]
    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    /// Left chapters without a partner.
    #[must_use]
    pub fn unmatched_left(&self) -> &[usize] {
        &self.unmatched_left
    }

    /// Right chapters not assigned to any left chapter.
    #[must_use]
    pub fn remaining_right(&self) -> &[usize] {
        &self.remaining_right
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Runs all three passes. Calling it again once finished is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if the books do not fit this matcher or if the scorer fails.
    pub fn run<M: SimilarityModel>(
        &mut self,
        left: &Book,
        right: &Book,
        scorer: &SimilarityScorer<M>,
    ) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.validate_against(left, right)?;

        info!(
            left = %left.title,
            right = %right.title,
            chapters_left = self.left_chapters,
            chapters_right = self.right_chapters,
            "matching chapters"
        );

        self.narrow_pass(left, right, scorer)?;
        let candidates = self.wide_pass(left, right, scorer)?;
        self.resolve(candidates);

        for issue in self.unmatched_issues(left) {
            warn!(
                chapter = %issue.name,
                snippet = %issue.snippet,
                "no matching chapter found"
            );
        }
        info!(
            matched = self.matches.len(),
            unmatched = self.unmatched_left.len(),
            "chapter matching finished"
        );
        self.finished = true;
        Ok(())
    }

    /// Unmatched left chapters, for operator review.
    #[must_use]
    pub fn unmatched_issues(&self, left: &Book) -> Vec<ChapterIssue> {
        self.unmatched_left
            .iter()
            .filter_map(|&i| left.chapters.get(i).map(|c| ChapterIssue::new(i, c)))
            .collect()
    }

    /// Compares the number of main chapters of both books and warns when
    /// they differ so much that the editions probably do not correspond.
    pub fn check_chapter_counts(left: &Book, right: &Book) -> ChapterCountCheck {
        let check = ChapterCountCheck {
            left: left.main_chapter_count(),
            right: right.main_chapter_count(),
        };
        if check.is_balanced() {
            info!(
                left = %left.title,
                right = %right.title,
                main_left = check.left,
                main_right = check.right,
                "main chapter counts roughly agree"
            );
        } else {
            warn!(
                left = %left.title,
                right = %right.title,
                main_left = check.left,
                main_right = check.right,
                "main chapter counts differ widely; check that both files are the same edition"
            );
        }
        check
    }

    /// Checks that a (restored) matcher belongs to the given books.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::InvalidSnapshot` if chapter counts, lengths or
    /// indices do not fit.
    pub fn validate_against(&self, left: &Book, right: &Book) -> Result<()> {
        if left.chapters.len() != self.left_chapters
            || right.chapters.len() != self.right_chapters
            || left.length() != self.left_length
            || right.length() != self.right_length
        {
            return Err(BitextError::InvalidSnapshot(format!(
                "matcher was built for other editions than {:?} / {:?}",
                left.title, right.title
            )));
        }

        let left_ok = self
            .unmatched_left
            .iter()
            .chain(self.matches.iter().map(|m| &m.left))
            .all(|&i| i < self.left_chapters);
        let right_ok = self
            .remaining_right
            .iter()
            .chain(self.matches.iter().map(|m| &m.right))
            .all(|&i| i < self.right_chapters);
        if !left_ok || !right_ok {
            return Err(BitextError::InvalidSnapshot(
                "matcher references chapters that do not exist".into(),
            ));
        }
        Ok(())
    }

    fn narrow_pass<M: SimilarityModel>(
        &mut self,
        left: &Book,
        right: &Book,
        scorer: &SimilarityScorer<M>,
    ) -> Result<()> {
        for left_idx in self.unmatched_left.clone() {
            let chapter = &left.chapters[left_idx];
            let abstract_left = left_abstract(chapter, self.config.abstract_paragraphs);

            for right_idx in self.candidates(chapter, right, self.config.narrow_range) {
                let abstract_right =
                    right.chapters[right_idx].abstract_text(self.config.abstract_paragraphs, false);
                let score = scorer.score(&abstract_left, &abstract_right)?;
                if score >= self.config.accept_threshold {
                    debug!(left = %chapter.name, right = %right.chapters[right_idx].name, score, "narrow pass match");
                    self.commit(left_idx, right_idx, score);
                    break;
                }
            }
        }
        Ok(())
    }

    fn wide_pass<M: SimilarityModel>(
        &mut self,
        left: &Book,
        right: &Book,
        scorer: &SimilarityScorer<M>,
    ) -> Result<Vec<MatchRecord>> {
        let mut candidates = Vec::new();

        for left_idx in self.unmatched_left.clone() {
            let chapter = &left.chapters[left_idx];
            let abstract_left = left_abstract(chapter, self.config.abstract_paragraphs);

            for right_idx in self.candidates(chapter, right, self.config.wide_range) {
                let abstract_right = right.chapters[right_idx]
                    .abstract_text(self.config.wide_abstract_paragraphs, false);
                let score = scorer.score(&abstract_left, &abstract_right)?;
                if score >= self.config.accept_threshold {
                    debug!(left = %chapter.name, right = %right.chapters[right_idx].name, score, "wide pass match");
                    self.commit(left_idx, right_idx, score);
                    break;
                } else if score >= self.config.candidate_threshold {
                    candidates.push(MatchRecord {
                        left: left_idx,
                        right: right_idx,
                        score,
                    });
                }
            }
        }
        Ok(candidates)
    }

    fn resolve(&mut self, mut candidates: Vec<MatchRecord>) {
        // Stable sort: equal scores keep encounter order.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        for candidate in candidates {
            if self.unmatched_left.contains(&candidate.left)
                && self.remaining_right.contains(&candidate.right)
            {
                debug!(left = candidate.left, right = candidate.right, score = candidate.score, "resolved match");
                self.commit(candidate.left, candidate.right, candidate.score);
            }
        }
    }

    /// Remaining right chapters whose share of the right book lies strictly
    /// within `range` points of the left chapter's share of the left book.
    fn candidates(&self, chapter: &Chapter, right: &Book, range: f64) -> Vec<usize> {
        let pct = percent(chapter.length(), self.left_length);
        let (min, max) = (pct - range, pct + range);
        self.remaining_right
            .iter()
            .copied()
            .filter(|&i| {
                let right_pct = percent(right.chapters[i].length(), self.right_length);
                min < right_pct && right_pct < max
            })
            .collect()
    }

    fn commit(&mut self, left: usize, right: usize, score: f32) {
        self.matches.push(MatchRecord { left, right, score });
        self.unmatched_left.retain(|&i| i != left);
        self.remaining_right.retain(|&i| i != right);
    }
}

/// Abstract of a left chapter, translated when a translation exists.
fn left_abstract(chapter: &Chapter, paragraphs: usize) -> String {
    chapter.abstract_text(paragraphs, chapter.translated)
}

fn percent(length: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        length as f64 / total as f64 * 100.0
    }
}

/// Chapter indices ordered by length, longest first; ties keep book order.
fn by_length_desc(book: &Book) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..book.chapters.len()).collect();
    indices.sort_by_key(|&i| std::cmp::Reverse(book.chapters[i].length()));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_handles_empty_books() {
        assert_eq!(percent(10, 0), 0.0);
        assert!((percent(1000, 1200) - 83.333).abs() < 0.001);
    }

    #[test]
    fn working_sets_are_longest_first() {
        let book = Book::new(
            "b",
            vec![
                Chapter::from_texts("short", ["ab"]),
                Chapter::from_texts("long", ["abcdef"]),
                Chapter::from_texts("mid", ["abcd"]),
                Chapter::from_texts("mid2", ["wxyz"]),
            ],
        );
        assert_eq!(by_length_desc(&book), vec![1, 2, 3, 0]);
    }

    #[test]
    fn chapter_count_balance() {
        assert!(ChapterCountCheck { left: 20, right: 22 }.is_balanced());
        assert!(!ChapterCountCheck { left: 20, right: 40 }.is_balanced());
        assert!(!ChapterCountCheck { left: 0, right: 0 }.is_balanced());
    }

    #[test]
    fn restored_matcher_must_fit_books() {
        let left = Book::new("l", vec![Chapter::from_texts("a", ["alpha"])]);
        let right = Book::new("r", vec![Chapter::from_texts("b", ["beta"])]);
        let matcher = ChapterMatcher::new(&left, &right, MatchConfig::default()).unwrap();
        assert!(matcher.validate_against(&left, &right).is_ok());

        let other = Book::new("r2", vec![]);
        assert!(matches!(
            matcher.validate_against(&left, &other),
            Err(BitextError::InvalidSnapshot(_))
        ));
    }
}
