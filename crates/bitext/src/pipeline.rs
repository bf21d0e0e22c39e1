//! # Run Orchestration
//!
//! Drives one full run over a pair of books: optional translation of the
//! source edition, chapter matching, then paragraph alignment of every
//! matched pair. Progress is checkpointed after matching and after every
//! aligned pair when a [`CheckpointStore`] is attached.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bitext_core::{
    AlignConfig, AlignmentState, Book, ChapterIssue, ChapterMatcher, MatchConfig,
    ParagraphAligner, Result, SimilarityModel, SimilarityScorer, Timings, Translator,
};

use crate::checkpoint::CheckpointStore;
use crate::report::{PairIssue, RunReport};

/// Leading paragraphs translated per chapter by default.
pub const TRANSLATE_PARAGRAPHS: usize = 15;

/// Settings for a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub matching: MatchConfig,
    pub alignment: AlignConfig,
    /// Reset already aligned pairs and align them again.
    pub realign: bool,
    /// Leading paragraphs per chapter translated for chapter abstracts.
    pub translate_paragraphs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            alignment: AlignConfig::default(),
            realign: false,
            translate_paragraphs: TRANSLATE_PARAGRAPHS,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matching(mut self, matching: MatchConfig) -> Self {
        self.matching = matching;
        self
    }

    pub fn with_alignment(mut self, alignment: AlignConfig) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_realign(mut self, realign: bool) -> Self {
        self.realign = realign;
        self
    }

    pub fn with_translate_paragraphs(mut self, paragraphs: usize) -> Self {
        self.translate_paragraphs = paragraphs;
        self
    }
}

/// Orchestrates matching and alignment for one pair of books.
pub struct Pipeline<'a, M> {
    scorer: &'a SimilarityScorer<M>,
    config: PipelineConfig,
    aligner: ParagraphAligner,
    checkpoints: Option<&'a CheckpointStore>,
    timings: Timings,
}

impl<'a, M: SimilarityModel> Pipeline<'a, M> {
    /// # Errors
    ///
    /// Returns `BitextError::InvalidConfig` if either configuration is
    /// inconsistent.
    pub fn new(scorer: &'a SimilarityScorer<M>, config: PipelineConfig) -> Result<Self> {
        config.matching.validate()?;
        let aligner = ParagraphAligner::new(config.alignment.clone())?;
        Ok(Self {
            scorer,
            config,
            aligner,
            checkpoints: None,
            timings: Timings::new(),
        })
    }

    /// Persists progress into `store` during the run.
    #[must_use]
    pub fn with_checkpoints(mut self, store: &'a CheckpointStore) -> Self {
        self.checkpoints = Some(store);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Translates the leading paragraphs of every chapter of `book` so that
    /// its abstracts can be compared with the other edition.
    ///
    /// # Errors
    ///
    /// Fails only if the checkpoint cannot be written.
    pub fn translate<T: Translator + ?Sized>(&self, book: &mut Book, translator: &T) -> Result<()> {
        if book.chapters.iter().all(|c| c.translated) {
            return Ok(());
        }
        book.translate(translator, self.config.translate_paragraphs);
        if let Some(store) = self.checkpoints {
            store.save_book(book)?;
        }
        Ok(())
    }

    /// Restores the saved matcher for this pair of books, or creates a new
    /// one.
    ///
    /// # Errors
    ///
    /// Fails if a saved matcher exists but cannot be read or does not fit
    /// the books.
    pub fn open_matcher(&self, left: &Book, right: &Book) -> Result<ChapterMatcher> {
        if let Some(store) = self.checkpoints {
            if let Some(matcher) = store.load_matcher(left, right)? {
                info!(
                    matches = matcher.matches().len(),
                    finished = matcher.is_finished(),
                    "restored chapter matcher"
                );
                return Ok(matcher);
            }
        }
        ChapterMatcher::new(left, right, self.config.matching.clone())
    }

    /// Runs chapter matching unless `matcher` has already finished.
    ///
    /// # Errors
    ///
    /// Scorer failures and checkpoint write failures abort the run.
    pub fn match_chapters(
        &self,
        left: &Book,
        right: &Book,
        matcher: &mut ChapterMatcher,
    ) -> Result<()> {
        if matcher.is_finished() {
            return Ok(());
        }
        ChapterMatcher::check_chapter_counts(left, right);

        let timer = self.timings.start("match_chapters");
        matcher.run(left, right, self.scorer)?;
        timer.finish(format_args!("{} pair(s) matched", matcher.matches().len()));

        if let Some(store) = self.checkpoints {
            store.save_matcher(left, right, matcher)?;
        }
        Ok(())
    }

    /// Matches chapters if needed, then aligns every matched pair that is
    /// not aligned yet.
    ///
    /// Bad-aligned pairs are reported and left as they are until reset.
    ///
    /// # Errors
    ///
    /// Scorer failures, dangling restored references and checkpoint write
    /// failures abort the run.
    pub fn run(
        &self,
        left: &mut Book,
        right: &Book,
        matcher: &mut ChapterMatcher,
    ) -> Result<RunReport> {
        matcher.validate_against(left, right)?;
        left.validate_subjects(right)?;
        self.match_chapters(left, right, matcher)?;

        let mut report = RunReport {
            matched_pairs: matcher.matches().len(),
            unmatched: matcher.unmatched_issues(left),
            ..RunReport::default()
        };

        for record in matcher.matches() {
            let right_chapter = right.chapter(record.right)?;
            let chapter = left.chapter_mut(record.left)?;
            if self.config.realign {
                chapter.reset();
            }

            match chapter.alignment {
                AlignmentState::Aligned => {
                    report.skipped_pairs += 1;
                    continue;
                }
                AlignmentState::BadAligned => {
                    report.bad_aligned.push(PairIssue::new(
                        ChapterIssue::new(record.left, chapter),
                        ChapterIssue::new(record.right, right_chapter),
                    ));
                    continue;
                }
                AlignmentState::NotAligned => {}
            }

            let timer = self.timings.start("align_chapter");
            let outcome = self
                .aligner
                .align(chapter, right_chapter, record.right, self.scorer)?;
            timer.finish(outcome.state);

            if outcome.state == AlignmentState::BadAligned {
                warn!(
                    left = %chapter.name,
                    right = %right_chapter.name,
                    "chapter pair left bad-aligned"
                );
                report.bad_aligned.push(PairIssue::new(
                    ChapterIssue::new(record.left, chapter),
                    ChapterIssue::new(record.right, right_chapter),
                ));
            } else {
                report.aligned_pairs += 1;
            }

            if let Some(store) = self.checkpoints {
                store.save_book(left)?;
            }
        }

        report.timings = self.timings.summary();
        self.timings.log_summary();
        info!(
            matched = report.matched_pairs,
            aligned = report.aligned_pairs,
            skipped = report.skipped_pairs,
            bad_aligned = report.bad_aligned.len(),
            unmatched = report.unmatched.len(),
            "run finished"
        );
        Ok(report)
    }
}
