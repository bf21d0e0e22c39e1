//! Post-run summary for operators.

use std::fmt;

use bitext_core::{ChapterIssue, SectionTiming};

/// A matched chapter pair whose paragraphs could not be aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairIssue {
    pub left: ChapterIssue,
    pub right: ChapterIssue,
}

impl PairIssue {
    #[must_use]
    pub fn new(left: ChapterIssue, right: ChapterIssue) -> Self {
        Self { left, right }
    }
}

impl fmt::Display for PairIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.left, self.right)
    }
}

/// What a run did and what needs attention.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Chapter pairs committed by the matcher.
    pub matched_pairs: usize,
    /// Pairs aligned during this run.
    pub aligned_pairs: usize,
    /// Pairs already aligned by an earlier run.
    pub skipped_pairs: usize,
    /// Left chapters without a partner; excluded from alignment.
    pub unmatched: Vec<ChapterIssue>,
    /// Pairs that ended bad-aligned, now or in an earlier run.
    pub bad_aligned: Vec<PairIssue>,
    /// Time spent per section.
    pub timings: Vec<SectionTiming>,
}

impl RunReport {
    /// `true` if nothing needs operator attention.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unmatched.is_empty() && self.bad_aligned.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} matched pair(s): {} aligned now, {} already aligned, {} bad-aligned",
            self.matched_pairs,
            self.aligned_pairs,
            self.skipped_pairs,
            self.bad_aligned.len()
        )?;
        if !self.unmatched.is_empty() {
            writeln!(f, "unmatched chapters:")?;
            for issue in &self.unmatched {
                writeln!(f, "  {issue}")?;
            }
        }
        if !self.bad_aligned.is_empty() {
            writeln!(f, "bad-aligned pairs:")?;
            for issue in &self.bad_aligned {
                writeln!(f, "  {issue}")?;
            }
        }
        for timing in &self.timings {
            writeln!(f, "{timing}")?;
        }
        Ok(())
    }
}
