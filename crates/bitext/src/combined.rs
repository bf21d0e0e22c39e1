//! Interleaved bilingual view of an aligned book.
//!
//! [`CombinedBook`] is what output writers consume: every aligned left
//! chapter with each of its paragraphs followed by the right-edition
//! paragraphs attached to it.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use bitext_core::{AlignmentState, Book, ChapterIssue, MatchRecord};

/// Characters of a left paragraph shown in a preview.
pub const PREVIEW_TEXT_CHARS: usize = 100;
/// Characters of a subject paragraph shown in a preview.
pub const PREVIEW_SUBJECT_CHARS: usize = 50;

const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedParagraph {
    pub text: String,
    /// Texts of the attached right-edition paragraphs, in attachment order.
    pub subjects: Vec<String>,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedChapter {
    pub left: String,
    pub right: String,
    pub score: f32,
    pub paragraphs: Vec<CombinedParagraph>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedBook {
    pub left_title: String,
    pub right_title: String,
    /// Aligned chapters in left-book order.
    pub chapters: Vec<CombinedChapter>,
    /// Matched chapters excluded because their alignment failed.
    pub bad_aligned: Vec<ChapterIssue>,
    /// Matched chapters not aligned yet.
    pub pending: Vec<ChapterIssue>,
    /// Left chapters without a partner.
    pub unmatched: Vec<ChapterIssue>,
}

impl CombinedBook {
    /// Interleaves `left` with the subjects it holds from `right`.
    ///
    /// Subjects that do not resolve in `right` are skipped.
    #[must_use]
    pub fn build(left: &Book, right: &Book, matches: &[MatchRecord]) -> Self {
        let mut combined = Self {
            left_title: left.title.clone(),
            right_title: right.title.clone(),
            chapters: Vec::new(),
            bad_aligned: Vec::new(),
            pending: Vec::new(),
            unmatched: Vec::new(),
        };

        for (index, chapter) in left.chapters.iter().enumerate() {
            let Some(record) = matches.iter().find(|m| m.left == index) else {
                combined.unmatched.push(ChapterIssue::new(index, chapter));
                continue;
            };
            match chapter.alignment {
                AlignmentState::BadAligned => {
                    combined.bad_aligned.push(ChapterIssue::new(index, chapter));
                }
                AlignmentState::NotAligned => {
                    combined.pending.push(ChapterIssue::new(index, chapter));
                }
                AlignmentState::Aligned => {
                    let paragraphs = chapter
                        .paragraphs
                        .iter()
                        .map(|p| CombinedParagraph {
                            text: p.text.clone(),
                            subjects: p
                                .subjects
                                .iter()
                                .filter_map(|s| right.paragraph(*s))
                                .map(|s| s.text.clone())
                                .collect(),
                            score: p.align_score,
                        })
                        .collect();
                    combined.chapters.push(CombinedChapter {
                        left: chapter.name.clone(),
                        right: right
                            .chapters
                            .get(record.right)
                            .map(|c| c.name.clone())
                            .unwrap_or_default(),
                        score: record.score,
                        paragraphs,
                    });
                }
            }
        }
        combined
    }

    /// Terminal preview: left paragraphs cut to 100 characters, each
    /// followed by its subjects cut to 50 characters in green.
    #[must_use]
    pub fn render_preview(&self) -> String {
        let mut out = String::new();
        for chapter in &self.chapters {
            let _ = writeln!(out, "== {} / {} ({:.2})", chapter.left, chapter.right, chapter.score);
            for p in &chapter.paragraphs {
                let _ = writeln!(out, "{}", truncate(&p.text, PREVIEW_TEXT_CHARS));
                for subject in &p.subjects {
                    let _ = writeln!(
                        out,
                        "{GREEN}{}{RESET}",
                        truncate(subject, PREVIEW_SUBJECT_CHARS)
                    );
                }
            }
        }
        out
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
