use serde::{Deserialize, Serialize};

use super::chapter::Chapter;
use super::paragraph::{Paragraph, SubjectRef};
use crate::error::{BitextError, Result};
use crate::translate::Translator;

/// Share of the total book length that the "main" chapters cover.
const MAIN_CHAPTER_SHARE: f64 = 0.95;

/// One edition of a book: an ordered sequence of chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Display title, also used to name checkpoints.
    pub title: String,

    /// Ordered chapters.
    pub chapters: Vec<Chapter>,
}

impl Book {
    #[must_use]
    pub fn new(title: impl Into<String>, chapters: Vec<Chapter>) -> Self {
        Self {
            title: title.into(),
            chapters,
        }
    }

    /// Total text length of the book in characters.
    #[must_use]
    pub fn length(&self) -> usize {
        self.chapters.iter().map(Chapter::length).sum()
    }

    /// Returns the chapter at `index`.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::ChapterOutOfRange` if the index is invalid.
    pub fn chapter(&self, index: usize) -> Result<&Chapter> {
        self.chapters
            .get(index)
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Mutable variant of [`Book::chapter`].
    ///
    /// # Errors
    ///
    /// Returns `BitextError::ChapterOutOfRange` if the index is invalid.
    pub fn chapter_mut(&mut self, index: usize) -> Result<&mut Chapter> {
        if index >= self.chapters.len() {
            return Err(self.out_of_range(index));
        }
        Ok(&mut self.chapters[index])
    }

    /// Resolves a subject reference held by the other edition.
    #[must_use]
    pub fn paragraph(&self, subject: SubjectRef) -> Option<&Paragraph> {
        self.chapters
            .get(subject.chapter)
            .and_then(|c| c.paragraphs.get(subject.paragraph))
    }

    /// Number of longest chapters needed to cover 95% of the book.
    ///
    /// Used to compare the structure of two editions: front matter, notes
    /// and other short files do not count.
    #[must_use]
    pub fn main_chapter_count(&self) -> usize {
        let mut lengths: Vec<usize> = self.chapters.iter().map(Chapter::length).collect();
        lengths.sort_unstable_by(|a, b| b.cmp(a));

        let total: usize = lengths.iter().sum();
        let target = MAIN_CHAPTER_SHARE * total as f64;
        let mut covered = 0usize;
        for (i, len) in lengths.iter().enumerate() {
            covered += len;
            if covered as f64 > target {
                return i + 1;
            }
        }
        lengths.len()
    }

    /// Translates the first `paragraphs` paragraphs of every chapter.
    pub fn translate<T: Translator + ?Sized>(&mut self, translator: &T, paragraphs: usize) {
        for chapter in &mut self.chapters {
            chapter.translate(translator, paragraphs);
        }
        tracing::info!(book = %self.title, "translation finished");
    }

    /// Resets every chapter so the whole book can be re-aligned.
    pub fn reset(&mut self) {
        for chapter in &mut self.chapters {
            chapter.reset();
        }
    }

    /// File-name-safe stem derived from the title.
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.title
            .chars()
            .filter(|c| !matches!(c, ':' | '/' | '\\'))
            .take(20)
            .collect()
    }

    /// Checks that every subject held by this book resolves in `other`.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::InvalidSnapshot` naming the first dangling
    /// reference.
    pub fn validate_subjects(&self, other: &Book) -> Result<()> {
        for chapter in &self.chapters {
            for (i, p) in chapter.paragraphs.iter().enumerate() {
                if let Some(subject) = p.subjects.iter().find(|s| other.paragraph(**s).is_none()) {
                    return Err(BitextError::InvalidSnapshot(format!(
                        "paragraph {i} of chapter {:?} references {subject:?}, which is missing from {:?}",
                        chapter.name, other.title
                    )));
                }
            }
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> BitextError {
        BitextError::ChapterOutOfRange {
            book: self.title.clone(),
            index,
        }
    }
}
