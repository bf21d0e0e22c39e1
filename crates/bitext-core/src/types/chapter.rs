use std::fmt;

use serde::{Deserialize, Serialize};

use super::paragraph::Paragraph;
use crate::translate::Translator;

/// Alignment progress of a chapter pair, tracked on the left chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlignmentState {
    /// Not aligned yet (or reset).
    #[default]
    NotAligned,
    /// Every right-paragraph has been attached.
    Aligned,
    /// Alignment stalled and was abandoned. Terminal until reset.
    BadAligned,
}

impl fmt::Display for AlignmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAligned => write!(f, "not-aligned"),
            Self::Aligned => write!(f, "aligned"),
            Self::BadAligned => write!(f, "bad-aligned"),
        }
    }
}

/// One structural unit of a book, e.g. one file of an ebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Identifier of the chapter inside its book.
    pub name: String,

    /// Ordered paragraphs.
    pub paragraphs: Vec<Paragraph>,

    /// Alignment progress.
    #[serde(default)]
    pub alignment: AlignmentState,

    /// Whether the leading paragraphs have been translated.
    #[serde(default)]
    pub translated: bool,
}

impl Chapter {
    #[must_use]
    pub fn new(name: impl Into<String>, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            name: name.into(),
            paragraphs,
            alignment: AlignmentState::NotAligned,
            translated: false,
        }
    }

    /// Builds a chapter from raw paragraph texts.
    #[must_use]
    pub fn from_texts<I, S>(name: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, texts.into_iter().map(Paragraph::new).collect())
    }

    /// Total text length in characters.
    #[must_use]
    pub fn length(&self) -> usize {
        self.paragraphs.iter().map(Paragraph::char_len).sum()
    }

    /// Concatenates the first `n` non-empty paragraphs, each followed by a
    /// space. With `translated` set, the translations are used instead.
    #[must_use]
    pub fn abstract_text(&self, n: usize, translated: bool) -> String {
        let mut summary = String::new();
        for p in self.paragraphs.iter().filter(|p| !p.text.is_empty()).take(n) {
            summary.push_str(p.text_for(translated));
            summary.push(' ');
        }
        summary
    }

    /// Short own-language excerpt for operator reports.
    #[must_use]
    pub fn snippet(&self, max_chars: usize) -> String {
        self.abstract_text(1, false)
            .trim()
            .chars()
            .take(max_chars)
            .collect()
    }

    /// Translates the first `n` paragraphs. A translated chapter is left
    /// untouched.
    pub fn translate<T: Translator + ?Sized>(&mut self, translator: &T, n: usize) {
        if self.translated {
            return;
        }
        for p in self.paragraphs.iter_mut().take(n) {
            p.translate(translator);
        }
        self.translated = true;
    }

    #[must_use]
    pub fn is_aligned(&self) -> bool {
        self.alignment == AlignmentState::Aligned
    }

    #[must_use]
    pub fn is_bad_aligned(&self) -> bool {
        self.alignment == AlignmentState::BadAligned
    }

    /// Clears subjects and alignment flags so the chapter can be re-aligned.
    pub fn reset(&mut self) {
        self.alignment = AlignmentState::NotAligned;
        for p in &mut self.paragraphs {
            p.reset();
        }
    }
}
