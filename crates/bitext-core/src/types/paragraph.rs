use serde::{Deserialize, Serialize};

use crate::translate::Translator;

/// Position of a paragraph in the other edition of the book.
///
/// Subjects are stored by location rather than by value: the referenced
/// paragraph stays owned by its own chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
    /// Chapter index in the other book.
    pub chapter: usize,
    /// Paragraph index inside that chapter.
    pub paragraph: usize,
}

impl SubjectRef {
    #[must_use]
    pub fn new(chapter: usize, paragraph: usize) -> Self {
        Self { chapter, paragraph }
    }
}

/// Smallest aligned unit of text within a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Plain, markup-free text.
    pub text: String,

    /// Machine translation of `text`; empty when untranslated.
    #[serde(default)]
    pub translation: String,

    /// Whether a translation has been attempted.
    #[serde(default)]
    pub translated: bool,

    /// Matched paragraphs from the other edition, in attachment order.
    #[serde(default)]
    pub subjects: Vec<SubjectRef>,

    /// Score of the last attached subject.
    #[serde(default)]
    pub align_score: f32,
}

impl Paragraph {
    /// Creates an untranslated, unaligned paragraph.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translation: String::new(),
            translated: false,
            subjects: Vec::new(),
            align_score: 0.0,
        }
    }

    /// Length of the text in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns `true` if the paragraph carries enough text to be matched.
    ///
    /// Paragraphs of one character or less (after trimming) never take part
    /// in alignment.
    #[must_use]
    pub fn is_alignable(&self) -> bool {
        self.text.trim().chars().nth(1).is_some()
    }

    /// Text in the requested language form.
    #[must_use]
    pub fn text_for(&self, translated: bool) -> &str {
        if translated { &self.translation } else { &self.text }
    }

    /// Appends a matched paragraph and records its score.
    pub fn add_subject(&mut self, subject: SubjectRef, score: f32) {
        self.subjects.push(subject);
        self.align_score = score;
    }

    /// Translates the paragraph once. Very short paragraphs are skipped.
    pub fn translate<T: Translator + ?Sized>(&mut self, translator: &T) {
        if self.translated || self.char_len() < 2 {
            return;
        }
        self.translation = translator.translate(&self.text);
        self.translated = true;
    }

    /// Drops all subjects so the paragraph can be aligned again.
    pub fn reset(&mut self) {
        self.subjects.clear();
        self.align_score = 0.0;
    }
}

impl From<&str> for Paragraph {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Paragraph {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
