use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Chapter;

/// Characters of chapter text quoted in operator reports.
pub const SNIPPET_CHARS: usize = 50;

/// A chapter that needs operator attention after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterIssue {
    /// Chapter index in its book.
    pub index: usize,
    /// Chapter identifier.
    pub name: String,
    /// Opening text of the chapter.
    pub snippet: String,
}

impl ChapterIssue {
    #[must_use]
    pub fn new(index: usize, chapter: &Chapter) -> Self {
        Self {
            index,
            name: chapter.name.clone(),
            snippet: chapter.snippet(SNIPPET_CHARS),
        }
    }
}

impl fmt::Display for ChapterIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{}): {:?}", self.name, self.index, self.snippet)
    }
}
