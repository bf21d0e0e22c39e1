//! # Checkpoints
//!
//! JSON snapshots of books and chapter matchers, so an interrupted run can
//! resume where it stopped. Files live in one directory:
//!
//! - `<title>.book.json` for a book, with its translations and subjects
//! - `<left>_<right>.match.json` for the matcher of a pair of books
//!
//! Every snapshot is checked against the books it is restored for; one that
//! does not fit is rejected instead of silently producing dangling
//! references.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use bitext_core::{BitextError, Book, ChapterMatcher, Result};

const BOOK_SUFFIX: &str = ".book.json";
const MATCH_SUFFIX: &str = ".match.json";

/// Directory of JSON checkpoints.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn book_path(&self, book: &Book) -> PathBuf {
        self.dir.join(format!("{}{BOOK_SUFFIX}", book.file_stem()))
    }

    pub fn matcher_path(&self, left: &Book, right: &Book) -> PathBuf {
        self.dir.join(format!(
            "{}_{}{MATCH_SUFFIX}",
            left.file_stem(),
            right.file_stem()
        ))
    }

    /// Writes `book`, replacing any earlier snapshot.
    ///
    /// # Errors
    ///
    /// Returns an I/O or JSON error if the snapshot cannot be written.
    pub fn save_book(&self, book: &Book) -> Result<PathBuf> {
        let path = self.book_path(book);
        write_json(&path, book)?;
        debug!(path = %path.display(), "book checkpoint saved");
        Ok(path)
    }

    /// Restores the snapshot of `fresh`, a book just read from its source.
    ///
    /// Returns `None` if no snapshot exists.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::InvalidSnapshot` if the snapshot has a
    /// different chapter structure than `fresh`, or an I/O or JSON error if
    /// it cannot be read.
    pub fn load_book(&self, fresh: &Book) -> Result<Option<Book>> {
        let path = self.book_path(fresh);
        let Some(saved) = read_json::<Book>(&path)? else {
            return Ok(None);
        };

        let fits = saved.chapters.len() == fresh.chapters.len()
            && saved
                .chapters
                .iter()
                .zip(&fresh.chapters)
                .all(|(s, f)| s.paragraphs.len() == f.paragraphs.len() && s.length() == f.length());
        if !fits {
            return Err(BitextError::InvalidSnapshot(format!(
                "{} does not match the chapters of {:?}",
                path.display(),
                fresh.title
            )));
        }

        info!(path = %path.display(), "book checkpoint restored");
        Ok(Some(saved))
    }

    /// Writes the matcher of `left` and `right`.
    ///
    /// # Errors
    ///
    /// Returns an I/O or JSON error if the snapshot cannot be written.
    pub fn save_matcher(&self, left: &Book, right: &Book, matcher: &ChapterMatcher) -> Result<PathBuf> {
        let path = self.matcher_path(left, right);
        write_json(&path, matcher)?;
        debug!(path = %path.display(), "matcher checkpoint saved");
        Ok(path)
    }

    /// Restores the matcher of `left` and `right`, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::InvalidSnapshot` if the matcher was built for
    /// other books, or an I/O or JSON error if it cannot be read.
    pub fn load_matcher(&self, left: &Book, right: &Book) -> Result<Option<ChapterMatcher>> {
        let path = self.matcher_path(left, right);
        let Some(matcher) = read_json::<ChapterMatcher>(&path)? else {
            return Ok(None);
        };
        matcher.validate_against(left, right)?;
        info!(path = %path.display(), "matcher checkpoint restored");
        Ok(Some(matcher))
    }

    /// Deletes the matcher snapshot of `left` and `right`. Returns whether
    /// one existed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be removed.
    pub fn remove_matcher(&self, left: &Book, right: &Book) -> Result<bool> {
        let path = self.matcher_path(left, right);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    Ok(Some(serde_json::from_slice(&bytes)?))
}
