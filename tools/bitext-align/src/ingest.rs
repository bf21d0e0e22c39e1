//! Reading books from disk.
//!
//! Two layouts are accepted:
//!
//! - a JSON file `{"title": .., "chapters": [{"name": .., "paragraphs": [..]}]}`
//! - a directory with one `.txt` or `.md` file per chapter, read in file
//!   name order; paragraphs are separated by blank lines

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use bitext::{Book, Chapter};
use regex::Regex;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct SourceBook {
    title: String,
    chapters: Vec<SourceChapter>,
}

#[derive(Debug, Deserialize)]
struct SourceChapter {
    name: String,
    paragraphs: Vec<String>,
}

/// Turns book files into [`Book`]s.
pub struct BookReader {
    re_paragraph_break: Regex,
    re_whitespace: Regex,
}

impl BookReader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_paragraph_break: Regex::new(r"\r?\n[ \t]*\r?\n")?,
            re_whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Reads the book at `path`.
    pub fn read(&self, path: &Path) -> Result<Book> {
        let book = if path.is_dir() {
            self.read_dir(path)?
        } else if path.extension().is_some_and(|e| e == "json") {
            self.read_json(path)?
        } else {
            bail!(
                "{} is neither a JSON book nor a directory of chapters",
                path.display()
            );
        };

        info!(
            title = %book.title,
            chapters = book.chapters.len(),
            length = book.length(),
            "book loaded"
        );
        Ok(book)
    }

    fn read_json(&self, path: &Path) -> Result<Book> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let source: SourceBook = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let chapters = source
            .chapters
            .into_iter()
            .map(|c| {
                Chapter::from_texts(c.name, c.paragraphs.iter().map(|p| self.normalize(p)))
            })
            .collect();
        Ok(Book::new(source.title, chapters))
    }

    fn read_dir(&self, path: &Path) -> Result<Book> {
        let mut files: Vec<_> = fs::read_dir(path)
            .with_context(|| format!("failed to list {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "txt" || e == "md"))
            .collect();
        files.sort();

        let mut chapters = Vec::with_capacity(files.len());
        for file in &files {
            let content = fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            chapters.push(Chapter::from_texts(name, self.paragraphs(&content)));
        }

        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Book::new(title, chapters))
    }

    /// Splits text on blank lines and collapses whitespace inside each
    /// paragraph. Empty paragraphs are dropped.
    fn paragraphs(&self, content: &str) -> Vec<String> {
        self.re_paragraph_break
            .split(content)
            .map(|p| self.normalize(p))
            .filter(|p| !p.is_empty())
            .collect()
    }

    fn normalize(&self, text: &str) -> String {
        self.re_whitespace.replace_all(text.trim(), " ").into_owned()
    }
}
