//! # Bitext
//!
//! Aligns two editions of the same book, typically an original and its
//! translation, into a bilingual document. Chapters are paired first, then
//! the paragraphs of every pair are aligned; each source paragraph ends up
//! annotated with the target paragraphs that correspond to it.
//!
//! This crate re-exports the engine from `bitext-core` and adds the run
//! orchestration on top of it: [`Pipeline`] drives matching and alignment,
//! [`CheckpointStore`] persists progress between runs, and [`CombinedBook`]
//! is the interleaved view handed to output writers.
//!
//! ```rust
//! use bitext::{Book, Chapter, CombinedBook, Pipeline, PipelineConfig, Result, SimilarityScorer};
//!
//! let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> {
//!     let same = matches!((a, b), ("Hello.", "你好。") | ("World.", "世界。"))
//!         || (a.starts_with("Hello.") && b.starts_with("你好。"));
//!     Ok(if same { 0.95 } else { 0.1 })
//! });
//!
//! let mut left = Book::new("en", vec![Chapter::from_texts("ch1", ["Hello.", "World."])]);
//! let right = Book::new("zh", vec![Chapter::from_texts("ch1", ["你好。", "世界。"])]);
//!
//! let pipeline = Pipeline::new(&scorer, PipelineConfig::default())?;
//! let mut matcher = pipeline.open_matcher(&left, &right)?;
//! let report = pipeline.run(&mut left, &right, &mut matcher)?;
//! assert_eq!(report.aligned_pairs, 1);
//!
//! let combined = CombinedBook::build(&left, &right, matcher.matches());
//! assert_eq!(combined.chapters[0].paragraphs[1].subjects, vec!["世界。"]);
//! # Ok::<(), bitext::BitextError>(())
//! ```

pub mod checkpoint;
pub mod combined;
pub mod pipeline;
pub mod report;

pub use bitext_core::{
    AlignConfig, AlignmentOutcome, AlignmentState, BitextError, Book, Chapter, ChapterCountCheck,
    ChapterIssue, ChapterMatcher, MatchConfig, MatchRecord, NoTranslation, Paragraph,
    ParagraphAligner, Result, ScopedTimer, SectionTiming, SimilarityModel, SimilarityScorer,
    SubjectRef, Timings, Translator,
};
pub use checkpoint::CheckpointStore;
pub use combined::{CombinedBook, CombinedChapter, CombinedParagraph};
pub use pipeline::{Pipeline, PipelineConfig};
pub use report::{PairIssue, RunReport};
