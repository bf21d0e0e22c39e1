//! # Bitext Core
//!
//! The matching and alignment engine behind bitext. Pairs the chapters of
//! two editions of a book and aligns the paragraphs of each chapter pair,
//! using a semantic similarity model as a black-box scorer.
//!
//! ## Quick Start
//!
//! ```rust
//! use bitext_core::{AlignmentState, Chapter, ParagraphAligner, Result, SimilarityScorer};
//!
//! let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> {
//!     let same = matches!((a, b), ("Hello.", "你好。") | ("World.", "世界。"));
//!     Ok(if same { 0.95 } else { 0.1 })
//! });
//!
//! let mut left = Chapter::from_texts("en", ["Hello.", "World."]);
//! let right = Chapter::from_texts("zh", ["你好。", "世界。"]);
//!
//! let outcome = ParagraphAligner::default().align(&mut left, &right, 0, &scorer).unwrap();
//!
//! assert_eq!(outcome.state, AlignmentState::Aligned);
//! assert_eq!(left.paragraphs[1].subjects.len(), 1);
//! ```
pub mod align;
pub mod error;
pub mod matching;
pub mod report;
pub mod similarity;
pub mod timing;
pub mod translate;
pub mod types;

// Re-export primary API
pub use align::{AlignConfig, AlignmentOutcome, ParagraphAligner};
pub use error::{BitextError, Result};
pub use matching::{ChapterCountCheck, ChapterMatcher, MatchConfig, MatchRecord};
pub use report::ChapterIssue;
pub use similarity::{SimilarityModel, SimilarityScorer};
pub use timing::{ScopedTimer, SectionTiming, Timings};
pub use translate::{NoTranslation, Translator};
pub use types::{AlignmentState, Book, Chapter, Paragraph, SubjectRef};
