//! # Bitext Embed
//!
//! Concrete [`bitext_core::SimilarityModel`] backed by a multilingual
//! sentence-embedding model running on candle.
//!
//! ```no_run
//! use bitext_core::SimilarityScorer;
//! use bitext_embed::EmbeddingModel;
//!
//! let model = EmbeddingModel::load("models/paraphrase-multilingual-MiniLM-L12-v2")?;
//! let scorer = SimilarityScorer::new(model);
//! let score = scorer.score("Hello.", "你好。")?;
//! # Ok::<(), bitext_core::BitextError>(())
//! ```

pub mod model;
pub mod pooling;

pub use model::{EmbeddingModel, MAX_TOKENS};
pub use pooling::{cosine, mean_pool};
