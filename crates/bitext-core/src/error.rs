use thiserror::Error;

/// Errors that can occur during bitext core operations.
#[derive(Debug, Error)]
pub enum BitextError {
    /// The similarity model could not be loaded.
    #[error("failed to load similarity model: {0}")]
    ModelLoad(String),

    /// The similarity model failed to score a text pair.
    ///
    /// This is fatal to a run: nothing can be matched without a scorer.
    #[error("similarity scoring failed: {0}")]
    Similarity(String),

    /// The similarity model returned a value that is not a number.
    #[error("similarity model returned an invalid score: {score}")]
    InvalidScore {
        /// The offending score.
        score: f32,
    },

    /// A matcher or aligner configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A restored book or matcher does not fit the books it is used with.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A chapter index does not exist in the given book.
    #[error("chapter {index} does not exist in book {book:?}")]
    ChapterOutOfRange {
        /// Title of the book that was indexed.
        book: String,
        /// The requested chapter index.
        index: usize,
    },

    /// Filesystem error while reading or writing checkpoints.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Checkpoint (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for bitext operations.
pub type Result<T> = std::result::Result<T, BitextError>;
