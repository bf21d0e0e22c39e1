//! # Similarity Scoring
//!
//! Wraps a semantic text-similarity model and memoizes every score by the
//! exact ordered pair of input strings.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::trace;

use crate::error::{BitextError, Result};

/// A semantic text-similarity model.
///
/// Scores are expected in `[-1.0, 1.0]`, higher meaning more similar.
/// Errors are treated as fatal by every caller.
pub trait SimilarityModel: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Result<f32>;
}

impl<F> SimilarityModel for F
where
    F: Fn(&str, &str) -> Result<f32> + Send + Sync,
{
    fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        self(a, b)
    }
}

type PairCache = HashMap<String, HashMap<String, f32>>;

/// Memoizing front-end for a [`SimilarityModel`].
///
/// Construct one per run and pass it by reference to the matcher and the
/// aligner. The cache is append-only and safe to share between threads.
pub struct SimilarityScorer<M> {
    model: M,
    cache: Mutex<PairCache>,
}

impl<M: SimilarityModel> SimilarityScorer<M> {
    #[must_use]
    pub fn new(model: M) -> Self {
        Self {
            model,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Scores `a` against `b`, invoking the model only on a cache miss.
    ///
    /// Scores are clamped to `[-1.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Propagates model failures and rejects NaN scores with
    /// `BitextError::InvalidScore`.
    pub fn score(&self, a: &str, b: &str) -> Result<f32> {
        if let Some(score) = self.lock().get(a).and_then(|row| row.get(b)).copied() {
            return Ok(score);
        }

        // The lock is not held while the model runs.
        let raw = self.model.similarity(a, b)?;
        if raw.is_nan() {
            return Err(BitextError::InvalidScore { score: raw });
        }
        let score = raw.clamp(-1.0, 1.0);
        trace!(score, "similarity computed");

        self.lock()
            .entry(a.to_owned())
            .or_default()
            .insert(b.to_owned(), score);
        Ok(score)
    }

    /// Number of distinct text pairs scored so far.
    #[must_use]
    pub fn cached_pairs(&self) -> usize {
        self.lock().values().map(HashMap::len).sum()
    }

    /// The wrapped model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    fn lock(&self) -> MutexGuard<'_, PairCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn repeated_pairs_hit_the_cache() {
        let calls = AtomicUsize::new(0);
        let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(if a == b { 1.0 } else { 0.2 })
        });

        assert_eq!(scorer.score("a", "a").unwrap(), 1.0);
        assert_eq!(scorer.score("a", "a").unwrap(), 1.0);
        assert_eq!(scorer.score("a", "b").unwrap(), 0.2);
        assert_eq!(scorer.score("a", "b").unwrap(), 0.2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(scorer.cached_pairs(), 2);
    }

    #[test]
    fn pairs_are_ordered() {
        let calls = AtomicUsize::new(0);
        let scorer = SimilarityScorer::new(|_: &str, _: &str| -> Result<f32> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(0.5)
        });

        scorer.score("a", "b").unwrap();
        scorer.score("b", "a").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_scores_are_cached_too() {
        let calls = AtomicUsize::new(0);
        let scorer = SimilarityScorer::new(|_: &str, _: &str| -> Result<f32> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(0.0)
        });

        scorer.score("x", "y").unwrap();
        scorer.score("x", "y").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scores_are_clamped() {
        let scorer = SimilarityScorer::new(|_: &str, _: &str| -> Result<f32> { Ok(1.7) });
        assert_eq!(scorer.score("a", "b").unwrap(), 1.0);
    }

    #[test]
    fn model_failure_is_propagated() {
        let scorer = SimilarityScorer::new(|_: &str, _: &str| -> Result<f32> {
            Err(BitextError::Similarity("model unavailable".into()))
        });
        assert!(matches!(
            scorer.score("a", "b"),
            Err(BitextError::Similarity(_))
        ));
        assert_eq!(scorer.cached_pairs(), 0);
    }

    #[test]
    fn nan_is_rejected() {
        let scorer = SimilarityScorer::new(|_: &str, _: &str| -> Result<f32> { Ok(f32::NAN) });
        assert!(matches!(
            scorer.score("a", "b"),
            Err(BitextError::InvalidScore { .. })
        ));
    }
}
