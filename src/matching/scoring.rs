use std::collections::HashSet;

use rapidfuzz::distance::indel;
use serde::{Deserialize, Serialize};

use crate::matching::engine::ScoringWeights;
use crate::matching::normalize::tokenize;

/// Safely convert usize to f64 for ratio calculations
///
/// Token counts are tiny compared to the f64 mantissa, so the precision loss
/// clippy warns about never happens in practice.
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Similarity scores between a variant key and a reference key.
///
/// Built once by a [`Scorer`] and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTriple {
    /// Weighted combination of `char_sim` and `token_sim`
    pub hybrid: f64,

    /// Indel similarity ratio of the full keys, in [0, 1]
    pub char_sim: f64,

    /// Jaccard coefficient of the token sets, in [0, 1]
    pub token_sim: f64,
}

impl ScoreTriple {
    #[must_use]
    pub fn new(char_sim: f64, token_sim: f64, weights: &ScoringWeights) -> Self {
        Self {
            hybrid: char_sim * weights.char_weight + token_sim * weights.token_weight,
            char_sim,
            token_sim,
        }
    }

    /// True when no reference can score higher than this one
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.hybrid >= PERFECT_SCORE
    }
}

/// Hybrid score at which the reference scan for a variant stops.
pub const PERFECT_SCORE: f64 = 1.0;

/// A similarity function over two comparison keys.
///
/// The engine is generic over this so that an instrumented scorer can be
/// swapped in; [`HybridScorer`] is the one used everywhere else.
pub trait Scorer {
    fn score(&self, a: &str, b: &str, weights: &ScoringWeights) -> ScoreTriple;
}

/// Edit-distance similarity combined with token-set Jaccard.
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridScorer;

impl Scorer for HybridScorer {
    fn score(&self, a: &str, b: &str, weights: &ScoringWeights) -> ScoreTriple {
        hybrid_score(a, b, weights)
    }
}

/// Score two comparison keys.
///
/// `hybrid = char_sim * char_weight + token_sim * token_weight`. The weights
/// are used as given; if they do not sum to 1.0 the hybrid leaves [0, 1].
#[must_use]
pub fn hybrid_score(a: &str, b: &str, weights: &ScoringWeights) -> ScoreTriple {
    let char_sim = char_similarity(a, b);
    let token_sim = token_similarity(a, b);
    ScoreTriple::new(char_sim, token_sim, weights)
}

/// Indel similarity ratio over Unicode scalar values.
///
/// `2 * lcs / (len(a) + len(b))`, where `lcs` is the longest common
/// subsequence, so 1.0 means identical. Two empty strings are identical.
#[must_use]
pub fn char_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    indel::normalized_similarity(a.chars(), b.chars())
}

/// Jaccard coefficient of the token sets of `a` and `b`.
#[must_use]
pub fn token_similarity(a: &str, b: &str) -> f64 {
    jaccard_similarity(&tokenize(a), &tokenize(b))
}

/// Jaccard similarity: |A ∩ B| / |A ∪ B|
///
/// Two empty sets count as a perfect match (1.0): two blank names are the
/// same name. Exactly one empty set gives 0.0.
fn jaccard_similarity<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let intersection = a.intersection(b).count();
            let union = a.union(b).count();
            count_to_f64(intersection) / count_to_f64(union)
        }
    }
}
