use crate::core::cell::CellValue;
use crate::matching::normalize::{fold, ComparisonKey};
use crate::matching::scoring::{HybridScorer, ScoreTriple, Scorer};

/// Default weight of the character-level (edit distance) signal
pub const DEFAULT_CHAR_WEIGHT: f64 = 0.7;

/// Default weight of the token-level (Jaccard) signal
pub const DEFAULT_TOKEN_WEIGHT: f64 = 0.3;

/// Tolerance used when checking whether weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights of the two similarity signals in the hybrid score.
///
/// The weights are expected, but not required, to sum to 1.0. They are never
/// rescaled: with other sums the hybrid score simply leaves [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScoringWeights {
    /// Weight for character-level similarity (typos, missing characters)
    pub char_weight: f64,
    /// Weight for token-set similarity (word order, separators)
    pub token_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            char_weight: DEFAULT_CHAR_WEIGHT,   // 70%
            token_weight: DEFAULT_TOKEN_WEIGHT, // 30%
        }
    }
}

impl ScoringWeights {
    #[must_use]
    pub fn new(char_weight: f64, token_weight: f64) -> Self {
        Self {
            char_weight,
            token_weight,
        }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.char_weight + self.token_weight
    }

    /// Whether the weights sum to 1.0, the only case where hybrid scores stay in [0, 1]
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

/// One canonical name with its precomputed comparison key
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    /// Original text as read from input
    pub original: String,
    /// Folded key used for scoring
    pub key: ComparisonKey,
}

impl ReferenceEntry {
    #[must_use]
    pub fn from_cell(cell: &CellValue) -> Self {
        Self {
            original: cell.to_comparable_text(),
            key: fold(cell),
        }
    }
}

/// The reference list, normalized once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCache {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceCache {
    /// Fold every reference cell once, keeping input order.
    pub fn build<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        Self {
            entries: cells.into_iter().map(ReferenceEntry::from_cell).collect(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The highest-scoring reference found for one variant
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch<'a> {
    /// Position of the entry in the reference cache
    pub index: usize,
    /// Original text of the matched reference
    pub reference: &'a str,
    pub score: ScoreTriple,
}

/// Scan the reference cache for the best match of one variant key.
///
/// Entries are scored in cache order. A later entry replaces the current best
/// only with a strictly greater hybrid score, so ties keep the earliest entry.
/// The scan stops as soon as the best score reaches 1.0. Returns `None` only
/// when the cache is empty.
pub fn find_best_match<'a, S: Scorer + ?Sized>(
    scorer: &S,
    variant_key: &ComparisonKey,
    cache: &'a ReferenceCache,
    weights: &ScoringWeights,
) -> Option<BestMatch<'a>> {
    let mut best: Option<BestMatch<'a>> = None;

    for (index, entry) in cache.entries.iter().enumerate() {
        let score = scorer.score(variant_key.as_str(), entry.key.as_str(), weights);

        let improves = best
            .as_ref()
            .map_or(true, |current| score.hybrid > current.score.hybrid);

        if improves {
            best = Some(BestMatch {
                index,
                reference: &entry.original,
                score,
            });

            if score.is_perfect() {
                break;
            }
        }
    }

    best
}

/// The main matching engine: a reference cache bound to weights and a scorer
pub struct MatchingEngine<'a, S = HybridScorer> {
    cache: &'a ReferenceCache,
    weights: ScoringWeights,
    scorer: S,
}

impl<'a> MatchingEngine<'a, HybridScorer> {
    /// Create a new matching engine using the hybrid scorer
    #[must_use]
    pub fn new(cache: &'a ReferenceCache, weights: ScoringWeights) -> Self {
        Self::with_scorer(cache, weights, HybridScorer)
    }
}

impl<'a, S: Scorer> MatchingEngine<'a, S> {
    /// Create a new matching engine with a custom scorer
    pub fn with_scorer(cache: &'a ReferenceCache, weights: ScoringWeights, scorer: S) -> Self {
        Self {
            cache,
            weights,
            scorer,
        }
    }

    /// Find the single best match for a folded variant key
    pub fn find_best_match(&self, variant_key: &ComparisonKey) -> Option<BestMatch<'a>> {
        find_best_match(&self.scorer, variant_key, self.cache, &self.weights)
    }

    #[must_use]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    #[must_use]
    pub fn cache(&self) -> &'a ReferenceCache {
        self.cache
    }
}
