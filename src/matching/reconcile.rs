//! The reconciliation driver: two record tables in, one match per variant out.

use rayon::prelude::*;
use serde::Serialize;

use crate::core::cell::CellValue;
use crate::core::table::RecordTable;
use crate::matching::engine::{MatchingEngine, ReferenceCache, ScoringWeights};
use crate::matching::normalize::{fold, normalize_width};
use crate::matching::progress::{ProgressEvent, ProgressSink};
use crate::matching::scoring::{HybridScorer, ScoreTriple, Scorer};

/// Default comparison column for both inputs ("product name")
pub const DEFAULT_FIELD: &str = "商品名";

/// Which input a configuration error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Variant,
    Reference,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variant => write!(f, "variant"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// Errors raised before any comparison work starts
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Column '{field}' not found in {collection} input (available: {available})")]
    MissingField {
        collection: Collection,
        field: String,
        available: String,
    },
}

/// Configuration for one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct ReconcileConfig {
    /// Comparison column in the variant table
    pub variant_field: String,
    /// Comparison column in the reference table
    pub reference_field: String,
    pub weights: ScoringWeights,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            variant_field: DEFAULT_FIELD.to_string(),
            reference_field: DEFAULT_FIELD.to_string(),
            weights: ScoringWeights::default(),
        }
    }
}

/// The resolution of one variant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Variant text exactly as read, before any normalization
    pub original_variant: String,
    /// Original text of the best reference; `None` only when there are no references
    pub matched_reference: Option<String>,
    /// Scores of the best reference; present exactly when `matched_reference` is
    pub score: Option<ScoreTriple>,
}

impl MatchResult {
    #[must_use]
    pub fn hybrid(&self) -> Option<f64> {
        self.score.map(|s| s.hybrid)
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        self.matched_reference.is_some()
    }
}

/// Resolve every variant against the reference list, in variant order.
///
/// # Errors
///
/// Returns `ReconcileError::MissingField` if either comparison column is
/// absent. Nothing is scored in that case.
pub fn reconcile(
    variants: &RecordTable,
    references: &RecordTable,
    config: &ReconcileConfig,
    progress: &dyn ProgressSink,
) -> Result<Vec<MatchResult>, ReconcileError> {
    reconcile_with_scorer(variants, references, config, HybridScorer, progress)
}

/// [`reconcile`] with a caller-supplied scorer
///
/// # Errors
///
/// Returns `ReconcileError::MissingField` if either comparison column is absent.
pub fn reconcile_with_scorer<S: Scorer>(
    variants: &RecordTable,
    references: &RecordTable,
    config: &ReconcileConfig,
    scorer: S,
    progress: &dyn ProgressSink,
) -> Result<Vec<MatchResult>, ReconcileError> {
    let run = Run::prepare(variants, references, config)?;
    let engine = MatchingEngine::with_scorer(&run.cache, config.weights, scorer);

    run.started(progress);
    let total = run.cells.len();
    let results = run
        .cells
        .iter()
        .enumerate()
        .map(|(index, cell)| resolve(&engine, index, total, cell, progress))
        .collect::<Vec<_>>();
    run.finished(&results, progress);

    Ok(results)
}

/// [`reconcile`] spread across the rayon thread pool.
///
/// Each variant is independent and the reference cache is shared read-only,
/// so the output is identical to the sequential driver. Progress events for
/// individual variants may arrive out of order.
///
/// # Errors
///
/// Returns `ReconcileError::MissingField` if either comparison column is absent.
pub fn reconcile_parallel(
    variants: &RecordTable,
    references: &RecordTable,
    config: &ReconcileConfig,
    progress: &(dyn ProgressSink + Sync),
) -> Result<Vec<MatchResult>, ReconcileError> {
    let run = Run::prepare(variants, references, config)?;
    let engine = MatchingEngine::new(&run.cache, config.weights);

    run.started(progress);
    let total = run.cells.len();
    let results = run
        .cells
        .par_iter()
        .enumerate()
        .map(|(index, cell)| resolve(&engine, index, total, cell, progress))
        .collect::<Vec<_>>();
    run.finished(&results, progress);

    Ok(results)
}

/// Validated inputs plus the reference cache for one run
struct Run<'t> {
    cells: Vec<&'t CellValue>,
    cache: ReferenceCache,
    weights: ScoringWeights,
}

impl<'t> Run<'t> {
    fn prepare(
        variants: &'t RecordTable,
        references: &RecordTable,
        config: &ReconcileConfig,
    ) -> Result<Self, ReconcileError> {
        // Resolve both fields before doing any work
        let variant_cells = variants
            .column(&config.variant_field)
            .ok_or_else(|| missing_field(Collection::Variant, &config.variant_field, variants))?;
        let reference_cells = references.column(&config.reference_field).ok_or_else(|| {
            missing_field(Collection::Reference, &config.reference_field, references)
        })?;

        if !config.weights.is_balanced() {
            tracing::warn!(
                "Scoring weights sum to {:.3}, not 1.0; hybrid scores will fall outside [0, 1] \
                 and exact matches will not stop the reference scan early",
                config.weights.sum()
            );
        }

        Ok(Self {
            cells: variant_cells.collect(),
            cache: ReferenceCache::build(reference_cells),
            weights: config.weights,
        })
    }

    fn started(&self, progress: &dyn ProgressSink) {
        progress.report(&ProgressEvent::Started {
            variants: self.cells.len(),
            references: self.cache.len(),
            weights: self.weights,
        });
    }

    fn finished(&self, results: &[MatchResult], progress: &dyn ProgressSink) {
        progress.report(&ProgressEvent::Finished {
            variants: results.len(),
        });
        progress.flush();
    }
}

fn resolve<S: Scorer>(
    engine: &MatchingEngine<'_, S>,
    index: usize,
    total: usize,
    cell: &CellValue,
    progress: &dyn ProgressSink,
) -> MatchResult {
    let key = fold(&normalize_width(cell));
    let best = engine.find_best_match(&key);

    let result = MatchResult {
        original_variant: cell.to_comparable_text(),
        matched_reference: best.as_ref().map(|b| b.reference.to_string()),
        score: best.map(|b| b.score),
    };

    progress.report(&ProgressEvent::Matched {
        index,
        total,
        original: &result.original_variant,
        reference: result.matched_reference.as_deref(),
        score: result.score,
    });

    result
}

fn missing_field(collection: Collection, field: &str, table: &RecordTable) -> ReconcileError {
    ReconcileError::MissingField {
        collection,
        field: field.to_string(),
        available: table.columns.join(", "),
    }
}
