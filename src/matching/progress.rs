//! Progress reporting for reconciliation runs.
//!
//! The driver never logs on its own; it reports [`ProgressEvent`]s to a sink
//! the caller creates for the run. [`TracingProgress`] forwards them to
//! `tracing`, [`NoProgress`] discards them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::matching::engine::ScoringWeights;
use crate::matching::scoring::ScoreTriple;

/// How often (in variants) [`TracingProgress`] logs a progress line
pub const PROGRESS_INTERVAL: usize = 100;

/// Something that happened during a reconciliation run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent<'a> {
    /// The reference cache is built and matching is about to start
    Started {
        variants: usize,
        references: usize,
        weights: ScoringWeights,
    },
    /// One variant has been resolved
    Matched {
        /// 0-based position of the variant in the input
        index: usize,
        total: usize,
        original: &'a str,
        reference: Option<&'a str>,
        score: Option<ScoreTriple>,
    },
    /// Every variant has been resolved
    Finished { variants: usize },
}

/// Receives progress events from the reconciliation driver.
///
/// Implementations are shared with worker threads by the parallel driver, so
/// they take `&self`; use interior mutability for any state.
pub trait ProgressSink {
    fn report(&self, event: &ProgressEvent<'_>);

    /// Called once by the driver after the last event of a run
    fn flush(&self) {}
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: &ProgressEvent<'_>) {}
}

/// Logs progress through `tracing`.
///
/// Per-variant results go to `debug`, periodic progress and run boundaries
/// to `info`.
#[derive(Debug)]
pub struct TracingProgress {
    started: Instant,
    completed: AtomicUsize,
}

impl Default for TracingProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingProgress {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            completed: AtomicUsize::new(0),
        }
    }
}

impl ProgressSink for TracingProgress {
    fn report(&self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::Started {
                variants,
                references,
                weights,
            } => {
                tracing::info!(
                    "Matching {variants} variant(s) against {references} reference(s) \
                     (char weight {:.2}, token weight {:.2})",
                    weights.char_weight,
                    weights.token_weight
                );
            }
            ProgressEvent::Matched {
                total,
                original,
                reference,
                score,
                ..
            } => {
                match (reference, score) {
                    (Some(reference), Some(score)) => tracing::debug!(
                        "{original} => {reference} (hybrid {:.2}, char {:.2}, token {:.2})",
                        score.hybrid,
                        score.char_sim,
                        score.token_sim
                    ),
                    _ => tracing::debug!("{original} => no reference"),
                }

                // Workers may finish out of order; count completions instead of using the index
                let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_INTERVAL == 0 || done == *total {
                    tracing::info!("Processed {done}/{total}");
                }
            }
            ProgressEvent::Finished { variants } => {
                tracing::info!(
                    "Matched {variants} variant(s) in {:.2?}",
                    self.started.elapsed()
                );
            }
        }
    }
}
