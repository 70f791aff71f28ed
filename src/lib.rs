//! # name-reconciler
//!
//! A library for resolving inconsistently written names against a canonical
//! master list.
//!
//! Product lists exported from different systems rarely agree on spelling:
//! the same item shows up with full-width digits, half-width katakana,
//! missing spaces, different casing or reordered words. `name-reconciler`
//! scores every variant against every canonical name and reports the best
//! match together with the scores that explain it.
//!
//! ## Features
//!
//! - **Width normalization**: NFKC folds full-width and half-width forms of variants
//! - **Hybrid scoring**: weighted Indel character ratio plus token Jaccard
//! - **Deterministic selection**: first-best wins on ties, exact matches stop the scan
//! - **Workbook and delimited input**: xlsx, xls, ods, csv and tsv tables
//! - **Workbook output**: a `Match Results` sheet with all three scores
//!
//! ## Example
//!
//! ```rust
//! use name_reconciler::core::table::RecordTable;
//! use name_reconciler::matching::progress::NoProgress;
//! use name_reconciler::matching::reconcile::{reconcile, ReconcileConfig};
//!
//! let variants = RecordTable::single_column("商品名", ["ＳＯＮＹ ＰＲＯＤＵＣＴ Ａ", "sony productb"]);
//! let masters = RecordTable::single_column("商品名", ["Sony Product A", "Sony Product B"]);
//!
//! let results = reconcile(&variants, &masters, &ReconcileConfig::default(), &NoProgress).unwrap();
//!
//! for r in &results {
//!     println!(
//!         "{} => {:?} ({:.3})",
//!         r.original_variant,
//!         r.matched_reference,
//!         r.hybrid().unwrap_or_default()
//!     );
//! }
//! assert_eq!(results[0].matched_reference.as_deref(), Some("Sony Product A"));
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Cell values and record tables
//! - [`matching`]: Normalization, scoring, best-match search and the reconciliation driver
//! - [`parsing`]: Workbook and CSV/TSV loaders
//! - [`export`]: Result workbook writer
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: Web server for browser-based reconciliation

pub mod cli;
pub mod core;
pub mod export;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use core::cell::CellValue;
pub use core::table::RecordTable;
pub use matching::engine::{MatchingEngine, ReferenceCache, ScoringWeights};
pub use matching::reconcile::{
    reconcile, reconcile_parallel, MatchResult, ReconcileConfig, ReconcileError,
};
pub use matching::scoring::ScoreTriple;
