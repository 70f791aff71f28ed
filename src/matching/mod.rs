//! Name matching engine and scoring algorithms.
//!
//! This module provides the core matching functionality:
//!
//! - [`normalize`]: NFKC width normalization, case folding and tokenization
//! - [`scoring`]: the hybrid similarity score ([`ScoreTriple`])
//! - [`engine`]: the reference cache and best-match search ([`MatchingEngine`])
//! - [`reconcile`]: the driver that resolves a whole variant table
//! - [`progress`]: progress reporting sinks for the driver
//!
//! ## Matching Algorithm
//!
//! 1. **Reference cache**: every canonical name is folded to upper case once
//! 2. **Variant key**: each variant is NFKC-normalized, then folded
//! 3. **Scan**: the key is scored against every cached reference in order
//! 4. **Selection**: a later reference wins only with a strictly higher score,
//!    and the scan stops early on a perfect score of 1.0
//!
//! ## Scoring
//!
//! The hybrid score combines two signals:
//!
//! - **Character similarity**: Indel similarity ratio (longest common subsequence) of the full
//!   keys, robust to typos and dropped characters
//! - **Token similarity**: Jaccard coefficient of the space/slash-separated
//!   word sets, robust to word order
//!
//! ## Example
//!
//! ```rust
//! use name_reconciler::core::table::RecordTable;
//! use name_reconciler::matching::progress::NoProgress;
//! use name_reconciler::matching::reconcile::{reconcile, ReconcileConfig};
//!
//! let variants = RecordTable::single_column("商品名", ["Sony ProductB"]);
//! let masters = RecordTable::single_column("商品名", ["Sony Product A", "Sony Product B"]);
//!
//! let results = reconcile(&variants, &masters, &ReconcileConfig::default(), &NoProgress).unwrap();
//! assert_eq!(results[0].matched_reference.as_deref(), Some("Sony Product B"));
//! ```

pub mod engine;
pub mod normalize;
pub mod progress;
pub mod reconcile;
pub mod scoring;

pub use engine::{MatchingEngine, ReferenceCache, ScoringWeights};
pub use reconcile::{MatchResult, ReconcileConfig, ReconcileError};
pub use scoring::ScoreTriple;
