//! Web server for browser-based reconciliation.
//!
//! This module provides an interactive web interface using Axum.
//! Users upload a variant table and a reference table, pick the comparison
//! columns and weights, and get the matches back as a table or a workbook.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! name-reconciler serve
//!
//! # Custom port and auto-open browser
//! name-reconciler serve --port 3000 --open
//!
//! # Bind to all interfaces
//! name-reconciler serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /` - Main page with the upload form
//! - `POST /api/reconcile` - Reconcile two uploaded tables (multipart form);
//!   add `?download=xlsx` to receive `result_combined_high_accuracy.xlsx`
//!
//! ## Form Fields
//!
//! | Field | Meaning | Default |
//! |-------|---------|---------|
//! | `variants` | variant table file | required |
//! | `references` | reference table file | required |
//! | `variant_field` | variant comparison column | `商品名` |
//! | `reference_field` | reference comparison column | `商品名` |
//! | `char_weight` | character weight, clamped to 0-1 | `0.7` |
//! | `token_weight` | token weight, clamped to 0-1 | `0.3` |

pub mod format_detection;
pub mod server;
