//! Core data types for name reconciliation.
//!
//! - [`CellValue`](cell::CellValue): a raw input cell (text, number, missing
//!   or other) with an explicit text rendering
//! - [`RecordTable`](table::RecordTable): rows of cells under named columns,
//!   the shape every input file is loaded into
//!
//! ## Cell Rendering
//!
//! | Cell | Text used for matching and output |
//! |------|-----------------------------------|
//! | `Text("ソニー")` | `ソニー` |
//! | `Number(3.0)` | `3` |
//! | `Number(2.5)` | `2.5` |
//! | `Missing` | empty string |
//! | `Other("TRUE")` | `TRUE` |

pub mod cell;
pub mod table;
