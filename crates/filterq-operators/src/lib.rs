#![forbid(unsafe_code)]
//! filterq-operators: one operator table per backend.
//!
//! - `document`: `Op` → `$`-prefixed document-store symbol.
//! - `relational`: `Op` → mutation of a fluent `WhereBuilder`.
//!
//! Both tables match on `Op` exhaustively. Keep this crate pure and
//! synchronous; compilers in `filterq-planner` drive these tables.

pub mod document;
pub mod relational;
pub mod traits;

pub use relational::{apply_operator, Applied};
pub use traits::{Comparison, Connective, WhereBuilder};
