#![forbid(unsafe_code)]
//! filterq-planner: raw filter → canonical tree → backend filter.
//!
//! Pipeline:
//!     * `normalize` repairs query-string artifacts and enforces the
//!       sequence invariants of a canonical tree
//!     * `document` compiles a canonical tree to a `$`-operator filter
//!     * `dates` is the separate, opt-in ISO string → date pass
//!     * `relational` folds a canonical tree over a `WhereBuilder`
//!
//! Every pass is a pure, synchronous rebuild; inputs are never mutated.

pub mod case;
pub mod dates;
pub mod document;
pub mod normalize;
pub mod relational;

pub use dates::cast_iso_strings_to_dates;
pub use document::compile_to_document_filter;
pub use normalize::normalize;
pub use relational::{apply_relational_filter, RelationalContext};
