#![forbid(unsafe_code)]
//! filterq-exec: the pagination engine.
//!
//! `Paginator` runs two strategies (offset, cursor) against either backend
//! (`DocumentStore`, `RelationalQuery`). Every page is one list query and
//! one count over the same compiled filter; cursor pages add two edge
//! probes. Independent round trips are awaited together and any failure
//! fails the page with the store's own error.

pub mod bounds;
pub mod cursor;
pub mod offset;
pub mod paginator;

mod filters;

pub use bounds::Side;
pub use paginator::Paginator;
