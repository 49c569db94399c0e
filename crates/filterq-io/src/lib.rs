#![forbid(unsafe_code)]
//! filterq-io: the stores pagination talks to.
//!
//! - `store`: `DocumentStore` and `RelationalQuery`, the collaborator traits.
//! - `memory_collection`: in-memory document collection evaluating compiled
//!   `$`-filters (see `matcher`).
//! - `memory_table`: in-memory table whose `TableQuery` is a `WhereBuilder`
//!   that both renders SQL text and evaluates rows.
//!
//! The in-memory backends exist for tests and for embedders without a real
//! driver; real drivers implement the traits in their own crates.

pub mod error;
pub mod matcher;
pub mod memory_collection;
pub mod memory_table;
pub mod store;

pub use error::{Result, StoreError};
pub use memory_collection::MemoryCollection;
pub use memory_table::{MemoryTable, TableQuery};
pub use store::{DocumentStore, FindOptions, RelationalQuery};
