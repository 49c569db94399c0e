#![forbid(unsafe_code)]
//! filterq-core: the vocabulary shared by every filterq crate.
//!
//! - `value`: the filter tree (`Value`/`Map`) and its total ordering.
//! - `op`: the closed operator and logical-operator vocabulary.
//! - `sort`/`page`: sort orders, pagination requests, and page shapes.
//! - `config`/`error`: ambient configuration and the core error type.
//!
//! No async or IO lives here.

pub mod config;
pub mod error;
pub mod op;
pub mod page;
pub mod prelude;
pub mod sort;
pub mod value;

pub use error::{Error, Result};
pub use value::{Map, Value};
