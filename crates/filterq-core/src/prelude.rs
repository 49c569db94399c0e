//! Convenient re-exports for downstream crates.

pub use crate::config::PaginationConfig;
pub use crate::error::{Error, Result};
pub use crate::op::{Logical, Op};
pub use crate::page::{CursorPage, CursorRequest, OffsetPage, OffsetRequest, Row, Towards};
pub use crate::sort::{Direction, SortOrder};
pub use crate::value::{Map, Value};
