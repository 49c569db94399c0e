//! Pagination/compilation configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when a request carries no limit.
    pub default_limit: usize,

    /// Optional upper bound on the page size, applied after the `>= 1` clamp.
    pub max_limit: Option<usize>,

    /// Default for camelCase → snake_case column translation in the relational compiler.
    pub case_convert: bool,

    /// Run the ISO date cast over compiled document filters before querying.
    pub cast_dates: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: None,
            case_convert: false,
            cast_dates: true,
        }
    }
}

impl PaginationConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `FILTERQ_DEFAULT_LIMIT`: page size when a request has none
    /// - `FILTERQ_MAX_LIMIT`: upper clamp for page sizes
    /// - `FILTERQ_CASE_CONVERT`: `true`/`false`
    /// - `FILTERQ_CAST_DATES`: `true`/`false`
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("FILTERQ_DEFAULT_LIMIT") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.default_limit = v;
            }
        }

        if let Ok(s) = std::env::var("FILTERQ_MAX_LIMIT") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_limit = Some(v);
            }
        }

        if let Ok(s) = std::env::var("FILTERQ_CASE_CONVERT") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.case_convert = v;
            }
        }

        if let Ok(s) = std::env::var("FILTERQ_CAST_DATES") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.cast_dates = v;
            }
        }

        cfg
    }

    /// Reject settings no request could page with.
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(Error::Config("default_limit must be at least 1".into()));
        }
        match self.max_limit {
            Some(0) => Err(Error::Config("max_limit must be at least 1".into())),
            Some(max) if max < self.default_limit => Err(Error::Config(format!(
                "max_limit {max} is below default_limit {}",
                self.default_limit
            ))),
            _ => Ok(()),
        }
    }

    /// Effective page size for a requested limit.
    ///
    /// Missing limits take `default_limit`; anything below 1 is clamped to 1
    /// (lenient policy for query-string input), then `max_limit` applies.
    pub fn resolve_limit(&self, requested: Option<i64>) -> u64 {
        let limit = requested.unwrap_or(self.default_limit as i64).max(1) as u64;
        match self.max_limit {
            Some(max) => limit.min(max.max(1) as u64),
            None => limit,
        }
    }
}
