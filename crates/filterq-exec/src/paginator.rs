use filterq_core::config::PaginationConfig;
use filterq_core::Result;
use filterq_planner::RelationalContext;

/// Entry point for both pagination strategies.
///
/// Strategy methods live in `offset` and `cursor`.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    pub(crate) cfg: PaginationConfig,
}

impl Paginator {
    pub fn new(cfg: PaginationConfig) -> Self {
        Self { cfg }
    }

    /// `new`, rejecting configs that fail `PaginationConfig::validate`.
    pub fn try_new(cfg: PaginationConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::new(cfg))
    }

    /// `PaginationConfig::from_env()`
    pub fn from_env() -> Self {
        Self::new(PaginationConfig::from_env())
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.cfg
    }

    /// Relational context carrying this paginator's `case_convert` default.
    pub fn relational_context(&self) -> RelationalContext {
        RelationalContext::from_config(&self.cfg)
    }
}
