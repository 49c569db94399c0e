//! Request filter → backend filter, shared by both strategies.

use filterq_core::config::PaginationConfig;
use filterq_core::page::Row;
use filterq_core::value::Value;
use filterq_io::matcher::lookup;
use filterq_io::RelationalQuery;
use filterq_planner::{
    apply_relational_filter, cast_iso_strings_to_dates, compile_to_document_filter, normalize,
    RelationalContext,
};

/// normalize → compile → (optional) ISO date cast.
pub(crate) fn document_filter(cfg: &PaginationConfig, raw: &Value) -> Value {
    let compiled = compile_to_document_filter(&normalize(raw));
    if cfg.cast_dates {
        cast_iso_strings_to_dates(&compiled)
    } else {
        compiled
    }
}

/// Clone of `base` with the normalized filter applied.
pub(crate) fn filtered_query<Q: RelationalQuery>(
    base: &Q,
    raw: &Value,
    ctx: &RelationalContext,
) -> Q {
    let mut q = base.clone();
    apply_relational_filter(&mut q, &normalize(raw), ctx);
    q
}

/// Sort value of a fetched row: the full key, then its last segment.
pub(crate) fn sort_value(row: &Row, key: &str) -> Option<Value> {
    lookup(row, key)
        .or_else(|| key.rsplit('.').next().and_then(|last| row.get(last)))
        .cloned()
}
