//! Document-store operator table.
//!
//! Native operator keys are the DSL name with a `$` prefix, except where the
//! store spells it differently (`neq` → `$ne`). Keys that already carry the
//! prefix are native and stay untouched, which keeps compilation idempotent.

use filterq_core::op::{Logical, Op};

pub const PREFIX: char = '$';

/// Native symbol for an operator, or `None` for relational-only operators.
pub const fn symbol(op: Op) -> Option<&'static str> {
    match op {
        Op::Eq => Some("$eq"),
        Op::Ne | Op::Neq => Some("$ne"),
        Op::In => Some("$in"),
        Op::Nin => Some("$nin"),
        Op::Gt => Some("$gt"),
        Op::Gte => Some("$gte"),
        Op::Lt => Some("$lt"),
        Op::Lte => Some("$lte"),
        Op::Exists => Some("$exists"),
        Op::Type => Some("$type"),
        Op::Regex => Some("$regex"),
        Op::Options => Some("$options"),
        Op::Mod => Some("$mod"),
        Op::Text => Some("$text"),
        Op::All => Some("$all"),
        Op::Size => Some("$size"),
        Op::ElemMatch => Some("$elemMatch"),
        Op::Like | Op::ILike | Op::IsNull | Op::IsNotNull => None,
    }
}

pub const fn logical_symbol(logical: Logical) -> &'static str {
    match logical {
        Logical::And => "$and",
        Logical::Or => "$or",
        Logical::Nor => "$nor",
    }
}

pub fn is_native(key: &str) -> bool {
    key.starts_with(PREFIX)
}

/// Rewrite any key inside an operator object to its native form.
///
/// Names outside the table (and relational-only operators) are prefixed
/// verbatim; the store decides what they mean.
pub fn native_key(key: &str) -> String {
    if is_native(key) {
        return key.to_string();
    }
    match Op::parse(key).and_then(symbol) {
        Some(sym) => sym.to_string(),
        None => format!("{PREFIX}{key}"),
    }
}
