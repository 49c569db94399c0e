//! Relational operator table: each `Op` as a `WhereBuilder` mutation.

use filterq_core::op::Op;
use filterq_core::value::Value;

use crate::traits::{Comparison, WhereBuilder};

/// Outcome of applying one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Yes,
    /// The operator has no relational meaning; nothing was added.
    Skipped,
}

/// Apply `op` with `operand` to `column`.
///
/// `eq`/`ne` against `null` become nullability checks. `isNull`/`isNotNull`
/// invert on an explicit `false`. Document-only operators are skipped.
pub fn apply_operator<B: WhereBuilder>(
    builder: &mut B,
    column: &str,
    op: Op,
    operand: Value,
) -> Applied {
    match op {
        Op::Eq => {
            if operand.is_null() {
                builder.where_null(column);
            } else {
                builder.where_cmp(column, Comparison::Eq, operand);
            }
        }
        Op::Ne | Op::Neq => {
            if operand.is_null() {
                builder.where_not_null(column);
            } else {
                builder.where_cmp(column, Comparison::Ne, operand);
            }
        }
        Op::Gt => {
            builder.where_cmp(column, Comparison::Gt, operand);
        }
        Op::Gte => {
            builder.where_cmp(column, Comparison::Gte, operand);
        }
        Op::Lt => {
            builder.where_cmp(column, Comparison::Lt, operand);
        }
        Op::Lte => {
            builder.where_cmp(column, Comparison::Lte, operand);
        }
        Op::In => {
            builder.where_in(column, into_list(operand));
        }
        Op::Nin => {
            builder.where_not_in(column, into_list(operand));
        }
        Op::Like => {
            builder.where_cmp(column, Comparison::Like, operand);
        }
        Op::ILike => {
            builder.where_cmp(column, Comparison::ILike, operand);
        }
        Op::IsNull => {
            if is_explicit_false(&operand) {
                builder.where_not_null(column);
            } else {
                builder.where_null(column);
            }
        }
        Op::IsNotNull => {
            if is_explicit_false(&operand) {
                builder.where_null(column);
            } else {
                builder.where_not_null(column);
            }
        }
        Op::Exists
        | Op::Type
        | Op::Regex
        | Op::Options
        | Op::Mod
        | Op::Text
        | Op::All
        | Op::Size
        | Op::ElemMatch => return Applied::Skipped,
    }
    Applied::Yes
}

/// Membership operands are sequences; a stray scalar becomes a singleton.
fn into_list(operand: Value) -> Vec<Value> {
    match operand {
        Value::List(items) => items,
        other => vec![other],
    }
}

/// `false`, or the query-string spelling `"false"`.
fn is_explicit_false(operand: &Value) -> bool {
    matches!(operand, Value::Bool(false)) || operand.as_str() == Some("false")
}
