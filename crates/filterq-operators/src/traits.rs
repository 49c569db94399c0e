//! The relational builder seam.
//!
//! `WhereBuilder` is the fluent predicate surface the relational compiler
//! folds over. Implementations own rendering/execution; the compiler only
//! decides which calls to make and in what order.

use filterq_core::value::Value;
use serde::{Deserialize, Serialize};

/// Binary comparison applied by `where_cmp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
}

impl Comparison {
    /// SQL operator text.
    pub const fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
            Comparison::Like => "like",
            Comparison::ILike => "ilike",
        }
    }
}

/// How a predicate joins the predicates before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub const fn keyword(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }
}

/// Fluent, chainable predicate API of a relational query builder.
///
/// Every `where_*` call is AND-combined with what came before, except
/// `where_group`, which takes its connective explicitly. The first predicate
/// inside a group ignores its connective.
pub trait WhereBuilder: Sized {
    /// Table the builder is bound to, if it knows one.
    fn table_name(&self) -> Option<&str>;

    fn where_cmp(&mut self, column: &str, cmp: Comparison, value: Value) -> &mut Self;

    fn where_in(&mut self, column: &str, values: Vec<Value>) -> &mut Self;

    fn where_not_in(&mut self, column: &str, values: Vec<Value>) -> &mut Self;

    fn where_null(&mut self, column: &str) -> &mut Self;

    fn where_not_null(&mut self, column: &str) -> &mut Self;

    /// A predicate no row satisfies (`1 = 0`).
    fn where_false(&mut self) -> &mut Self;

    /// Parenthesized group built by `build`, joined with `connective`.
    /// Empty groups are dropped.
    fn where_group<F>(&mut self, connective: Connective, build: F) -> &mut Self
    where
        F: FnOnce(&mut Self);
}
