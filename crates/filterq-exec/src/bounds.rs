//! Strict sort-field bounds for cursors and edge probes.

use filterq_core::op::Op;
use filterq_core::page::Towards;
use filterq_core::sort::Direction;
use filterq_core::value::{Map, Value};
use filterq_operators::document::symbol;
use filterq_operators::{Comparison, WhereBuilder};

/// Which side of a boundary value a bound keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// `field > value`
    Above,
    /// `field < value`
    Below,
}

impl Side {
    /// Rows past the cursor when walking `towards` under `direction`.
    pub fn for_cursor(direction: Direction, towards: Towards) -> Self {
        match (direction, towards) {
            (Direction::Asc, Towards::Next) | (Direction::Desc, Towards::Previous) => Side::Above,
            (Direction::Desc, Towards::Next) | (Direction::Asc, Towards::Previous) => Side::Below,
        }
    }

    /// Rows that precede a boundary in declared order.
    pub fn before(direction: Direction) -> Self {
        Self::for_cursor(direction, Towards::Previous)
    }

    /// Rows that follow a boundary in declared order.
    pub fn after(direction: Direction) -> Self {
        Self::for_cursor(direction, Towards::Next)
    }

    pub fn op(self) -> Op {
        match self {
            Side::Above => Op::Gt,
            Side::Below => Op::Lt,
        }
    }

    pub fn comparison(self) -> Comparison {
        match self {
            Side::Above => Comparison::Gt,
            Side::Below => Comparison::Lt,
        }
    }
}

/// `base AND field <side> value` as a document filter.
pub fn document_bound(base: &Value, field: &str, side: Side, value: Value) -> Value {
    let mut ops = Map::new();
    // $gt/$lt always have a document symbol
    let key = symbol(side.op()).unwrap_or("$gt");
    ops.insert(key.to_string(), value);
    let mut bound = Map::new();
    bound.insert(field.to_string(), Value::Map(ops));
    conjoin(base, bound)
}

/// `base AND clause`. An empty `base` yields the bare clause instead of a
/// one-armed `$and`.
pub fn conjoin(base: &Value, clause: Map) -> Value {
    match base {
        Value::Map(m) if m.is_empty() => Value::Map(clause),
        Value::Map(_) => {
            let mut and = Map::new();
            and.insert(
                "$and".to_string(),
                Value::List(vec![base.clone(), Value::Map(clause)]),
            );
            Value::Map(and)
        }
        _ => Value::Map(clause),
    }
}

/// AND `column <side> value` onto a relational query.
pub fn relational_bound<B: WhereBuilder>(builder: &mut B, column: &str, side: Side, value: Value) {
    builder.where_cmp(column, side.comparison(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cursor_sides() {
        assert_eq!(Side::for_cursor(Direction::Asc, Towards::Next), Side::Above);
        assert_eq!(Side::for_cursor(Direction::Desc, Towards::Next), Side::Below);
        assert_eq!(Side::for_cursor(Direction::Asc, Towards::Previous), Side::Below);
        assert_eq!(Side::for_cursor(Direction::Desc, Towards::Previous), Side::Above);
        assert_eq!(Side::before(Direction::Asc), Side::Below);
        assert_eq!(Side::after(Direction::Desc), Side::Below);
    }

    #[test]
    fn test_document_bound_shapes() {
        let bare = document_bound(&Value::empty_map(), "ts", Side::Above, Value::Int(3));
        assert_eq!(bare, Value::from(json!({"ts": {"$gt": 3}})));

        let base = Value::from(json!({"status": {"$eq": "active"}}));
        let combined = document_bound(&base, "ts", Side::Below, Value::Int(3));
        assert_eq!(
            combined,
            Value::from(json!({"$and": [{"status": {"$eq": "active"}}, {"ts": {"$lt": 3}}]}))
        );
    }
}
