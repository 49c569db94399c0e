//! Canonical tree → document-store filter expression.
//!
//! Per top-level key:
//! - logical key → native symbol, members compiled recursively
//! - field → operator object with every key rewritten to native form;
//!   a sequence is an implicit `$in`, a scalar/null an implicit `$eq`.
//!
//! Compiling an already-compiled expression is a no-op.

use filterq_core::op::{Logical, Op};
use filterq_core::value::{Map, Value};
use filterq_operators::document::{self, is_native, logical_symbol, native_key};

/// Compile a canonical tree. Non-map input is returned unchanged.
pub fn compile_to_document_filter(tree: &Value) -> Value {
    match tree {
        Value::Map(map) => Value::Map(compile_map(map)),
        other => other.clone(),
    }
}

fn compile_map(map: &Map) -> Map {
    let mut out = Map::new();
    for (key, value) in map {
        match Logical::from_key(key) {
            Some(logical) => {
                out.insert(logical_symbol(logical).to_string(), compile_members(value));
            }
            None => {
                out.insert(key.clone(), compile_field(value));
            }
        }
    }
    out
}

fn compile_members(value: &Value) -> Value {
    match value {
        Value::List(items) => Value::List(items.iter().map(compile_to_document_filter).collect()),
        Value::Map(_) => Value::List(vec![compile_to_document_filter(value)]),
        other => other.clone(),
    }
}

fn compile_field(value: &Value) -> Value {
    match value {
        Value::Map(ops) => Value::Map(rewrite_operators(ops)),
        Value::List(items) => implicit(Op::In, Value::List(items.clone())),
        scalar => implicit(Op::Eq, scalar.clone()),
    }
}

fn implicit(op: Op, operand: Value) -> Value {
    let mut m = Map::new();
    m.insert(native_key(op.name()), operand);
    Value::Map(m)
}

fn rewrite_operators(ops: &Map) -> Map {
    let mut out = Map::new();
    for (key, operand) in ops {
        let native = native_key(key);
        let operand = if Some(native.as_str()) == document::symbol(Op::ElemMatch) {
            compile_elem_match(operand)
        } else {
            rewrite_operand(operand)
        };
        out.insert(native, operand);
    }
    out
}

/// Operands are left alone except nested keyed structures (`$text: { search }`).
fn rewrite_operand(operand: &Value) -> Value {
    match operand {
        Value::Map(nested) => Value::Map(rewrite_operators(nested)),
        other => other.clone(),
    }
}

/// `elemMatch` takes either an operator object (`{ gte: 80 }`) for scalar
/// arrays or a sub-filter over element fields (`{ score: { gt: 5 } }`).
///
/// It is read as an operator object when every key is an operator and at
/// least one is native or a value comparison. `{ type: "x" }` is a field
/// match; `{ gte: 1 }` still cannot name an element field called `gte`.
fn compile_elem_match(operand: &Value) -> Value {
    match operand {
        Value::Map(nested) if is_operator_object(nested) => Value::Map(rewrite_operators(nested)),
        Value::Map(_) => compile_to_document_filter(operand),
        other => other.clone(),
    }
}

fn is_operator_object(map: &Map) -> bool {
    let all_operators = map.keys().all(|k| is_native(k) || Op::parse(k).is_some());
    let any_comparison = map.keys().any(|k| {
        is_native(k) || Op::parse(k).is_some_and(Op::is_value_comparison)
    });
    all_operators && any_comparison
}
