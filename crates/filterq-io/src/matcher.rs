//! Evaluation of compiled document filters for `MemoryCollection`.
//!
//! Understands the `$`-vocabulary the document compiler emits. A field
//! holding an array matches a scalar condition when any element does.
//! `$text` needs a text index and is reported as unsupported.

use std::cmp::Ordering;

use regex::RegexBuilder;

use filterq_core::value::{Map, Value};

use crate::error::{Result, StoreError};

/// Field lookup: the literal key first, then a dotted path.
pub fn lookup<'a>(doc: &'a Map, path: &str) -> Option<&'a Value> {
    if let Some(v) = doc.get(path) {
        return Some(v);
    }
    let (head, rest) = path.split_once('.')?;
    doc.get(head)?.get_path(rest)
}

/// Does `doc` satisfy `filter`? An empty filter matches everything.
pub fn matches(doc: &Map, filter: &Value) -> Result<bool> {
    match filter {
        Value::Map(clauses) => matches_map(doc, clauses),
        other => Err(StoreError::Unsupported(format!(
            "filter of type {}",
            other.type_name()
        ))),
    }
}

fn matches_map(doc: &Map, clauses: &Map) -> Result<bool> {
    for (key, cond) in clauses {
        let ok = match key.as_str() {
            "$and" => all(doc, members(key, cond)?)?,
            "$or" => any(doc, members(key, cond)?)?,
            "$nor" => !any(doc, members(key, cond)?)?,
            k if k.starts_with('$') => return Err(StoreError::Unsupported(k.to_string())),
            field => matches_field(lookup(doc, field), cond)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn members<'a>(key: &str, cond: &'a Value) -> Result<&'a [Value]> {
    cond.as_list()
        .ok_or_else(|| StoreError::Unsupported(format!("{key} expects a sequence")))
}

fn all(doc: &Map, filters: &[Value]) -> Result<bool> {
    for f in filters {
        if !matches(doc, f)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any(doc: &Map, filters: &[Value]) -> Result<bool> {
    for f in filters {
        if matches(doc, f)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn matches_field(value: Option<&Value>, cond: &Value) -> Result<bool> {
    match cond {
        Value::Map(ops) if is_operator_object(ops) => eval_operators(value, ops),
        literal => Ok(equals(value, literal)),
    }
}

/// `{ $gt: 1, $lt: 5 }`, as opposed to a literal sub-document or a sub-filter.
fn is_operator_object(m: &Map) -> bool {
    !m.is_empty()
        && m.keys()
            .all(|k| k.starts_with('$') && !matches!(k.as_str(), "$and" | "$or" | "$nor"))
}

fn eval_operators(value: Option<&Value>, ops: &Map) -> Result<bool> {
    for (op, operand) in ops {
        let ok = match op.as_str() {
            "$eq" => equals(value, operand),
            "$ne" => !equals(value, operand),
            "$in" => in_set(value, operand),
            "$nin" => !in_set(value, operand),
            "$gt" => ordered(value, operand, |o| o == Ordering::Greater),
            "$gte" => ordered(value, operand, |o| o != Ordering::Less),
            "$lt" => ordered(value, operand, |o| o == Ordering::Less),
            "$lte" => ordered(value, operand, |o| o != Ordering::Greater),
            "$exists" => value.is_some() == truthy(operand),
            "$type" => has_type(value, operand),
            "$regex" => regex_match(value, operand, ops.get("$options"))?,
            // read together with $regex
            "$options" => true,
            "$size" => matches!(
                (value, operand.as_i64()),
                (Some(Value::List(items)), Some(n)) if items.len() as i64 == n
            ),
            "$all" => contains_all(value, operand),
            "$elemMatch" => elem_match(value, operand)?,
            "$mod" => modulo(value, operand),
            other => return Err(StoreError::Unsupported(other.to_string())),
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Missing fields equal `null`; arrays match when any element does.
fn equals(value: Option<&Value>, operand: &Value) -> bool {
    match value {
        None | Some(Value::Null) => operand.is_null(),
        Some(Value::List(items)) if !operand.is_list() => {
            items.iter().any(|item| item.loose_eq(operand))
        }
        Some(v) => v.loose_eq(operand),
    }
}

fn in_set(value: Option<&Value>, operand: &Value) -> bool {
    match operand {
        Value::List(options) => options.iter().any(|o| equals(value, o)),
        single => equals(value, single),
    }
}

/// Range comparisons only hold between values of the same kind.
fn ordered(value: Option<&Value>, operand: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    let holds = |v: &Value| !v.is_null() && v.same_kind(operand) && accept(v.compare(operand));
    match value {
        Some(Value::List(items)) if !operand.is_list() => items.iter().any(|v| holds(v)),
        Some(v) => holds(v),
        None => false,
    }
}

fn truthy(operand: &Value) -> bool {
    match operand {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Str(s) => !matches!(s.as_str(), "false" | "0" | ""),
        _ => true,
    }
}

fn has_type(value: Option<&Value>, operand: &Value) -> bool {
    let Some(v) = value else {
        return false;
    };
    let is = |name: &Value| match name.as_str() {
        Some("number") => matches!(v, Value::Int(_) | Value::Float(_)),
        Some(name) => v.type_name() == name,
        None => false,
    };
    match operand {
        Value::List(names) => names.iter().any(is),
        name => is(name),
    }
}

fn regex_match(value: Option<&Value>, pattern: &Value, options: Option<&Value>) -> Result<bool> {
    let Some(pattern) = pattern.as_str() else {
        return Err(StoreError::Unsupported(
            "$regex expects a string pattern".to_string(),
        ));
    };
    let flags = options.and_then(Value::as_str).unwrap_or("");
    let re = RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()
        .map_err(|e| StoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

    let hit = |v: &Value| v.as_str().is_some_and(|s| re.is_match(s));
    Ok(match value {
        Some(Value::List(items)) => items.iter().any(|v| hit(v)),
        Some(v) => hit(v),
        None => false,
    })
}

fn contains_all(value: Option<&Value>, operand: &Value) -> bool {
    let wanted = operand.as_list().unwrap_or(&[]);
    !wanted.is_empty() && wanted.iter().all(|w| equals(value, w))
}

fn elem_match(value: Option<&Value>, operand: &Value) -> Result<bool> {
    let (Some(Value::List(items)), Value::Map(cond)) = (value, operand) else {
        return Ok(false);
    };
    for item in items {
        let hit = if is_operator_object(cond) {
            eval_operators(Some(item), cond)?
        } else {
            match item {
                Value::Map(doc) => matches_map(doc, cond)?,
                _ => false,
            }
        };
        if hit {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `[divisor, remainder]`
fn modulo(value: Option<&Value>, operand: &Value) -> bool {
    let (Some(v), Some([divisor, remainder])) = (value.and_then(Value::as_i64), operand.as_list())
    else {
        return false;
    };
    match (divisor.as_i64(), remainder.as_i64()) {
        (Some(d), Some(r)) => v.checked_rem(d) == Some(r),
        _ => false,
    }
}
