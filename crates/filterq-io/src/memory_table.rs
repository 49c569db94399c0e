//! In-memory relational table and its query builder.
//!
//! `TableQuery` records predicates as a small tree. The same tree is
//! rendered to SQL text (`to_sql`, positional `?` bindings) and evaluated
//! against the table's rows with SQL semantics: `and` binds tighter than
//! `or`, and comparisons against `null` are unknown.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};

use filterq_core::page::Row;
use filterq_core::sort::Direction;
use filterq_core::value::Value;
use filterq_operators::{Comparison, Connective, WhereBuilder};

use crate::error::{Result, StoreError};
use crate::store::RelationalQuery;

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Cmp {
        column: String,
        cmp: Comparison,
        value: Value,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
    NotIn {
        column: String,
        values: Vec<Value>,
    },
    Null(String),
    NotNull(String),
    False,
    Group(Vec<(Connective, Predicate)>),
}

/// Named table of rows. Clones share rows and the armed failure.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    name: String,
    rows: Arc<RwLock<Vec<Row>>>,
    failure: Arc<RwLock<Option<StoreError>>>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Arc::new(RwLock::new(Vec::new())),
            failure: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_rows(self, rows: impl IntoIterator<Item = Row>) -> Self {
        for row in rows {
            self.insert(row);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&self, row: Row) {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A fresh `select *` over this table.
    pub fn query(&self) -> TableQuery {
        TableQuery {
            table: self.clone(),
            predicates: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Make every subsequent fetch/count fail with `StoreError::Backend(msg)`.
    pub fn fail_with(&self, msg: impl Into<String>) {
        let mut failure = self.failure.write().unwrap_or_else(PoisonError::into_inner);
        *failure = Some(StoreError::Backend(msg.into()));
    }

    pub fn clear_failure(&self) {
        let mut failure = self.failure.write().unwrap_or_else(PoisonError::into_inner);
        *failure = None;
    }

    fn matching(&self, predicates: &[(Connective, Predicate)]) -> Result<Vec<Row>> {
        if let Some(err) = self
            .failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Err(err.clone());
        }

        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        let mut out = Vec::new();
        for row in rows.iter() {
            if eval_list(predicates, row)? == Some(true) {
                out.push(row.clone());
            }
        }
        Ok(out)
    }
}

/// Query builder over a `MemoryTable`.
#[derive(Debug, Clone)]
pub struct TableQuery {
    table: MemoryTable,
    predicates: Vec<(Connective, Predicate)>,
    order: Vec<(String, Direction)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl TableQuery {
    /// SQL text of the windowed select and its bindings, in placeholder order.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut binds = Vec::new();
        let mut sql = format!("select * from {}", quote_ident(&self.table.name));
        self.push_where(&mut sql, &mut binds);

        if !self.order.is_empty() {
            let keys: Vec<String> = self
                .order
                .iter()
                .map(|(column, direction)| format!("{} {}", quote_ident(column), direction.keyword()))
                .collect();
            sql.push_str(" order by ");
            sql.push_str(&keys.join(", "));
        }
        if let Some(n) = self.limit {
            sql.push_str(" limit ?");
            binds.push(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)));
        }
        if let Some(n) = self.offset {
            sql.push_str(" offset ?");
            binds.push(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)));
        }
        (sql, binds)
    }

    /// SQL text of the unwindowed count.
    pub fn to_count_sql(&self) -> (String, Vec<Value>) {
        let mut binds = Vec::new();
        let mut sql = format!("select count(*) from {}", quote_ident(&self.table.name));
        self.push_where(&mut sql, &mut binds);
        (sql, binds)
    }

    fn push_where(&self, sql: &mut String, binds: &mut Vec<Value>) {
        if !self.predicates.is_empty() {
            sql.push_str(" where ");
            render_list(&self.predicates, sql, binds);
        }
    }

    fn compare_rows(&self, a: &Row, b: &Row) -> Ordering {
        for (column, direction) in &self.order {
            let left = resolve(a, column).unwrap_or(&Value::Null);
            let right = resolve(b, column).unwrap_or(&Value::Null);
            let ord = match direction {
                Direction::Asc => left.compare(right),
                Direction::Desc => right.compare(left),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl WhereBuilder for TableQuery {
    fn table_name(&self) -> Option<&str> {
        Some(&self.table.name)
    }

    fn where_cmp(&mut self, column: &str, cmp: Comparison, value: Value) -> &mut Self {
        self.predicates.push((
            Connective::And,
            Predicate::Cmp {
                column: column.to_string(),
                cmp,
                value,
            },
        ));
        self
    }

    fn where_in(&mut self, column: &str, values: Vec<Value>) -> &mut Self {
        self.predicates.push((
            Connective::And,
            Predicate::In {
                column: column.to_string(),
                values,
            },
        ));
        self
    }

    fn where_not_in(&mut self, column: &str, values: Vec<Value>) -> &mut Self {
        self.predicates.push((
            Connective::And,
            Predicate::NotIn {
                column: column.to_string(),
                values,
            },
        ));
        self
    }

    fn where_null(&mut self, column: &str) -> &mut Self {
        self.predicates
            .push((Connective::And, Predicate::Null(column.to_string())));
        self
    }

    fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.predicates
            .push((Connective::And, Predicate::NotNull(column.to_string())));
        self
    }

    fn where_false(&mut self) -> &mut Self {
        self.predicates.push((Connective::And, Predicate::False));
        self
    }

    fn where_group<F>(&mut self, connective: Connective, build: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        let mut scratch = self.table.query();
        build(&mut scratch);
        if !scratch.predicates.is_empty() {
            self.predicates
                .push((connective, Predicate::Group(scratch.predicates)));
        }
        self
    }
}

#[async_trait]
impl RelationalQuery for TableQuery {
    type Error = StoreError;

    fn order_by(&mut self, column: &str, direction: Direction) -> &mut Self {
        self.order.push((column.to_string(), direction));
        self
    }

    fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    fn offset(&mut self, n: u64) -> &mut Self {
        self.offset = Some(n);
        self
    }

    async fn fetch(&self) -> Result<Vec<Row>> {
        let mut rows = self.table.matching(&self.predicates)?;
        rows.sort_by(|a, b| self.compare_rows(a, b));

        let skip = self
            .offset
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .unwrap_or(0);
        let take = self
            .limit
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(skip).take(take).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.table.matching(&self.predicates)?.len() as u64)
    }
}

// --- rendering ---

/// `users.created_at` → `"users"."created_at"`
fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|segment| format!("\"{}\"", segment.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

fn render_list(predicates: &[(Connective, Predicate)], sql: &mut String, binds: &mut Vec<Value>) {
    for (i, (connective, predicate)) in predicates.iter().enumerate() {
        if i > 0 {
            sql.push(' ');
            sql.push_str(connective.keyword());
            sql.push(' ');
        }
        render(predicate, sql, binds);
    }
}

fn render(predicate: &Predicate, sql: &mut String, binds: &mut Vec<Value>) {
    match predicate {
        Predicate::Cmp { column, cmp, value } => {
            sql.push_str(&format!("{} {} ?", quote_ident(column), cmp.symbol()));
            binds.push(value.clone());
        }
        Predicate::In { values, .. } if values.is_empty() => sql.push_str("1 = 0"),
        Predicate::NotIn { values, .. } if values.is_empty() => sql.push_str("1 = 1"),
        Predicate::In { column, values } | Predicate::NotIn { column, values } => {
            let keyword = if matches!(predicate, Predicate::In { .. }) {
                "in"
            } else {
                "not in"
            };
            let marks = vec!["?"; values.len()].join(", ");
            sql.push_str(&format!("{} {keyword} ({marks})", quote_ident(column)));
            binds.extend(values.iter().cloned());
        }
        Predicate::Null(column) => sql.push_str(&format!("{} is null", quote_ident(column))),
        Predicate::NotNull(column) => {
            sql.push_str(&format!("{} is not null", quote_ident(column)))
        }
        Predicate::False => sql.push_str("1 = 0"),
        Predicate::Group(inner) => {
            sql.push('(');
            render_list(inner, sql, binds);
            sql.push(')');
        }
    }
}

// --- evaluation (three-valued: None is SQL unknown) ---

/// Qualified names fall back to the bare column.
fn resolve<'a>(row: &'a Row, column: &str) -> Option<&'a Value> {
    row.get(column).or_else(|| {
        column
            .split_once('.')
            .and_then(|(_, bare)| row.get(bare))
    })
}

fn eval_list(predicates: &[(Connective, Predicate)], row: &Row) -> Result<Option<bool>> {
    // OR of AND-runs
    let mut any = Some(false);
    let mut run = Some(true);
    for (i, (connective, predicate)) in predicates.iter().enumerate() {
        if i > 0 && *connective == Connective::Or {
            any = or3(any, run);
            run = Some(true);
        }
        run = and3(run, eval(predicate, row)?);
    }
    Ok(or3(any, run))
}

fn eval(predicate: &Predicate, row: &Row) -> Result<Option<bool>> {
    Ok(match predicate {
        Predicate::Cmp { column, cmp, value } => compare_cell(resolve(row, column), *cmp, value)?,
        Predicate::In { column, values } => membership(resolve(row, column), values),
        Predicate::NotIn { column, values } => {
            membership(resolve(row, column), values).map(|hit| !hit)
        }
        Predicate::Null(column) => Some(is_null(resolve(row, column))),
        Predicate::NotNull(column) => Some(!is_null(resolve(row, column))),
        Predicate::False => Some(false),
        Predicate::Group(inner) => eval_list(inner, row)?,
    })
}

fn and3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn or3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

fn is_null(cell: Option<&Value>) -> bool {
    matches!(cell, None | Some(Value::Null))
}

fn compare_cell(cell: Option<&Value>, cmp: Comparison, operand: &Value) -> Result<Option<bool>> {
    let cell = match cell {
        Some(v) if !v.is_null() && !operand.is_null() => v,
        _ => return Ok(None),
    };

    if matches!(cmp, Comparison::Like | Comparison::ILike) {
        let (Some(text), Some(pattern)) = (cell.as_str(), operand.as_str()) else {
            return Ok(None);
        };
        let re = like_regex(pattern, cmp == Comparison::ILike)?;
        return Ok(Some(re.is_match(text)));
    }

    if !cell.same_kind(operand) {
        return Ok(None);
    }
    let ord = cell.compare(operand);
    Ok(Some(match cmp {
        Comparison::Eq => ord == Ordering::Equal,
        Comparison::Ne => ord != Ordering::Equal,
        Comparison::Gt => ord == Ordering::Greater,
        Comparison::Gte => ord != Ordering::Less,
        Comparison::Lt => ord == Ordering::Less,
        Comparison::Lte => ord != Ordering::Greater,
        Comparison::Like | Comparison::ILike => false,
    }))
}

fn membership(cell: Option<&Value>, values: &[Value]) -> Option<bool> {
    if values.is_empty() {
        return Some(false);
    }
    let cell = cell.filter(|v| !v.is_null())?;
    if values.iter().any(|v| cell.loose_eq(v)) {
        Some(true)
    } else if values.iter().any(Value::is_null) {
        None
    } else {
        Some(false)
    }
}

/// `%` any run, `_` one character, `\` escapes the next character.
fn like_regex(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    let mut re = String::from("^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    re.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');

    RegexBuilder::new(&re)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| StoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
