//! Canonical tree (or flat field map) → `WhereBuilder` predicates.
//!
//! Top-level keys are AND-combined in map iteration order. `or`/`and`
//! become one parenthesized group whose members are themselves groups:
//!
//! ```text
//! { or: [ {a: 1, b: 2}, {c: 3} ] }   →   ((a = 1 and b = 2) or (c = 3))
//! ```
//!
//! An `or` with no members matches nothing (`1 = 0`); an `or` with an empty
//! member matches everything and adds no predicate.
//!
//! Operators without a relational meaning are skipped, never rejected.

use std::fmt;

use filterq_core::config::PaginationConfig;
use filterq_core::op::{Logical, Op};
use filterq_core::value::{Map, Value};
use filterq_operators::{apply_operator, Applied, Connective, WhereBuilder};

use crate::case::{self, CaseFn};

/// Table/column resolution for one compilation.
#[derive(Clone)]
pub struct RelationalContext {
    /// Overrides the builder's own table name when set.
    pub table_name: Option<String>,
    /// Applied once to every field name before qualification.
    pub case: CaseFn,
}

impl Default for RelationalContext {
    fn default() -> Self {
        Self {
            table_name: None,
            case: case::identity,
        }
    }
}

impl fmt::Debug for RelationalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationalContext")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}

impl RelationalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &PaginationConfig) -> Self {
        Self::default().with_case_convert(cfg.case_convert)
    }

    pub fn with_table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// camelCase → snake_case when `enabled`, identity otherwise.
    pub fn with_case_convert(mut self, enabled: bool) -> Self {
        self.case = if enabled {
            case::to_snake_case
        } else {
            case::identity
        };
        self
    }

    pub fn with_case(mut self, case: CaseFn) -> Self {
        self.case = case;
        self
    }

    /// Column name as stored (case-translated, unqualified).
    pub fn column_name(&self, field: &str) -> String {
        (self.case)(field)
    }

    /// `<table>.<column>` when a table is known; names that already
    /// contain a `.` are taken as qualified.
    pub fn qualified_key(&self, field: &str, builder_table: Option<&str>) -> String {
        let column = self.column_name(field);
        let table = self.table_name.as_deref().or(builder_table);
        match table {
            Some(t) if !column.contains('.') => format!("{t}.{column}"),
            _ => column,
        }
    }
}

/// Fold `filter` over `builder`. Non-map filters add nothing.
pub fn apply_relational_filter<'b, B: WhereBuilder>(
    builder: &'b mut B,
    filter: &Value,
    ctx: &RelationalContext,
) -> &'b mut B {
    if let Value::Map(map) = filter {
        let table = ctx
            .table_name
            .clone()
            .or_else(|| builder.table_name().map(str::to_owned));
        apply_map(builder, map, ctx, table.as_deref());
    }
    builder
}

fn apply_map<B: WhereBuilder>(
    builder: &mut B,
    map: &Map,
    ctx: &RelationalContext,
    table: Option<&str>,
) {
    for (key, value) in map {
        match Logical::from_key(key) {
            Some(Logical::Or) => apply_group(builder, value, Connective::Or, ctx, table),
            Some(Logical::And) => apply_group(builder, value, Connective::And, ctx, table),
            Some(Logical::Nor) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(key = %key, "skipping document-only logical operator");
            }
            None => apply_field(builder, &ctx.qualified_key(key, table), value),
        }
    }
}

fn apply_group<B: WhereBuilder>(
    builder: &mut B,
    value: &Value,
    members: Connective,
    ctx: &RelationalContext,
    table: Option<&str>,
) {
    let trees = group_members(value);
    if members == Connective::Or {
        if trees.is_empty() {
            builder.where_false();
            return;
        }
        if trees.iter().any(|tree| always_true(tree)) {
            #[cfg(feature = "tracing")]
            tracing::trace!("or group has an unconstrained member; dropped");
            return;
        }
    }
    if trees.is_empty() {
        return;
    }

    builder.where_group(Connective::And, |group| {
        for (i, tree) in trees.iter().enumerate() {
            let connective = if i == 0 { Connective::And } else { members };
            group.where_group(connective, |inner| apply_map(inner, tree, ctx, table));
        }
    });
}

fn group_members(value: &Value) -> Vec<&Map> {
    match value {
        Value::List(items) => items.iter().filter_map(Value::as_map).collect(),
        Value::Map(m) => vec![m],
        _ => Vec::new(),
    }
}

/// A tree that adds no relational predicate and so matches every row:
/// empty, or built only from groups that are themselves unconstrained.
fn always_true(tree: &Map) -> bool {
    tree.iter().all(|(key, value)| match Logical::from_key(key) {
        Some(Logical::Or) => group_members(value).into_iter().any(always_true),
        Some(Logical::And) => group_members(value).into_iter().all(always_true),
        Some(Logical::Nor) => true,
        None => false,
    })
}

fn apply_field<B: WhereBuilder>(builder: &mut B, column: &str, value: &Value) {
    match value {
        Value::Map(ops) => {
            for (name, operand) in ops {
                let Some(op) = Op::parse(name) else {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(column, operator = %name, "skipping unknown operator");
                    continue;
                };
                if apply_operator(builder, column, op, operand.clone()) == Applied::Skipped {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(column, operator = %name, "operator has no relational form");
                }
            }
        }
        Value::List(items) => {
            apply_operator(builder, column, Op::In, Value::List(items.clone()));
        }
        scalar => {
            apply_operator(builder, column, Op::Eq, scalar.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use filterq_io::MemoryTable;
    use serde_json::json;

    fn v(j: serde_json::Value) -> Value {
        Value::from(j)
    }

    fn sql_for(filter: serde_json::Value, ctx: &RelationalContext) -> (String, Vec<Value>) {
        let table = MemoryTable::new("users");
        let mut q = table.query();
        apply_relational_filter(&mut q, &normalize(&v(filter)), ctx);
        q.to_sql()
    }

    #[test]
    fn test_flat_map_qualified_with_builder_table() {
        let (sql, binds) = sql_for(json!({"status": "active", "age": {"gte": 18}}), &RelationalContext::new());
        assert_eq!(
            sql,
            r#"select * from "users" where "users"."age" >= ? and "users"."status" = ?"#
        );
        assert_eq!(binds, vec![Value::Int(18), Value::from("active")]);
    }

    #[test]
    fn test_explicit_table_and_case_translation() {
        let ctx = RelationalContext::new()
            .with_table("accounts")
            .with_case_convert(true);
        let (sql, _) = sql_for(json!({"createdAt": {"lt": 5}, "userId": ["1", "2"]}), &ctx);
        assert_eq!(
            sql,
            r#"select * from "users" where "accounts"."created_at" < ? and "accounts"."user_id" in (?, ?)"#
        );
    }

    #[test]
    fn test_or_group() {
        let (sql, binds) = sql_for(
            json!({
                "deleted": false,
                "or": {"0": {"status": "active", "age": {"gt": 30}}, "1": {"role": "admin"}}
            }),
            &RelationalContext::new(),
        );
        assert_eq!(
            sql,
            r#"select * from "users" where "users"."deleted" = ? and (("users"."age" > ? and "users"."status" = ?) or ("users"."role" = ?))"#
        );
        assert_eq!(binds.len(), 4);
    }

    #[test]
    fn test_degenerate_or_groups() {
        let (sql, _) = sql_for(json!({"role": "admin", "or": []}), &RelationalContext::new());
        assert_eq!(
            sql,
            r#"select * from "users" where 1 = 0 and "users"."role" = ?"#
        );

        let (sql, _) = sql_for(
            json!({"role": "admin", "or": [{}, {"age": {"gt": 3}}]}),
            &RelationalContext::new(),
        );
        assert_eq!(sql, r#"select * from "users" where "users"."role" = ?"#);

        let (sql, _) = sql_for(
            json!({"or": [{"and": [{}, {"or": [{}]}]}, {"age": 1}]}),
            &RelationalContext::new(),
        );
        assert_eq!(sql, r#"select * from "users""#);

        let (sql, _) = sql_for(json!({"or": [{"or": []}, {"age": 1}]}), &RelationalContext::new());
        assert_eq!(
            sql,
            r#"select * from "users" where ((1 = 0) or ("users"."age" = ?))"#
        );
    }

    #[test]
    fn test_from_config_follows_case_convert() {
        let cfg = PaginationConfig {
            case_convert: true,
            ..PaginationConfig::default()
        };
        let ctx = RelationalContext::from_config(&cfg);
        assert_eq!(ctx.qualified_key("createdAt", Some("events")), "events.created_at");
        let plain = RelationalContext::from_config(&PaginationConfig::default());
        assert_eq!(plain.qualified_key("createdAt", Some("events")), "events.createdAt");
    }

    #[test]
    fn test_and_group_nests_or() {
        let (sql, _) = sql_for(
            json!({"and": [{"a": 1}, {"or": [{"b": 2}, {"c": 3}]}]}),
            &RelationalContext::new(),
        );
        assert_eq!(
            sql,
            r#"select * from "users" where (("users"."a" = ?) and ((("users"."b" = ?) or ("users"."c" = ?))))"#
        );
    }

    #[test]
    fn test_null_sugar_and_is_null_flags() {
        let (sql, binds) = sql_for(
            json!({"deletedAt": null, "archivedAt": {"isNull": false}, "bio": {"isNotNull": true}}),
            &RelationalContext::new(),
        );
        assert_eq!(
            sql,
            r#"select * from "users" where "users"."archivedAt" is not null and "users"."bio" is not null and "users"."deletedAt" is null"#
        );
        assert!(binds.is_empty());
    }

    #[test]
    fn test_unknown_and_document_only_operators_are_skipped() {
        let (sql, _) = sql_for(
            json!({"age": {"between": [1, 2], "exists": true, "lte": 9}, "nor": [{"x": 1}]}),
            &RelationalContext::new(),
        );
        assert_eq!(sql, r#"select * from "users" where "users"."age" <= ?"#);
    }

    #[test]
    fn test_like_and_nin() {
        let (sql, binds) = sql_for(
            json!({"name": {"ilike": "%ann%"}, "role": {"nin": "guest"}}),
            &RelationalContext::new(),
        );
        assert_eq!(
            sql,
            r#"select * from "users" where "users"."name" ilike ? and "users"."role" not in (?)"#
        );
        assert_eq!(binds, vec![Value::from("%ann%"), Value::from("guest")]);
    }

    #[test]
    fn test_sql_is_deterministic() {
        let filter = json!({"z": 1, "a": {"in": [3, 2]}, "or": [{"m": 1}, {"n": 2}]});
        let first = sql_for(filter.clone(), &RelationalContext::new());
        let second = sql_for(filter, &RelationalContext::new());
        assert_eq!(first, second);
    }

    #[test]
    fn test_qualified_key_keeps_dotted_names() {
        let ctx = RelationalContext::new().with_table("users");
        assert_eq!(ctx.qualified_key("roles.name", None), "roles.name");
        assert_eq!(ctx.qualified_key("name", Some("other")), "users.name");
        assert_eq!(RelationalContext::new().qualified_key("name", None), "name");
    }
}
