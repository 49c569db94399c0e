//! Column-name case converters.
//!
//! Stateless functions handed to `RelationalContext`; nothing here is global.

use convert_case::{Case, Casing};

/// Converter injected into the relational compiler.
pub type CaseFn = fn(&str) -> String;

/// `createdAt` → `created_at`. Dotted names convert per segment.
pub fn to_snake_case(name: &str) -> String {
    name.split('.')
        .map(|segment| segment.to_case(Case::Snake))
        .collect::<Vec<_>>()
        .join(".")
}

pub fn identity(name: &str) -> String {
    name.to_string()
}
