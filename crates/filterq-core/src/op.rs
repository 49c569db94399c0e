//! The fixed operator vocabulary.
//!
//! Operators are a closed enum: each backend table matches on `Op`
//! exhaustively, so adding a variant forces both tables to be updated.

use serde::{Deserialize, Serialize};

/// Field-level operators, by their filter-DSL name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Eq,
    Ne,
    Neq,
    In,
    Nin,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    IsNull,
    IsNotNull,
    Exists,
    Type,
    Regex,
    Options,
    Mod,
    Text,
    All,
    Size,
    ElemMatch,
}

impl Op {
    pub const ALL: [Op; 22] = [
        Op::Eq,
        Op::Ne,
        Op::Neq,
        Op::In,
        Op::Nin,
        Op::Gt,
        Op::Gte,
        Op::Lt,
        Op::Lte,
        Op::Like,
        Op::ILike,
        Op::IsNull,
        Op::IsNotNull,
        Op::Exists,
        Op::Type,
        Op::Regex,
        Op::Options,
        Op::Mod,
        Op::Text,
        Op::All,
        Op::Size,
        Op::ElemMatch,
    ];

    /// Look up an operator by its DSL name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Op> {
        Op::ALL.iter().copied().find(|op| op.name() == name)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Neq => "neq",
            Op::In => "in",
            Op::Nin => "nin",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Like => "like",
            Op::ILike => "ilike",
            Op::IsNull => "isNull",
            Op::IsNotNull => "isNotNull",
            Op::Exists => "exists",
            Op::Type => "type",
            Op::Regex => "regex",
            Op::Options => "options",
            Op::Mod => "mod",
            Op::Text => "text",
            Op::All => "all",
            Op::Size => "size",
            Op::ElemMatch => "elemMatch",
        }
    }

    /// Operators that test an element's value rather than its shape.
    pub const fn is_value_comparison(self) -> bool {
        matches!(
            self,
            Op::Eq
                | Op::Ne
                | Op::Neq
                | Op::In
                | Op::Nin
                | Op::Gt
                | Op::Gte
                | Op::Lt
                | Op::Lte
                | Op::Like
                | Op::ILike
                | Op::Regex
                | Op::Mod
        )
    }

    /// Array operators always carry a sequence in a canonical tree.
    pub const fn is_array_operator(self) -> bool {
        matches!(self, Op::In | Op::Nin)
    }
}

/// Logical grouping keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Logical {
    And,
    Or,
    /// Document-store only.
    Nor,
}

impl Logical {
    pub const ALL: [Logical; 3] = [Logical::And, Logical::Or, Logical::Nor];

    /// Recognize a logical key in DSL form (`or`) or backend-prefixed form (`$or`).
    pub fn from_key(key: &str) -> Option<Logical> {
        match key.strip_prefix('$').unwrap_or(key) {
            "and" => Some(Logical::And),
            "or" => Some(Logical::Or),
            "nor" => Some(Logical::Nor),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Logical::And => "and",
            Logical::Or => "or",
            Logical::Nor => "nor",
        }
    }

    /// `and`/`or` always carry a sequence of trees in a canonical tree.
    pub const fn is_sequence_group(self) -> bool {
        matches!(self, Logical::And | Logical::Or)
    }
}

/// DSL keys whose value the normalizer forces into a sequence.
pub fn requires_sequence(key: &str) -> bool {
    match Op::parse(key) {
        Some(op) => op.is_array_operator(),
        None => Logical::ALL
            .iter()
            .any(|logical| logical.name() == key && logical.is_sequence_group()),
    }
}
