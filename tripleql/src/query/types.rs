//! Types shared by the pattern compiler, the filter compiler and the
//! renderer.
//!
//! - `PatternKey` - a pattern key, classified once before compiling it
//! - `FilterOp` - the recognized filter operators
//! - `Clause` - one entry of a compiled group: a triple or a filter
//! - `CompiledFilter` - filter text bound to its comparison variable

use std::fmt;

use crate::codec::encode_term;
use crate::constants::{ID_KEY, INVERSE_PREFIX, OPTIONAL_KEY, WILDCARD_PREFIX};
use crate::error::{Error, Result};
use crate::types::Triple;

/// A filter operator key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Not,
    Like,
    In,
    And,
    Or,
}

impl FilterOp {
    /// Look up an operator by its key. `$lteq` and `$gteq` are accepted
    /// as aliases.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let op = match key {
            "$eq" => Self::Eq,
            "$neq" => Self::Neq,
            "$lt" => Self::Lt,
            "$lte" | "$lteq" => Self::Lte,
            "$gt" => Self::Gt,
            "$gte" | "$gteq" => Self::Gte,
            "$not" => Self::Not,
            "$like" => Self::Like,
            "$in" => Self::In,
            "$and" => Self::And,
            "$or" => Self::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Infix symbol for comparison operators.
    #[must_use]
    pub const fn symbol(self) -> Option<&'static str> {
        match self {
            Self::Eq => Some("="),
            Self::Neq => Some("!="),
            Self::Lt => Some("<"),
            Self::Lte => Some("<="),
            Self::Gt => Some(">"),
            Self::Gte => Some(">="),
            Self::Not | Self::Like | Self::In | Self::And | Self::Or => None,
        }
    }
}

/// A pattern key, classified once before its value is compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternKey {
    /// `@id`: the node's identifier.
    Id,
    /// `$optional`: the value is an optional sub-pattern (or a list of them).
    Optional,
    /// `$inv_<name>`: an edge traversed in reverse.
    Inverse(String),
    /// A filter operator appearing as a pattern key.
    Operator(FilterOp),
    /// `?` or `?name`: the predicate itself is a variable.
    Wildcard(Option<String>),
    /// Any other key, already encoded as a predicate token.
    Property(String),
}

impl PatternKey {
    /// Classify a key.
    ///
    /// # Errors
    ///
    /// Returns `UnknownOperator` for a `$`-prefixed key outside the
    /// recognized set, or for an `@` term without a wire mapping.
    pub fn resolve(key: &str) -> Result<Self> {
        if key == ID_KEY {
            return Ok(Self::Id);
        }
        if key == OPTIONAL_KEY {
            return Ok(Self::Optional);
        }
        if let Some(name) = key.strip_prefix(INVERSE_PREFIX) {
            if name.is_empty() {
                return Err(Error::UnknownOperator(key.to_owned()));
            }
            return Ok(Self::Inverse(name.to_owned()));
        }
        if key.starts_with('$') {
            return FilterOp::from_key(key)
                .map(Self::Operator)
                .ok_or_else(|| Error::UnknownOperator(key.to_owned()));
        }
        if let Some(name) = key.strip_prefix(WILDCARD_PREFIX) {
            return Ok(Self::Wildcard((!name.is_empty()).then(|| name.to_owned())));
        }
        encode_term(key).map(Self::Property)
    }
}

/// A filter compiled to text and bound to the variable it constrains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFilter {
    /// The comparison variable, used as the object of the filtered edge.
    pub variable: String,
    /// Full `FILTER(...)` text.
    pub text: String,
}

/// One entry of a compiled group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Triple(Triple),
    Filter(CompiledFilter),
}

impl Clause {
    /// Replace every triple position equal to `from` with `to`.
    ///
    /// Filter text is left untouched: it only mentions filter variables.
    pub fn substitute(&mut self, from: &str, to: &str) {
        if let Self::Triple(triple) = self {
            triple.substitute(from, to);
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Triple(triple) => write!(f, "{triple}"),
            Self::Filter(filter) => f.write_str(&filter.text),
        }
    }
}

impl From<Triple> for Clause {
    fn from(triple: Triple) -> Self {
        Self::Triple(triple)
    }
}

/// The variable triad minted when a node is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeVariables {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}
