//! Filter compiler.
//!
//! A filter expression is a single-key node whose key is an operator:
//!
//! ```text
//! {"$neq": 3}                         -> FILTER((?F_0_0 != 3))
//! {"$not": {"$eq": 2}}                -> FILTER(!((?F_0_0 = 2)))
//! {"$or": [{"$lt": 1}, {"$gt": 9}]}   -> FILTER(((?F_0_0 < 1)||(?F_0_0 > 9)))
//! {"$like": "^jo"}                    -> FILTER((regex(?F_0_0,"^jo","i")))
//! ```
//!
//! Expressions are parsed into a `FilterExpr` tree first, so malformed
//! payloads are rejected before a variable is minted.

use crate::codec::{ValueCodec, escape_literal};
use crate::error::{Error, Result};
use crate::types::{Node, Value};

use super::context::QueryContext;
use super::types::{CompiledFilter, FilterOp, PatternKey};

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Nested(Box<FilterExpr>),
}

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// One of `= != < <= > >=`.
    Compare(FilterOp, Operand),
    Not(Box<FilterExpr>),
    /// Case-insensitive regular expression match.
    Like(String),
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Check whether a node is a filter expression rather than a pattern.
    #[must_use]
    pub fn is_expression(node: &Node) -> bool {
        node.len() == 1
            && node
                .keys()
                .next()
                .is_some_and(|key| FilterOp::from_key(key).is_some())
    }

    /// Parse a single-key filter node.
    ///
    /// # Errors
    ///
    /// - `InvalidFilterShape` if the node is not a single-key operator
    ///   mapping or an operator payload has the wrong shape.
    /// - `UnknownOperator` for an unrecognized `$` key.
    pub fn parse(node: &Node) -> Result<Self> {
        let mut entries = node.iter();
        let (Some((key, payload)), None) = (entries.next(), entries.next()) else {
            return Err(Error::InvalidFilterShape(format!(
                "a filter must have exactly one operator key, found {}",
                node.len()
            )));
        };
        let op = match PatternKey::resolve(key)? {
            PatternKey::Operator(op) => op,
            _ => {
                return Err(Error::InvalidFilterShape(format!(
                    "`{key}` is not a filter operator"
                )));
            }
        };
        Self::parse_operator(op, payload)
    }

    fn parse_operator(op: FilterOp, payload: &Value) -> Result<Self> {
        match op {
            FilterOp::Eq | FilterOp::Neq | FilterOp::Lt | FilterOp::Lte | FilterOp::Gt
            | FilterOp::Gte => Ok(Self::Compare(op, Operand::parse(payload)?)),
            FilterOp::Not => match payload {
                Value::Node(inner) => Ok(Self::Not(Box::new(Self::parse(inner)?))),
                Value::List(_) => Err(Error::InvalidFilterShape(
                    "$not expects a filter or a single value".to_owned(),
                )),
                value => Ok(Self::Not(Box::new(Self::Compare(
                    FilterOp::Eq,
                    Operand::Literal(value.clone()),
                )))),
            },
            FilterOp::Like => match payload {
                Value::String(pattern) => {
                    regex::Regex::new(pattern).map_err(|e| {
                        Error::InvalidFilterShape(format!("$like pattern `{pattern}`: {e}"))
                    })?;
                    Ok(Self::Like(pattern.clone()))
                }
                other => Err(Error::InvalidFilterShape(format!(
                    "$like expects a text pattern, got a {}",
                    other.kind_name()
                ))),
            },
            FilterOp::In => {
                let candidates = non_empty_list("$in", payload)?;
                let alternatives = candidates
                    .iter()
                    .map(|candidate| Ok(Self::Compare(FilterOp::Eq, Operand::parse(candidate)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Or(alternatives))
            }
            FilterOp::And | FilterOp::Or => {
                let name = if op == FilterOp::And { "$and" } else { "$or" };
                let terms = non_empty_list(name, payload)?
                    .iter()
                    .map(|term| match term {
                        Value::Node(inner) => Self::parse(inner),
                        other => Err(Error::InvalidFilterShape(format!(
                            "{name} expects filters, got a {}",
                            other.kind_name()
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(if op == FilterOp::And {
                    Self::And(terms)
                } else {
                    Self::Or(terms)
                })
            }
        }
    }

    /// Render the expression against a comparison variable.
    pub fn render(&self, variable: &str, codec: &ValueCodec) -> Result<String> {
        match self {
            Self::Compare(op, operand) => {
                let symbol = op.symbol().ok_or_else(|| {
                    Error::InvalidFilterShape(format!("{op:?} is not a comparison"))
                })?;
                let rhs = match operand {
                    Operand::Literal(value) => codec.encode_literal(value)?,
                    Operand::Nested(inner) => inner.render(variable, codec)?,
                };
                Ok(format!("({variable} {symbol} {rhs})"))
            }
            Self::Not(inner) => Ok(format!("!({})", inner.render(variable, codec)?)),
            Self::Like(pattern) => Ok(format!(
                "(regex({variable},\"{}\",\"i\"))",
                escape_literal(pattern)
            )),
            Self::And(terms) => render_fold(terms, "&&", variable, codec),
            Self::Or(terms) => render_fold(terms, "||", variable, codec),
        }
    }
}

impl Operand {
    fn parse(payload: &Value) -> Result<Self> {
        match payload {
            Value::Node(inner) => Ok(Self::Nested(Box::new(FilterExpr::parse(inner)?))),
            Value::List(_) | Value::Wildcard(_) => Err(Error::InvalidFilterShape(format!(
                "a comparison cannot take a {}",
                payload.kind_name()
            ))),
            value => Ok(Self::Literal(value.clone())),
        }
    }
}

fn non_empty_list<'v>(name: &str, payload: &'v Value) -> Result<&'v [Value]> {
    match payload {
        Value::List(items) if !items.is_empty() => Ok(items),
        Value::List(_) => Err(Error::InvalidFilterShape(format!(
            "{name} needs at least one entry"
        ))),
        other => Err(Error::InvalidFilterShape(format!(
            "{name} expects a list, got a {}",
            other.kind_name()
        ))),
    }
}

fn render_fold(
    terms: &[FilterExpr],
    connective: &str,
    variable: &str,
    codec: &ValueCodec,
) -> Result<String> {
    let rendered = terms
        .iter()
        .map(|term| term.render(variable, codec))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("({})", rendered.join(connective)))
}

/// Compiles filter expressions, each bound to a freshly minted variable.
#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler<'a> {
    codec: &'a ValueCodec,
}

impl<'a> FilterCompiler<'a> {
    #[must_use]
    pub const fn new(codec: &'a ValueCodec) -> Self {
        Self { codec }
    }

    /// Compile `expression` for a filter attached to node `node_id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFilterShape` or `UnknownOperator` for malformed
    /// expressions, and `UnsupportedValueKind` for operands without a
    /// literal form. The context is not touched on a parse error.
    pub fn compile(
        &self,
        expression: &Node,
        ctx: &mut QueryContext,
        node_id: usize,
    ) -> Result<CompiledFilter> {
        let parsed = FilterExpr::parse(expression)?;
        let variable = ctx.fresh_filter_variable(node_id);
        let body = parsed.render(&variable, self.codec)?;
        Ok(CompiledFilter {
            text: format!("FILTER({body})"),
            variable,
        })
    }
}
