//! Pattern compiler: nested patterns to graph-pattern clauses.
//!
//! Each pattern node becomes one basic graph pattern. Nested nodes are
//! compiled depth-first and appended to the context before the edges of
//! the node that references them, so a node's clauses always follow those
//! of its children. A node's filters follow its own edges.
//!
//! # Pattern keys
//!
//! - `@id`: pins the subject to an identifier (or a named variable).
//! - `$optional`: the value (or each element of a list value) is an
//!   optional continuation of the current node.
//! - `$inv_<name>`: an edge pointing *into* the current node.
//! - `?` / `?name`: the predicate is a variable.
//! - anything else: a predicate token.
//!
//! Values are literals, wildcards, nested patterns, filter expressions
//! (single-key operator nodes) or lists of those, which fan out to one
//! edge per element.

use crate::codec::{ValueCodec, encode_term};
use crate::constants::ID_KEY;
use crate::error::{Error, Result};
use crate::types::{Node, Reference, Triple, Value};

use super::context::QueryContext;
use super::filter::{FilterCompiler, FilterExpr};
use super::types::{Clause, CompiledFilter, PatternKey};

/// Result of compiling one pattern node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledNode {
    pub node_id: usize,
    pub subject: String,
}

/// Compiles patterns into a `QueryContext`.
#[derive(Debug, Clone, Copy)]
pub struct PatternCompiler<'a> {
    codec: &'a ValueCodec,
}

impl<'a> PatternCompiler<'a> {
    #[must_use]
    pub const fn new(codec: &'a ValueCodec) -> Self {
        Self { codec }
    }

    /// Compile a pattern into a fresh context.
    ///
    /// # Errors
    ///
    /// - `InvalidFilterShape` for malformed filters, or a filter operator
    ///   mixed with ordinary keys.
    /// - `UnknownOperator` for unrecognized `$` keys or `@` terms.
    /// - `UnsupportedValueKind` for values with no wire form in their
    ///   position.
    pub fn compile(&self, pattern: &Node) -> Result<QueryContext> {
        let mut ctx = QueryContext::new();
        self.compile_into(pattern, &mut ctx)?;
        Ok(ctx)
    }

    /// Compile a pattern into an existing context, returning the root
    /// node. On error the context must be discarded.
    pub fn compile_into(&self, pattern: &Node, ctx: &mut QueryContext) -> Result<CompiledNode> {
        if FilterExpr::is_expression(pattern) {
            return Err(Error::InvalidFilterShape(
                "a filter expression cannot be a pattern root".to_owned(),
            ));
        }
        self.compile_node(pattern, ctx, false)
    }

    fn compile_node(
        &self,
        pattern: &Node,
        ctx: &mut QueryContext,
        inverse: bool,
    ) -> Result<CompiledNode> {
        let node_id = ctx.next_node_id();
        let id = match pattern.get(ID_KEY) {
            Some(value) => self.subject_token(value, ctx)?,
            None => None,
        };
        let vars = ctx.register_node(id, node_id, inverse);
        let subject = vars.subject.as_str();

        let mut edges = Vec::new();
        let mut filters = Vec::new();

        for (key, value) in pattern {
            match PatternKey::resolve(key)? {
                PatternKey::Id => {}
                PatternKey::Optional => {
                    let branches = match value {
                        Value::List(items) => items.as_slice(),
                        single => std::slice::from_ref(single),
                    };
                    for branch in branches {
                        self.compile_optional(branch, ctx, subject)?;
                    }
                }
                PatternKey::Operator(_) => {
                    return Err(Error::InvalidFilterShape(format!(
                        "operator `{key}` must be the only key of a filter expression"
                    )));
                }
                PatternKey::Inverse(name) => {
                    let predicate = encode_term(&name)?;
                    for object in self.compile_objects(value, ctx, node_id, true, &mut filters)? {
                        edges.push(Triple::new(object, predicate.as_str(), subject));
                    }
                }
                PatternKey::Wildcard(name) => {
                    let predicate = variable(name.as_deref(), ctx)?;
                    for object in self.compile_objects(value, ctx, node_id, false, &mut filters)? {
                        edges.push(Triple::new(subject, predicate.as_str(), object));
                    }
                }
                PatternKey::Property(predicate) => {
                    for object in self.compile_objects(value, ctx, node_id, false, &mut filters)? {
                        edges.push(Triple::new(subject, predicate.as_str(), object));
                    }
                }
            }
        }

        if edges.is_empty() {
            edges.push(Triple::new(subject, vars.predicate.as_str(), vars.object.as_str()));
        }

        ctx.append(
            edges
                .into_iter()
                .map(Clause::Triple)
                .chain(filters.into_iter().map(Clause::Filter)),
        );
        Ok(CompiledNode {
            node_id,
            subject: vars.subject,
        })
    }

    /// Compile an optional branch as a continuation of `parent_subject`.
    fn compile_optional(
        &self,
        branch: &Value,
        ctx: &mut QueryContext,
        parent_subject: &str,
    ) -> Result<()> {
        let Value::Node(sub_pattern) = branch else {
            return Err(Error::UnsupportedValueKind(format!(
                "$optional expects a pattern, got a {}",
                branch.kind_name()
            )));
        };
        if FilterExpr::is_expression(sub_pattern) {
            return Err(Error::InvalidFilterShape(
                "$optional expects a pattern, got a filter expression".to_owned(),
            ));
        }
        ctx.enter_optional();
        let nested = self.compile_node(sub_pattern, ctx, false)?;
        ctx.demote_to_optional(nested.node_id, parent_subject);
        ctx.exit_optional();
        Ok(())
    }

    /// Compile an edge value into one object token per list element.
    fn compile_objects(
        &self,
        value: &Value,
        ctx: &mut QueryContext,
        node_id: usize,
        inverse: bool,
        filters: &mut Vec<CompiledFilter>,
    ) -> Result<Vec<String>> {
        match value {
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::List(_) => Err(Error::UnsupportedValueKind(
                        "nested lists are not valid in patterns".to_owned(),
                    )),
                    item => self.compile_object(item, ctx, node_id, inverse, filters),
                })
                .collect(),
            single => Ok(vec![
                self.compile_object(single, ctx, node_id, inverse, filters)?,
            ]),
        }
    }

    fn compile_object(
        &self,
        value: &Value,
        ctx: &mut QueryContext,
        node_id: usize,
        inverse: bool,
        filters: &mut Vec<CompiledFilter>,
    ) -> Result<String> {
        match value {
            Value::Node(nested) if FilterExpr::is_expression(nested) => {
                let filter = FilterCompiler::new(self.codec).compile(nested, ctx, node_id)?;
                let variable = filter.variable.clone();
                filters.push(filter);
                Ok(variable)
            }
            Value::Node(nested) => Ok(self.compile_node(nested, ctx, inverse)?.subject),
            Value::Wildcard(name) => variable(name.as_deref(), ctx),
            scalar => self.codec.encode_literal(scalar),
        }
    }

    /// Resolve an `@id` value to a subject token. `None` means mint a
    /// fresh subject variable.
    fn subject_token(&self, value: &Value, ctx: &mut QueryContext) -> Result<Option<String>> {
        match value {
            Value::Wildcard(None) => Ok(None),
            Value::Wildcard(Some(name)) => variable(Some(name), ctx).map(Some),
            Value::String(raw) => Reference::normalize(raw)
                .map(|reference| Some(format!("<{}>", reference.locator())))
                .ok_or_else(|| {
                    Error::UnsupportedValueKind(format!("`{raw}` is not a valid identifier"))
                }),
            Value::Reference(_) | Value::Iri(_) => self.codec.encode_literal(value).map(Some),
            other => Err(Error::UnsupportedValueKind(format!(
                "a {} cannot be used as an identifier",
                other.kind_name()
            ))),
        }
    }
}

/// Variable token for a wildcard: `?X_<n>` when anonymous, `?name` when
/// named.
fn variable(name: Option<&str>, ctx: &mut QueryContext) -> Result<String> {
    match name {
        None => Ok(ctx.anonymous_variable()),
        Some(name) if Reference::new(name).is_some() => Ok(ctx.named_variable(name)),
        Some(name) => Err(Error::UnsupportedValueKind(format!(
            "`?{name}` is not a valid variable name"
        ))),
    }
}

/// Compile a pattern with the default codec.
pub fn compile_pattern(pattern: &Node) -> Result<QueryContext> {
    let codec = ValueCodec::new();
    PatternCompiler::new(&codec).compile(pattern)
}
