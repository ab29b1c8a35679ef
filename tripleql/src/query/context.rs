//! Mutable compilation state for one query.
//!
//! The `QueryContext` accumulates everything a compile pass produces: the
//! required clause sequence, sealed optional blocks, the projection set
//! and any union siblings. One context belongs to exactly one compile
//! call; a context left half-filled by an error must be dropped.

use std::collections::HashMap;

use indexmap::IndexSet;

use super::types::{Clause, NodeVariables};

/// Compilation state for a single query.
///
/// # Invariants
///
/// - Node ids are handed out in strictly increasing order.
/// - Clauses keep their append order within the required sequence and
///   within each optional block.
/// - Every projected subject variable was registered through
///   `register_node` and has not been demoted since.
#[derive(Debug, Default)]
pub struct QueryContext {
    node_counter: usize,
    filter_counters: HashMap<usize, usize>,
    required: Vec<Clause>,
    optional_depth: usize,
    optional_buffer: Vec<Clause>,
    optional_blocks: Vec<Vec<Clause>>,
    projection: IndexSet<String>,
    nodes: HashMap<usize, String>,
    tuple_variables: IndexSet<String>,
    unions: Vec<Self>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl QueryContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next node id.
    pub fn next_node_id(&mut self) -> usize {
        let id = self.node_counter;
        self.node_counter += 1;
        id
    }

    /// Register a compiled node and mint its variable triad.
    ///
    /// A given identifier becomes the subject directly. Otherwise a fresh
    /// `?S_<node_id>` is minted. Either way the subject is projected,
    /// unless the node sits on the far side of an inverse edge.
    pub fn register_node(
        &mut self,
        id: Option<String>,
        node_id: usize,
        inverse: bool,
    ) -> NodeVariables {
        let subject = id.unwrap_or_else(|| format!("?S_{node_id}"));
        if !inverse {
            self.projection.insert(subject.clone());
        }
        self.nodes.insert(node_id, subject.clone());
        NodeVariables {
            subject,
            predicate: format!("?P_{node_id}"),
            object: format!("?O_{node_id}"),
        }
    }

    #[cfg(test)]
    fn subject_of(&self, node_id: usize) -> Option<&str> {
        self.nodes.get(&node_id).map(String::as_str)
    }

    /// Route clauses into the current optional block, or into the required
    /// sequence when no optional block is open.
    pub fn append(&mut self, clauses: impl IntoIterator<Item = Clause>) {
        if self.in_optional() {
            self.optional_buffer.extend(clauses);
        } else {
            self.required.extend(clauses);
        }
    }

    /// Start routing clauses into the optional buffer.
    ///
    /// Optional blocks nest: only the outermost `exit_optional` seals.
    pub const fn enter_optional(&mut self) {
        self.optional_depth += 1;
    }

    /// Leave an optional block, sealing the buffer once the outermost
    /// block closes.
    pub fn exit_optional(&mut self) {
        self.optional_depth = self.optional_depth.saturating_sub(1);
        if self.optional_depth == 0 {
            let block = std::mem::take(&mut self.optional_buffer);
            self.optional_blocks.push(block);
        }
    }

    /// Whether clauses are currently routed into an optional block.
    #[must_use]
    pub const fn in_optional(&self) -> bool {
        self.optional_depth > 0
    }

    /// Retrofit a nested node as the continuation of an optional block.
    ///
    /// Drops the node's subject from the projection set and the node
    /// table, then rewrites every clause buffered for the current optional
    /// block so the node's subject is replaced by `parent_subject`.
    pub fn demote_to_optional(&mut self, node_id: usize, parent_subject: &str) {
        let Some(subject) = self.nodes.remove(&node_id) else {
            return;
        };
        self.projection.shift_remove(&subject);
        for clause in &mut self.optional_buffer {
            clause.substitute(&subject, parent_subject);
        }
    }

    /// Mint a filter variable scoped to `node_id`.
    ///
    /// Each node has its own counter, so two filters never share a
    /// variable within one query.
    pub fn fresh_filter_variable(&mut self, node_id: usize) -> String {
        let counter = self.filter_counters.entry(node_id).or_default();
        let variable = format!("?F_{node_id}_{counter}");
        *counter += 1;
        variable
    }

    /// Mint a variable that binds and discards.
    pub fn anonymous_variable(&mut self) -> String {
        format!("?X_{}", self.next_node_id())
    }

    /// A caller-named variable, recorded for select-style projection.
    pub fn named_variable(&mut self, name: &str) -> String {
        let variable = format!("?{name}");
        self.tuple_variables.insert(variable.clone());
        variable
    }

    /// Attach a sibling context, OR'ed into this one when rendered.
    ///
    /// Siblings of the sibling are flattened into this context.
    pub fn union(&mut self, mut other: Self) {
        let nested = std::mem::take(&mut other.unions);
        self.unions.push(other);
        self.unions.extend(nested);
    }

    pub const fn set_limit(&mut self, limit: Option<u64>) {
        self.limit = limit;
    }

    pub const fn set_offset(&mut self, offset: Option<u64>) {
        self.offset = offset;
    }

    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Required clauses in append order.
    #[must_use]
    pub fn required(&self) -> &[Clause] {
        &self.required
    }

    /// Sealed optional blocks in sealing order.
    #[must_use]
    pub fn optional_blocks(&self) -> &[Vec<Clause>] {
        &self.optional_blocks
    }

    /// Projected subjects in registration order.
    #[must_use]
    pub const fn projection(&self) -> &IndexSet<String> {
        &self.projection
    }

    /// Named wildcard variables in first-use order.
    #[must_use]
    pub const fn tuple_variables(&self) -> &IndexSet<String> {
        &self.tuple_variables
    }

    #[must_use]
    pub fn unions(&self) -> &[Self] {
        &self.unions
    }
}
