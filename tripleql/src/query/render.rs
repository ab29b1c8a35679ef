//! Query renderer.
//!
//! Turns a sealed `QueryContext` into query text. Describe-style and
//! select-style rendering share the same body and differ only in the
//! projection header.

use indexmap::IndexSet;

use crate::constants::{
    RDF_NAMESPACE, RDFS_NAMESPACE, VOCABULARY_NAMESPACE, XPATH_FUNCTIONS_NAMESPACE, XSD_NAMESPACE,
};

use super::context::QueryContext;
use super::types::Clause;

/// Which projection header to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryForm {
    /// `DESCRIBE` the projected subjects: returns whole nodes.
    #[default]
    Describe,
    /// `SELECT DISTINCT` the named variables: returns flat tuples.
    Select,
}

/// Namespace declarations prefixed to every rendered query.
#[must_use]
pub fn preamble() -> String {
    format!(
        "PREFIX : <{VOCABULARY_NAMESPACE}> PREFIX rdf: <{RDF_NAMESPACE}> \
         PREFIX rdfs: <{RDFS_NAMESPACE}> PREFIX xsd: <{XSD_NAMESPACE}> \
         PREFIX fn: <{XPATH_FUNCTIONS_NAMESPACE}> "
    )
}

impl QueryContext {
    /// Render the body of this context alone: required clauses joined by
    /// ` . `, followed by one `OPTIONAL { … }` per sealed block.
    #[must_use]
    pub fn render_body(&self) -> String {
        let required = join_clauses(self.required());
        let optionals: Vec<String> = self
            .optional_blocks()
            .iter()
            .map(|block| format!("OPTIONAL {{ {} }}", join_clauses(block)))
            .collect();
        if optionals.is_empty() {
            return required;
        }
        let optionals = optionals.join(" ");
        if required.is_empty() {
            optionals
        } else {
            format!("{required} {optionals}")
        }
    }

    /// Render the full `WHERE` group, OR-ing in union siblings.
    #[must_use]
    pub fn render_where(&self) -> String {
        if self.unions().is_empty() {
            return format!("{{ {} }}", self.render_body());
        }
        let mut groups = vec![format!("{{ {} }}", self.render_body())];
        groups.extend(
            self.unions()
                .iter()
                .map(|sibling| format!("{{ {} }}", sibling.render_body())),
        );
        format!("{{ {} }}", groups.join(" UNION "))
    }

    /// Subjects projected by this context and every union sibling, in
    /// first-seen order.
    #[must_use]
    pub fn describe_projection(&self) -> IndexSet<String> {
        let mut projection = self.projection().clone();
        for sibling in self.unions() {
            projection.extend(sibling.projection().iter().cloned());
        }
        projection
    }

    /// Named variables across this context and every union sibling.
    ///
    /// Falls back to the describe projection when nothing was named.
    #[must_use]
    pub fn select_projection(&self) -> IndexSet<String> {
        let mut variables = self.tuple_variables().clone();
        for sibling in self.unions() {
            variables.extend(sibling.tuple_variables().iter().cloned());
        }
        if variables.is_empty() {
            self.describe_projection()
        } else {
            variables
        }
    }

    /// Render a describe-style query.
    #[must_use]
    pub fn to_describe(&self) -> String {
        let projection = join_set(&self.describe_projection());
        format!("{}DESCRIBE {projection} WHERE {}", preamble(), self.render_where())
    }

    /// Render a select-style query.
    #[must_use]
    pub fn to_select(&self) -> String {
        let projection = join_set(&self.select_projection());
        format!(
            "{}SELECT DISTINCT {projection} WHERE {}",
            preamble(),
            self.render_where()
        )
    }

    /// Render in the requested form.
    #[must_use]
    pub fn render(&self, form: QueryForm) -> String {
        match form {
            QueryForm::Describe => self.to_describe(),
            QueryForm::Select => self.to_select(),
        }
    }
}

fn join_clauses(clauses: &[Clause]) -> String {
    clauses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" . ")
}

fn join_set(set: &IndexSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}
