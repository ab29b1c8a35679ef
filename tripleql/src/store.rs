//! Boundary with the external triple store.
//!
//! Everything behind the `Store` trait is an opaque pass-through: the
//! crate hands it rendered documents and query text and gets raw response
//! bodies back. Transport, authentication and database lifecycle live on
//! the other side of this trait.

use std::fmt;

/// Category of a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// A write broke an integrity constraint.
    IntegrityViolation,
    /// The database or resource does not exist.
    NotFound,
    /// The request never reached the store or the reply never came back.
    Transport,
    /// Anything else the store reported.
    Other,
}

/// Error reported by a `Store` implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Check whether the store refused a write on integrity grounds.
    #[must_use]
    pub const fn is_integrity_violation(&self) -> bool {
        matches!(self.kind, StoreErrorKind::IntegrityViolation)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StoreErrorKind::IntegrityViolation => {
                write!(f, "integrity constraint violation: {}", self.message)
            }
            StoreErrorKind::NotFound => write!(f, "not found: {}", self.message),
            StoreErrorKind::Transport => write!(f, "transport error: {}", self.message),
            StoreErrorKind::Other => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for StoreError {}

/// Reasoning profile applied when answering queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReasoningLevel {
    #[default]
    Ql,
    Rl,
    El,
    Dl,
}

impl ReasoningLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ql => "QL",
            Self::Rl => "RL",
            Self::El => "EL",
            Self::Dl => "DL",
        }
    }
}

/// Options sent with a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Requested response media type. `None` lets the store pick JSON.
    pub accept: Option<String>,
    /// Set for describe-style queries.
    pub describe: bool,
    pub reasoning: Option<ReasoningLevel>,
}

/// A database setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseOption {
    /// `icv.enabled`: check integrity constraints on every write.
    ValidationEnabled(bool),
    /// `icv.reasoning.type`: reasoning profile used by validation.
    ReasoningType(ReasoningLevel),
    /// `reasoning.schema.graphs`: graph holding schema definitions.
    SchemaGraphs(String),
}

impl DatabaseOption {
    /// Key under which the store knows this setting.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::ValidationEnabled(_) => "icv.enabled",
            Self::ReasoningType(_) => "icv.reasoning.type",
            Self::SchemaGraphs(_) => "reasoning.schema.graphs",
        }
    }

    /// Setting value as text.
    #[must_use]
    pub fn value(&self) -> String {
        match self {
            Self::ValidationEnabled(enabled) => enabled.to_string(),
            Self::ReasoningType(level) => level.as_str().to_owned(),
            Self::SchemaGraphs(graph) => graph.clone(),
        }
    }
}

/// Operations the external store makes available.
///
/// `graph` names the target graph of a write; `None` is the default
/// graph. `media_type` tags the submitted document.
#[allow(async_fn_in_trait)]
pub trait Store {
    async fn list_databases(&self) -> Result<Vec<String>, StoreError>;

    async fn create_database(
        &self,
        name: &str,
        options: &[DatabaseOption],
    ) -> Result<(), StoreError>;

    async fn add(
        &self,
        database: &str,
        document: &str,
        graph: Option<&str>,
        media_type: &str,
    ) -> Result<(), StoreError>;

    async fn remove(
        &self,
        database: &str,
        document: &str,
        graph: Option<&str>,
        media_type: &str,
    ) -> Result<(), StoreError>;

    /// Add integrity-constraint axioms.
    async fn add_icv(
        &self,
        database: &str,
        document: &str,
        media_type: &str,
    ) -> Result<(), StoreError>;

    /// Remove integrity-constraint axioms.
    async fn remove_icv(
        &self,
        database: &str,
        document: &str,
        media_type: &str,
    ) -> Result<(), StoreError>;

    /// Run a query and return the raw response body.
    async fn query(
        &self,
        database: &str,
        query: &str,
        options: &QueryOptions,
    ) -> Result<String, StoreError>;

    async fn set_database_options(
        &self,
        database: &str,
        options: &[DatabaseOption],
    ) -> Result<(), StoreError>;

    async fn offline_database(&self, database: &str) -> Result<(), StoreError>;

    /// Bring a database back online, waiting for it to be ready.
    async fn online_database(&self, database: &str) -> Result<(), StoreError>;

    /// Upload a rule document.
    async fn upload_rules(&self, database: &str, document: &str) -> Result<(), StoreError>;
}
