//! Graph session facade.
//!
//! A `Graph` ties the codec, encoder, compiler and decoder to one `Store`
//! and one selected database. It keeps the last compiled query so that it
//! can be refined (`union`, `limit`, `offset`) and then run in either
//! describe or select form.
//!
//! ```ignore
//! let mut graph = Graph::connect(store, &config).await?;
//! graph.with_db("people").await?;
//! graph.store(&people).await?;
//! graph.query(&node([("name", Value::var("name"))]))?.limit(10)?;
//! let names = graph.tuples().await?;
//! ```

use indexmap::IndexMap;

use crate::codec::ValueCodec;
use crate::config::GraphConfig;
use crate::constants::{RDF_XML_MEDIA_TYPE, TURTLE_MEDIA_TYPE};
use crate::decoder::{BindingDecoder, DecodedGraph, decode_tuples};
use crate::encoder::{TripleEncoder, to_document};
use crate::error::{Error, Result};
use crate::query::{PatternCompiler, QueryContext};
use crate::store::{DatabaseOption, QueryOptions, ReasoningLevel, Store, StoreError, StoreErrorKind};
use crate::types::{Node, Value};

/// A session against one store.
#[derive(Debug)]
pub struct Graph<S> {
    store: S,
    codec: ValueCodec,
    databases: Vec<String>,
    database: Option<String>,
    validations: bool,
    reasoning: Option<ReasoningLevel>,
    last_query: Option<QueryContext>,
}

impl<S: Store> Graph<S> {
    /// Open a session, selecting the configured database if any.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store cannot list or create
    /// databases.
    pub async fn connect(store: S, config: &GraphConfig) -> Result<Self> {
        Self::with_codec(store, config, ValueCodec::new()).await
    }

    /// Open a session with a codec carrying custom kind handlers.
    pub async fn with_codec(store: S, config: &GraphConfig, codec: ValueCodec) -> Result<Self> {
        let databases = store.list_databases().await?;
        tracing::info!(
            "connected to {} as {} ({} databases)",
            config.endpoint,
            config.user,
            databases.len()
        );
        let mut graph = Self {
            store,
            codec,
            databases,
            database: None,
            validations: config.validate,
            reasoning: None,
            last_query: None,
        };
        if let Some(database) = &config.database {
            graph.with_db(database).await?;
        }
        Ok(graph)
    }

    /// The underlying store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// The selected database, if any.
    #[must_use]
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// The last compiled query, if any.
    #[must_use]
    pub const fn last_query(&self) -> Option<&QueryContext> {
        self.last_query.as_ref()
    }

    /// Select a database, creating it first if the store does not know it.
    ///
    /// New databases read schema definitions from `<name>:schema` and
    /// get integrity validation when the session was configured with it.
    pub async fn with_db(&mut self, name: &str) -> Result<&mut Self> {
        if !self.databases.iter().any(|known| known == name) {
            tracing::info!("creating database {name}");
            self.store
                .create_database(name, &[DatabaseOption::SchemaGraphs(schema_graph(name))])
                .await?;
            self.databases.push(name.to_owned());
            if self.validations {
                self.toggle(name, &[DatabaseOption::ValidationEnabled(true)])
                    .await?;
            }
        }
        self.database = Some(name.to_owned());
        Ok(self)
    }

    /// Store an object graph.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreRejected` if the store refuses the write on
    /// integrity grounds.
    pub async fn store(&mut self, data: &Value) -> Result<&mut Self> {
        let database = self.require_database()?;
        let document = TripleEncoder::new(&self.codec).document(data, false)?;
        tracing::debug!("storing in {database}:\n{document}");
        self.store
            .add(&database, &document, None, TURTLE_MEDIA_TYPE)
            .await
            .map_err(|e| rejected("error storing objects in the graph", e))?;
        Ok(self)
    }

    /// Remove the statements an object graph encodes to.
    ///
    /// Nodes without an `@id` get fresh identifiers and so match nothing.
    pub async fn remove(&mut self, data: &Value) -> Result<&mut Self> {
        let database = self.require_database()?;
        let document = TripleEncoder::new(&self.codec).document(data, false)?;
        tracing::debug!("removing from {database}:\n{document}");
        self.store
            .remove(&database, &document, None, TURTLE_MEDIA_TYPE)
            .await?;
        Ok(self)
    }

    /// Remove every node matched by the last query.
    pub async fn remove_matching(&mut self) -> Result<&mut Self> {
        let database = self.require_database()?;
        let ctx = self.last_query.as_ref().ok_or(Error::NoActiveQuery)?;
        let query = ctx.to_describe();
        let options = QueryOptions {
            accept: Some(RDF_XML_MEDIA_TYPE.to_owned()),
            describe: true,
            reasoning: self.reasoning,
            ..QueryOptions::default()
        };
        tracing::debug!("fetching matches to remove:\n{query}");
        let matched = self.store.query(&database, &query, &options).await?;
        self.store
            .remove(&database, &matched, None, RDF_XML_MEDIA_TYPE)
            .await?;
        Ok(self)
    }

    /// Compile a pattern and make it the current query.
    ///
    /// The previous query is dropped even if compilation fails.
    pub fn query(&mut self, pattern: &Node) -> Result<&mut Self> {
        self.last_query = None;
        let ctx = PatternCompiler::new(&self.codec).compile(pattern)?;
        self.last_query = Some(ctx);
        Ok(self)
    }

    /// OR another pattern into the current query.
    pub fn union(&mut self, pattern: &Node) -> Result<&mut Self> {
        let sibling = PatternCompiler::new(&self.codec).compile(pattern)?;
        self.last_query
            .as_mut()
            .ok_or(Error::NoActiveQuery)?
            .union(sibling);
        Ok(self)
    }

    /// Limit the number of statements the store returns.
    pub fn limit(&mut self, limit: u64) -> Result<&mut Self> {
        self.current_mut()?.set_limit(Some(limit));
        Ok(self)
    }

    /// Skip the first `offset` statements the store returns.
    pub fn offset(&mut self, offset: u64) -> Result<&mut Self> {
        self.current_mut()?.set_offset(Some(offset));
        Ok(self)
    }

    /// Run the current query in describe form and return the raw records.
    pub async fn run(&self) -> Result<serde_json::Value> {
        let ctx = self.last_query.as_ref().ok_or(Error::NoActiveQuery)?;
        let body = self.submit(ctx, &ctx.to_describe(), true).await?;
        parse_json(&body)
    }

    /// Run the current query and decode the matched nodes.
    ///
    /// With `unlink`, only nodes that no other returned node links to are
    /// listed at the top level.
    pub async fn all(&self, unlink: bool) -> Result<DecodedGraph> {
        let records = self.run().await?;
        BindingDecoder::new(&self.codec).decode(&records, unlink)
    }

    /// Run the current query and return the first matched node.
    pub async fn first(&self, unlink: bool) -> Result<Option<Value>> {
        let graph = self.all(unlink).await?;
        Ok(graph
            .top_level()
            .first()
            .map(|index| graph.to_value(*index)))
    }

    /// Run the current query in select form and decode the tuples bound
    /// to its named variables.
    pub async fn tuples(&self) -> Result<Vec<IndexMap<String, Value>>> {
        let ctx = self.last_query.as_ref().ok_or(Error::NoActiveQuery)?;
        let body = self.submit(ctx, &ctx.to_select(), false).await?;
        decode_tuples(&self.codec, &parse_json(&body)?)
    }

    /// Add schema definitions, given as flat `[s, p, o, …]` statements.
    pub async fn define(&mut self, statements: &[Value]) -> Result<&mut Self> {
        let (database, document) = self.schema_document(statements)?;
        let graph = schema_graph(&database);
        tracing::debug!("defining in {graph}:\n{document}");
        self.store
            .add(&database, &document, Some(&graph), TURTLE_MEDIA_TYPE)
            .await?;
        Ok(self)
    }

    /// Drop schema definitions.
    pub async fn retract_definition(&mut self, statements: &[Value]) -> Result<&mut Self> {
        let (database, document) = self.schema_document(statements)?;
        let graph = schema_graph(&database);
        tracing::debug!("retracting from {graph}:\n{document}");
        self.store
            .remove(&database, &document, Some(&graph), TURTLE_MEDIA_TYPE)
            .await?;
        Ok(self)
    }

    /// Add integrity constraints, given as flat statements.
    pub async fn validate(&mut self, statements: &[Value]) -> Result<&mut Self> {
        let (database, document) = self.schema_document(statements)?;
        tracing::debug!("adding constraints to {database}:\n{document}");
        self.store
            .add_icv(&database, &document, TURTLE_MEDIA_TYPE)
            .await?;
        Ok(self)
    }

    /// Drop integrity constraints.
    pub async fn retract_validation(&mut self, statements: &[Value]) -> Result<&mut Self> {
        let (database, document) = self.schema_document(statements)?;
        tracing::debug!("removing constraints from {database}:\n{document}");
        self.store
            .remove_icv(&database, &document, TURTLE_MEDIA_TYPE)
            .await?;
        Ok(self)
    }

    /// Turn integrity validation on or off for the selected database.
    pub async fn with_validations(&mut self, enabled: bool) -> Result<&mut Self> {
        let database = self.require_database()?;
        self.validations = enabled;
        self.toggle(&database, &[DatabaseOption::ValidationEnabled(enabled)])
            .await?;
        Ok(self)
    }

    /// Answer queries with reasoning under the given profile.
    pub async fn with_reasoning(&mut self, level: ReasoningLevel) -> Result<&mut Self> {
        let database = self.require_database()?;
        self.toggle(&database, &[DatabaseOption::ReasoningType(level)])
            .await?;
        self.reasoning = Some(level);
        Ok(self)
    }

    /// Answer queries without reasoning.
    pub const fn without_reasoning(&mut self) -> &mut Self {
        self.reasoning = None;
        self
    }

    /// Upload a rule document to the selected database.
    pub async fn upload_rules(&mut self, document: &str) -> Result<&mut Self> {
        let database = self.require_database()?;
        self.store.upload_rules(&database, document).await?;
        Ok(self)
    }

    /// Database settings only change while the database is offline.
    async fn toggle(&self, database: &str, options: &[DatabaseOption]) -> Result<()> {
        self.store.offline_database(database).await?;
        self.store.set_database_options(database, options).await?;
        self.store.online_database(database).await?;
        Ok(())
    }

    async fn submit(&self, ctx: &QueryContext, query: &str, describe: bool) -> Result<String> {
        let database = self.require_database()?;
        let options = QueryOptions {
            limit: ctx.limit(),
            offset: ctx.offset(),
            accept: None,
            describe,
            reasoning: self.reasoning,
        };
        tracing::debug!(
            "querying {database} (limit {:?}, offset {:?}):\n{query}",
            options.limit,
            options.offset
        );
        Ok(self.store.query(&database, query, &options).await?)
    }

    fn schema_document(&self, statements: &[Value]) -> Result<(String, String)> {
        let database = self.require_database()?;
        let triples = TripleEncoder::new(&self.codec).encode_statements(statements)?;
        Ok((database, to_document(&triples, true)))
    }

    fn current_mut(&mut self) -> Result<&mut QueryContext> {
        self.last_query.as_mut().ok_or(Error::NoActiveQuery)
    }

    fn require_database(&self) -> Result<String> {
        self.database.clone().ok_or_else(|| {
            Error::Store(StoreError::new(
                StoreErrorKind::NotFound,
                "no database selected",
            ))
        })
    }
}

fn schema_graph(database: &str) -> String {
    format!("{database}:schema")
}

/// Wrap integrity violations so the cause stays attached; pass other
/// failures through.
fn rejected(message: &str, error: StoreError) -> Error {
    if error.is_integrity_violation() {
        Error::StoreRejected {
            message: format!("{message}: a validation has failed"),
            cause: error,
        }
    } else {
        Error::Store(error)
    }
}

fn parse_json(body: &str) -> Result<serde_json::Value> {
    serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("response is not JSON: {e}")))
}
