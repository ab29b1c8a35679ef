//! Common helpers for end-to-end tests.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::config::GraphConfig;
use crate::graph::Graph;
use crate::testing::MemoryStore;

/// Database every test session selects.
pub const TEST_DATABASE: &str = "people";

/// A graph session over a fresh in-memory store.
pub struct TestGraph {
    pub graph: Graph<MemoryStore>,
    pub runtime: tokio::runtime::Runtime,
}

impl TestGraph {
    /// Open a session on an existing `people` database.
    #[must_use]
    pub fn new() -> Self {
        Self::open(MemoryStore::with_databases(&[TEST_DATABASE]), false)
    }

    /// Open a session over `store`, selecting `people`.
    #[must_use]
    pub fn open(store: MemoryStore, validate: bool) -> Self {
        #[allow(clippy::expect_used)]
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("Failed to create runtime");
        let config = test_config(validate);
        #[allow(clippy::expect_used)]
        let graph = runtime
            .block_on(Graph::connect(store, &config))
            .expect("Failed to open session");
        Self { graph, runtime }
    }

    pub fn store(&self) -> &MemoryStore {
        self.graph.inner()
    }
}

pub fn test_config(validate: bool) -> GraphConfig {
    GraphConfig {
        endpoint: GraphConfig::DEFAULT_ENDPOINT.to_string(),
        user: "admin".to_string(),
        password: "admin".to_string(),
        database: Some(TEST_DATABASE.to_string()),
        validate,
    }
}

/// Write JSON to a temporary file that lives as long as the handle.
pub fn json_file(json: &serde_json::Value) -> NamedTempFile {
    #[allow(clippy::expect_used)]
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    #[allow(clippy::expect_used)]
    write!(file, "{json}").expect("Failed to write temp file");
    file
}
