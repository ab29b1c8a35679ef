//! In-memory `Store` for tests.
//!
//! Records every call, answers queries from a queue of canned bodies and
//! can be told to fail the next write.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::store::{DatabaseOption, QueryOptions, Store, StoreError, StoreErrorKind};

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListDatabases,
    CreateDatabase {
        name: String,
        options: Vec<DatabaseOption>,
    },
    Add {
        database: String,
        document: String,
        graph: Option<String>,
        media_type: String,
    },
    Remove {
        database: String,
        document: String,
        graph: Option<String>,
        media_type: String,
    },
    AddIcv {
        database: String,
        document: String,
    },
    RemoveIcv {
        database: String,
        document: String,
    },
    Query {
        database: String,
        query: String,
        options: QueryOptions,
    },
    SetDatabaseOptions {
        database: String,
        options: Vec<DatabaseOption>,
    },
    OfflineDatabase(String),
    OnlineDatabase(String),
    UploadRules {
        database: String,
        document: String,
    },
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    calls: Mutex<Vec<Call>>,
    databases: Vec<String>,
    responses: Mutex<VecDeque<String>>,
    write_failure: Mutex<Option<StoreError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already knows the given databases.
    pub fn with_databases(names: &[&str]) -> Self {
        Self {
            databases: names.iter().map(|name| (*name).to_string()).collect(),
            ..Self::default()
        }
    }

    /// Queue a response body for the next query.
    pub fn respond(&self, body: impl Into<String>) {
        self.responses.lock().unwrap().push_back(body.into());
    }

    /// Make the next `add` or `remove` fail with `error`.
    pub fn fail_next_write(&self, error: StoreError) {
        *self.write_failure.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls after the session was opened, skipping `ListDatabases`.
    pub fn calls_after_connect(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| *call != Call::ListDatabases)
            .collect()
    }

    /// The query calls, in order.
    pub fn queries(&self) -> Vec<(String, QueryOptions)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Query { query, options, .. } => Some((query, options)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_write_failure(&self) -> Result<(), StoreError> {
        self.write_failure.lock().unwrap().take().map_or(Ok(()), Err)
    }
}

impl Store for MemoryStore {
    async fn list_databases(&self) -> Result<Vec<String>, StoreError> {
        self.record(Call::ListDatabases);
        Ok(self.databases.clone())
    }

    async fn create_database(
        &self,
        name: &str,
        options: &[DatabaseOption],
    ) -> Result<(), StoreError> {
        self.record(Call::CreateDatabase {
            name: name.to_string(),
            options: options.to_vec(),
        });
        Ok(())
    }

    async fn add(
        &self,
        database: &str,
        document: &str,
        graph: Option<&str>,
        media_type: &str,
    ) -> Result<(), StoreError> {
        self.record(Call::Add {
            database: database.to_string(),
            document: document.to_string(),
            graph: graph.map(str::to_string),
            media_type: media_type.to_string(),
        });
        self.take_write_failure()
    }

    async fn remove(
        &self,
        database: &str,
        document: &str,
        graph: Option<&str>,
        media_type: &str,
    ) -> Result<(), StoreError> {
        self.record(Call::Remove {
            database: database.to_string(),
            document: document.to_string(),
            graph: graph.map(str::to_string),
            media_type: media_type.to_string(),
        });
        self.take_write_failure()
    }

    async fn add_icv(
        &self,
        database: &str,
        document: &str,
        _media_type: &str,
    ) -> Result<(), StoreError> {
        self.record(Call::AddIcv {
            database: database.to_string(),
            document: document.to_string(),
        });
        Ok(())
    }

    async fn remove_icv(
        &self,
        database: &str,
        document: &str,
        _media_type: &str,
    ) -> Result<(), StoreError> {
        self.record(Call::RemoveIcv {
            database: database.to_string(),
            document: document.to_string(),
        });
        Ok(())
    }

    async fn query(
        &self,
        database: &str,
        query: &str,
        options: &QueryOptions,
    ) -> Result<String, StoreError> {
        self.record(Call::Query {
            database: database.to_string(),
            query: query.to_string(),
            options: options.clone(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| StoreError::new(StoreErrorKind::Other, "no canned response"))
    }

    async fn set_database_options(
        &self,
        database: &str,
        options: &[DatabaseOption],
    ) -> Result<(), StoreError> {
        self.record(Call::SetDatabaseOptions {
            database: database.to_string(),
            options: options.to_vec(),
        });
        Ok(())
    }

    async fn offline_database(&self, database: &str) -> Result<(), StoreError> {
        self.record(Call::OfflineDatabase(database.to_string()));
        Ok(())
    }

    async fn online_database(&self, database: &str) -> Result<(), StoreError> {
        self.record(Call::OnlineDatabase(database.to_string()));
        Ok(())
    }

    async fn upload_rules(&self, database: &str, document: &str) -> Result<(), StoreError> {
        self.record(Call::UploadRules {
            database: database.to_string(),
            document: document.to_string(),
        });
        Ok(())
    }
}
