//! Graph session configuration.
//!
//! Configuration is loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `TRIPLEQL_ENDPOINT`: Store endpoint (default: `http://localhost:5822/`)
//! - `TRIPLEQL_USER`: User name (default: `admin`)
//! - `TRIPLEQL_PASSWORD`: Password (default: `admin`)
//! - `TRIPLEQL_DATABASE`: Database selected on start-up (optional)
//! - `TRIPLEQL_VALIDATE`: Enable integrity validation on new databases
//!   (default: `false`)
//!
//! `TRIPLEQL_USER` and `TRIPLEQL_PASSWORD` are a pair: setting one
//! without the other is an error.
//!
//! # Invariants
//!
//! - `endpoint` is never empty
//! - `database`, when present, is never empty

use serde::Serialize;

/// Graph session configuration.
///
/// Serializes without the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphConfig {
    /// Store endpoint handed to the transport.
    pub endpoint: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Database selected when the session starts.
    pub database: Option<String>,
    /// Whether newly created databases check integrity constraints.
    pub validate: bool,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const ENDPOINT_VAR: &str = "TRIPLEQL_ENDPOINT";
const USER_VAR: &str = "TRIPLEQL_USER";
const PASSWORD_VAR: &str = "TRIPLEQL_PASSWORD";
const DATABASE_VAR: &str = "TRIPLEQL_DATABASE";
const VALIDATE_VAR: &str = "TRIPLEQL_VALIDATE";

impl GraphConfig {
    /// Default store endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:5822/";
    /// Default user name and password.
    pub const DEFAULT_CREDENTIAL: &'static str = "admin";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `TRIPLEQL_ENDPOINT` is set but empty
    /// - only one of `TRIPLEQL_USER` and `TRIPLEQL_PASSWORD` is set
    /// - `TRIPLEQL_VALIDATE` is set but not a boolean
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint = Self::load_endpoint(&lookup)?;
        let (user, password) = Self::load_credentials(&lookup)?;
        let database = lookup(DATABASE_VAR).filter(|name| !name.is_empty());
        let validate = Self::load_validate(&lookup)?;

        Ok(Self {
            endpoint,
            user,
            password,
            database,
            validate,
        })
    }

    fn load_endpoint(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
        match lookup(ENDPOINT_VAR) {
            Some(endpoint) if endpoint.trim().is_empty() => Err(ConfigError::InvalidValue {
                name: ENDPOINT_VAR.to_string(),
                message: "must not be empty".to_string(),
            }),
            Some(endpoint) => Ok(endpoint),
            None => Ok(Self::DEFAULT_ENDPOINT.to_string()),
        }
    }

    fn load_credentials(
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<(String, String), ConfigError> {
        match (lookup(USER_VAR), lookup(PASSWORD_VAR)) {
            (Some(user), Some(password)) => Ok((user, password)),
            (None, None) => Ok((
                Self::DEFAULT_CREDENTIAL.to_string(),
                Self::DEFAULT_CREDENTIAL.to_string(),
            )),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(PASSWORD_VAR.to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(USER_VAR.to_string())),
        }
    }

    fn load_validate(lookup: &impl Fn(&str) -> Option<String>) -> Result<bool, ConfigError> {
        let Some(value) = lookup(VALIDATE_VAR) else {
            return Ok(false);
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: VALIDATE_VAR.to_string(),
                message: format!("'{value}' is not a boolean"),
            }),
        }
    }
}
