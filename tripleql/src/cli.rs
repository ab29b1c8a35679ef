//! Command-line front end.
//!
//! Every command is offline: it reads JSON files, runs them through the
//! compiler, encoder or decoder, and returns the text to print. Nothing
//! here talks to a store.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::codec::ValueCodec;
use crate::config::GraphConfig;
use crate::decoder::{BindingDecoder, decode_tuples};
use crate::encoder::{TripleEncoder, to_document};
use crate::error::Error;
use crate::query::{PatternCompiler, QueryForm};
use crate::types::{Node, Value};

#[derive(Debug, Parser)]
#[command(name = "tripleql", version, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a JSON pattern into query text.
    Query {
        /// File holding the pattern object.
        pattern: PathBuf,

        /// Render a select query over the named variables.
        #[arg(long)]
        select: bool,

        /// Patterns OR-ed into the query.
        #[arg(long, num_args = 1..)]
        union: Vec<PathBuf>,
    },
    /// Encode a JSON object graph as a turtle document.
    Turtle {
        /// File holding the object graph.
        data: PathBuf,

        /// Read flat `[s, p, o, ...]` statements and add the schema prefixes.
        #[arg(long)]
        schema: bool,
    },
    /// Decode store results into JSON objects.
    Decode {
        /// File holding the store response.
        results: PathBuf,

        /// Only list nodes no other node links to.
        #[arg(long)]
        unlink: bool,

        /// Decode select results into variable bindings.
        #[arg(long, conflicts_with = "unlink")]
        tuples: bool,
    },
    /// Print the configuration loaded from the environment.
    Config,
}

/// Error returned by a command.
#[derive(Debug)]
pub enum CliError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The input parsed but has the wrong shape for the command.
    Input { path: PathBuf, message: String },
    Compile(Error),
    Output(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "{} is not valid JSON: {source}", path.display())
            }
            Self::Input { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Compile(e) => write!(f, "{e}"),
            Self::Output(e) => write!(f, "cannot render output: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Compile(e) => Some(e),
            Self::Output(e) => Some(e),
            Self::Input { .. } => None,
        }
    }
}

impl From<Error> for CliError {
    fn from(e: Error) -> Self {
        Self::Compile(e)
    }
}

/// Run a command and return what it prints.
pub fn execute(cli: &Cli, config: &GraphConfig) -> Result<String, CliError> {
    let codec = ValueCodec::new();
    match &cli.command {
        Commands::Query {
            pattern,
            select,
            union,
        } => {
            let compiler = PatternCompiler::new(&codec);
            let mut ctx = compiler.compile(&read_pattern(pattern)?)?;
            for path in union {
                ctx.union(compiler.compile(&read_pattern(path)?)?);
            }
            let form = if *select {
                QueryForm::Select
            } else {
                QueryForm::Describe
            };
            tracing::debug!("compiled {} with {} unions", pattern.display(), union.len());
            Ok(ctx.render(form))
        }
        Commands::Turtle { data, schema } => {
            let value = Value::from_json(read_json(data)?);
            let mut encoder = TripleEncoder::new(&codec);
            if !*schema {
                return Ok(encoder.document(&value, false)?);
            }
            let Value::List(statements) = value else {
                return Err(CliError::Input {
                    path: data.clone(),
                    message: "schema statements must be a flat array".to_string(),
                });
            };
            let triples = encoder.encode_statements(&statements)?;
            Ok(to_document(&triples, true))
        }
        Commands::Decode {
            results,
            unlink,
            tuples,
        } => {
            let json = read_json(results)?;
            if *tuples {
                let rows = decode_tuples(&codec, &json)?;
                return serde_json::to_string_pretty(&rows).map_err(CliError::Output);
            }
            let graph = BindingDecoder::new(&codec).decode(&json, *unlink)?;
            serde_json::to_string_pretty(&graph.to_values()).map_err(CliError::Output)
        }
        Commands::Config => serde_json::to_string_pretty(config).map_err(CliError::Output),
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_pattern(path: &Path) -> Result<Node, CliError> {
    match Value::from_json(read_json(path)?) {
        Value::Node(pattern) => Ok(pattern),
        other => Err(CliError::Input {
            path: path.to_path_buf(),
            message: format!("a pattern must be an object, not {}", other.kind_name()),
        }),
    }
}
