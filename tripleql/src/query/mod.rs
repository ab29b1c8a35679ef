//! Pattern to query compilation.
//!
//! This module turns nested key/value patterns into query text. It
//! supports:
//! - Nested patterns joined on shared subject variables
//! - OPTIONAL blocks, including optional continuations of a node
//! - Inverse edges (`$inv_<name>`)
//! - Comparison, negation, regex and logical filters
//! - UNION of independently compiled patterns
//!
//! # Example
//!
//! ```ignore
//! use tripleql::{Value, node};
//! use tripleql::query::compile_pattern;
//!
//! let pattern = node([
//!     ("name", Value::var("name")),
//!     ("age", Value::Node(node([("$gt", Value::Integer(30))]))),
//! ]);
//! let ctx = compile_pattern(&pattern)?;
//! println!("{}", ctx.to_select());
//! ```

pub mod compiler;
pub mod context;
pub mod filter;
pub mod render;
pub mod types;

pub use compiler::{CompiledNode, PatternCompiler, compile_pattern};
pub use context::QueryContext;
pub use filter::{FilterCompiler, FilterExpr, Operand};
pub use render::{QueryForm, preamble};
pub use types::{Clause, CompiledFilter, FilterOp, NodeVariables, PatternKey};
