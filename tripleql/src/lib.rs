// Life of a write:
// 1. Object graph comes in as a `Value`
// 2. Encode into triples, allocating ids for anonymous nodes
// 3. Render a turtle document and hand it to the store
//
// Life of a query:
// 1. Pattern comes in as a `Node`
// 2. Compile into clauses, filters and optional blocks
// 3. Render describe or select text and hand it to the store
// 4. Decode the returned records into linked nodes or bindings
//
// System components:
//  - Value codec
//  - Triple encoder
//  - Pattern compiler and query renderer
//  - Binding decoder
//  - Store boundary

pub mod cli;
pub mod codec;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod graph;
pub mod query;
pub mod store;
pub mod types;

#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod testing;

pub use codec::{KindHandler, ValueCodec};
pub use config::GraphConfig;
pub use decoder::{BindingDecoder, Decoded, DecodedGraph, DecodedNode};
pub use encoder::TripleEncoder;
pub use error::{Error, Result};
pub use graph::Graph;
pub use query::{PatternCompiler, QueryContext, QueryForm};
pub use store::{Store, StoreError, StoreErrorKind};
pub use types::{IdAllocator, Node, Reference, Triple, Value, node};
