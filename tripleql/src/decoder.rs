//! Binding decoder: store results back into linked objects.
//!
//! Describe-style results arrive as linked-data node records (one JSON
//! object per subject, properties keyed by full or prefixed locators).
//! Decoding runs in two passes:
//!
//! 1. Every record is normalized (duplicate list values dropped, single
//!    element lists collapsed, keys shortened to their local names) and
//!    indexed by its locator.
//! 2. Every property value that points at an indexed locator is replaced
//!    by a handle to the already-built node.
//!
//! Nodes live in an arena (`DecodedGraph`), so nodes that reference each
//! other are plain index handles rather than ownership cycles, and
//! splicing never re-decodes a record.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::codec::{ValueCodec, decode_locator};
use crate::constants::{ID_KEY, ID_NAMESPACE, RDF_NIL, VOCABULARY_NAMESPACE};
use crate::error::{Error, Result};
use crate::types::{Node, Reference, Value};

/// Handle to a node inside a `DecodedGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(usize);

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Value(Value),
    /// A live link to another decoded node.
    Node(NodeIndex),
    List(Vec<Decoded>),
}

/// One decoded node.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedNode {
    /// Identifier, kept only for nodes addressed by an explicit reference.
    pub id: Option<Reference>,
    /// Properties keyed by local name, in arrival order.
    pub properties: IndexMap<String, Decoded>,
    locator: String,
}

impl DecodedNode {
    /// Locator the record arrived with.
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Decoded> {
        self.properties.get(key)
    }
}

/// Decoded nodes plus the order in which they are returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedGraph {
    nodes: Vec<DecodedNode>,
    top_level: Vec<NodeIndex>,
}

impl DecodedGraph {
    /// Get a node by handle.
    ///
    /// # Panics
    ///
    /// Panics if `index` was handed out by a different graph. Use `get`
    /// for handles of unknown origin.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &DecodedNode {
        &self.nodes[index.0]
    }

    /// Get a node by handle, or `None` if this graph never issued it.
    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<&DecodedNode> {
        self.nodes.get(index.0)
    }

    /// Top-level nodes in record order.
    #[must_use]
    pub fn top_level(&self) -> &[NodeIndex] {
        &self.top_level
    }

    /// Iterate over top-level nodes.
    pub fn iter(&self) -> impl Iterator<Item = &DecodedNode> {
        self.top_level.iter().map(|index| self.node(*index))
    }

    /// Number of top-level nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.top_level.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }

    /// Find a node, top-level or spliced, by its identifier.
    #[must_use]
    pub fn find(&self, id: &Reference) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|node| node.id.as_ref() == Some(id))
            .map(NodeIndex)
    }

    /// Materialize a node as a nested `Value::Node`.
    ///
    /// Links back to a node already being materialized (a cycle) are cut
    /// and rendered as that node's reference, or its locator when it has
    /// no identifier.
    #[must_use]
    pub fn to_value(&self, index: NodeIndex) -> Value {
        let mut path = Vec::new();
        self.materialize(index, &mut path)
    }

    /// Materialize every top-level node.
    #[must_use]
    pub fn to_values(&self) -> Vec<Value> {
        self.top_level
            .iter()
            .map(|index| self.to_value(*index))
            .collect()
    }

    fn materialize(&self, index: NodeIndex, path: &mut Vec<NodeIndex>) -> Value {
        let node = self.node(index);
        if path.contains(&index) {
            return node.id.clone().map_or_else(
                || Value::Iri(node.locator.clone()),
                Value::Reference,
            );
        }
        path.push(index);
        let mut out = Node::new();
        if let Some(id) = &node.id {
            out.insert(ID_KEY.to_owned(), Value::Reference(id.clone()));
        }
        for (key, value) in &node.properties {
            out.insert(key.clone(), self.materialize_value(value, path));
        }
        path.pop();
        Value::Node(out)
    }

    fn materialize_value(&self, value: &Decoded, path: &mut Vec<NodeIndex>) -> Value {
        match value {
            Decoded::Value(value) => value.clone(),
            Decoded::Node(index) => self.materialize(*index, path),
            Decoded::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.materialize_value(item, path))
                    .collect(),
            ),
        }
    }
}

/// Property value after the first pass: links are still locators.
#[derive(Debug)]
enum Raw {
    Value(Value),
    Link(String),
    List(Vec<Raw>),
}

/// Decodes store results.
#[derive(Debug, Clone, Copy)]
pub struct BindingDecoder<'a> {
    codec: &'a ValueCodec,
}

impl<'a> BindingDecoder<'a> {
    #[must_use]
    pub const fn new(codec: &'a ValueCodec) -> Self {
        Self { codec }
    }

    /// Decode describe-style node records into a linked graph.
    ///
    /// Accepts an array of records, a single record, or a document whose
    /// `@graph` holds the records. With `unlink`, nodes spliced into
    /// another node's property are dropped from the top level.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` if a record is not an object, an `@id`
    /// is not text, or a typed literal does not parse.
    pub fn decode(&self, bindings: &Json, unlink: bool) -> Result<DecodedGraph> {
        let records = records(bindings)?;

        let mut nodes = Vec::with_capacity(records.len());
        let mut pending = Vec::with_capacity(records.len());
        let mut index: HashMap<String, NodeIndex> = HashMap::new();

        for (position, record) in records.iter().enumerate() {
            let Json::Object(fields) = record else {
                return Err(Error::MalformedResponse(format!(
                    "expected a node record, got {record}"
                )));
            };
            let locator = match fields.get(ID_KEY) {
                Some(Json::String(locator)) => locator.clone(),
                Some(other) => {
                    return Err(Error::MalformedResponse(format!(
                        "`@id` must be text, got {other}"
                    )));
                }
                None => format!("_:record{position}"),
            };
            let mut properties = Vec::new();
            for (key, value) in fields {
                if key == ID_KEY || key == "@context" {
                    continue;
                }
                properties.push((local_name(key), self.raw_value(key, value)?));
            }
            let id = locator.strip_prefix(ID_NAMESPACE).and_then(Reference::new);
            let handle = NodeIndex(nodes.len());
            // A repeated locator keeps the last record, as the index does.
            index.insert(locator.clone(), handle);
            nodes.push(DecodedNode {
                id,
                properties: IndexMap::new(),
                locator,
            });
            pending.push(properties);
        }

        let mut spliced = vec![false; nodes.len()];
        for (position, properties) in pending.into_iter().enumerate() {
            let mut linked = IndexMap::with_capacity(properties.len());
            for (key, raw) in properties {
                let value = link(raw, &index, NodeIndex(position), &mut spliced);
                linked.insert(key, value);
            }
            nodes[position].properties = linked;
        }

        let top_level = (0..nodes.len())
            .filter(|&position| index.get(&nodes[position].locator) == Some(&NodeIndex(position)))
            .filter(|&position| !(unlink && spliced[position]))
            .map(NodeIndex)
            .collect();

        tracing::debug!("decoded {} node records", nodes.len());
        Ok(DecodedGraph { nodes, top_level })
    }

    fn raw_value(&self, key: &str, value: &Json) -> Result<Raw> {
        match value {
            Json::Array(items) => {
                let mut unique: Vec<&Json> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                if let [single] = unique.as_slice() {
                    return self.raw_value(key, single);
                }
                unique
                    .into_iter()
                    .map(|item| self.raw_value(key, item))
                    .collect::<Result<Vec<_>>>()
                    .map(Raw::List)
            }
            Json::Object(fields) => {
                if let Some(Json::String(locator)) = fields.get(ID_KEY) {
                    return Ok(Raw::Link(locator.clone()));
                }
                let Some(lexical) = fields.get("@value") else {
                    return Err(Error::MalformedResponse(format!(
                        "property `{key}` holds an object with neither @id nor @value"
                    )));
                };
                let datatype = fields.get("@type").and_then(Json::as_str);
                match lexical {
                    Json::String(text) => self.codec.decode_literal(text, datatype).map(Raw::Value),
                    scalar => Ok(Raw::Value(json_scalar(scalar))),
                }
            }
            Json::String(text) if key == "@type" || is_own_locator(text) => {
                Ok(Raw::Link(text.clone()))
            }
            scalar => Ok(Raw::Value(json_scalar(scalar))),
        }
    }
}

fn records(bindings: &Json) -> Result<&[Json]> {
    match bindings {
        Json::Array(items) => Ok(items),
        Json::Object(fields) => match fields.get("@graph") {
            Some(Json::Array(items)) => Ok(items),
            Some(other) => Err(Error::MalformedResponse(format!(
                "`@graph` must be a list, got {other}"
            ))),
            None => Ok(std::slice::from_ref(bindings)),
        },
        Json::Null => Ok(&[]),
        other => Err(Error::MalformedResponse(format!(
            "expected node records, got {other}"
        ))),
    }
}

/// Strings the store hands back unwrapped that are really locators.
fn is_own_locator(text: &str) -> bool {
    text == RDF_NIL || text.starts_with(ID_NAMESPACE) || text.starts_with(VOCABULARY_NAMESPACE)
}

fn json_scalar(value: &Json) -> Value {
    match value {
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => n
            .as_i64()
            .map_or_else(|| Value::Float(n.as_f64().unwrap_or(f64::NAN)), Value::Integer),
        Json::String(text) => Value::text(text.as_str()),
        Json::Null | Json::Array(_) | Json::Object(_) => Value::Null,
    }
}

/// Shorten a property key to its local name: `:name` and
/// `http://…#name` both become `name`.
fn local_name(key: &str) -> String {
    if key == "@type" {
        return key.to_owned();
    }
    if let Some(name) = key.strip_prefix(':') {
        return name.to_owned();
    }
    key.rsplit_once('#')
        .map_or_else(|| key.to_owned(), |(_, name)| name.to_owned())
}

fn link(
    raw: Raw,
    index: &HashMap<String, NodeIndex>,
    owner: NodeIndex,
    spliced: &mut [bool],
) -> Decoded {
    match raw {
        Raw::Value(value) => Decoded::Value(value),
        Raw::Link(locator) => match index.get(&locator) {
            Some(&target) => {
                if target != owner {
                    spliced[target.0] = true;
                }
                Decoded::Node(target)
            }
            None => Decoded::Value(decode_locator(&locator)),
        },
        Raw::List(items) => Decoded::List(
            items
                .into_iter()
                .map(|item| link(item, index, owner, spliced))
                .collect(),
        ),
    }
}

/// Decode select-style tuple bindings.
///
/// Accepts either a full result document (`{"results": {"bindings":
/// [...]}}`) or the bare list of bindings. Each binding maps a variable
/// to `{type, value, datatype?}`; the leading `?` of variable names is
/// dropped.
///
/// # Errors
///
/// Returns `MalformedResponse` if the document does not have that shape
/// or a typed literal does not parse.
pub fn decode_tuples(codec: &ValueCodec, results: &Json) -> Result<Vec<IndexMap<String, Value>>> {
    let bindings = match results {
        Json::Array(items) => items.as_slice(),
        Json::Object(fields) => match fields.get("results").and_then(|r| r.get("bindings")) {
            Some(Json::Array(items)) => items.as_slice(),
            _ => {
                return Err(Error::MalformedResponse(
                    "tuple results carry no `results.bindings` list".to_owned(),
                ));
            }
        },
        other => {
            return Err(Error::MalformedResponse(format!(
                "expected tuple results, got {other}"
            )));
        }
    };

    bindings
        .iter()
        .map(|binding| {
            let Json::Object(fields) = binding else {
                return Err(Error::MalformedResponse(format!(
                    "expected a tuple binding, got {binding}"
                )));
            };
            fields
                .iter()
                .map(|(variable, value)| {
                    let name = variable.strip_prefix('?').unwrap_or(variable).to_owned();
                    Ok((name, tuple_value(codec, value)?))
                })
                .collect()
        })
        .collect()
}

fn tuple_value(codec: &ValueCodec, value: &Json) -> Result<Value> {
    let kind = value.get("type").and_then(Json::as_str);
    let Some(lexical) = value.get("value").and_then(Json::as_str) else {
        return Err(Error::MalformedResponse(format!(
            "tuple value without a text `value`: {value}"
        )));
    };
    let datatype = value.get("datatype").and_then(Json::as_str);
    match kind {
        Some("uri") => Ok(decode_locator(lexical)),
        Some("bnode") => Ok(Value::Iri(format!("_:{lexical}"))),
        Some("literal" | "typed-literal") | None => codec.decode_literal(lexical, datatype),
        Some(other) => Err(Error::MalformedResponse(format!(
            "unknown tuple value type `{other}`"
        ))),
    }
}
