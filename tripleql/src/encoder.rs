//! Object graph to triple encoder.
//!
//! Walks a nested object graph depth-first and emits a flat, ordered
//! sequence of triples. A node's own edges always follow the triples of
//! everything it references, so the output order is deterministic.
//!
//! Two input shapes are accepted at the top level:
//! - a node, or a list of nodes, encoded as object graphs;
//! - a list with no nodes at all, read three values at a time as flat
//!   `subject predicate object` statements (used for schema definitions).

use crate::codec::{ValueCodec, encode_term};
use crate::constants::{ID_KEY, RDF_NAMESPACE, RDFS_NAMESPACE, VOCABULARY_NAMESPACE};
use crate::error::{Error, Result};
use crate::types::{IdAllocator, Node, Reference, Triple, Value};

/// Output of one encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// Triples in emission order.
    pub triples: Vec<Triple>,
    /// Locator of the root node, when the input was a single node.
    pub root: Option<String>,
    /// Identifiers minted for nodes without an `@id`, in the order the
    /// nodes were reached. Writing them back into those nodes lets a later
    /// remove match the stored statements.
    pub allocated: Vec<Reference>,
}

/// Encodes object graphs into triples.
///
/// Owns the `IdAllocator` used for anonymous nodes, so two encoders never
/// share identifier state.
#[derive(Debug)]
pub struct TripleEncoder<'a> {
    codec: &'a ValueCodec,
    allocator: IdAllocator,
    allocated: Vec<Reference>,
}

impl<'a> TripleEncoder<'a> {
    /// Create an encoder with an OS-seeded identifier allocator.
    #[must_use]
    pub fn new(codec: &'a ValueCodec) -> Self {
        Self::with_allocator(codec, IdAllocator::new())
    }

    /// Create an encoder with a caller-supplied allocator.
    #[must_use]
    pub const fn with_allocator(codec: &'a ValueCodec, allocator: IdAllocator) -> Self {
        Self {
            codec,
            allocator,
            allocated: Vec::new(),
        }
    }

    /// Encode a node, a list of nodes, or a flat statement list.
    ///
    /// # Errors
    ///
    /// - `UnsupportedValueKind` for scalars at the top level, wildcard
    ///   keys, malformed identifiers, nested lists, or a flat statement
    ///   list whose length is not a multiple of three.
    /// - `UnknownOperator` for `$`-prefixed keys or unknown `@` terms.
    pub fn encode(&mut self, value: &Value) -> Result<Encoded> {
        self.allocated.clear();
        match value {
            Value::Node(node) => {
                let (triples, subject) = self.encode_node(node)?;
                Ok(Encoded {
                    triples,
                    root: Some(subject),
                    allocated: std::mem::take(&mut self.allocated),
                })
            }
            Value::List(items) if value.contains_node() => {
                let mut triples = Vec::new();
                for item in items {
                    let Value::Node(node) = item else {
                        return Err(Error::UnsupportedValueKind(format!(
                            "a list of nodes cannot also hold a {}",
                            item.kind_name()
                        )));
                    };
                    triples.extend(self.encode_node(node)?.0);
                }
                Ok(Encoded {
                    triples,
                    root: None,
                    allocated: std::mem::take(&mut self.allocated),
                })
            }
            Value::List(items) => Ok(Encoded {
                triples: self.encode_statements(items)?,
                root: None,
                allocated: Vec::new(),
            }),
            other => Err(Error::UnsupportedValueKind(format!(
                "cannot encode a top-level {}",
                other.kind_name()
            ))),
        }
    }

    /// Encode a flat `[s, p, o, s, p, o, …]` statement list.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedValueKind` if the length is not a multiple of
    /// three or a position holds a value without a wire form.
    pub fn encode_statements(&self, items: &[Value]) -> Result<Vec<Triple>> {
        if items.len() % 3 != 0 {
            return Err(Error::UnsupportedValueKind(format!(
                "flat statement list has {} values, expected a multiple of three",
                items.len()
            )));
        }
        items
            .chunks_exact(3)
            .map(|chunk| {
                Ok(Triple::new(
                    self.codec.encode_literal(&chunk[0])?,
                    self.codec.encode_literal(&chunk[1])?,
                    self.codec.encode_literal(&chunk[2])?,
                ))
            })
            .collect()
    }

    /// Encode a value and render it as a prefixed statement document.
    pub fn document(&mut self, value: &Value, schema: bool) -> Result<String> {
        let encoded = self.encode(value)?;
        Ok(to_document(&encoded.triples, schema))
    }

    fn encode_node(&mut self, node: &Node) -> Result<(Vec<Triple>, String)> {
        let subject = self.resolve_subject(node)?;
        let mut nested = Vec::new();
        let mut own = Vec::new();

        for (key, value) in node {
            if key == ID_KEY {
                continue;
            }
            let predicate = encode_key(key)?;
            match value {
                Value::Node(child) => {
                    let (child_triples, child_subject) = self.encode_node(child)?;
                    nested.extend(child_triples);
                    own.push(Triple::new(subject.as_str(), predicate, child_subject));
                }
                Value::List(items) => {
                    for item in items {
                        let object = match item {
                            Value::Node(child) => {
                                let (child_triples, child_subject) = self.encode_node(child)?;
                                nested.extend(child_triples);
                                child_subject
                            }
                            Value::List(_) => {
                                return Err(Error::UnsupportedValueKind(format!(
                                    "property `{key}` holds a nested list"
                                )));
                            }
                            scalar => self.codec.encode_literal(scalar)?,
                        };
                        own.push(Triple::new(subject.as_str(), predicate.as_str(), object));
                    }
                }
                scalar => {
                    let object = self.codec.encode_literal(scalar)?;
                    own.push(Triple::new(subject.as_str(), predicate, object));
                }
            }
        }

        nested.extend(own);
        Ok((nested, subject))
    }

    /// Resolve the node's identifier, assigning a synthetic one if absent.
    fn resolve_subject(&mut self, node: &Node) -> Result<String> {
        let reference = match node.get(ID_KEY) {
            None | Some(Value::Null) => {
                let id = self.allocator.next_id();
                self.allocated.push(id.clone());
                id
            }
            Some(Value::Reference(reference)) => reference.clone(),
            Some(Value::String(raw)) => Reference::normalize(raw).ok_or_else(|| {
                Error::UnsupportedValueKind(format!("`{raw}` is not a valid identifier"))
            })?,
            Some(Value::Iri(iri)) => return Ok(format!("<{iri}>")),
            Some(other) => {
                return Err(Error::UnsupportedValueKind(format!(
                    "a {} cannot be used as an identifier",
                    other.kind_name()
                )));
            }
        };
        Ok(format!("<{}>", reference.locator()))
    }
}

fn encode_key(key: &str) -> Result<String> {
    if key.starts_with('$') {
        return Err(Error::UnknownOperator(key.to_owned()));
    }
    if key.starts_with('?') {
        return Err(Error::UnsupportedValueKind(format!(
            "wildcard key `{key}` is only valid in query patterns"
        )));
    }
    encode_term(key)
}

/// Render triples as a prefixed statement document.
///
/// `schema` adds the `rdfs:` prefix declaration used by schema graphs.
#[must_use]
pub fn to_document(triples: &[Triple], schema: bool) -> String {
    let mut document =
        format!("@prefix : <{VOCABULARY_NAMESPACE}> . @prefix rdf: <{RDF_NAMESPACE}> . ");
    if schema {
        document.push_str(&format!("@prefix rdfs: <{RDFS_NAMESPACE}> . "));
    }
    if triples.is_empty() {
        return document;
    }
    let statements: Vec<String> = triples.iter().map(Triple::to_string).collect();
    document.push_str(&statements.join(" .\n "));
    document.push_str(" .");
    document
}

/// Encode a value with a fresh encoder and default codec.
pub fn to_turtle(value: &Value) -> Result<String> {
    let codec = ValueCodec::new();
    TripleEncoder::new(&codec).document(value, false)
}
