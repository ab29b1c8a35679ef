//! Dynamic value model shared by stored objects and query patterns.
//!
//! Provides the `Value` enum, the `Node` property map and the `Reference`
//! token type, along with conversion from JSON input.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::constants::{ID_NAMESPACE, WILDCARD_PREFIX};

/// An ordered property map. The reserved `@id` key holds the identifier.
pub type Node = IndexMap<String, Value>;

/// Build a node from key/value pairs, keeping their order.
#[must_use]
pub fn node<const N: usize>(pairs: [(&str, Value); N]) -> Node {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

/// A reference token: points at another node's identifier.
///
/// The textual form is `@id(name)`.
///
/// # Invariants
///
/// - `name` is non-empty and contains only word characters
///   (alphanumerics and `_`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference(String);

impl Reference {
    /// Create a reference from a bare name.
    ///
    /// Returns `None` if the name is empty or contains non-word characters.
    #[must_use]
    pub fn new(name: &str) -> Option<Self> {
        is_word(name).then(|| Self(name.to_owned()))
    }

    /// Wrap a name the caller guarantees to be made of word characters.
    pub(crate) const fn from_word(name: String) -> Self {
        Self(name)
    }

    /// Parse the tagged form `@id(name)`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        token
            .strip_prefix("@id(")
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(Self::new)
    }

    /// Normalize an identifier that may or may not already be tagged.
    ///
    /// Tagging an already tagged token is a no-op, so
    /// `normalize("x")` and `normalize("@id(x)")` agree.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        Self::parse(raw).or_else(|| Self::new(raw))
    }

    /// The bare name inside the token.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// The full locator this reference addresses.
    #[must_use]
    pub fn locator(&self) -> String {
        format!("{ID_NAMESPACE}{}", self.0)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@id({})", self.0)
    }
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// A value in an object graph or a query pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<FixedOffset>),
    /// Points at another node by identifier.
    Reference(Reference),
    /// A vocabulary token such as a type name (`:Person`).
    Term(String),
    /// A foreign locator, passed through untouched.
    Iri(String),
    Node(Node),
    List(Vec<Value>),
    /// Query only: bind to a fresh variable. `None` binds and discards.
    Wildcard(Option<String>),
    /// A value handled by a registered `KindHandler`.
    Custom { kind: String, payload: String },
}

impl Value {
    /// Create a text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Create a reference value from a bare name or a tagged token.
    ///
    /// Falls back to a text value when the name is not a valid reference.
    #[must_use]
    pub fn reference(name: &str) -> Self {
        Reference::normalize(name).map_or_else(|| Self::text(name), Self::Reference)
    }

    /// Create a vocabulary term.
    #[must_use]
    pub fn term(name: impl Into<String>) -> Self {
        Self::Term(name.into())
    }

    /// Create an anonymous wildcard.
    #[must_use]
    pub const fn any() -> Self {
        Self::Wildcard(None)
    }

    /// Create a named wildcard whose binding is returned by tuple queries.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Wildcard(Some(name.into()))
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Timestamp(_) => "timestamp",
            Self::Reference(_) => "reference",
            Self::Term(_) => "term",
            Self::Iri(_) => "iri",
            Self::Node(_) => "node",
            Self::List(_) => "list",
            Self::Wildcard(_) => "wildcard",
            Self::Custom { .. } => "custom",
        }
    }

    /// Get the node if this is one.
    #[must_use]
    pub const fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Check whether this value or anything nested inside it is a node.
    #[must_use]
    pub fn contains_node(&self) -> bool {
        match self {
            Self::Node(_) => true,
            Self::List(items) => items.iter().any(Self::contains_node),
            _ => false,
        }
    }

    /// Convert JSON input into a value.
    ///
    /// Strings follow a small set of conventions so that JSON documents
    /// can express every variant:
    ///
    /// - `@id(name)` is a reference
    /// - `?` and `?name` are wildcards
    /// - `:name` is a vocabulary term
    /// - `<iri>` is a foreign locator
    /// - strict RFC 3339 strings are timestamps
    ///
    /// Integers that fit in `i64` become `Integer`, other numbers `Float`.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Integer),
            serde_json::Value::String(s) => Self::from_json_string(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Node(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    fn from_json_string(s: String) -> Self {
        if let Some(reference) = Reference::parse(&s) {
            return Self::Reference(reference);
        }
        if let Some(name) = s.strip_prefix(WILDCARD_PREFIX) {
            return if name.is_empty() {
                Self::any()
            } else {
                Self::var(name)
            };
        }
        if let Some(name) = s.strip_prefix(':') {
            return Self::term(name);
        }
        if let Some(iri) = s.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
            return Self::Iri(iri.to_owned());
        }
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(&s) {
            return Self::Timestamp(timestamp);
        }
        Self::String(s)
    }
}

/// Serializes with the same string conventions `from_json` reads, so a
/// serialized value converts back to an equal one.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            Self::Reference(reference) => reference.serialize(serializer),
            Self::Term(name) => serializer.serialize_str(&format!(":{name}")),
            Self::Iri(iri) => serializer.serialize_str(&format!("<{iri}>")),
            Self::Wildcard(None) => serializer.serialize_str(WILDCARD_PREFIX),
            Self::Wildcard(Some(name)) => {
                serializer.serialize_str(&format!("{WILDCARD_PREFIX}{name}"))
            }
            Self::Custom { payload, .. } => serializer.serialize_str(payload),
            Self::Node(node) => {
                let mut map = serializer.serialize_map(Some(node.len()))?;
                for (key, value) in node {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Reference> for Value {
    fn from(reference: Reference) -> Self {
        Self::Reference(reference)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(timestamp: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(timestamp)
    }
}
