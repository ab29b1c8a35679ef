//! Scalar value codec.
//!
//! Converts scalar values to their literal wire form and back. Encoding is
//! keyed on the `Value` variant; decoding is keyed on the datatype IRI of
//! the wire literal or on the shape of a locator.
//!
//! # Extension point
//!
//! Value kinds the codec does not know natively are represented as
//! `Value::Custom { kind, payload }`. A `KindHandler` registered for the
//! kind controls their datatype and lexical form. Kinds without a handler
//! are treated as opaque text.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat};

use crate::constants::{
    ID_NAMESPACE, OWL_NAMESPACE, RDF_NIL, RDFS_NAMESPACE, VOCABULARY_NAMESPACE, XSD_BOOLEAN,
    XSD_DATE_TIME, XSD_FLOAT, XSD_INTEGER, XSD_NAMESPACE, XSD_STRING,
};
use crate::error::{Error, Result};
use crate::types::{Reference, Value};

/// Handles one custom value kind.
pub trait KindHandler: Send + Sync {
    /// Discriminant matched against `Value::Custom::kind`.
    fn kind(&self) -> &str;

    /// Datatype IRI used for the literal.
    fn datatype(&self) -> &str;

    /// Produce the lexical form from a payload.
    fn to_lexical(&self, payload: &str) -> Result<String> {
        Ok(payload.to_owned())
    }

    /// Recover the payload from a lexical form.
    fn from_lexical(&self, lexical: &str) -> Result<String> {
        Ok(lexical.to_owned())
    }
}

/// Converts scalar values to and from their wire representation.
#[derive(Default)]
pub struct ValueCodec {
    handlers: HashMap<String, Box<dyn KindHandler>>,
}

impl fmt::Debug for ValueCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("ValueCodec").field("kinds", &kinds).finish()
    }
}

impl ValueCodec {
    /// Create a codec with no custom kinds registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous handler for its kind.
    pub fn register(&mut self, handler: impl KindHandler + 'static) {
        self.handlers
            .insert(handler.kind().to_owned(), Box::new(handler));
    }

    /// Encode a scalar value as a wire literal or locator.
    ///
    /// Text shaped like `@id(name)` is a reference and encodes to its
    /// locator.
    ///
    /// # Errors
    ///
    /// - `UnsupportedValueKind` for nodes, lists and wildcards, which have
    ///   no literal form.
    /// - `UnknownOperator` for an `@`-prefixed term outside the reserved
    ///   vocabulary.
    pub fn encode_literal(&self, value: &Value) -> Result<String> {
        match value {
            Value::Null => Ok(format!("\"{RDF_NIL}\"")),
            Value::Boolean(b) => Ok(typed(&b.to_string(), XSD_BOOLEAN)),
            Value::Integer(n) => Ok(typed(&n.to_string(), XSD_INTEGER)),
            Value::Float(n) => Ok(typed(&float_lexical(*n), XSD_FLOAT)),
            Value::String(s) => Ok(Reference::parse(s).map_or_else(
                || format!("\"{}\"", escape_literal(s)),
                |reference| format!("<{}>", reference.locator()),
            )),
            Value::Timestamp(ts) => Ok(typed(
                &ts.to_rfc3339_opts(SecondsFormat::AutoSi, false),
                XSD_DATE_TIME,
            )),
            Value::Reference(reference) => Ok(format!("<{}>", reference.locator())),
            Value::Term(name) => encode_term(name),
            Value::Iri(iri) => Ok(format!("<{iri}>")),
            Value::Custom { kind, payload } => match self.handlers.get(kind) {
                Some(handler) => Ok(typed(&handler.to_lexical(payload)?, handler.datatype())),
                None => Ok(format!("\"{}\"", escape_literal(payload))),
            },
            Value::Node(_) | Value::List(_) | Value::Wildcard(_) => Err(
                Error::UnsupportedValueKind(format!("{} has no literal form", value.kind_name())),
            ),
        }
    }

    /// Decode a literal given its lexical form and declared datatype.
    ///
    /// Plain literals (no datatype) decode to text, except the `rdf:nil`
    /// sentinel which decodes to `Null`. Datatypes nobody registered decode
    /// to text.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` if the lexical form does not parse as
    /// its declared datatype.
    pub fn decode_literal(&self, lexical: &str, datatype: Option<&str>) -> Result<Value> {
        let Some(datatype) = datatype else {
            return Ok(if lexical == RDF_NIL {
                Value::Null
            } else {
                Value::text(lexical)
            });
        };
        let datatype = expand_xsd(datatype);
        match datatype.as_str() {
            XSD_INTEGER => parse_integer(lexical),
            XSD_FLOAT => parse_float(lexical),
            XSD_BOOLEAN => match lexical {
                "true" | "1" => Ok(Value::Boolean(true)),
                "false" | "0" => Ok(Value::Boolean(false)),
                _ => Err(malformed(lexical, XSD_BOOLEAN)),
            },
            XSD_DATE_TIME => parse_timestamp(lexical),
            XSD_STRING => Ok(Value::text(lexical)),
            other => {
                let local = other.strip_prefix(XSD_NAMESPACE).unwrap_or_default();
                if INTEGER_FAMILY.contains(&local) {
                    return parse_integer(lexical);
                }
                if matches!(local, "double" | "decimal") {
                    return parse_float(lexical);
                }
                match self.handlers.values().find(|h| h.datatype() == other) {
                    Some(handler) => Ok(Value::Custom {
                        kind: handler.kind().to_owned(),
                        payload: handler.from_lexical(lexical)?,
                    }),
                    None => Ok(Value::text(lexical)),
                }
            }
        }
    }

    /// Decode a locator back into a reference, term or foreign locator.
    ///
    /// A locator matching neither the id nor the vocabulary prefix is
    /// passed through unchanged as `Value::Iri`.
    #[must_use]
    pub fn decode_locator(&self, locator: &str) -> Value {
        decode_locator(locator)
    }
}

/// Decode a locator without any codec state.
#[must_use]
pub fn decode_locator(locator: &str) -> Value {
    if locator == RDF_NIL {
        return Value::Null;
    }
    if let Some(reference) = locator
        .strip_prefix(ID_NAMESPACE)
        .and_then(Reference::new)
    {
        return Value::Reference(reference);
    }
    if let Some(name) = locator.strip_prefix(VOCABULARY_NAMESPACE) {
        return Value::term(name);
    }
    Value::Iri(locator.to_owned())
}

/// Encode a vocabulary token used as a predicate or a type.
///
/// # Errors
///
/// Returns `UnknownOperator` for `@`-prefixed names outside the reserved
/// vocabulary.
pub fn encode_term(name: &str) -> Result<String> {
    if name.starts_with('@') {
        return reserved_term(name).ok_or_else(|| Error::UnknownOperator(name.to_owned()));
    }
    if name.starts_with('<') && name.ends_with('>') {
        return Ok(name.to_owned());
    }
    Ok(format!(":{name}"))
}

fn reserved_term(name: &str) -> Option<String> {
    let term = match name {
        "@type" => return Some("rdf:type".to_owned()),
        "@subclass" => format!("{RDFS_NAMESPACE}subClassOf"),
        "@subproperty" => format!("{RDFS_NAMESPACE}subPropertyOf"),
        "@domain" => format!("{RDFS_NAMESPACE}domain"),
        "@range" => format!("{RDFS_NAMESPACE}range"),
        "@same_as" => format!("{OWL_NAMESPACE}sameAs"),
        "@functional" => format!("{OWL_NAMESPACE}FunctionalProperty"),
        "@some" => format!("{OWL_NAMESPACE}someValuesFrom"),
        "@all" => format!("{OWL_NAMESPACE}allValuesFrom"),
        _ => return None,
    };
    Some(format!("<{term}>"))
}

const INTEGER_FAMILY: [&str; 7] = [
    "int",
    "long",
    "short",
    "nonNegativeInteger",
    "positiveInteger",
    "negativeInteger",
    "nonPositiveInteger",
];

fn typed(lexical: &str, datatype: &str) -> String {
    format!("\"{lexical}\"^^<{datatype}>")
}

fn float_lexical(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        (if n > 0.0 { "INF" } else { "-INF" }).to_owned()
    } else {
        format!("{n:?}")
    }
}

/// Escape text so it can sit inside a double-quoted literal.
#[must_use]
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn expand_xsd(datatype: &str) -> String {
    datatype.strip_prefix("xsd:").map_or_else(
        || datatype.to_owned(),
        |local| format!("{XSD_NAMESPACE}{local}"),
    )
}

fn malformed(lexical: &str, datatype: &str) -> Error {
    Error::MalformedResponse(format!("`{lexical}` is not a valid <{datatype}> literal"))
}

fn parse_integer(lexical: &str) -> Result<Value> {
    lexical
        .trim()
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| malformed(lexical, XSD_INTEGER))
}

fn parse_float(lexical: &str) -> Result<Value> {
    lexical
        .trim()
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| malformed(lexical, XSD_FLOAT))
}

fn parse_timestamp(lexical: &str) -> Result<Value> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(lexical) {
        return Ok(Value::Timestamp(ts));
    }
    // Timestamps without an offset are read as UTC.
    NaiveDateTime::parse_from_str(lexical, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Value::Timestamp(naive.and_utc().fixed_offset()))
        .map_err(|_| malformed(lexical, XSD_DATE_TIME))
}
