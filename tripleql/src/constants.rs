//! Wire-level constants shared by the encoder, compiler and decoder.
//!
//! These strings are part of the addressing scheme stored data relies on.
//! Changing any of them makes previously stored graphs unreadable.

/// Namespace for property and type tokens (`:name`).
pub const VOCABULARY_NAMESPACE: &str = "http://grel.org/vocabulary#";

/// Prefix of locators built from explicit `@id(name)` references.
pub const ID_NAMESPACE: &str = "http://grel.org/ids/id/";

/// XML Schema datatype namespace.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

pub const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";
pub const XPATH_FUNCTIONS_NAMESPACE: &str = "http://www.w3.org/2005/xpath-functions#";

/// `rdf:nil`, stored as a plain literal to represent an explicit null.
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Reserved node key holding the identifier.
pub const ID_KEY: &str = "@id";

/// Reserved pattern key marking a sub-pattern as optional.
pub const OPTIONAL_KEY: &str = "$optional";

/// Prefix of pattern keys whose edge direction is reversed.
pub const INVERSE_PREFIX: &str = "$inv_";

/// Prefix of wildcard keys and values (`?` alone binds and discards).
pub const WILDCARD_PREFIX: &str = "?";

/// Media type of serialized triple documents.
pub const TURTLE_MEDIA_TYPE: &str = "text/turtle";

/// Media type requested when fetching matched nodes for removal.
pub const RDF_XML_MEDIA_TYPE: &str = "application/rdf+xml";
