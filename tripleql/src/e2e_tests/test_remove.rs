//! Test: removing statements and whole matched nodes.

use super::helpers::TestGraph;
use crate::constants::{RDF_XML_MEDIA_TYPE, TURTLE_MEDIA_TYPE};
use crate::error::Error;
use crate::testing::Call;
use crate::types::{Value, node};

#[test]
fn test_remove_sends_turtle() {
    let mut t = TestGraph::new();
    let data = Value::Node(node([
        ("@id", Value::reference("alice")),
        ("name", Value::text("Alice")),
    ]));
    t.runtime.block_on(t.graph.remove(&data)).unwrap();
    let calls = t.store().calls_after_connect();
    let [Call::Remove {
        document,
        media_type,
        graph,
        ..
    }] = calls.as_slice()
    else {
        panic!("expected one remove, got {calls:?}");
    };
    assert_eq!(media_type, TURTLE_MEDIA_TYPE);
    assert_eq!(graph, &None);
    assert!(document.contains("<http://grel.org/ids/id/alice> :name \"Alice\""));
}

#[test]
fn test_remove_matching_round_trips_rdf_xml() {
    let mut t = TestGraph::new();
    let matched = "<rdf:RDF><rdf:Description/></rdf:RDF>";
    t.store().respond(matched);
    t.graph.query(&node([("name", Value::text("Alice"))])).unwrap();
    t.runtime.block_on(t.graph.remove_matching()).unwrap();

    let calls = t.store().calls_after_connect();
    let [
        Call::Query { query, options, .. },
        Call::Remove {
            document,
            media_type,
            ..
        },
    ] = calls.as_slice()
    else {
        panic!("expected a query then a remove, got {calls:?}");
    };
    assert!(query.contains("DESCRIBE ?S_0 WHERE"));
    assert_eq!(options.accept.as_deref(), Some(RDF_XML_MEDIA_TYPE));
    assert!(options.describe);
    assert_eq!(document, matched);
    assert_eq!(media_type, RDF_XML_MEDIA_TYPE);
}

#[test]
fn test_remove_matching_needs_a_query() {
    let mut t = TestGraph::new();
    assert!(matches!(
        t.runtime.block_on(t.graph.remove_matching()),
        Err(Error::NoActiveQuery)
    ));
    assert!(t.store().calls_after_connect().is_empty());
}
