//! Test: storing an object graph and reading it back.

use serde_json::json;

use super::helpers::TestGraph;
use crate::constants::TURTLE_MEDIA_TYPE;
use crate::error::Error;
use crate::store::{StoreError, StoreErrorKind};
use crate::testing::Call;
use crate::types::{Reference, Value, node};

fn alice() -> Value {
    Value::Node(node([
        ("@id", Value::reference("alice")),
        ("name", Value::text("Alice")),
        ("age", Value::Integer(30)),
        (
            "knows",
            Value::Node(node([
                ("@id", Value::reference("bob")),
                ("name", Value::text("Bob")),
            ])),
        ),
    ]))
}

#[test]
fn test_store_sends_turtle() {
    let mut t = TestGraph::new();
    t.runtime.block_on(t.graph.store(&alice())).unwrap();

    let calls = t.store().calls_after_connect();
    let [Call::Add {
        database,
        document,
        graph,
        media_type,
    }] = calls.as_slice()
    else {
        panic!("expected one add, got {calls:?}");
    };
    assert_eq!(database, "people");
    assert_eq!(graph, &None);
    assert_eq!(media_type, TURTLE_MEDIA_TYPE);
    assert!(document.starts_with("@prefix : <http://grel.org/vocabulary#> . "));
    assert!(document.contains("<http://grel.org/ids/id/bob> :name \"Bob\""));
    assert!(document.contains(
        "<http://grel.org/ids/id/alice> :age \"30\"^^<http://www.w3.org/2001/XMLSchema#integer>"
    ));
    assert!(
        document.contains("<http://grel.org/ids/id/alice> :knows <http://grel.org/ids/id/bob>")
    );
    // Bob's statements come before the edge that points at him.
    let bob = document.find(":name \"Bob\"").unwrap();
    let edge = document.find(":knows").unwrap();
    assert!(bob < edge);
}

#[test]
fn test_integrity_violation_is_wrapped() {
    let mut t = TestGraph::new();
    t.store().fail_next_write(StoreError::new(
        StoreErrorKind::IntegrityViolation,
        "age must be an integer",
    ));
    let Err(Error::StoreRejected { message, cause }) = t.runtime.block_on(t.graph.store(&alice()))
    else {
        panic!("expected a rejected write");
    };
    assert_eq!(message, "error storing objects in the graph: a validation has failed");
    assert_eq!(cause.message, "age must be an integer");
}

#[test]
fn test_other_write_failures_pass_through() {
    let mut t = TestGraph::new();
    t.store()
        .fail_next_write(StoreError::new(StoreErrorKind::Transport, "connection reset"));
    let result = t.runtime.block_on(t.graph.store(&alice()));
    assert!(matches!(result, Err(Error::Store(e)) if e.kind == StoreErrorKind::Transport));
}

#[test]
fn test_query_decodes_linked_nodes() {
    let mut t = TestGraph::new();
    t.store().respond(
        json!([
            {
                "@id": "http://grel.org/ids/id/alice",
                "http://grel.org/vocabulary#name": "Alice",
                "http://grel.org/vocabulary#age": {
                    "@value": "30",
                    "@type": "http://www.w3.org/2001/XMLSchema#integer"
                },
                "http://grel.org/vocabulary#knows": {"@id": "http://grel.org/ids/id/bob"}
            },
            {
                "@id": "http://grel.org/ids/id/bob",
                "http://grel.org/vocabulary#name": "Bob"
            }
        ])
        .to_string(),
    );
    t.graph
        .query(&node([("knows", Value::Node(node([("name", Value::text("Bob"))])))]))
        .unwrap();

    let first = t.runtime.block_on(t.graph.first(true)).unwrap().unwrap();
    let expected = Value::Node(node([
        ("@id", Value::reference("alice")),
        ("name", Value::text("Alice")),
        ("age", Value::Integer(30)),
        (
            "knows",
            Value::Node(node([
                ("@id", Value::reference("bob")),
                ("name", Value::text("Bob")),
            ])),
        ),
    ]));
    assert_eq!(first, expected);

    let (query, options) = &t.store().queries()[0];
    assert!(query.contains("DESCRIBE ?S_0 ?S_1 WHERE"));
    assert!(query.contains("?S_1 :name \"Bob\""));
    assert!(options.describe);
}

#[test]
fn test_all_keeps_every_node_without_unlink() {
    let mut t = TestGraph::new();
    t.store().respond(
        json!({"@graph": [
            {"@id": "http://grel.org/ids/id/a", ":child": {"@id": "http://grel.org/ids/id/b"}},
            {"@id": "http://grel.org/ids/id/b", ":name": "b"}
        ]})
        .to_string(),
    );
    t.store().respond(
        json!([
            {"@id": "http://grel.org/ids/id/a", ":child": {"@id": "http://grel.org/ids/id/b"}},
            {"@id": "http://grel.org/ids/id/b", ":name": "b"}
        ])
        .to_string(),
    );
    t.graph.query(&node([("child", Value::any())])).unwrap();

    let linked = t.runtime.block_on(t.graph.all(false)).unwrap();
    assert_eq!(linked.len(), 2);
    let unlinked = t.runtime.block_on(t.graph.all(true)).unwrap();
    assert_eq!(unlinked.len(), 1);
    let a = Reference::new("a").unwrap();
    assert_eq!(unlinked.iter().next().unwrap().id, Some(a));
}

#[test]
fn test_first_on_empty_result() {
    let mut t = TestGraph::new();
    t.store().respond("[]");
    t.graph.query(&node([("name", Value::text("nobody"))])).unwrap();
    assert_eq!(t.runtime.block_on(t.graph.first(false)).unwrap(), None);
}

#[test]
fn test_non_json_response_is_malformed() {
    let mut t = TestGraph::new();
    t.store().respond("<rdf:RDF/>");
    t.graph.query(&node([("name", Value::any())])).unwrap();
    assert!(matches!(
        t.runtime.block_on(t.graph.run()),
        Err(Error::MalformedResponse(_))
    ));
}
