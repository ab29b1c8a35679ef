//! Test: schema definitions and integrity constraints.

use super::helpers::TestGraph;
use crate::error::Error;
use crate::testing::Call;
use crate::types::Value;

const SUBCLASS: &str = "<http://www.w3.org/2000/01/rdf-schema#subClassOf>";

fn developer_is_a_person() -> Vec<Value> {
    vec![
        Value::term("Developer"),
        Value::term("@subclass"),
        Value::term("Person"),
    ]
}

#[test]
fn test_define_writes_to_schema_graph() {
    let mut t = TestGraph::new();
    t.runtime
        .block_on(t.graph.define(&developer_is_a_person()))
        .unwrap();
    let calls = t.store().calls_after_connect();
    let [Call::Add {
        document, graph, ..
    }] = calls.as_slice()
    else {
        panic!("expected one add, got {calls:?}");
    };
    assert_eq!(graph.as_deref(), Some("people:schema"));
    assert!(document.contains("@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> . "));
    assert!(document.ends_with(&format!(":Developer {SUBCLASS} :Person .")));
}

#[test]
fn test_retract_definition_removes_from_schema_graph() {
    let mut t = TestGraph::new();
    t.runtime
        .block_on(t.graph.retract_definition(&developer_is_a_person()))
        .unwrap();
    assert!(matches!(
        t.store().calls_after_connect().as_slice(),
        [Call::Remove { graph: Some(graph), .. }] if graph == "people:schema"
    ));
}

#[test]
fn test_validate_and_retract_use_constraint_calls() {
    let mut t = TestGraph::new();
    let statements = developer_is_a_person();
    t.runtime.block_on(t.graph.validate(&statements)).unwrap();
    t.runtime
        .block_on(t.graph.retract_validation(&statements))
        .unwrap();
    let calls = t.store().calls_after_connect();
    let [Call::AddIcv { document: added, .. }, Call::RemoveIcv { document: removed, .. }] =
        calls.as_slice()
    else {
        panic!("expected add then remove of constraints, got {calls:?}");
    };
    assert_eq!(added, removed);
    assert!(added.contains(&format!(":Developer {SUBCLASS} :Person")));
}

#[test]
fn test_statements_come_in_triples() {
    let mut t = TestGraph::new();
    let statements = vec![Value::term("Developer"), Value::term("@subclass")];
    assert!(matches!(
        t.runtime.block_on(t.graph.define(&statements)),
        Err(Error::UnsupportedValueKind(_))
    ));
    assert!(t.store().calls_after_connect().is_empty());
}
