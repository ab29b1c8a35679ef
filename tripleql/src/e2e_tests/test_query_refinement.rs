//! Test: refining the current query with unions, limits and offsets.

use super::helpers::TestGraph;
use crate::error::Error;
use crate::types::{Value, node};

#[test]
fn test_refinement_needs_a_query() {
    let mut t = TestGraph::new();
    let pattern = node([("a", Value::Integer(1))]);
    assert!(matches!(t.graph.union(&pattern), Err(Error::NoActiveQuery)));
    assert!(matches!(t.graph.limit(10), Err(Error::NoActiveQuery)));
    assert!(matches!(t.graph.offset(10), Err(Error::NoActiveQuery)));
    assert!(matches!(
        t.runtime.block_on(t.graph.run()),
        Err(Error::NoActiveQuery)
    ));
    assert!(matches!(
        t.runtime.block_on(t.graph.tuples()),
        Err(Error::NoActiveQuery)
    ));
    assert!(t.store().queries().is_empty());
}

#[test]
fn test_failed_compile_drops_previous_query() {
    let mut t = TestGraph::new();
    t.graph.query(&node([("a", Value::Integer(1))])).unwrap();
    assert!(t.graph.last_query().is_some());

    let bad = node([("$bogus", Value::Integer(1))]);
    assert!(matches!(t.graph.query(&bad), Err(Error::UnknownOperator(_))));
    assert!(t.graph.last_query().is_none());
    assert!(matches!(t.graph.limit(1), Err(Error::NoActiveQuery)));
}

#[test]
fn test_union_renders_both_branches() {
    let mut t = TestGraph::new();
    t.store().respond("[]");
    t.graph
        .query(&node([("a", Value::Integer(1))]))
        .unwrap()
        .union(&node([("b", Value::Integer(2))]))
        .unwrap();
    t.runtime.block_on(t.graph.run()).unwrap();

    let (query, _) = &t.store().queries()[0];
    let integer = "^^<http://www.w3.org/2001/XMLSchema#integer>";
    assert!(query.ends_with(&format!(
        "DESCRIBE ?S_0 WHERE {{ {{ ?S_0 :a \"1\"{integer} }} UNION {{ ?S_0 :b \"2\"{integer} }} }}"
    )));
}

#[test]
fn test_limit_and_offset_travel_as_options() {
    let mut t = TestGraph::new();
    t.store().respond("[]");
    t.graph
        .query(&node([("a", Value::any())]))
        .unwrap()
        .limit(10)
        .unwrap()
        .offset(20)
        .unwrap();
    t.runtime.block_on(t.graph.run()).unwrap();

    let (query, options) = &t.store().queries()[0];
    assert_eq!(options.limit, Some(10));
    assert_eq!(options.offset, Some(20));
    assert!(!query.contains("LIMIT"));
}

#[test]
fn test_new_query_resets_limit() {
    let mut t = TestGraph::new();
    t.store().respond("[]");
    t.graph.query(&node([("a", Value::any())])).unwrap().limit(5).unwrap();
    t.graph.query(&node([("b", Value::any())])).unwrap();
    t.runtime.block_on(t.graph.run()).unwrap();
    assert_eq!(t.store().queries()[0].1.limit, None);
}

#[test]
fn test_filter_reaches_the_store() {
    let mut t = TestGraph::new();
    t.store().respond("[]");
    t.graph
        .query(&node([(
            "age",
            Value::Node(node([("$gte", Value::Integer(18))])),
        )]))
        .unwrap();
    t.runtime.block_on(t.graph.run()).unwrap();

    let (query, _) = &t.store().queries()[0];
    assert!(query.contains(
        "FILTER((?F_0_0 >= \"18\"^^<http://www.w3.org/2001/XMLSchema#integer>))"
    ));
}
