//! Test: select queries decoded into variable bindings.

use serde_json::json;

use super::helpers::TestGraph;
use crate::error::Error;
use crate::types::{Value, node};

#[test]
fn test_tuples_bind_named_variables() {
    let mut t = TestGraph::new();
    t.store().respond(
        json!({
            "head": {"vars": ["who", "age"]},
            "results": {"bindings": [
                {
                    "who": {"type": "uri", "value": "http://grel.org/ids/id/alice"},
                    "age": {
                        "type": "literal",
                        "value": "30",
                        "datatype": "http://www.w3.org/2001/XMLSchema#integer"
                    }
                },
                {
                    "who": {"type": "uri", "value": "http://grel.org/ids/id/bob"},
                    "age": {
                        "type": "literal",
                        "value": "25",
                        "datatype": "http://www.w3.org/2001/XMLSchema#integer"
                    }
                }
            ]}
        })
        .to_string(),
    );
    t.graph
        .query(&node([
            ("@id", Value::var("who")),
            ("age", Value::var("age")),
        ]))
        .unwrap();
    let rows = t.runtime.block_on(t.graph.tuples()).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["who"], Value::reference("alice"));
    assert_eq!(rows[0]["age"], Value::Integer(30));
    assert_eq!(rows[1]["who"], Value::reference("bob"));

    let (query, options) = &t.store().queries()[0];
    assert!(query.contains("SELECT DISTINCT ?who ?age WHERE"));
    assert!(!options.describe);
}

#[test]
fn test_tuples_without_bindings_are_malformed() {
    let mut t = TestGraph::new();
    t.store().respond(json!({"boolean": true}).to_string());
    t.graph.query(&node([("age", Value::var("age"))])).unwrap();
    assert!(matches!(
        t.runtime.block_on(t.graph.tuples()),
        Err(Error::MalformedResponse(_))
    ));
}
