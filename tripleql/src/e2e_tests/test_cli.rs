//! Test: command-line commands over JSON files.

use clap::Parser;
use serde_json::json;

use super::helpers::{json_file, test_config};
use crate::cli::{Cli, CliError, execute};

fn run(args: &[&str]) -> Result<String, CliError> {
    let mut argv = vec!["tripleql"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    execute(&cli, &test_config(false))
}

fn path(file: &tempfile::NamedTempFile) -> &str {
    file.path().to_str().unwrap()
}

#[test]
fn test_query_command_renders_describe() {
    let pattern = json_file(&json!({"name": "?name"}));
    let output = run(&["query", path(&pattern)]).unwrap();
    assert!(output.starts_with("PREFIX : <http://grel.org/vocabulary#>"));
    assert!(output.ends_with("DESCRIBE ?S_0 WHERE { ?S_0 :name ?name }"));
}

#[test]
fn test_query_command_select_with_union() {
    let first = json_file(&json!({"name": "?name"}));
    let second = json_file(&json!({"nick": "?name"}));
    let output = run(&["query", path(&first), "--select", "--union", path(&second)]).unwrap();
    assert!(output.ends_with(
        "SELECT DISTINCT ?name WHERE { { ?S_0 :name ?name } UNION { ?S_0 :nick ?name } }"
    ));
}

#[test]
fn test_query_command_rejects_non_object() {
    let pattern = json_file(&json!([1, 2, 3]));
    assert!(matches!(
        run(&["query", path(&pattern)]),
        Err(CliError::Input { .. })
    ));
}

#[test]
fn test_turtle_command() {
    let data = json_file(&json!({"@id": "@id(alice)", "name": "Alice"}));
    let output = run(&["turtle", path(&data)]).unwrap();
    assert!(output.ends_with("<http://grel.org/ids/id/alice> :name \"Alice\" ."));

    let schema = json_file(&json!([":Developer", ":@subclass", ":Person"]));
    let output = run(&["turtle", path(&schema), "--schema"]).unwrap();
    assert!(output.contains("@prefix rdfs:"));
    assert!(output.contains(":Developer <http://www.w3.org/2000/01/rdf-schema#subClassOf> :Person"));
}

#[test]
fn test_decode_command() {
    let results = json_file(&json!([
        {"@id": "http://grel.org/ids/id/a", ":child": {"@id": "http://grel.org/ids/id/b"}},
        {"@id": "http://grel.org/ids/id/b", ":name": "b"}
    ]));
    let output = run(&["decode", path(&results), "--unlink"]).unwrap();
    let decoded: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        decoded,
        json!([{"@id": "@id(a)", "child": {"@id": "@id(b)", "name": "b"}}])
    );
}

#[test]
fn test_decode_tuples_command() {
    let results = json_file(&json!({"results": {"bindings": [
        {"?name": {"type": "literal", "value": "Alice"}}
    ]}}));
    let output = run(&["decode", path(&results), "--tuples"]).unwrap();
    let decoded: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(decoded, json!([{"name": "Alice"}]));
}

#[test]
fn test_invalid_json_input() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "{not json").unwrap();
    assert!(matches!(
        run(&["decode", path(&file)]),
        Err(CliError::Json { .. })
    ));
}

#[test]
fn test_config_command_hides_password() {
    let output = run(&["config"]).unwrap();
    let config: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(config["database"], "people");
    assert!(config.get("password").is_none());
}
