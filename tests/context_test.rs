use serde_json::json;
use spice::context::{
    filter_namespace, load_context, parse_document, DataReader, DocumentFormat, Namespace,
};
use spice::error::Error;
use std::fs;
use tempfile::TempDir;

fn namespace(value: serde_json::Value) -> Namespace {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_document_format_from_path() {
    assert_eq!(DocumentFormat::from_path("context.json"), DocumentFormat::Json);
    assert_eq!(DocumentFormat::from_path("context.yml"), DocumentFormat::Yaml);
    assert_eq!(DocumentFormat::from_path("context.YAML"), DocumentFormat::Yaml);
    assert_eq!(DocumentFormat::from_path("context"), DocumentFormat::Unknown);
}

#[test]
fn test_parse_document_falls_back_to_yaml() {
    let parsed = parse_document("name: World\ncount: 3\n", DocumentFormat::Unknown).unwrap();
    assert_eq!(parsed.get("name"), Some(&json!("World")));
    assert_eq!(parsed.get("count"), Some(&json!(3)));

    let parsed = parse_document(r#"{"name": "World"}"#, DocumentFormat::Unknown).unwrap();
    assert_eq!(parsed.get("name"), Some(&json!("World")));
}

#[test]
fn test_parse_empty_document() {
    assert!(parse_document("", DocumentFormat::Yaml).unwrap().is_empty());
    assert!(parse_document("  \n", DocumentFormat::Json).unwrap().is_empty());
}

#[test]
fn test_parse_document_requires_mapping() {
    let result = parse_document("[1, 2, 3]", DocumentFormat::Json);
    assert!(matches!(result, Err(Error::ContextError(_))));
}

#[test]
fn test_filter_drops_private_names() {
    let context = filter_namespace(namespace(json!({
        "name": "World",
        "_helper": 1,
        "__doc__": "hidden",
        "items": [1, 2]
    })))
    .unwrap();

    assert_eq!(context.names().collect::<Vec<_>>(), vec!["name", "items"]);
}

#[test]
fn test_filter_with_exports_keeps_only_exported() {
    let context = filter_namespace(namespace(json!({
        "__all__": ["name", "_private"],
        "name": "x",
        "secret": "y",
        "_private": true
    })))
    .unwrap();

    assert_eq!(context.len(), 2);
    assert!(context.contains("name"));
    assert!(context.contains("_private"));
    assert!(!context.contains("secret"));
    assert!(!context.contains("__all__"));
}

#[test]
fn test_filter_skips_undefined_exports() {
    let context = filter_namespace(namespace(json!({
        "__all__": ["name", "missing"],
        "name": "x"
    })))
    .unwrap();

    assert_eq!(context.names().collect::<Vec<_>>(), vec!["name"]);
}

#[test]
fn test_filter_rejects_invalid_exports() {
    let result = filter_namespace(namespace(json!({ "__all__": "name", "name": "x" })));
    assert!(matches!(result, Err(Error::ContextError(_))));
}

#[test]
fn test_load_context_from_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("context.yaml");
    fs::write(
        &path,
        "__all__: [name]\nname: x\nsecret: y\nnested:\n  key: value\n",
    )
    .unwrap();

    let context = load_context(&DataReader::new(), &path).unwrap();
    assert_eq!(context.names().collect::<Vec<_>>(), vec!["name"]);
    assert_eq!(context.get("name"), Some(&json!("x")));
}

#[test]
fn test_load_context_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = load_context(&DataReader::new(), temp_dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_include_resolves_sibling_documents() {
    let temp_dir = TempDir::new().unwrap();
    let shared = temp_dir.path().join("shared");
    fs::create_dir(&shared).unwrap();
    fs::write(
        shared.join("base.json"),
        r#"{"name": "base", "version": "1.0", "__all__": ["name"]}"#,
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("context.yaml"),
        "_include: [shared/base.json]\nname: override\n",
    )
    .unwrap();

    let context = load_context(&DataReader::new(), temp_dir.path().join("context.yaml")).unwrap();
    assert_eq!(context.get("name"), Some(&json!("override")));
    assert_eq!(context.get("version"), Some(&json!("1.0")));
    assert!(!context.contains("_include"));
}

#[test]
fn test_include_cycle_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.yaml"), "_include: [b.yaml]\na: 1\n").unwrap();
    fs::write(temp_dir.path().join("b.yaml"), "_include: [a.yaml]\nb: 2\n").unwrap();

    let result = load_context(&DataReader::new(), temp_dir.path().join("a.yaml"));
    assert!(matches!(result, Err(Error::ContextError(_))));
}
