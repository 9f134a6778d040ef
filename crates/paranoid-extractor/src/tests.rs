//! Crate-level smoke tests: extractor dispatch and cross-language extraction.

use crate::extractor::get_extractor;
use crate::parser_pool::create_parser_pool;
use paranoid_core::{EntityKind, RelationshipKind};
use std::path::PathBuf;

#[test]
fn dispatches_an_extractor_for_every_known_extension() {
    let cases = [
        "main.rs", "app.ts", "index.js", "lib.py", "main.go", "Main.java", "main.c", "main.cpp", "unknown.xyz",
    ];
    let pool = create_parser_pool();
    for filename in cases {
        let path = PathBuf::from(filename);
        let extractor = get_extractor(&path, pool.clone());
        assert!(extractor.is_some(), "expected an extractor for {filename}");
        let result = extractor.unwrap().extract(&path, b"");
        assert!(result.is_ok(), "extraction on empty content failed for {filename}");
    }
}

#[test]
fn get_extractor_returns_none_without_an_extension() {
    let pool = create_parser_pool();
    assert!(get_extractor(&PathBuf::from("Makefile"), pool).is_none());
}

#[test]
fn python_extraction_yields_class_method_function_and_call_edge() {
    let pool = create_parser_pool();
    let path = PathBuf::from("auth.py");
    let extractor = get_extractor(&path, pool).unwrap();
    let code = r#"
class User:
    def login(self):
        return True

def authenticate(user):
    return user.login()
"#;
    let result = extractor.extract(&path, code.as_bytes()).unwrap();

    let classes: Vec<_> = result.entities.iter().filter(|e| e.kind == EntityKind::Class).collect();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].qualified_name, "User");

    let methods: Vec<_> = result.entities.iter().filter(|e| e.kind == EntityKind::Method).collect();
    assert!(methods.iter().any(|m| m.qualified_name == "User.login"));

    assert!(result.relationships.iter().any(|r| r.kind == RelationshipKind::Calls));
}

#[test]
fn javascript_extraction_yields_class_and_instantiation() {
    let pool = create_parser_pool();
    let path = PathBuf::from("app.js");
    let extractor = get_extractor(&path, pool).unwrap();
    let code = r#"
class Widget {
    render() {
        return "ok";
    }
}
function build() {
    return new Widget();
}
"#;
    let result = extractor.extract(&path, code.as_bytes()).unwrap();
    assert!(result.entities.iter().any(|e| e.kind == EntityKind::Class && e.name == "Widget"));
    assert!(result.relationships.iter().any(|r| r.kind == RelationshipKind::Instantiates));
}

#[test]
fn invalid_utf8_is_reported_as_an_error() {
    let pool = create_parser_pool();
    let path = PathBuf::from("binary.py");
    let extractor = get_extractor(&path, pool).unwrap();
    let invalid_utf8 = vec![0xFF, 0xFE, 0xFD];
    assert!(extractor.extract(&path, &invalid_utf8).is_err());
}
