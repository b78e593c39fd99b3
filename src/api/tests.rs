use super::*;
use crate::ast::fixtures::*;
use crate::ast::{IntKind, Member, Type};
use crate::codegen::GenError;

const DECODER_JSON: &str = r#"{
    "classes": [{
        "name": "Decoder",
        "visibility": "public",
        "members": [{
            "method": {
                "name": "Half",
                "visibility": "public",
                "is_static": true,
                "params": [{ "name": "X", "ty": { "int": "int" } }],
                "return_type": { "int": "int" },
                "body": { "stmts": [{ "return": {
                    "kind": { "binary": {
                        "left": { "kind": { "var": "X" }, "ty": { "int": "int" } },
                        "op": "div",
                        "right": { "kind": { "literal": { "int": 2 } }, "ty": { "int": "int" } }
                    } },
                    "ty": { "int": "int" }
                } }] }
            }
        }]
    }],
    "globals": [{ "class": 0 }]
}"#;

#[test]
fn test_from_json_loads_program() {
    let program = Program::from_json(DECODER_JSON).unwrap();
    assert_eq!(program.classes[0].name, "Decoder");
    assert!(program.classes[0].is_static());
}

#[test]
fn test_from_json_rejects_dangling_ids() {
    let err = Program::from_json(r#"{ "globals": [{ "class": 3 }] }"#).unwrap_err();
    assert!(matches!(err, LoadError::DanglingId(_)), "{:?}", err);
}

#[test]
fn test_from_json_rejects_malformed_input() {
    let err = Program::from_json("{ \"globals\": 7 }").unwrap_err();
    assert!(matches!(err, LoadError::Json(_)));
    assert!(err.to_string().starts_with("malformed program"));
}

#[test]
fn test_generate_picks_backend() {
    let program = Program::from_json(DECODER_JSON).unwrap();
    let files = generate(&program, &GenOptions::new("c", "out/decoder.c")).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].contents.contains("int Decoder_Half(int x)"));

    let files = generate(&program, &GenOptions::new("as", "out")).unwrap();
    assert_eq!(files[0].path, PathBuf::from("out/Decoder.as"));
    assert!(files[0].contents.contains("return int(x / 2);"));
}

#[test]
fn test_generate_unknown_target() {
    let program = single_method(vec![], Type::Void, vec![]);
    let err = generate(&program, &GenOptions::new("java", "out")).unwrap_err();
    assert_eq!(err, GenError::UnknownTarget("java".into()));
}

#[test]
fn test_write_outputs_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let program = single_class(class("Empty", vec![]));
    let files = generate(
        &program,
        &GenOptions::new("as", dir.path().join("gen").join("as")),
    )
    .unwrap();
    write_outputs(&files).unwrap();
    let written = std::fs::read_to_string(dir.path().join("gen/as/Empty.as")).unwrap();
    assert_eq!(written, files[0].contents);
}

#[test]
fn test_failed_generation_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let program = single_class(class(
        "Counter",
        vec![Member::Field(field("Total", Type::Int(IntKind::Long), None))],
    ));
    let options = GenOptions::new("as", dir.path().join("gen"));
    assert!(generate(&program, &options).is_err());
    assert!(!dir.path().join("gen").exists());
}

#[test]
fn test_load_program_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let err = load_program(&missing).unwrap_err();
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn test_default_output() {
    let input = Path::new("src/decoder.json");
    assert_eq!(default_output(input, "as"), PathBuf::from("src/decoder"));
    assert_eq!(default_output(input, "c"), PathBuf::from("src/decoder.c"));
    assert_eq!(default_output(input, "cl"), PathBuf::from("src/decoder.cl"));
}
