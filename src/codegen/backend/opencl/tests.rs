use super::*;
use crate::ast::fixtures::*;
use crate::ast::*;
use crate::codegen::{Backend, GenError, GenOptions};

fn generate(program: &Program) -> GenResult<String> {
    let mut files = OpenClBackend::new().generate(program, &GenOptions::new("cl", "out/prog"))?;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path.to_str(), Some("out/prog.cl"));
    Ok(files.remove(0).contents)
}

fn run_body(params: Vec<Param>, return_type: Type, stmts: Vec<Stmt>) -> String {
    generate(&single_method(params, return_type, stmts)).unwrap()
}

#[test]
fn test_opencl_scalar_types() {
    let packet = class(
        "Packet",
        vec![
            Member::Field(field("Data", Type::array_storage(Type::byte(), 4), None)),
            Member::Field(field("Kind", Type::Int(IntKind::SByte), None)),
            Member::Field(field("Total", Type::Int(IntKind::Long), None)),
            Member::Field(field("Name", Type::String, None)),
            Member::Field(field("Valid", Type::Bool, None)),
        ],
    );
    let out = generate(&single_class(packet)).unwrap();
    assert!(out.contains(
        "struct Packet {\n\
         \tuchar data[4];\n\
         \tchar kind;\n\
         \tlong total;\n\
         \tconstant char *name;\n\
         \tbool valid;\n\
         };\n"
    ));
    assert!(!out.contains("#include"));
    assert!(!out.contains("int8_t"));
}

#[test]
fn test_streq_helper_precedes_bodies() {
    let a = Expr::var("a", Type::String);
    let b = Expr::var("b", Type::String);
    let out = run_body(
        vec![param("A", Type::String), param("B", Type::String)],
        Type::Bool,
        vec![ret(Expr::binary(a, BinaryOp::NotEq, b))],
    );
    assert!(out.contains("\treturn !streq(a, b);\n"), "{}", out);
    let helper = out.find("static bool streq(").unwrap();
    let declaration = out.find("bool Test_Run(constant char *a, constant char *b);").unwrap();
    let body = out.find("bool Test_Run(constant char *a, constant char *b)\n{").unwrap();
    assert!(declaration < helper && helper < body);
    assert!(!out.contains("static int strlen("));
    assert!(!out.contains("strcmp"));
}

#[test]
fn test_strlen_helper_only_when_used() {
    let s = Expr::var("s", Type::String);
    let out = run_body(
        vec![param("S", Type::String)],
        Type::int(),
        vec![ret(Expr::property(s, BuiltinProperty::StringLength))],
    );
    assert!(out.contains("static int strlen(constant char *str)\n{\n"));
    assert!(out.contains("\treturn strlen(s);\n"));
    assert!(!out.contains("streq"));

    let out = run_body(vec![], Type::int(), vec![ret(Expr::int(1))]);
    assert_eq!(out, "int Test_Run(void);\n\nint Test_Run(void)\n{\n\treturn 1;\n}\n");
}

#[test]
fn test_sign_extend_casts_to_char() {
    let b = Expr::var("b", Type::int());
    let out = run_body(
        vec![],
        Type::int(),
        vec![ret(Expr::property(b, BuiltinProperty::SignExtendByte))],
    );
    assert!(out.contains("return (char) b;"));
}

#[test]
fn test_array_copy_is_unmapped() {
    let source = Expr::var("src", Type::array_storage(Type::byte(), 4));
    let dest = Expr::var("dst", Type::array_ref(Type::byte()));
    let copy = Expr::builtin(
        Some(source),
        BuiltinMethod::ArrayCopyTo,
        vec![Expr::int(0), dest, Expr::int(0), Expr::int(4)],
    );
    let program = single_method(vec![], Type::Void, vec![Stmt::Expr(copy)]);
    assert_eq!(
        generate(&program).unwrap_err(),
        GenError::UnmappedBuiltin {
            backend: "cl",
            builtin: "array.CopyTo",
        }
    );
}

#[test]
fn test_interpolated_string_is_unsupported() {
    let text = Expr::new(
        ExprKind::Interpolated {
            parts: vec![InterpolatedPart {
                prefix: "x=".into(),
                arg: Expr::int(1),
                width: None,
                format: None,
                precision: None,
            }],
            suffix: String::new(),
        },
        Type::String,
    );
    let program = single_method(vec![], Type::Void, vec![local("S", Type::String, Some(text))]);
    match generate(&program) {
        Err(GenError::Unsupported { backend, feature }) => {
            assert_eq!(backend, "cl");
            assert!(feature.contains("OpenCL"), "{}", feature);
        }
        other => panic!("expected unsupported, got {:?}", other),
    }
}

#[test]
fn test_tables_live_in_constant_space() {
    let mut tables = class("Tables", vec![]);
    tables.const_arrays.push(konst(
        "CrcTable",
        Type::array_ref(Type::byte()),
        ConstValue::Array(vec![ConstValue::Int(1), ConstValue::Int(2), ConstValue::Int(3)]),
    ));
    let mut program = single_class(tables);
    program.resources.insert("a.bin".into(), vec![7]);
    let out = generate(&program).unwrap();
    assert!(out.contains("constant unsigned char CiResource_a_bin[] = {\n\t0x07\n};\n"));
    assert!(out.contains("constant uchar Tables_CRC_TABLE[3] = { 1, 2, 3 };\n"));
    assert!(!out.contains("static"));
}

#[test]
fn test_long_printf_has_no_cast() {
    let total = Expr::var("total", Type::Int(IntKind::Long));
    let print = Expr::builtin(None, BuiltinMethod::ConsoleWriteLine, vec![total]);
    let out = run_body(vec![], Type::Void, vec![Stmt::Expr(print)]);
    assert!(out.contains("\tprintf(\"%ld\\n\", total);\n"), "{}", out);
}

#[test]
fn test_address_space_names_are_escaped() {
    let out = run_body(
        vec![],
        Type::Void,
        vec![
            local("Global", Type::int(), Some(Expr::int(1))),
            local("Uchar", Type::int(), Some(Expr::int(2))),
        ],
    );
    assert!(out.contains("\tint global_ = 1;\n\tint uchar_ = 2;\n"), "{}", out);
}
