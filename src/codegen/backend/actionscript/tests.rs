use super::*;
use crate::ast::fixtures::*;
use crate::codegen::GenError;

fn generate(program: &Program) -> GenResult<Vec<OutputFile>> {
    ActionScriptBackend::new().generate(program, &GenOptions::new("as", "out"))
}

fn file<'a>(files: &'a [OutputFile], name: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path.file_name().is_some_and(|n| n == name))
        .map(|f| f.contents.as_str())
        .unwrap_or_else(|| panic!("no file {}", name))
}

fn run_body(stmts: Vec<Stmt>) -> String {
    let program = single_method(vec![], Type::Void, stmts);
    let files = generate(&program).unwrap();
    file(&files, "Test.as").to_string()
}

#[test]
fn test_enum_file() {
    let program = Program {
        enums: vec![color_enum()],
        globals: vec![GlobalRef::Enum(EnumId(0))],
        ..Program::default()
    };
    let files = generate(&program).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, PathBuf::from("out/Color.as"));
    assert_eq!(
        files[0].contents,
        "package\n\
         {\n\
         \timport flash.utils.ByteArray;\n\
         \n\
         \tpublic class Color\n\
         \t{\n\
         \t\tpublic static const RED : int = 0;\n\
         \t\tpublic static const GREEN : int = 1;\n\
         \t\tpublic static const BLUE : int = 2;\n\
         \t}\n\
         }\n"
    );
}

#[test]
fn test_namespace_names_package() {
    let program = single_method(vec![], Type::Void, vec![]);
    let options = GenOptions::new("as", "out").with_namespace("com.example");
    let files = ActionScriptBackend::new().generate(&program, &options).unwrap();
    assert!(files[0].contents.starts_with("package com.example\n{\n"));
}

#[test]
fn test_method_signature() {
    let program = single_method(
        vec![param("Text", Type::String), param("Count", Type::int())],
        Type::Bool,
        vec![ret(Expr::bool(true))],
    );
    let files = generate(&program).unwrap();
    let out = file(&files, "Test.as");
    assert!(out.contains(
        "\t\tpublic static function run(text : String, count : int) : Boolean\n\
         \t\t{\n\
         \t\t\treturn true;\n\
         \t\t}\n"
    ));
}

#[test]
fn test_long_is_unmapped() {
    let program = single_class(class(
        "Counter",
        vec![Member::Field(field("Total", Type::Int(IntKind::Long), None))],
    ));
    match generate(&program) {
        Err(GenError::UnmappedType { backend, ty }) => {
            assert_eq!(backend, "as");
            assert_eq!(ty, "long");
        }
        other => panic!("expected unmapped type, got {:?}", other),
    }
}

#[test]
fn test_integer_division_truncates() {
    let out = run_body(vec![local(
        "q",
        Type::int(),
        Some(Expr::binary(Expr::int(-7), BinaryOp::Div, Expr::int(2))),
    )]);
    assert!(out.contains("var q : int = int(-7 / 2);"), "{}", out);
}

fn divide_assign(target: Expr) -> Stmt {
    Stmt::Assign {
        target,
        op: AssignOp::Div,
        value: Expr::int(2),
    }
}

fn element(array: Expr, index: Expr) -> Expr {
    Expr::new(
        ExprKind::Index {
            array: Box::new(array),
            index: Box::new(index),
        },
        Type::int(),
    )
}

#[test]
fn test_integer_divide_assign_truncates() {
    let a = Expr::var("a", Type::array_ref(Type::int()));
    let target = element(a, Expr::var("i", Type::int()));
    let program = single_method(vec![], Type::Void, vec![divide_assign(target)]);
    let files = generate(&program).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].contents.contains("a[i] = int(a[i] / 2);"), "{}", files[0].contents);
}

#[test]
fn test_divide_assign_with_side_effect_uses_helper() {
    let a = Expr::var("a", Type::array_ref(Type::int()));
    let i = Expr::unary(UnaryOp::PostInc, Expr::var("i", Type::int()));
    let program = single_method(vec![], Type::Void, vec![divide_assign(element(a, i))]);
    let files = generate(&program).unwrap();
    let test = file(&files, "Test.as");
    assert!(test.contains("Ci.divideElement(a, i++, 2);"), "{}", test);
    assert!(!test.contains("/="));
    assert!(file(&files, "Ci.as").contains("return a[i] = int(a[i] / v);"));
}

#[test]
fn test_divide_assign_on_side_effect_field_is_unsupported() {
    let make = call(None, ClassId(0), "Make", vec![], Type::ClassRef(ClassId(0)));
    let target = Expr::field(make, "Total", Type::int());
    let program = single_method(vec![], Type::Void, vec![divide_assign(target)]);
    let err = generate(&program).unwrap_err();
    assert!(matches!(err, GenError::Unsupported { .. }), "{:?}", err);
}

#[test]
fn test_float_division_is_plain() {
    let x = Expr::var("x", Type::Float(FloatKind::Double));
    let out = run_body(vec![local(
        "h",
        Type::Float(FloatKind::Double),
        Some(Expr::binary(x.clone(), BinaryOp::Div, x)),
    )]);
    assert!(out.contains("var h : Number = x / x;"), "{}", out);
}

#[test]
fn test_non_finite_floats_are_named() {
    let float = |f: f64| {
        Expr::new(
            ExprKind::Literal(Literal::Float(f)),
            Type::Float(FloatKind::Double),
        )
    };
    let out = run_body(vec![
        local("a", Type::Float(FloatKind::Double), Some(float(f64::INFINITY))),
        local(
            "b",
            Type::Float(FloatKind::Double),
            Some(Expr::binary(float(1.0), BinaryOp::Sub, float(f64::NEG_INFINITY))),
        ),
        local("c", Type::Float(FloatKind::Double), Some(float(f64::NAN))),
    ]);
    assert!(out.contains("var a : Number = Infinity;"), "{}", out);
    assert!(out.contains("var b : Number = 1.0 - -Infinity;"), "{}", out);
    assert!(out.contains("var c : Number = NaN;"), "{}", out);
}

#[test]
fn test_sign_extend_byte_is_parenthesized_under_mul() {
    let b = Expr::var("b", Type::int());
    let value = Expr::binary(
        Expr::property(b, BuiltinProperty::SignExtendByte),
        BinaryOp::Mul,
        Expr::int(2),
    );
    let out = run_body(vec![local("x", Type::int(), Some(value))]);
    assert!(out.contains("var x : int = ((b ^ 128) - 128) * 2;"), "{}", out);
}

#[test]
fn test_low_byte_under_equality() {
    let b = Expr::var("b", Type::int());
    let value = Expr::binary(
        Expr::property(b, BuiltinProperty::LowByte),
        BinaryOp::Eq,
        Expr::int(0),
    );
    let out = run_body(vec![local("z", Type::Bool, Some(value))]);
    assert!(out.contains("var z : Boolean = (b & 0xff) == 0;"), "{}", out);
}

#[test]
fn test_substring_without_side_effect_is_inline() {
    let s = Expr::var("s", Type::String);
    let call = Expr::builtin(
        Some(s),
        BuiltinMethod::Substring,
        vec![Expr::var("i", Type::int()), Expr::int(3)],
    );
    let program = single_method(vec![], Type::String, vec![ret(call)]);
    let files = generate(&program).unwrap();
    assert_eq!(files.len(), 1, "no helper file expected");
    assert!(files[0].contents.contains("return s.substring(i, i + 3);"));
}

#[test]
fn test_substring_with_side_effect_uses_helper() {
    let s = Expr::var("s", Type::String);
    let start = Expr::unary(UnaryOp::PostInc, Expr::var("i", Type::int()));
    let call = Expr::builtin(Some(s), BuiltinMethod::Substring, vec![start, Expr::int(3)]);
    let program = single_method(vec![], Type::String, vec![ret(call)]);
    let files = generate(&program).unwrap();
    assert!(file(&files, "Test.as").contains("return Ci.substring(s, i++, 3);"));
    let ci = file(&files, "Ci.as");
    assert!(ci.contains("internal class Ci"));
    assert!(ci.contains("public static function substring("));
    assert!(!ci.contains("copyArray"));
}

#[test]
fn test_helpers_do_not_leak_between_runs() {
    let mut backend = ActionScriptBackend::new();
    let options = GenOptions::new("as", "out");
    let clear = Expr::builtin(
        Some(Expr::var("a", Type::array_storage(Type::byte(), 4))),
        BuiltinMethod::ArrayClear,
        vec![],
    );
    let first = single_method(vec![], Type::Void, vec![Stmt::Expr(clear)]);
    let files = backend.generate(&first, &options).unwrap();
    assert!(file(&files, "Ci.as").contains("clearArray"));

    let second = single_method(vec![], Type::Void, vec![]);
    let files = backend.generate(&second, &options).unwrap();
    assert_eq!(files.len(), 1);
}

#[test]
fn test_console_write_is_unmapped() {
    let call = Expr::builtin(None, BuiltinMethod::ConsoleWrite, vec![Expr::string("x")]);
    let program = single_method(vec![], Type::Void, vec![Stmt::Expr(call)]);
    let err = generate(&program).unwrap_err();
    assert_eq!(
        err,
        GenError::UnmappedBuiltin {
            backend: "as",
            builtin: "Console.Write",
        }
    );
}

#[test]
fn test_console_write_line_is_trace() {
    let call = Expr::builtin(None, BuiltinMethod::ConsoleWriteLine, vec![Expr::string("hi")]);
    let out = run_body(vec![Stmt::Expr(call)]);
    assert!(out.contains("trace(\"hi\");"));
}

#[test]
fn test_storage_field_gets_exactly_one_initializer() {
    let program = single_class(class(
        "Decoder",
        vec![
            Member::Field(field(
                "Buffer",
                Type::array_storage(Type::byte(), 16),
                Some(Expr::null()),
            )),
            Member::Field(field("Table", Type::array_storage(Type::int(), 8), None)),
            Member::Field(field("Count", Type::int(), Some(Expr::int(5)))),
        ],
    ));
    let files = generate(&program).unwrap();
    let out = file(&files, "Decoder.as");
    assert!(out.contains("private const buffer : ByteArray = new ByteArray();"));
    assert!(out.contains("private const table : Array = new Array(8);"));
    assert!(out.contains("private var count : int = 5;"));
    assert!(!out.contains("= null"));
}

#[test]
fn test_class_storage_local_is_constructed() {
    let decoder = class("Decoder", vec![]);
    let mut program = single_method(
        vec![],
        Type::Void,
        vec![local("d", Type::ClassStorage(ClassId(1)), None)],
    );
    program.classes.push(decoder);
    program.globals.push(GlobalRef::Class(ClassId(1)));
    let files = generate(&program).unwrap();
    assert!(file(&files, "Test.as").contains("var d : Decoder = new Decoder();"));
}

#[test]
fn test_enum_and_const_references() {
    let mut program = single_class(class(
        "Palette",
        vec![
            Member::Const(konst(
                "Default",
                Type::Enum(EnumId(0)),
                ConstValue::EnumValue {
                    enum_id: EnumId(0),
                    index: 2,
                },
            )),
            Member::Const(ConstDef {
                visibility: Visibility::Private,
                ..konst("Hidden", Type::int(), ConstValue::Int(1))
            }),
        ],
    ));
    program.enums.push(color_enum());
    let out = &generate(&program).unwrap()[0].contents;
    assert!(out.contains("public static const DEFAULT : int = Color.BLUE;"));
    assert!(!out.contains("HIDDEN"));
}

#[test]
fn test_private_const_is_inlined() {
    let mut limits = class(
        "Limits",
        vec![
            Member::Const(ConstDef {
                visibility: Visibility::Private,
                ..konst("Floor", Type::int(), ConstValue::Int(-4))
            }),
            Member::Const(konst("Ceiling", Type::int(), ConstValue::Int(9))),
        ],
    );
    let floor = Expr::new(
        ExprKind::Const {
            class: ClassId(0),
            name: "Floor".into(),
        },
        Type::int(),
    );
    let ceiling = Expr::new(
        ExprKind::Const {
            class: ClassId(0),
            name: "Ceiling".into(),
        },
        Type::int(),
    );
    limits.members.push(Member::Method(static_method(
        "Span",
        vec![],
        Type::int(),
        vec![ret(Expr::binary(
            ceiling,
            BinaryOp::Sub,
            Expr::unary(UnaryOp::Neg, floor),
        ))],
    )));
    let out = &generate(&single_class(limits)).unwrap()[0].contents;
    assert!(out.contains("return CEILING - -(-4);"), "{}", out);
    assert!(!out.contains("FLOOR"));
}

#[test]
fn test_const_array_table() {
    let mut palette = class("Palette", vec![]);
    palette.const_arrays.push(ConstDef {
        global_name: Some("CrcTable".into()),
        visibility: Visibility::Private,
        ..konst(
            "Table",
            Type::array_ref(Type::int()),
            ConstValue::Array(vec![ConstValue::Int(1), ConstValue::Int(2)]),
        )
    });
    let out = &generate(&single_class(palette)).unwrap()[0].contents;
    assert!(out.contains("private static const CRC_TABLE : Array = [ 1, 2 ];"));
}

#[test]
fn test_if_else_chain_layout() {
    let x = Expr::var("x", Type::int());
    let stmt = Stmt::If {
        cond: Expr::binary(x.clone(), BinaryOp::Less, Expr::int(0)),
        then_branch: Box::new(Stmt::Block(Block::new(vec![Stmt::Break]))),
        else_branch: Some(Box::new(Stmt::If {
            cond: Expr::binary(x, BinaryOp::Eq, Expr::int(0)),
            then_branch: Box::new(Stmt::Continue),
            else_branch: Some(Box::new(Stmt::Return(None))),
        })),
    };
    let out = run_body(vec![stmt]);
    assert!(
        out.contains(
            "\t\t\tif (x < 0) {\n\
             \t\t\t\tbreak;\n\
             \t\t\t}\n\
             \t\t\telse if (x == 0)\n\
             \t\t\t\tcontinue;\n\
             \t\t\telse\n\
             \t\t\t\treturn;\n"
        ),
        "{}",
        out
    );
}

#[test]
fn test_keyword_names_are_escaped() {
    let out = run_body(vec![local("Function", Type::int(), Some(Expr::int(1)))]);
    assert!(out.contains("var function_ : int = 1;"));
}

#[test]
fn test_interpolated_string_concatenates() {
    let n = Expr::var("n", Type::int());
    let text = Expr::new(
        ExprKind::Interpolated {
            parts: vec![InterpolatedPart {
                prefix: "n=".into(),
                arg: Expr::binary(n.clone(), BinaryOp::Add, Expr::int(1)),
                width: None,
                format: None,
                precision: None,
            }],
            suffix: "!".into(),
        },
        Type::String,
    );
    let out = run_body(vec![local("s", Type::String, Some(text))]);
    assert!(out.contains("var s : String = \"n=\" + (n + 1) + \"!\";"), "{}", out);
}

#[test]
fn test_failed_run_emits_nothing() {
    let mut program = single_method(vec![], Type::Void, vec![]);
    program.enums.push(color_enum());
    program.globals.insert(0, GlobalRef::Enum(EnumId(0)));
    program.classes[0]
        .members
        .push(Member::Field(field("Big", Type::Int(IntKind::Long), None)));
    assert!(generate(&program).is_err());
}
