//! Small program builders shared by unit tests.

use super::*;

pub fn param(name: &str, ty: Type) -> Param {
    Param {
        name: name.to_string(),
        ty,
        doc: None,
    }
}

pub fn method(name: &str, params: Vec<Param>, return_type: Type, stmts: Vec<Stmt>) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        visibility: Visibility::Public,
        doc: None,
        is_static: false,
        params,
        return_type,
        body: Block::new(stmts),
    }
}

pub fn static_method(
    name: &str,
    params: Vec<Param>,
    return_type: Type,
    stmts: Vec<Stmt>,
) -> MethodDef {
    MethodDef {
        is_static: true,
        ..method(name, params, return_type, stmts)
    }
}

pub fn field(name: &str, ty: Type, value: Option<Expr>) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        visibility: Visibility::Private,
        doc: None,
        ty,
        value,
    }
}

pub fn konst(name: &str, ty: Type, value: ConstValue) -> ConstDef {
    ConstDef {
        name: name.to_string(),
        visibility: Visibility::Public,
        doc: None,
        ty,
        value,
        global_name: None,
    }
}

pub fn class(name: &str, members: Vec<Member>) -> ClassDef {
    ClassDef {
        name: name.to_string(),
        visibility: Visibility::Public,
        doc: None,
        constructor: None,
        members,
        const_arrays: Vec::new(),
    }
}

pub fn color_enum() -> EnumDef {
    EnumDef {
        name: "Color".to_string(),
        visibility: Visibility::Public,
        doc: None,
        values: ["Red", "Green", "Blue"]
            .iter()
            .map(|name| EnumValue {
                name: name.to_string(),
                doc: None,
            })
            .collect(),
    }
}

/// A program whose only global is `class`, as `ClassId(0)`.
pub fn single_class(class: ClassDef) -> Program {
    Program {
        classes: vec![class],
        globals: vec![GlobalRef::Class(ClassId(0))],
        ..Program::default()
    }
}

/// A program with one public static method `Run` in class `Test`.
pub fn single_method(params: Vec<Param>, return_type: Type, stmts: Vec<Stmt>) -> Program {
    single_class(class(
        "Test",
        vec![Member::Method(static_method("Run", params, return_type, stmts))],
    ))
}

pub fn ret(expr: Expr) -> Stmt {
    Stmt::Return(Some(expr))
}

pub fn local(name: &str, ty: Type, value: Option<Expr>) -> Stmt {
    Stmt::Var(VarDecl {
        name: name.to_string(),
        ty,
        value,
    })
}

pub fn call(obj: Option<Expr>, class: ClassId, name: &str, args: Vec<Expr>, ty: Type) -> Expr {
    Expr::new(
        ExprKind::Call {
            obj: obj.map(Box::new),
            method: MethodRef::User {
                class,
                name: name.to_string(),
                is_static: false,
            },
            args,
        },
        ty,
    )
}
