//! Typed program model handed over by the resolver.
//!
//! Everything here is read-only to code generation. Enum and class types
//! refer to their declarations by id, so two types are the same type iff
//! their ids are equal, whatever the declarations are called.

pub mod builtins;
pub mod display;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod navigate;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use builtins::{BuiltinMethod, BuiltinProperty};

/// Index of an enum in [`Program::enums`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnumId(pub usize);

/// Index of a class in [`Program::classes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub usize);

/// A whole resolved program.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub classes: Vec<ClassDef>,
    /// Top-level symbols in declaration order.
    pub globals: Vec<GlobalRef>,
    /// Verbatim target code placed before any generated declaration.
    #[serde(default)]
    pub natives: Vec<String>,
    /// Binary resources embedded in the program, by name.
    #[serde(default)]
    pub resources: BTreeMap<String, Vec<u8>>,
}

/// A top-level symbol of the global scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRef {
    Enum(EnumId),
    Class(ClassId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Never referenced; emitted the same way as `Private`.
    Dead,
    #[default]
    Private,
    Internal,
    Public,
}

/// Documentation attached to a symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDoc {
    pub summary: String,
    #[serde(default)]
    pub details: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub doc: Option<CodeDoc>,
    pub values: Vec<EnumValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    #[serde(default)]
    pub doc: Option<CodeDoc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub doc: Option<CodeDoc>,
    /// Statements run when an instance is constructed, after field initializers.
    #[serde(default)]
    pub constructor: Option<Block>,
    /// Fields, constants and methods in declaration order.
    #[serde(default)]
    pub members: Vec<Member>,
    /// Array-typed constants, emitted as static tables after the members.
    #[serde(default)]
    pub const_arrays: Vec<ConstDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Member {
    Field(FieldDef),
    Const(ConstDef),
    Method(MethodDef),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub doc: Option<CodeDoc>,
    pub ty: Type,
    /// Explicit initial value written in the source, if any.
    #[serde(default)]
    pub value: Option<Expr>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConstDef {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub doc: Option<CodeDoc>,
    pub ty: Type,
    pub value: ConstValue,
    /// Name given by the resolver to a constant hoisted out of a method.
    #[serde(default)]
    pub global_name: Option<String>,
}

impl ConstDef {
    /// The name the constant is emitted under.
    pub fn emitted_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub doc: Option<CodeDoc>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Block,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub doc: Option<CodeDoc>,
}

/// A compile-time constant value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    EnumValue { enum_id: EnumId, index: usize },
    Array(Vec<ConstValue>),
}

// ─── Types ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntKind {
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    Long,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatKind {
    Float,
    Double,
}

/// Semantic types, as resolved.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Void,
    Bool,
    Int(IntKind),
    Float(FloatKind),
    String,
    /// Type of the `null` literal.
    Null,
    Enum(EnumId),
    Array(ArrayType),
    /// An inline instance owned by its declaration, constructed eagerly.
    ClassStorage(ClassId),
    /// A reference to an instance owned elsewhere.
    ClassRef(ClassId),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayType {
    pub element: Box<Type>,
    /// True when the declaration owns the elements (a fixed-capacity array).
    #[serde(default)]
    pub storage: bool,
    #[serde(default)]
    pub length: Option<u32>,
}

impl Type {
    pub fn int() -> Self {
        Type::Int(IntKind::Int)
    }

    pub fn byte() -> Self {
        Type::Int(IntKind::Byte)
    }

    pub fn array_ref(element: Type) -> Self {
        Type::Array(ArrayType {
            element: Box::new(element),
            storage: false,
            length: None,
        })
    }

    pub fn array_storage(element: Type, length: u32) -> Self {
        Type::Array(ArrayType {
            element: Box::new(element),
            storage: true,
            length: Some(length),
        })
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int(_))
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Type::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::String)
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            Type::Array(array) => Some(array),
            _ => None,
        }
    }

    /// An array whose elements are bytes.
    pub fn is_byte_array(&self) -> bool {
        self.as_array()
            .is_some_and(|a| *a.element == Type::Int(IntKind::Byte))
    }

    /// Declarations of this type need a default initializer.
    pub fn needs_construction(&self) -> bool {
        match self {
            Type::ClassStorage(_) => true,
            Type::Array(array) => array.storage,
            _ => false,
        }
    }
}

// ─── Statements ────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Block(Block),
    Expr(Expr),
    Var(VarDecl),
    Assign {
        target: Expr,
        op: AssignOp,
        value: Expr,
    },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        #[serde(default)]
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        advance: Option<Box<Stmt>>,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    Throw(Expr),
    /// Target code copied verbatim.
    Native(String),
}

/// A local variable declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub value: Option<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
        }
    }
}

// ─── Expressions ───────────────────────────────────────────────────

/// An expression together with its resolved type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Literal(Literal),
    /// A local variable or parameter.
    Var(String),
    /// The instance the current method runs on.
    This,
    /// A class constant, scalar or array table.
    Const { class: ClassId, name: String },
    EnumValue { enum_id: EnumId, index: usize },
    Field { obj: Box<Expr>, field: String },
    /// Built-in zero-argument accessor.
    Property {
        obj: Box<Expr>,
        property: BuiltinProperty,
    },
    Call {
        #[serde(default)]
        obj: Option<Box<Expr>>,
        method: MethodRef,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Index { array: Box<Expr>, index: Box<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Select {
        cond: Box<Expr>,
        on_true: Box<Expr>,
        on_false: Box<Expr>,
    },
    Interpolated {
        parts: Vec<InterpolatedPart>,
        #[serde(default)]
        suffix: String,
    },
    /// A named binary resource, as a byte array.
    Resource(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodRef {
    Builtin(BuiltinMethod),
    User {
        class: ClassId,
        name: String,
        #[serde(default)]
        is_static: bool,
    },
}

/// One `{arg}` hole of an interpolated string and the text before it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedPart {
    #[serde(default)]
    pub prefix: String,
    pub arg: Expr,
    #[serde(default)]
    pub width: Option<i32>,
    /// Format letter, e.g. `x` for hexadecimal.
    #[serde(default)]
    pub format: Option<char>,
    #[serde(default)]
    pub precision: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }

    pub fn mutates(&self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// On integer operands this is truncating division.
    Div,
    Mod,
    Shl,
    Shr,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Eq,
    NotEq,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Operators whose result is `bool` regardless of operand types.
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            BinaryOp::Less
                | BinaryOp::LessEq
                | BinaryOp::Greater
                | BinaryOp::GreaterEq
                | BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::And
                | BinaryOp::Or
        )
    }
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty }
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::Literal(Literal::Int(value)), Type::int())
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ExprKind::Literal(Literal::Bool(value)), Type::Bool)
    }

    pub fn string(value: &str) -> Self {
        Self::new(ExprKind::Literal(Literal::Str(value.to_string())), Type::String)
    }

    pub fn null() -> Self {
        Self::new(ExprKind::Literal(Literal::Null), Type::Null)
    }

    pub fn var(name: &str, ty: Type) -> Self {
        Self::new(ExprKind::Var(name.to_string()), ty)
    }

    pub fn this(class: ClassId) -> Self {
        Self::new(ExprKind::This, Type::ClassRef(class))
    }

    pub fn field(obj: Expr, field: &str, ty: Type) -> Self {
        Self::new(
            ExprKind::Field {
                obj: Box::new(obj),
                field: field.to_string(),
            },
            ty,
        )
    }

    /// Binary expression; comparisons and logical operators are `bool`,
    /// everything else takes the left operand's type.
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        let ty = if op.is_boolean() {
            Type::Bool
        } else {
            left.ty.clone()
        };
        Self::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            ty,
        )
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        let ty = if op == UnaryOp::Not {
            Type::Bool
        } else {
            operand.ty.clone()
        };
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
        )
    }

    pub fn property(obj: Expr, property: BuiltinProperty) -> Self {
        Self::new(
            ExprKind::Property {
                obj: Box::new(obj),
                property,
            },
            property.result_type(),
        )
    }

    pub fn builtin(obj: Option<Expr>, method: BuiltinMethod, args: Vec<Expr>) -> Self {
        let ty = method.result_type(args.first().map(|a| &a.ty));
        Self::new(
            ExprKind::Call {
                obj: obj.map(Box::new),
                method: MethodRef::Builtin(method),
                args,
            },
            ty,
        )
    }

    /// Whether evaluating this expression twice could be observed.
    pub fn has_side_effect(&self) -> bool {
        match &self.kind {
            ExprKind::Literal(_)
            | ExprKind::Var(_)
            | ExprKind::This
            | ExprKind::Const { .. }
            | ExprKind::EnumValue { .. }
            | ExprKind::Resource(_) => false,
            ExprKind::Field { obj, .. } | ExprKind::Property { obj, .. } => obj.has_side_effect(),
            ExprKind::Call { obj, method, args } => {
                let call_effect = match method {
                    MethodRef::Builtin(m) => m.has_side_effect(),
                    MethodRef::User { .. } => true,
                };
                call_effect
                    || obj.as_ref().is_some_and(|o| o.has_side_effect())
                    || args.iter().any(Expr::has_side_effect)
            }
            ExprKind::Index { array, index } => array.has_side_effect() || index.has_side_effect(),
            ExprKind::Unary { op, operand } => op.mutates() || operand.has_side_effect(),
            ExprKind::Binary { left, right, .. } => {
                left.has_side_effect() || right.has_side_effect()
            }
            ExprKind::Select {
                cond,
                on_true,
                on_false,
            } => cond.has_side_effect() || on_true.has_side_effect() || on_false.has_side_effect(),
            ExprKind::Interpolated { parts, .. } => parts.iter().any(|p| p.arg.has_side_effect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_have_no_side_effect() {
        assert!(!Expr::int(3).has_side_effect());
        assert!(!Expr::var("i", Type::int()).has_side_effect());
    }

    #[test]
    fn test_increment_has_side_effect() {
        let inc = Expr::unary(UnaryOp::PostInc, Expr::var("i", Type::int()));
        assert!(inc.has_side_effect());
        let sum = Expr::binary(Expr::int(1), BinaryOp::Add, inc);
        assert!(sum.has_side_effect());
    }

    #[test]
    fn test_user_call_has_side_effect() {
        let call = Expr::new(
            ExprKind::Call {
                obj: None,
                method: MethodRef::User {
                    class: ClassId(0),
                    name: "Next".into(),
                    is_static: true,
                },
                args: vec![],
            },
            Type::int(),
        );
        assert!(call.has_side_effect());
    }

    #[test]
    fn test_pure_builtin_propagates_argument_effects() {
        let s = Expr::var("s", Type::String);
        let pure = Expr::builtin(Some(s.clone()), BuiltinMethod::CharAt, vec![Expr::int(0)]);
        assert!(!pure.has_side_effect());
        let impure = Expr::builtin(
            Some(s),
            BuiltinMethod::CharAt,
            vec![Expr::unary(UnaryOp::PreInc, Expr::var("i", Type::int()))],
        );
        assert!(impure.has_side_effect());
    }

    #[test]
    fn test_comparison_is_bool() {
        let cmp = Expr::binary(Expr::int(1), BinaryOp::Less, Expr::int(2));
        assert_eq!(cmp.ty, Type::Bool);
        let sum = Expr::binary(Expr::int(1), BinaryOp::Add, Expr::int(2));
        assert_eq!(sum.ty, Type::int());
    }

    #[test]
    fn test_byte_array_detection() {
        assert!(Type::array_storage(Type::byte(), 16).is_byte_array());
        assert!(!Type::array_storage(Type::int(), 16).is_byte_array());
        assert!(Type::array_storage(Type::byte(), 16).needs_construction());
        assert!(!Type::array_ref(Type::byte()).needs_construction());
    }

    #[test]
    fn test_program_from_json_shape() {
        let json = r#"{
            "enums": [{ "name": "Color", "values": [{ "name": "Red" }] }],
            "globals": [{ "enum": 0 }]
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();
        assert_eq!(program.enums[0].name, "Color");
        assert_eq!(program.globals, vec![GlobalRef::Enum(EnumId(0))]);
    }
}
