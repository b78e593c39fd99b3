//! Human-readable rendering of semantic types, for diagnostics and logs.

use super::{FloatKind, IntKind, Program, Type};

impl IntKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntKind::SByte => "sbyte",
            IntKind::Byte => "byte",
            IntKind::Short => "short",
            IntKind::UShort => "ushort",
            IntKind::Int => "int",
            IntKind::Long => "long",
        }
    }
}

impl FloatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FloatKind::Float => "float",
            FloatKind::Double => "double",
        }
    }
}

impl Program {
    /// Format a type the way the source language spells it.
    pub fn describe_type(&self, ty: &Type) -> String {
        match ty {
            Type::Void => "void".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Int(kind) => kind.as_str().to_string(),
            Type::Float(kind) => kind.as_str().to_string(),
            Type::String => "string".to_string(),
            Type::Null => "null".to_string(),
            Type::Enum(id) => self.enum_name(*id).to_string(),
            Type::Array(array) => match (array.storage, array.length) {
                (true, Some(len)) => format!("{}[{}]", self.describe_type(&array.element), len),
                (true, None) => format!("{}[]()", self.describe_type(&array.element)),
                (false, _) => format!("{}[]", self.describe_type(&array.element)),
            },
            Type::ClassStorage(id) => format!("{}()", self.class_name(*id)),
            Type::ClassRef(id) => self.class_name(*id).to_string(),
        }
    }
}
