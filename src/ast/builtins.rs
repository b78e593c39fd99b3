//! Built-in operations the resolver binds to sentinel variants.
//!
//! Backends match on these enums and never on a surface spelling. Both
//! enums are closed: adding a variant breaks every backend's `match` until
//! it decides how to lower (or reject) the new operation.

use serde::{Deserialize, Serialize};

use super::{FloatKind, IntKind, Type};

/// Zero-argument built-in accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinProperty {
    /// Reinterpret the low 8 bits as a signed byte.
    SignExtendByte,
    /// The low 8 bits, zero-extended.
    LowByte,
    StringLength,
}

impl BuiltinProperty {
    /// Source-level name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinProperty::SignExtendByte => "int.SByte",
            BuiltinProperty::LowByte => "int.LowByte",
            BuiltinProperty::StringLength => "string.Length",
        }
    }

    pub fn result_type(&self) -> Type {
        Type::Int(IntKind::Int)
    }
}

/// Built-in methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinMethod {
    /// `a.MulDiv(b, c)`: `a * b / c` without intermediate overflow, truncated.
    MulDiv,
    CharAt,
    /// `s.Substring(start, length)`.
    Substring,
    /// `src.CopyTo(srcOffset, dest, destOffset, length)`.
    ArrayCopyTo,
    /// `bytes.ToString(offset, length)`: decode a byte range.
    ArrayToString,
    ArrayClear,
    ConsoleWrite,
    ConsoleWriteLine,
    MathAbs,
    MathSqrt,
}

impl BuiltinMethod {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinMethod::MulDiv => "int.MulDiv",
            BuiltinMethod::CharAt => "string.CharAt",
            BuiltinMethod::Substring => "string.Substring",
            BuiltinMethod::ArrayCopyTo => "array.CopyTo",
            BuiltinMethod::ArrayToString => "array.ToString",
            BuiltinMethod::ArrayClear => "array.Clear",
            BuiltinMethod::ConsoleWrite => "Console.Write",
            BuiltinMethod::ConsoleWriteLine => "Console.WriteLine",
            BuiltinMethod::MathAbs => "Math.Abs",
            BuiltinMethod::MathSqrt => "Math.Sqrt",
        }
    }

    pub fn has_side_effect(&self) -> bool {
        matches!(
            self,
            BuiltinMethod::ArrayCopyTo
                | BuiltinMethod::ArrayClear
                | BuiltinMethod::ConsoleWrite
                | BuiltinMethod::ConsoleWriteLine
        )
    }

    /// Result type given the type of the first argument, if any.
    pub fn result_type(&self, first_arg: Option<&Type>) -> Type {
        match self {
            BuiltinMethod::MulDiv | BuiltinMethod::CharAt => Type::Int(IntKind::Int),
            BuiltinMethod::Substring | BuiltinMethod::ArrayToString => Type::String,
            BuiltinMethod::ArrayCopyTo
            | BuiltinMethod::ArrayClear
            | BuiltinMethod::ConsoleWrite
            | BuiltinMethod::ConsoleWriteLine => Type::Void,
            BuiltinMethod::MathAbs => first_arg.cloned().unwrap_or(Type::Int(IntKind::Int)),
            BuiltinMethod::MathSqrt => Type::Float(FloatKind::Double),
        }
    }
}

impl std::fmt::Display for BuiltinProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for BuiltinMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
