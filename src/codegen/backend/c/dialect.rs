//! The points where C-family targets differ.
//!
//! Every hook has the C99 behavior as its default. A dialect overrides
//! only what its target does differently.

use crate::ast::{BuiltinMethod, Expr, IntKind, InterpolatedPart, Type};
use crate::codegen::error::GenResult;
use crate::codegen::generator::SourceGenerator;
use crate::codegen::naming::Keywords;
use crate::codegen::priority::Priority;

use super::CEmitter;

const C_KEYWORDS: &[&str] = &[
    "auto", "bool", "break", "case", "char", "const", "continue", "default", "do", "double",
    "else", "enum", "extern", "false", "float", "for", "goto", "if", "inline", "int", "long",
    "register", "restrict", "return", "self", "short", "signed", "sizeof", "static", "struct",
    "switch", "true", "typedef", "union", "unsigned", "void", "volatile", "while", "_Bool",
    "_Complex", "_Imaginary",
];

pub trait CDialect: Sized {
    /// Target id.
    const NAME: &'static str;
    const EXTENSION: &'static str;
    const KEYWORDS: Keywords;
    const STRING_TYPE: &'static str = "const char *";
    /// Qualifier of read-only tables at file scope.
    const CONST_QUALIFIER: &'static str = "const";
    /// Whether file-scope tables are `static`.
    const STATIC_TABLES: bool = true;
    /// `printf` conversion for 64-bit integers.
    const LONG_CONVERSION: &'static str = "lld";
    /// Cast applied to 64-bit `printf` arguments.
    const LONG_PRINTF_CAST: Option<&'static str> = Some("long long");

    fn int_type(e: &mut CEmitter<'_, '_, Self>, kind: IntKind) -> &'static str {
        if kind != IntKind::Int {
            e.uses.stdint = true;
        }
        match kind {
            IntKind::SByte => "int8_t",
            IntKind::Byte => "uint8_t",
            IntKind::Short => "int16_t",
            IntKind::UShort => "uint16_t",
            IntKind::Int => "int",
            IntKind::Long => "int64_t",
        }
    }

    fn write_includes(e: &mut CEmitter<'_, '_, Self>) {
        let uses = &e.uses;
        let headers = [
            (uses.math, "math.h"),
            (uses.stdbool, "stdbool.h"),
            (uses.stddef, "stddef.h"),
            (uses.stdint, "stdint.h"),
            (uses.stdio, "stdio.h"),
            (uses.stdlib, "stdlib.h"),
            (uses.string, "string.h"),
        ];
        for (_, header) in headers.iter().filter(|(used, _)| *used) {
            e.write_line(&format!("#include <{}>", header));
        }
    }

    fn write_string_equality(
        e: &mut CEmitter<'_, '_, Self>,
        left: &Expr,
        right: &Expr,
        not: bool,
    ) -> GenResult<()> {
        e.uses.string = true;
        e.write("strcmp(");
        e.write_expr(left)?;
        e.write(", ");
        e.write_expr(right)?;
        e.write(if not { ") != 0" } else { ") == 0" });
        Ok(())
    }

    fn write_string_length(e: &mut CEmitter<'_, '_, Self>, s: &Expr) -> GenResult<()> {
        e.uses.string = true;
        e.write("(int) strlen(");
        e.write_expr(s)?;
        e.write_char(')');
        Ok(())
    }

    /// `ArrayCopyTo` and `ArrayClear`.
    fn write_array_builtin(
        e: &mut CEmitter<'_, '_, Self>,
        method: BuiltinMethod,
        array: &Expr,
        args: &[Expr],
    ) -> GenResult<()> {
        match (method, args) {
            (BuiltinMethod::ArrayCopyTo, [source_index, dest, dest_index, length]) => {
                e.uses.string = true;
                e.write("memmove(");
                e.write_child(Priority::Add, dest)?;
                e.write(" + ");
                e.write_non_assoc_child(Priority::Add, dest_index)?;
                e.write(", ");
                e.write_child(Priority::Add, array)?;
                e.write(" + ");
                e.write_non_assoc_child(Priority::Add, source_index)?;
                e.write(", ");
                e.write_child(Priority::Mul, length)?;
                e.write(" * sizeof(");
                e.write_child(Priority::Postfix, array)?;
                e.write("[0]))");
                Ok(())
            }
            (BuiltinMethod::ArrayClear, []) => {
                // a storage parameter decays to a pointer, so `sizeof(a)` is wrong
                let length = match &array.ty {
                    Type::Array(a) if a.storage => a.length,
                    _ => None,
                };
                let Some(length) = length else {
                    return Err(e.unsupported("only fixed-size arrays can be cleared"));
                };
                e.uses.string = true;
                e.write("memset(");
                e.write_expr(array)?;
                e.write(&format!(", 0, {} * sizeof(", length));
                e.write_child(Priority::Postfix, array)?;
                e.write("[0]))");
                Ok(())
            }
            _ => Err(e.unmapped_method(method)),
        }
    }

    fn write_interpolated(
        e: &mut CEmitter<'_, '_, Self>,
        _parts: &[InterpolatedPart],
        _suffix: &str,
    ) -> GenResult<()> {
        Err(e.unsupported(
            "interpolated strings are only supported as Console.Write arguments",
        ))
    }

    /// Functions the generated code calls but the target lacks.
    fn write_library(_e: &mut CEmitter<'_, '_, Self>) {}
}

/// C99 with the standard headers.
#[derive(Debug)]
pub struct StdC;

impl CDialect for StdC {
    const NAME: &'static str = "c";
    const EXTENSION: &'static str = "c";
    const KEYWORDS: Keywords = Keywords(C_KEYWORDS);
}
