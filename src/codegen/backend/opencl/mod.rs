//! OpenCL C: the C backend with the OpenCL dialect.
//!
//! OpenCL C has no standard headers, so nothing is included and the few
//! string functions the generated code needs are emitted as `static`
//! helpers, each only when it is used.

#[cfg(test)]
mod tests;

use crate::ast::{BuiltinMethod, Expr, IntKind, InterpolatedPart};
use crate::codegen::error::GenResult;
use crate::codegen::generator::SourceGenerator;
use crate::codegen::naming::Keywords;

use super::c::{CBackend, CDialect, CEmitter};

pub type OpenClBackend = CBackend<OpenCl>;

const KEYWORDS: &[&str] = &[
    // C99
    "auto", "bool", "break", "case", "char", "const", "continue", "default", "do", "double",
    "else", "enum", "extern", "false", "float", "for", "goto", "if", "inline", "int", "long",
    "register", "restrict", "return", "self", "short", "signed", "sizeof", "static", "struct",
    "switch", "true", "typedef", "union", "unsigned", "void", "volatile", "while", "_Bool",
    "_Complex", "_Imaginary",
    // address spaces and kernels
    "constant", "global", "local", "private", "kernel", "__constant", "__global", "__local",
    "__private", "__kernel",
    // built-in types
    "uchar", "ushort", "uint", "ulong", "half", "size_t",
];

const STREQ_HELPER: &str = "\
static bool streq(constant char *str1, constant char *str2)
{
	for (size_t i = 0; str1[i] == str2[i]; i++) {
		if (str1[i] == '\\0')
			return true;
	}
	return false;
}";

const STRLEN_HELPER: &str = "\
static int strlen(constant char *str)
{
	int len = 0;
	while (str[len] != '\\0')
		len++;
	return len;
}";

#[derive(Debug)]
pub struct OpenCl;

impl CDialect for OpenCl {
    const NAME: &'static str = "cl";
    const EXTENSION: &'static str = "cl";
    const KEYWORDS: Keywords = Keywords(KEYWORDS);
    const STRING_TYPE: &'static str = "constant char *";
    const CONST_QUALIFIER: &'static str = "constant";
    const STATIC_TABLES: bool = false;
    const LONG_CONVERSION: &'static str = "ld";
    const LONG_PRINTF_CAST: Option<&'static str> = None;

    fn int_type(_e: &mut CEmitter<'_, '_, Self>, kind: IntKind) -> &'static str {
        match kind {
            IntKind::SByte => "char",
            IntKind::Byte => "uchar",
            IntKind::Short => "short",
            IntKind::UShort => "ushort",
            IntKind::Int => "int",
            IntKind::Long => "long",
        }
    }

    fn write_includes(_e: &mut CEmitter<'_, '_, Self>) {}

    fn write_string_equality(
        e: &mut CEmitter<'_, '_, Self>,
        left: &Expr,
        right: &Expr,
        not: bool,
    ) -> GenResult<()> {
        e.uses.streq = true;
        if not {
            e.write_char('!');
        }
        e.write("streq(");
        e.write_expr(left)?;
        e.write(", ");
        e.write_expr(right)?;
        e.write_char(')');
        Ok(())
    }

    fn write_string_length(e: &mut CEmitter<'_, '_, Self>, s: &Expr) -> GenResult<()> {
        e.uses.strlen = true;
        e.write("strlen(");
        e.write_expr(s)?;
        e.write_char(')');
        Ok(())
    }

    fn write_array_builtin(
        e: &mut CEmitter<'_, '_, Self>,
        method: BuiltinMethod,
        _array: &Expr,
        _args: &[Expr],
    ) -> GenResult<()> {
        Err(e.unmapped_method(method))
    }

    fn write_interpolated(
        e: &mut CEmitter<'_, '_, Self>,
        _parts: &[InterpolatedPart],
        _suffix: &str,
    ) -> GenResult<()> {
        Err(e.unsupported("interpolated strings are not supported in OpenCL C"))
    }

    fn write_library(e: &mut CEmitter<'_, '_, Self>) {
        let helpers = [(e.uses.streq, STREQ_HELPER), (e.uses.strlen, STRLEN_HELPER)];
        for (_, text) in helpers.iter().filter(|(used, _)| *used) {
            e.newline();
            e.writer().write_lines(text);
        }
    }
}
