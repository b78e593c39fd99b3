//! ActionScript 3 backend.
//!
//! Every top-level symbol becomes a class in its own `<Name>.as` file.
//! Built-ins without an ActionScript counterpart are lowered to static
//! methods of an internal `Ci` class, written to `Ci.as` only when used.

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use crate::ast::*;
use crate::codegen::error::GenResult;
use crate::codegen::generator::{format_float, SourceGenerator};
use crate::codegen::naming::{camel_case, Keywords};
use crate::codegen::priority::{default_priority, Priority};
use crate::codegen::writer::{OutputFile, SourceWriter};
use crate::codegen::{run_emission, Backend, GenOptions};

const KEYWORDS: Keywords = Keywords(&[
    "as", "break", "case", "catch", "class", "const", "continue", "default", "delete", "do",
    "dynamic", "each", "else", "extends", "false", "final", "finally", "for", "function", "get",
    "if", "implements", "import", "in", "include", "instanceof", "interface", "internal", "is",
    "namespace", "native", "new", "null", "override", "package", "private", "protected",
    "public", "return", "set", "static", "super", "switch", "this", "throw", "to", "true", "try",
    "typeof", "use", "var", "void", "while", "with",
]);

const SUBSTRING_HELPER: &str = "\
public static function substring(s : String, offset : int, length : int) : String
{
	return s.substring(offset, offset + length);
}";

const COPY_ARRAY_HELPER: &str = "\
public static function copyArray(sa : Object, soffset : int, da : Object, doffset : int, length : int) : void
{
	if (sa == da && soffset < doffset) {
		for (var i : int = length - 1; i >= 0; i--)
			da[doffset + i] = sa[soffset + i];
	}
	else {
		for (var j : int = 0; j < length; j++)
			da[doffset + j] = sa[soffset + j];
	}
}";

const BYTES_TO_STRING_HELPER: &str = "\
public static function bytesToString(a : ByteArray, offset : int, length : int) : String
{
	a.position = offset;
	return a.readUTFBytes(length);
}";

const CLEAR_ARRAY_HELPER: &str = "\
public static function clearArray(a : Object) : void
{
	for (var i : int = 0; i < a.length; i++)
		a[i] = 0;
}";

const DIVIDE_ELEMENT_HELPER: &str = "\
public static function divideElement(a : Object, i : int, v : int) : int
{
	return a[i] = int(a[i] / v);
}";

/// Helpers of the `Ci` class lowered to during the current run.
#[derive(Debug, Default)]
struct HelperUsage {
    substring: bool,
    copy_array: bool,
    bytes_to_string: bool,
    clear_array: bool,
    divide_element: bool,
}

impl HelperUsage {
    fn any(&self) -> bool {
        self.substring
            || self.copy_array
            || self.bytes_to_string
            || self.clear_array
            || self.divide_element
    }
}

pub struct ActionScriptBackend {
    out: SourceWriter,
}

impl ActionScriptBackend {
    pub fn new() -> Self {
        Self {
            out: SourceWriter::new(),
        }
    }
}

impl Default for ActionScriptBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for ActionScriptBackend {
    fn target_name(&self) -> &'static str {
        "as"
    }

    fn output_extension(&self) -> &'static str {
        "as"
    }

    fn generate(
        &mut self,
        program: &Program,
        options: &GenOptions,
    ) -> GenResult<Vec<OutputFile>> {
        run_emission(&mut self.out, |out| {
            AsEmitter {
                program,
                out,
                dir: options.output.clone(),
                namespace: options.namespace.clone(),
                class: None,
                helpers: HelperUsage::default(),
            }
            .emit_program()
        })
    }
}

/// State of one ActionScript run.
struct AsEmitter<'p, 'w> {
    program: &'p Program,
    out: &'w mut SourceWriter,
    dir: PathBuf,
    namespace: Option<String>,
    /// Class whose members are being emitted.
    class: Option<ClassId>,
    helpers: HelperUsage,
}

impl<'p> AsEmitter<'p, '_> {
    fn emit_program(&mut self) -> GenResult<()> {
        let program = self.program;
        if !program.natives.is_empty() {
            return Err(self.unsupported("top-level native blocks have no place in per-class files"));
        }
        for global in &program.globals {
            match *global {
                GlobalRef::Enum(id) => self.emit_enum(program.enum_def(id))?,
                GlobalRef::Class(id) => self.emit_class(id, program.class(id))?,
            }
        }
        self.emit_helper_class()
    }

    /// Open `<name>.as`, run `f` inside the class body, close the file.
    fn in_class_file<F>(&mut self, name: &str, visibility: Visibility, f: F) -> GenResult<()>
    where
        F: FnOnce(&mut Self) -> GenResult<()>,
    {
        self.out.create_file(self.dir.join(format!("{}.as", name)));
        match self.namespace.clone() {
            Some(namespace) => {
                self.write("package ");
                self.write_line(&namespace);
            }
            None => self.write_line("package"),
        }
        self.in_block(|g| {
            g.write_line("import flash.utils.ByteArray;");
            g.newline();
            g.write_visibility(visibility);
            g.write("class ");
            g.write_line(name);
            g.in_block(f)
        })?;
        self.out.close_file();
        Ok(())
    }

    fn emit_enum(&mut self, def: &'p EnumDef) -> GenResult<()> {
        log::debug!("as: enum {}", def.name);
        self.in_class_file(&def.name, def.visibility, |g| {
            for (i, value) in def.values.iter().enumerate() {
                g.write("public static const ");
                g.write_uppercase_with_underscores(&value.name);
                g.write(" : int = ");
                g.write(&i.to_string());
                g.write_line(";");
            }
            Ok(())
        })
    }

    fn emit_class(&mut self, id: ClassId, class: &'p ClassDef) -> GenResult<()> {
        log::debug!("as: class {}", class.name);
        self.class = Some(id);
        self.in_class_file(&class.name, class.visibility, |g| {
            for member in &class.members {
                match member {
                    Member::Field(field) => g.emit_field(field)?,
                    Member::Const(konst) => g.emit_const(konst)?,
                    Member::Method(method) => g.emit_method(method)?,
                }
            }
            if let Some(body) = &class.constructor {
                g.newline();
                g.write("public function ");
                g.write(&class.name);
                g.write_line("()");
                g.write_block(body)?;
            }
            for konst in &class.const_arrays {
                g.write("private static const ");
                g.write_uppercase_with_underscores(konst.emitted_name());
                g.write(" : Array = ");
                g.write_const_value(&konst.value)?;
                g.write_line(";");
            }
            Ok(())
        })?;
        self.class = None;
        Ok(())
    }

    fn emit_field(&mut self, field: &FieldDef) -> GenResult<()> {
        self.write_visibility(field.visibility);
        self.write(if field.ty.needs_construction() {
            "const "
        } else {
            "var "
        });
        self.write_camel_case_not_keyword(&field.name);
        self.write_type(&field.ty)?;
        self.write_initializer(&field.name, &field.ty, field.value.as_ref())?;
        self.write_line(";");
        Ok(())
    }

    /// Only public constants exist at run time; the rest are inlined.
    fn emit_const(&mut self, konst: &ConstDef) -> GenResult<()> {
        if konst.visibility != Visibility::Public {
            return Ok(());
        }
        self.write("public static const ");
        self.write_uppercase_with_underscores(konst.emitted_name());
        self.write_type(&konst.ty)?;
        self.write(" = ");
        self.write_const_value(&konst.value)?;
        self.write_line(";");
        Ok(())
    }

    fn emit_method(&mut self, method: &MethodDef) -> GenResult<()> {
        self.newline();
        self.write_visibility(method.visibility);
        if method.is_static {
            self.write("static ");
        }
        self.write("function ");
        self.write_camel_case_not_keyword(&method.name);
        self.write_char('(');
        for (i, param) in method.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_camel_case_not_keyword(&param.name);
            self.write_type(&param.ty)?;
        }
        self.write_char(')');
        self.write_type(&method.return_type)?;
        self.newline();
        self.write_block(&method.body)
    }

    fn emit_helper_class(&mut self) -> GenResult<()> {
        if !self.helpers.any() {
            return Ok(());
        }
        let helpers = std::mem::take(&mut self.helpers);
        log::debug!("as: helper class {:?}", helpers);
        self.in_class_file("Ci", Visibility::Internal, |g| {
            let used = [
                (helpers.substring, SUBSTRING_HELPER),
                (helpers.copy_array, COPY_ARRAY_HELPER),
                (helpers.bytes_to_string, BYTES_TO_STRING_HELPER),
                (helpers.clear_array, CLEAR_ARRAY_HELPER),
                (helpers.divide_element, DIVIDE_ELEMENT_HELPER),
            ];
            let mut first = true;
            for (_, text) in used.iter().filter(|(is_used, _)| *is_used) {
                if !first {
                    g.newline();
                }
                first = false;
                g.writer().write_lines(text);
            }
            Ok(())
        })
    }

    fn write_visibility(&mut self, visibility: Visibility) {
        self.write(match visibility {
            Visibility::Dead | Visibility::Private => "private ",
            Visibility::Internal => "internal ",
            Visibility::Public => "public ",
        });
    }

    fn type_name(&self, ty: &Type) -> GenResult<String> {
        Ok(match ty {
            Type::Void => "void".to_string(),
            Type::Bool => "Boolean".to_string(),
            Type::Int(IntKind::Long) | Type::Null => return Err(self.unmapped_type(ty)),
            Type::Int(_) | Type::Enum(_) => "int".to_string(),
            Type::Float(_) => "Number".to_string(),
            Type::String => "String".to_string(),
            Type::Array(array) => {
                self.type_name(&array.element)?;
                if ty.is_byte_array() {
                    "ByteArray".to_string()
                } else {
                    "Array".to_string()
                }
            }
            Type::ClassStorage(id) | Type::ClassRef(id) => self.program.class(*id).name.clone(),
        })
    }

    /// ` : Type`
    fn write_type(&mut self, ty: &Type) -> GenResult<()> {
        let name = self.type_name(ty)?;
        self.write(" : ");
        self.write(&name);
        Ok(())
    }

    /// Write the initializer a storage type implies, if any.
    fn write_init(&mut self, ty: &Type) -> bool {
        match ty {
            Type::ClassStorage(id) => {
                let program = self.program;
                let name = &program.class(*id).name;
                self.write(" = new ");
                self.write(name);
                self.write("()");
                true
            }
            Type::Array(array) if array.storage => {
                if ty.is_byte_array() {
                    self.write(" = new ByteArray()");
                } else {
                    match array.length {
                        Some(length) => self.write(&format!(" = new Array({})", length)),
                        None => self.write(" = new Array()"),
                    }
                }
                true
            }
            _ => false,
        }
    }

    /// Exactly one initializer: the implied one, else the explicit one.
    fn write_initializer(&mut self, name: &str, ty: &Type, value: Option<&Expr>) -> GenResult<()> {
        if self.write_init(ty) {
            if value.is_some() {
                log::warn!(
                    "as: `{}` is constructed by its type; explicit initializer dropped",
                    name
                );
            }
        } else if let Some(value) = value {
            self.write(" = ");
            self.write_expr(value)?;
        }
        Ok(())
    }

    /// `Class.` when `class` is not the one being emitted.
    fn write_class_prefix(&mut self, class: ClassId) {
        if self.class != Some(class) {
            let program = self.program;
            let name = &program.class(class).name;
            self.write(name);
            self.write_char('.');
        }
    }
}

impl<'p> SourceGenerator<'p> for AsEmitter<'p, '_> {
    fn writer(&mut self) -> &mut SourceWriter {
        &mut *self.out
    }

    fn program(&self) -> &'p Program {
        self.program
    }

    fn backend_name(&self) -> &'static str {
        "as"
    }

    fn write_camel_case_not_keyword(&mut self, name: &str) {
        let name = KEYWORDS.escape(camel_case(name));
        self.write(&name);
    }

    fn priority(&self, expr: &Expr) -> Priority {
        match &expr.kind {
            ExprKind::Property {
                property: BuiltinProperty::SignExtendByte,
                ..
            } => Priority::Add,
            ExprKind::Property {
                property: BuiltinProperty::LowByte,
                ..
            } => Priority::And,
            ExprKind::Binary {
                op: BinaryOp::Div, ..
            } if expr.ty.is_integer() => Priority::Primary,
            ExprKind::Interpolated { .. } => Priority::Add,
            _ => default_priority(expr),
        }
    }

    fn write_var(&mut self, var: &VarDecl) -> GenResult<()> {
        self.write("var ");
        self.write_camel_case_not_keyword(&var.name);
        self.write_type(&var.ty)?;
        self.write_initializer(&var.name, &var.ty, var.value.as_ref())
    }

    fn write_throw(&mut self, message: &Expr) -> GenResult<()> {
        self.write("throw ");
        self.write_expr(message)?;
        self.write_line(";");
        Ok(())
    }

    fn write_this(&mut self) -> GenResult<()> {
        self.write("this");
        Ok(())
    }

    fn write_float(&mut self, value: f64) -> GenResult<()> {
        if value.is_nan() {
            self.write("NaN");
        } else if value.is_infinite() {
            self.write(if value < 0.0 { "-Infinity" } else { "Infinity" });
        } else {
            self.write(&format_float(value));
        }
        Ok(())
    }

    fn write_const_ref(&mut self, class: ClassId, name: &str) -> GenResult<()> {
        let program = self.program;
        let def = program.class(class);
        let hidden = def
            .consts()
            .find(|c| c.name == name && c.visibility != Visibility::Public);
        if let Some(konst) = hidden {
            let negative = matches!(konst.value, ConstValue::Int(n) if n < 0)
                || matches!(konst.value, ConstValue::Float(f) if f < 0.0);
            if negative {
                self.write_char('(');
                self.write_const_value(&konst.value)?;
                self.write_char(')');
                return Ok(());
            }
            return self.write_const_value(&konst.value);
        }
        self.write_class_prefix(class);
        let emitted = def.find_const(name).map_or(name, |c| c.emitted_name());
        self.write_uppercase_with_underscores(emitted);
        Ok(())
    }

    fn write_enum_value(&mut self, enum_id: EnumId, index: usize) -> GenResult<()> {
        let program = self.program;
        let def = program.enum_def(enum_id);
        let value = def.values.get(index).ok_or_else(|| {
            self.unsupported(format!("enum `{}` has no value #{}", def.name, index))
        })?;
        self.write(&def.name);
        self.write_char('.');
        self.write_uppercase_with_underscores(&value.name);
        Ok(())
    }

    fn write_const_array(&mut self, items: &[ConstValue]) -> GenResult<()> {
        self.write("[ ");
        self.write_const_items(items)?;
        self.write(" ]");
        Ok(())
    }

    fn write_property(
        &mut self,
        expr: &Expr,
        obj: &Expr,
        property: BuiltinProperty,
    ) -> GenResult<()> {
        let priority = self.priority(expr);
        match property {
            BuiltinProperty::SignExtendByte => {
                self.write_char('(');
                self.write_child(Priority::Xor, obj)?;
                self.write(" ^ 128) - 128");
            }
            BuiltinProperty::LowByte => {
                self.write_child(priority, obj)?;
                self.write(" & 0xff");
            }
            BuiltinProperty::StringLength => {
                self.write_child(priority, obj)?;
                self.write(".length");
            }
        }
        Ok(())
    }

    fn write_builtin_call(
        &mut self,
        _expr: &Expr,
        obj: Option<&Expr>,
        method: BuiltinMethod,
        args: &[Expr],
    ) -> GenResult<()> {
        let (obj, args) = match (obj, method) {
            (_, BuiltinMethod::ConsoleWrite) => return Err(self.unmapped_method(method)),
            (None, BuiltinMethod::ConsoleWriteLine) => {
                self.write("trace(");
                match args.first() {
                    Some(arg) => self.write_expr(arg)?,
                    None => self.write("\"\""),
                }
                self.write_char(')');
                return Ok(());
            }
            (None, BuiltinMethod::MathAbs) => {
                self.write("Math.abs");
                return self.write_args(args);
            }
            (None, BuiltinMethod::MathSqrt) => {
                self.write("Math.sqrt");
                return self.write_args(args);
            }
            (Some(obj), _) => (obj, args),
            (None, _) => {
                return Err(self.unsupported(format!("`{}` needs a receiver", method.name())))
            }
        };
        match (method, args) {
            (BuiltinMethod::MulDiv, [by, div]) => {
                self.write("int(");
                self.write_child(Priority::Mul, obj)?;
                self.write(" * ");
                self.write_child(Priority::Mul, by)?;
                self.write(" / ");
                self.write_non_assoc_child(Priority::Mul, div)?;
                self.write_char(')');
            }
            (BuiltinMethod::CharAt, [index]) => {
                self.write_child(Priority::Postfix, obj)?;
                self.write(".charCodeAt(");
                self.write_expr(index)?;
                self.write_char(')');
            }
            (BuiltinMethod::Substring, [start, length]) => {
                if start.has_side_effect() {
                    self.helpers.substring = true;
                    self.write("Ci.substring");
                    self.write_args(&[obj.clone(), start.clone(), length.clone()])?;
                } else {
                    let end = Expr::binary(start.clone(), BinaryOp::Add, length.clone());
                    self.write_child(Priority::Postfix, obj)?;
                    self.write(".substring");
                    self.write_args(&[start.clone(), end])?;
                }
            }
            (BuiltinMethod::ArrayCopyTo, [_, _, _, _]) => {
                self.helpers.copy_array = true;
                self.write("Ci.copyArray");
                let mut all = vec![obj.clone()];
                all.extend_from_slice(args);
                self.write_args(&all)?;
            }
            (BuiltinMethod::ArrayToString, [_, _]) => {
                self.helpers.bytes_to_string = true;
                self.write("Ci.bytesToString");
                let mut all = vec![obj.clone()];
                all.extend_from_slice(args);
                self.write_args(&all)?;
            }
            (BuiltinMethod::ArrayClear, []) => {
                self.helpers.clear_array = true;
                self.write("Ci.clearArray(");
                self.write_expr(obj)?;
                self.write_char(')');
            }
            (
                BuiltinMethod::MulDiv
                | BuiltinMethod::CharAt
                | BuiltinMethod::Substring
                | BuiltinMethod::ArrayCopyTo
                | BuiltinMethod::ArrayToString
                | BuiltinMethod::ArrayClear
                | BuiltinMethod::ConsoleWrite
                | BuiltinMethod::ConsoleWriteLine
                | BuiltinMethod::MathAbs
                | BuiltinMethod::MathSqrt,
                _,
            ) => {
                return Err(self.unsupported(format!(
                    "`{}` called with {} argument(s)",
                    method.name(),
                    args.len()
                )))
            }
        }
        Ok(())
    }

    fn write_user_call(
        &mut self,
        obj: Option<&Expr>,
        class: ClassId,
        name: &str,
        is_static: bool,
        args: &[Expr],
    ) -> GenResult<()> {
        match obj {
            Some(obj) => {
                self.write_child(Priority::Postfix, obj)?;
                self.write_char('.');
            }
            None if is_static => self.write_class_prefix(class),
            None => {}
        }
        self.write_camel_case_not_keyword(name);
        self.write_args(args)
    }

    fn write_binary(
        &mut self,
        expr: &Expr,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
    ) -> GenResult<()> {
        if op == BinaryOp::Div && expr.ty.is_integer() {
            self.write("int(");
            self.write_child(Priority::Mul, left)?;
            self.write(" / ");
            self.write_non_assoc_child(Priority::Mul, right)?;
            self.write_char(')');
            return Ok(());
        }
        let priority = op.priority();
        self.write_child(priority, left)?;
        self.write_char(' ');
        self.write(op.as_str());
        self.write_char(' ');
        self.write_non_assoc_child(priority, right)
    }

    fn write_assign(&mut self, target: &Expr, op: AssignOp, value: &Expr) -> GenResult<()> {
        // `/=` leaves a Number behind in untyped slots
        if op == AssignOp::Div && target.ty.is_integer() {
            if !target.has_side_effect() {
                self.write_expr(target)?;
                self.write(" = ");
                let quotient = Expr::binary(target.clone(), BinaryOp::Div, value.clone());
                return self.write_expr(&quotient);
            }
            return match &target.kind {
                ExprKind::Index { array, index } => {
                    self.helpers.divide_element = true;
                    self.write("Ci.divideElement");
                    self.write_args(&[(**array).clone(), (**index).clone(), value.clone()])
                }
                _ => Err(self.unsupported("integer `/=` on a target with side effects")),
            };
        }
        self.write_expr(target)?;
        self.write_char(' ');
        self.write(op.as_str());
        self.write_char(' ');
        self.write_expr(value)
    }

    fn write_interpolated(&mut self, parts: &[InterpolatedPart], suffix: &str) -> GenResult<()> {
        for (i, part) in parts.iter().enumerate() {
            if part.width.is_some() || part.format.is_some() || part.precision.is_some() {
                return Err(self.unsupported("formatted interpolation arguments are not supported"));
            }
            if i == 0 || !part.prefix.is_empty() {
                if i > 0 {
                    self.write(" + ");
                }
                self.write_string_literal(&part.prefix);
            }
            self.write(" + ");
            self.write_non_assoc_child(Priority::Add, &part.arg)?;
        }
        if parts.is_empty() || !suffix.is_empty() {
            if !parts.is_empty() {
                self.write(" + ");
            }
            self.write_string_literal(suffix);
        }
        Ok(())
    }
}
