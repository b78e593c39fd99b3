//! C backend, generic over the C-family dialect.
//!
//! The whole program goes to one file. Bodies and declarations are
//! rendered into deferred sections first, so that by the time the file
//! is assembled it is known which headers and helpers the code needs:
//!
//! includes, natives, enum constants, `#define`d constants, struct
//! typedefs, signatures, struct layouts, resources, constant tables,
//! library helpers, function bodies.

mod dialect;

pub use dialect::{CDialect, StdC};

use std::collections::HashSet;
use std::marker::PhantomData;
use std::path::PathBuf;

use crate::ast::*;
use crate::codegen::error::GenResult;
use crate::codegen::generator::SourceGenerator;
use crate::codegen::naming::{camel_case, upper_snake_case};
use crate::codegen::priority::{default_priority, Priority};
use crate::codegen::writer::{OutputFile, SourceWriter};
use crate::codegen::{run_emission, Backend, GenOptions};

/// Headers and helpers referenced during the current run.
#[derive(Debug, Default)]
pub struct Usage {
    pub math: bool,
    pub stdbool: bool,
    pub stddef: bool,
    pub stdint: bool,
    pub stdio: bool,
    pub stdlib: bool,
    pub string: bool,
    /// OpenCL `streq` helper.
    pub streq: bool,
    /// OpenCL `strlen` helper.
    pub strlen: bool,
}

pub struct CBackend<D: CDialect> {
    out: SourceWriter,
    _dialect: PhantomData<D>,
}

impl<D: CDialect> CBackend<D> {
    pub fn new() -> Self {
        Self {
            out: SourceWriter::new(),
            _dialect: PhantomData,
        }
    }
}

impl<D: CDialect> Default for CBackend<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: CDialect> Backend for CBackend<D> {
    fn target_name(&self) -> &'static str {
        D::NAME
    }

    fn output_extension(&self) -> &'static str {
        D::EXTENSION
    }

    fn generate(
        &mut self,
        program: &Program,
        options: &GenOptions,
    ) -> GenResult<Vec<OutputFile>> {
        let path = if options.output.extension().is_some() {
            options.output.clone()
        } else {
            options.output.with_extension(D::EXTENSION)
        };
        run_emission(&mut self.out, |out| {
            CEmitter::<D> {
                program,
                out,
                uses: Usage::default(),
                _dialect: PhantomData,
            }
            .emit_program(path)
        })
    }
}

/// State of one C-family run.
pub struct CEmitter<'p, 'w, D: CDialect> {
    program: &'p Program,
    out: &'w mut SourceWriter,
    pub uses: Usage,
    _dialect: PhantomData<D>,
}

impl<'p, D: CDialect> CEmitter<'p, '_, D> {
    fn emit_program(&mut self, path: PathBuf) -> GenResult<()> {
        self.out.begin_section();
        self.emit_bodies()?;
        let bodies = self.out.end_section();

        self.out.begin_section();
        self.emit_declarations()?;
        let declarations = self.out.end_section();

        self.out.begin_section();
        D::write_library(self);
        let library = self.out.end_section();

        self.out.begin_section();
        D::write_includes(self);
        let includes = self.out.end_section();

        log::debug!("{}: assembling {}", D::NAME, path.display());
        self.out.create_file(path);
        self.out
            .write_raw(&join_segments(&[includes, declarations, library, bodies]));
        self.out.close_file();
        Ok(())
    }

    /// Render `f` and emit it after a blank line, unless it wrote nothing.
    fn write_group<F>(&mut self, f: F) -> GenResult<()>
    where
        F: FnOnce(&mut Self) -> GenResult<()>,
    {
        self.out.begin_section();
        let result = f(self);
        let text = self.out.end_section();
        result?;
        if !text.is_empty() {
            self.newline();
            self.out.write_raw(&text);
        }
        Ok(())
    }

    // ── Declarations ──────────────────────────────────────────────

    fn emit_declarations(&mut self) -> GenResult<()> {
        let program = self.program;
        for native in &program.natives {
            self.newline();
            self.writer().write_lines(native);
        }
        for (_, def) in program.enums_in_order() {
            self.emit_enum(def);
        }
        self.write_group(|g| {
            for (_, class) in program.classes_in_order() {
                for konst in class.consts() {
                    g.emit_define(class, konst)?;
                }
            }
            Ok(())
        })?;
        self.write_group(|g| {
            for (_, class) in program.classes_in_order() {
                if !class.is_static() {
                    g.write_line(&format!("typedef struct {0} {0};", class.name));
                }
            }
            Ok(())
        })?;
        self.write_group(|g| {
            for (id, class) in program.classes_in_order() {
                if needs_construction(program, id) {
                    g.write_constructor_signature(class);
                    g.write_line(";");
                }
                for method in class.methods() {
                    g.write_signature(class, method)?;
                    g.write_line(";");
                }
            }
            Ok(())
        })?;
        for id in struct_order(program) {
            self.emit_struct(program.class(id))?;
        }
        for (name, bytes) in &program.resources {
            self.emit_resource(name, bytes);
        }
        self.write_group(|g| {
            for (_, class) in program.classes_in_order() {
                for konst in &class.const_arrays {
                    g.emit_table(class, konst)?;
                }
            }
            Ok(())
        })
    }

    fn emit_enum(&mut self, def: &EnumDef) {
        // C forbids an empty enumerator list; the type itself maps to `int`
        if def.values.is_empty() {
            log::debug!("{}: skipping empty enum {}", D::NAME, def.name);
            return;
        }
        log::debug!("{}: enum {}", D::NAME, def.name);
        self.newline();
        self.write_line("enum {");
        self.writer().indent();
        for (i, value) in def.values.iter().enumerate() {
            self.write(&enum_value_name(def, i));
            self.write(&format!(" = {}", i));
            if i + 1 < def.values.len() {
                self.write_char(',');
            }
            self.newline();
        }
        self.writer().dedent();
        self.write_line("};");
    }

    fn emit_define(&mut self, class: &ClassDef, konst: &ConstDef) -> GenResult<()> {
        self.write("#define ");
        self.write(&const_name(class, konst.emitted_name()));
        self.write_char(' ');
        let negative = match konst.value {
            ConstValue::Int(n) => n < 0,
            ConstValue::Float(f) => f < 0.0,
            _ => false,
        };
        if negative {
            self.write_char('(');
        }
        self.write_const_value(&konst.value)?;
        if negative {
            self.write_char(')');
        }
        self.newline();
        Ok(())
    }

    fn emit_struct(&mut self, class: &ClassDef) -> GenResult<()> {
        log::debug!("{}: struct {}", D::NAME, class.name);
        self.newline();
        self.write(&format!("struct {} ", class.name));
        self.write_line("{");
        self.writer().indent();
        let mut empty = true;
        for field in class.fields() {
            let name = self.local_name(&field.name);
            self.write_decl(&field.ty, &name)?;
            self.write_line(";");
            empty = false;
        }
        if empty {
            // C forbids empty structs
            self.write_line("char unused;");
        }
        self.writer().dedent();
        self.write_line("};");
        Ok(())
    }

    fn emit_resource(&mut self, name: &str, bytes: &[u8]) {
        self.newline();
        if D::STATIC_TABLES {
            self.write("static ");
        }
        self.write(D::CONST_QUALIFIER);
        self.write(" unsigned char ");
        self.write(&resource_name(name));
        self.write_line("[] = {");
        self.writer().indent();
        for (i, chunk) in bytes.chunks(16).enumerate() {
            let line: Vec<String> = chunk.iter().map(|b| format!("0x{:02x}", b)).collect();
            self.write(&line.join(", "));
            if (i + 1) * 16 < bytes.len() {
                self.write_char(',');
            }
            self.newline();
        }
        self.writer().dedent();
        self.write_line("};");
    }

    fn emit_table(&mut self, class: &ClassDef, konst: &ConstDef) -> GenResult<()> {
        let (element, items) = match (&konst.ty, &konst.value) {
            (Type::Array(array), ConstValue::Array(items)) => (&*array.element, items),
            _ => {
                return Err(self.unsupported(format!(
                    "constant table `{}` is not an array",
                    konst.emitted_name()
                )))
            }
        };
        if D::STATIC_TABLES {
            self.write("static ");
        }
        let element_type = self.type_name(element)?;
        if element_type.ends_with('*') {
            self.write(&element_type);
            self.write(D::CONST_QUALIFIER);
            self.write_char(' ');
        } else {
            self.write(D::CONST_QUALIFIER);
            self.write_char(' ');
            self.write(&element_type);
            self.write_char(' ');
        }
        self.write(&const_name(class, konst.emitted_name()));
        self.write(&format!("[{}] = ", items.len()));
        self.write_const_value(&konst.value)?;
        self.write_line(";");
        Ok(())
    }

    // ── Functions ─────────────────────────────────────────────────

    fn emit_bodies(&mut self) -> GenResult<()> {
        let program = self.program;
        for (id, class) in program.classes_in_order() {
            if needs_construction(program, id) {
                self.emit_constructor(class)?;
            }
            for method in class.methods() {
                log::debug!("{}: {}_{}", D::NAME, class.name, method.name);
                self.newline();
                self.write_signature(class, method)?;
                self.newline();
                self.write_block(&method.body)?;
            }
        }
        Ok(())
    }

    fn write_constructor_signature(&mut self, class: &ClassDef) {
        if matches!(class.visibility, Visibility::Private | Visibility::Dead) {
            self.write("static ");
        }
        self.write(&format!("void {0}_Construct({0} *self)", class.name));
    }

    /// Field initializers in declaration order, then the constructor body.
    fn emit_constructor(&mut self, class: &ClassDef) -> GenResult<()> {
        self.newline();
        self.write_constructor_signature(class);
        self.newline();
        self.in_block(|g| {
            for field in class.fields() {
                let place = format!("self->{}", g.local_name(&field.name));
                match &field.value {
                    Some(value) if !field.ty.needs_construction() => {
                        g.write(&place);
                        g.write(" = ");
                        g.write_expr(value)?;
                        g.write_line(";");
                    }
                    value => {
                        if value.is_some() {
                            log::warn!(
                                "{}: `{}.{}` is constructed by its type; explicit initializer dropped",
                                D::NAME,
                                class.name,
                                field.name
                            );
                        }
                        g.write_construct_calls(&field.ty, &place, 0)?;
                    }
                }
            }
            if let Some(body) = &class.constructor {
                g.write_stmts(&body.stmts)?;
            }
            Ok(())
        })
    }

    fn write_signature(&mut self, class: &ClassDef, method: &MethodDef) -> GenResult<()> {
        if matches!(method.visibility, Visibility::Private | Visibility::Dead) {
            self.write("static ");
        }
        let return_type = self.type_name(&method.return_type)?;
        self.write(&return_type);
        if !return_type.ends_with('*') {
            self.write_char(' ');
        }
        self.write(&format!("{}_{}(", class.name, method.name));
        let mut first = true;
        if !method.is_static {
            self.write(&format!("{} *self", class.name));
            first = false;
        }
        for param in &method.params {
            if !first {
                self.write(", ");
            }
            first = false;
            let name = self.local_name(&param.name);
            self.write_decl(&param.ty, &name)?;
        }
        if first {
            self.write("void");
        }
        self.write_char(')');
        Ok(())
    }

    /// `Name_Construct(&place);` for every part of `ty` that needs it.
    fn write_construct_calls(&mut self, ty: &Type, place: &str, depth: usize) -> GenResult<()> {
        match ty {
            Type::ClassStorage(id) if needs_construction(self.program, *id) => {
                let name = &self.program.class(*id).name;
                self.write_line(&format!("{}_Construct(&{});", name, place));
            }
            Type::Array(array) if array.storage && type_needs_construction(self.program, ty) => {
                let length = array
                    .length
                    .ok_or_else(|| self.unsupported("dynamic array storage"))?;
                let index = format!("_i{}", depth);
                self.write_line(&format!(
                    "for (int {0} = 0; {0} < {1}; {0}++)",
                    index, length
                ));
                self.writer().indent();
                let element_place = format!("{}[{}]", place, index);
                let result = self.write_construct_calls(&array.element, &element_place, depth + 1);
                self.writer().dedent();
                result?;
            }
            _ => {}
        }
        Ok(())
    }

    // ── Types and names ───────────────────────────────────────────

    fn local_name(&self, name: &str) -> String {
        D::KEYWORDS.escape(camel_case(name))
    }

    fn type_name(&mut self, ty: &Type) -> GenResult<String> {
        Ok(match ty {
            Type::Void => "void".to_string(),
            Type::Bool => {
                self.uses.stdbool = true;
                "bool".to_string()
            }
            Type::Int(kind) => D::int_type(self, *kind).to_string(),
            Type::Float(FloatKind::Float) => "float".to_string(),
            Type::Float(FloatKind::Double) => "double".to_string(),
            Type::String => D::STRING_TYPE.to_string(),
            Type::Enum(_) => "int".to_string(),
            Type::Null => return Err(self.unmapped_type(ty)),
            Type::ClassStorage(id) => self.program.class(*id).name.clone(),
            Type::ClassRef(id) => format!("{} *", self.program.class(*id).name),
            Type::Array(array) => pointer_to(self.type_name(&array.element)?),
        })
    }

    /// A declarator: `int x`, `const char *s`, `uint8_t buf[16]`.
    fn write_decl(&mut self, ty: &Type, name: &str) -> GenResult<()> {
        let mut dims = Vec::new();
        let mut base = ty;
        while let Type::Array(array) = base {
            if !array.storage {
                break;
            }
            let length = array
                .length
                .ok_or_else(|| self.unsupported("dynamic array storage"))?;
            dims.push(length);
            base = &array.element;
        }
        let type_name = self.type_name(base)?;
        self.write(&type_name);
        if !type_name.ends_with('*') {
            self.write_char(' ');
        }
        self.write(name);
        for length in dims {
            self.write(&format!("[{}]", length));
        }
        Ok(())
    }

    // ── printf ────────────────────────────────────────────────────

    /// `Console.Write` / `Console.WriteLine` as a single `printf`.
    fn write_printf(&mut self, args: &[Expr], newline: bool) -> GenResult<()> {
        self.uses.stdio = true;
        let line_end = if newline { "\\n" } else { "" };
        let arg = match args {
            [] => {
                self.write(&format!("printf(\"{}\")", line_end));
                return Ok(());
            }
            [arg] => arg,
            _ => return Err(self.unsupported("Console.Write takes one argument")),
        };
        let mut format = String::new();
        let mut values: Vec<&Expr> = Vec::new();
        match &arg.kind {
            ExprKind::Interpolated { parts, suffix } => {
                for part in parts {
                    format.push_str(&printf_text(&part.prefix));
                    format.push_str(&self.conversion(&part.arg.ty, part)?);
                    values.push(&part.arg);
                }
                format.push_str(&printf_text(suffix));
            }
            ExprKind::Literal(Literal::Str(text)) => format.push_str(&printf_text(text)),
            _ => {
                let plain = InterpolatedPart {
                    prefix: String::new(),
                    arg: arg.clone(),
                    width: None,
                    format: None,
                    precision: None,
                };
                format.push_str(&self.conversion(&arg.ty, &plain)?);
                values.push(arg);
            }
        }
        self.write(&format!("printf(\"{}{}\"", format, line_end));
        for value in values {
            self.write(", ");
            match D::LONG_PRINTF_CAST {
                Some(cast) if value.ty == Type::Int(IntKind::Long) => {
                    self.write(&format!("({}) ", cast));
                    self.write_child(Priority::Prefix, value)?;
                }
                _ => self.write_child(Priority::Argument, value)?,
            }
        }
        self.write_char(')');
        Ok(())
    }

    /// One `%` conversion for an argument of type `ty`.
    fn conversion(&self, ty: &Type, part: &InterpolatedPart) -> GenResult<String> {
        let letter = match (part.format, ty) {
            (Some(c @ ('x' | 'X' | 'e' | 'E' | 'g' | 'G')), _) => c.to_string(),
            (Some('f' | 'F'), _) => "f".to_string(),
            (Some('d' | 'D'), _) | (None, Type::Int(IntKind::SByte | IntKind::Byte))
            | (None, Type::Int(IntKind::Short | IntKind::UShort | IntKind::Int))
            | (None, Type::Bool | Type::Enum(_)) => "d".to_string(),
            (None, Type::Int(IntKind::Long)) => D::LONG_CONVERSION.to_string(),
            (None, Type::Float(_)) => "g".to_string(),
            (None, Type::String) => "s".to_string(),
            (Some(c), _) => {
                return Err(self.unsupported(format!("format specifier `{}` in printf", c)))
            }
            (None, other) => return Err(self.unmapped_type(other)),
        };
        let mut spec = String::from("%");
        if let Some(width) = part.width {
            spec.push_str(&width.to_string());
        }
        if let Some(precision) = part.precision {
            spec.push_str(&format!(".{}", precision));
        }
        spec.push_str(&letter);
        Ok(spec)
    }

    fn is_string_comparison(left: &Expr, right: &Expr) -> bool {
        (left.ty.is_string() && right.ty != Type::Null)
            || (right.ty.is_string() && left.ty != Type::Null)
    }
}

impl<'p, D: CDialect> SourceGenerator<'p> for CEmitter<'p, '_, D> {
    fn writer(&mut self) -> &mut SourceWriter {
        &mut *self.out
    }

    fn program(&self) -> &'p Program {
        self.program
    }

    fn backend_name(&self) -> &'static str {
        D::NAME
    }

    fn write_camel_case_not_keyword(&mut self, name: &str) {
        let name = self.local_name(name);
        self.write(&name);
    }

    fn priority(&self, expr: &Expr) -> Priority {
        match &expr.kind {
            ExprKind::Property { .. } => Priority::Prefix,
            ExprKind::Call {
                method: MethodRef::Builtin(BuiltinMethod::MulDiv),
                ..
            } => Priority::Prefix,
            _ => default_priority(expr),
        }
    }

    fn write_bool(&mut self, value: bool) {
        self.uses.stdbool = true;
        self.write(if value { "true" } else { "false" });
    }

    fn write_null(&mut self) {
        self.uses.stddef = true;
        self.write("NULL");
    }

    fn write_var(&mut self, var: &VarDecl) -> GenResult<()> {
        let name = self.local_name(&var.name);
        self.write_decl(&var.ty, &name)?;
        if var.ty.needs_construction() {
            if var.value.is_some() {
                log::warn!(
                    "{}: `{}` is constructed by its type; explicit initializer dropped",
                    D::NAME,
                    var.name
                );
            }
            self.write(" = { 0 }");
        } else if let Some(value) = &var.value {
            self.write(" = ");
            self.write_expr(value)?;
        }
        Ok(())
    }

    fn after_simple_stmt(&mut self, stmt: &Stmt) -> GenResult<()> {
        if let Stmt::Var(var) = stmt {
            let name = self.local_name(&var.name);
            self.write_construct_calls(&var.ty, &name, 0)?;
        }
        Ok(())
    }

    fn write_for_init(&mut self, init: &Stmt) -> GenResult<()> {
        if let Stmt::Var(var) = init {
            if type_needs_construction(self.program, &var.ty) {
                return Err(self.unsupported(format!(
                    "`{}` needs construction and cannot be declared in a for clause",
                    var.name
                )));
            }
        }
        self.write_simple_stmt(init)
    }

    fn write_throw(&mut self, _message: &Expr) -> GenResult<()> {
        Err(self.unsupported("exceptions are not supported"))
    }

    fn write_this(&mut self) -> GenResult<()> {
        self.write("self");
        Ok(())
    }

    fn write_const_ref(&mut self, class: ClassId, name: &str) -> GenResult<()> {
        let def = self.program.class(class);
        let emitted = def.find_const(name).map_or(name, |c| c.emitted_name());
        self.write(&const_name(def, emitted));
        Ok(())
    }

    fn write_enum_value(&mut self, enum_id: EnumId, index: usize) -> GenResult<()> {
        let def = self.program.enum_def(enum_id);
        if index >= def.values.len() {
            return Err(self.unsupported(format!("enum `{}` has no value #{}", def.name, index)));
        }
        self.write(&enum_value_name(def, index));
        Ok(())
    }

    fn write_field_access(&mut self, obj: &Expr, field: &str) -> GenResult<()> {
        self.write_child(Priority::Postfix, obj)?;
        self.write(match obj.ty {
            Type::ClassRef(_) => "->",
            _ => ".",
        });
        self.write_camel_case_not_keyword(field);
        Ok(())
    }

    fn write_property(
        &mut self,
        _expr: &Expr,
        obj: &Expr,
        property: BuiltinProperty,
    ) -> GenResult<()> {
        match property {
            BuiltinProperty::SignExtendByte => {
                let cast = D::int_type(self, IntKind::SByte);
                self.write(&format!("({}) ", cast));
                self.write_child(Priority::Prefix, obj)
            }
            BuiltinProperty::LowByte => {
                let cast = D::int_type(self, IntKind::Byte);
                self.write(&format!("({}) ", cast));
                self.write_child(Priority::Prefix, obj)
            }
            BuiltinProperty::StringLength => D::write_string_length(self, obj),
        }
    }

    fn write_builtin_call(
        &mut self,
        _expr: &Expr,
        obj: Option<&Expr>,
        method: BuiltinMethod,
        args: &[Expr],
    ) -> GenResult<()> {
        match (method, obj, args) {
            (BuiltinMethod::MulDiv, Some(obj), [by, div]) => {
                let wide = D::int_type(self, IntKind::Long);
                self.write(&format!("(int) (({}) ", wide));
                self.write_child(Priority::Prefix, obj)?;
                self.write(" * ");
                self.write_child(Priority::Mul, by)?;
                self.write(" / ");
                self.write_non_assoc_child(Priority::Mul, div)?;
                self.write_char(')');
                Ok(())
            }
            (BuiltinMethod::CharAt, Some(obj), [index]) => {
                self.write_child(Priority::Postfix, obj)?;
                self.write_char('[');
                self.write_expr(index)?;
                self.write_char(']');
                Ok(())
            }
            (BuiltinMethod::Substring | BuiltinMethod::ArrayToString, _, _) => {
                Err(self.unmapped_method(method))
            }
            (BuiltinMethod::ArrayCopyTo | BuiltinMethod::ArrayClear, Some(obj), _) => {
                D::write_array_builtin(self, method, obj, args)
            }
            (BuiltinMethod::ConsoleWrite, None, _) => self.write_printf(args, false),
            (BuiltinMethod::ConsoleWriteLine, None, _) => self.write_printf(args, true),
            (BuiltinMethod::MathAbs, None, [value]) => {
                if value.ty.is_floating() {
                    self.uses.math = true;
                    self.write("fabs");
                } else {
                    self.uses.stdlib = true;
                    self.write("abs");
                }
                self.write_args(args)
            }
            (BuiltinMethod::MathSqrt, None, [_]) => {
                self.uses.math = true;
                self.write("sqrt");
                self.write_args(args)
            }
            (
                BuiltinMethod::MulDiv
                | BuiltinMethod::CharAt
                | BuiltinMethod::ArrayCopyTo
                | BuiltinMethod::ArrayClear
                | BuiltinMethod::ConsoleWrite
                | BuiltinMethod::ConsoleWriteLine
                | BuiltinMethod::MathAbs
                | BuiltinMethod::MathSqrt,
                _,
                _,
            ) => Err(self.unsupported(format!(
                "`{}` called with {} argument(s)",
                method.name(),
                args.len()
            ))),
        }
    }

    fn write_user_call(
        &mut self,
        obj: Option<&Expr>,
        class: ClassId,
        name: &str,
        is_static: bool,
        args: &[Expr],
    ) -> GenResult<()> {
        let class_name = &self.program.class(class).name;
        self.write(&format!("{}_{}(", class_name, name));
        let mut first = true;
        if !is_static {
            match obj {
                Some(obj) if matches!(obj.ty, Type::ClassStorage(_)) => {
                    self.write_char('&');
                    self.write_child(Priority::Prefix, obj)?;
                }
                Some(obj) => self.write_expr(obj)?,
                None => self.write("self"),
            }
            first = false;
        }
        for arg in args {
            if !first {
                self.write(", ");
            }
            first = false;
            self.write_child(Priority::Argument, arg)?;
        }
        self.write_char(')');
        Ok(())
    }

    fn write_equality(
        &mut self,
        expr: &Expr,
        left: &Expr,
        right: &Expr,
        not: bool,
    ) -> GenResult<()> {
        if Self::is_string_comparison(left, right) {
            return D::write_string_equality(self, left, right, not);
        }
        let op = if not { BinaryOp::NotEq } else { BinaryOp::Eq };
        self.write_binary(expr, left, op, right)
    }

    fn write_interpolated(&mut self, parts: &[InterpolatedPart], suffix: &str) -> GenResult<()> {
        D::write_interpolated(self, parts, suffix)
    }

    fn write_resource(&mut self, name: &str) -> GenResult<()> {
        if !self.program.resources.contains_key(name) {
            return Err(self.unsupported(format!("resource `{}` does not exist", name)));
        }
        self.write(&resource_name(name));
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────

/// `Color_RED`
fn enum_value_name(def: &EnumDef, index: usize) -> String {
    let value = def.values.get(index).map_or("", |v| v.name.as_str());
    format!("{}_{}", def.name, upper_snake_case(value))
}

/// `Class_NAME`
fn const_name(class: &ClassDef, name: &str) -> String {
    format!("{}_{}", class.name, upper_snake_case(name))
}

/// `CiResource_` followed by the name with non-identifier characters
/// replaced by `_`.
fn resource_name(name: &str) -> String {
    let mangled: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("CiResource_{}", mangled)
}

fn pointer_to(type_name: String) -> String {
    if type_name.ends_with('*') {
        type_name + "*"
    } else {
        type_name + " *"
    }
}

fn join_segments(segments: &[String]) -> String {
    segments
        .iter()
        .map(|s| s.trim_start_matches('\n'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape text for a `printf` format string literal.
fn printf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '%' => out.push_str("%%"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// A class needs a `_Construct` function when constructing it does more
/// than zero-filling: a constructor body, a field initializer, or a field
/// that itself needs construction.
pub(crate) fn needs_construction(program: &Program, id: ClassId) -> bool {
    class_needs(program, id, 0)
}

fn class_needs(program: &Program, id: ClassId, depth: usize) -> bool {
    // storage cycles cannot be laid out anyway
    if depth > program.classes.len() {
        return false;
    }
    let class = program.class(id);
    class.constructor.is_some()
        || class
            .fields()
            .any(|f| f.value.is_some() || type_needs(program, &f.ty, depth + 1))
}

fn type_needs(program: &Program, ty: &Type, depth: usize) -> bool {
    match ty {
        Type::ClassStorage(id) => class_needs(program, *id, depth),
        Type::Array(array) if array.storage => type_needs(program, &array.element, depth),
        _ => false,
    }
}

fn type_needs_construction(program: &Program, ty: &Type) -> bool {
    type_needs(program, ty, 0)
}

/// Struct layouts ordered so that every struct held by value is
/// complete before the struct holding it.
fn struct_order(program: &Program) -> Vec<ClassId> {
    fn visit(program: &Program, id: ClassId, seen: &mut HashSet<ClassId>, order: &mut Vec<ClassId>) {
        if !seen.insert(id) {
            return;
        }
        for field in program.class(id).fields() {
            let mut ty = &field.ty;
            while let Type::Array(array) = ty {
                if !array.storage {
                    break;
                }
                ty = &array.element;
            }
            if let Type::ClassStorage(inner) = ty {
                visit(program, *inner, seen, order);
            }
        }
        if !program.class(id).is_static() {
            order.push(id);
        }
    }

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for (id, _) in program.classes_in_order() {
        visit(program, id, &mut seen, &mut order);
    }
    order
}
