//! The target-independent traversal.
//!
//! `SourceGenerator` prints statements and expressions in the C-like shape
//! all targets share. A backend implements the required hooks (locals,
//! built-ins, calls, names of declared things) and overrides any default
//! whose output differs on its target.

use crate::ast::*;

use super::error::{GenError, GenResult};
use super::naming::{camel_case, upper_snake_case};
use super::priority::{default_priority, Priority};
use super::writer::SourceWriter;

pub trait SourceGenerator<'p>: Sized {
    fn writer(&mut self) -> &mut SourceWriter;
    fn program(&self) -> &'p Program;
    /// Target id used in diagnostics (e.g. "as").
    fn backend_name(&self) -> &'static str;

    // --- Required mapping points ---

    /// A local declaration without the terminating `;`.
    fn write_var(&mut self, var: &VarDecl) -> GenResult<()>;
    fn write_throw(&mut self, message: &Expr) -> GenResult<()>;
    fn write_this(&mut self) -> GenResult<()>;
    fn write_const_ref(&mut self, class: ClassId, name: &str) -> GenResult<()>;
    fn write_enum_value(&mut self, enum_id: EnumId, index: usize) -> GenResult<()>;
    fn write_property(
        &mut self,
        expr: &Expr,
        obj: &Expr,
        property: BuiltinProperty,
    ) -> GenResult<()>;
    fn write_builtin_call(
        &mut self,
        expr: &Expr,
        obj: Option<&Expr>,
        method: BuiltinMethod,
        args: &[Expr],
    ) -> GenResult<()>;
    fn write_user_call(
        &mut self,
        obj: Option<&Expr>,
        class: ClassId,
        name: &str,
        is_static: bool,
        args: &[Expr],
    ) -> GenResult<()>;

    // --- Output shortcuts ---

    fn write(&mut self, text: &str) {
        self.writer().write(text);
    }

    fn write_char(&mut self, c: char) {
        self.writer().write_char(c);
    }

    fn write_line(&mut self, text: &str) {
        self.writer().write_line(text);
    }

    fn newline(&mut self) {
        self.writer().newline();
    }

    /// Run `f` inside `{` `}`. The block is closed whatever `f` returns.
    fn in_block<F>(&mut self, f: F) -> GenResult<()>
    where
        F: FnOnce(&mut Self) -> GenResult<()>,
    {
        self.writer().open_block();
        let result = f(self);
        self.writer().close_block();
        result
    }

    // --- Errors ---

    fn unmapped_type(&self, ty: &Type) -> GenError {
        GenError::UnmappedType {
            backend: self.backend_name(),
            ty: self.program().describe_type(ty),
        }
    }

    fn unmapped_method(&self, method: BuiltinMethod) -> GenError {
        GenError::UnmappedBuiltin {
            backend: self.backend_name(),
            builtin: method.name(),
        }
    }

    fn unsupported(&self, feature: impl Into<String>) -> GenError {
        GenError::Unsupported {
            backend: self.backend_name(),
            feature: feature.into(),
        }
    }

    // --- Names ---

    fn write_camel_case(&mut self, name: &str) {
        let name = camel_case(name);
        self.write(&name);
    }

    fn write_uppercase_with_underscores(&mut self, name: &str) {
        let name = upper_snake_case(name);
        self.write(&name);
    }

    /// Fields, locals and parameters.
    fn write_camel_case_not_keyword(&mut self, name: &str) {
        self.write_camel_case(name);
    }

    // --- Parenthesization ---

    fn priority(&self, expr: &Expr) -> Priority {
        default_priority(expr)
    }

    fn write_child(&mut self, parent: Priority, child: &Expr) -> GenResult<()> {
        if self.priority(child) < parent {
            self.write_parenthesized(child)
        } else {
            self.write_expr(child)
        }
    }

    fn write_non_assoc_child(&mut self, parent: Priority, child: &Expr) -> GenResult<()> {
        if self.priority(child) <= parent {
            self.write_parenthesized(child)
        } else {
            self.write_expr(child)
        }
    }

    fn write_parenthesized(&mut self, expr: &Expr) -> GenResult<()> {
        self.write_char('(');
        self.write_expr(expr)?;
        self.write_char(')');
        Ok(())
    }

    // --- Expressions ---

    fn write_expr(&mut self, expr: &Expr) -> GenResult<()> {
        match &expr.kind {
            ExprKind::Literal(lit) => self.write_literal(lit),
            ExprKind::Var(name) => {
                self.write_camel_case_not_keyword(name);
                Ok(())
            }
            ExprKind::This => self.write_this(),
            ExprKind::Const { class, name } => self.write_const_ref(*class, name),
            ExprKind::EnumValue { enum_id, index } => self.write_enum_value(*enum_id, *index),
            ExprKind::Field { obj, field } => self.write_field_access(obj, field),
            ExprKind::Property { obj, property } => self.write_property(expr, obj, *property),
            ExprKind::Call { obj, method, args } => match method {
                MethodRef::Builtin(m) => self.write_builtin_call(expr, obj.as_deref(), *m, args),
                MethodRef::User {
                    class,
                    name,
                    is_static,
                } => self.write_user_call(obj.as_deref(), *class, name, *is_static, args),
            },
            ExprKind::Index { array, index } => self.write_index(array, index),
            ExprKind::Unary { op, operand } => self.write_unary(*op, operand),
            ExprKind::Binary { left, op, right } => match op {
                BinaryOp::Eq => self.write_equality(expr, left, right, false),
                BinaryOp::NotEq => self.write_equality(expr, left, right, true),
                _ => self.write_binary(expr, left, *op, right),
            },
            ExprKind::Select {
                cond,
                on_true,
                on_false,
            } => self.write_select(cond, on_true, on_false),
            ExprKind::Interpolated { parts, suffix } => self.write_interpolated(parts, suffix),
            ExprKind::Resource(name) => self.write_resource(name),
        }
    }

    fn write_literal(&mut self, lit: &Literal) -> GenResult<()> {
        match lit {
            Literal::Int(n) => self.write(&n.to_string()),
            Literal::Float(f) => return self.write_float(*f),
            Literal::Bool(b) => self.write_bool(*b),
            Literal::Str(s) => self.write_string_literal(s),
            Literal::Null => self.write_null(),
        }
        Ok(())
    }

    fn write_bool(&mut self, value: bool) {
        self.write(if value { "true" } else { "false" });
    }

    /// Infinities and NaN have no literal form in the C family.
    fn write_float(&mut self, value: f64) -> GenResult<()> {
        if !value.is_finite() {
            return Err(self.unsupported(format!("float literal {}", value)));
        }
        self.write(&format_float(value));
        Ok(())
    }

    fn write_null(&mut self) {
        self.write("null");
    }

    fn write_string_literal(&mut self, s: &str) {
        let mut quoted = String::with_capacity(s.len() + 2);
        quoted.push('"');
        for c in s.chars() {
            match c {
                '"' => quoted.push_str("\\\""),
                '\\' => quoted.push_str("\\\\"),
                '\n' => quoted.push_str("\\n"),
                '\r' => quoted.push_str("\\r"),
                '\t' => quoted.push_str("\\t"),
                _ => quoted.push(c),
            }
        }
        quoted.push('"');
        self.write(&quoted);
    }

    fn write_const_value(&mut self, value: &ConstValue) -> GenResult<()> {
        match value {
            ConstValue::Int(n) => self.write(&n.to_string()),
            ConstValue::Float(f) => return self.write_float(*f),
            ConstValue::Bool(b) => self.write_bool(*b),
            ConstValue::Str(s) => self.write_string_literal(s),
            ConstValue::EnumValue { enum_id, index } => {
                return self.write_enum_value(*enum_id, *index)
            }
            ConstValue::Array(items) => return self.write_const_array(items),
        }
        Ok(())
    }

    fn write_const_array(&mut self, items: &[ConstValue]) -> GenResult<()> {
        self.write("{ ");
        self.write_const_items(items)?;
        self.write(" }");
        Ok(())
    }

    fn write_const_items(&mut self, items: &[ConstValue]) -> GenResult<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_const_value(item)?;
        }
        Ok(())
    }

    fn write_field_access(&mut self, obj: &Expr, field: &str) -> GenResult<()> {
        self.write_child(Priority::Postfix, obj)?;
        self.write_char('.');
        self.write_camel_case_not_keyword(field);
        Ok(())
    }

    fn write_index(&mut self, array: &Expr, index: &Expr) -> GenResult<()> {
        self.write_child(Priority::Postfix, array)?;
        self.write_char('[');
        self.write_expr(index)?;
        self.write_char(']');
        Ok(())
    }

    fn write_args(&mut self, args: &[Expr]) -> GenResult<()> {
        self.write_char('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_child(Priority::Argument, arg)?;
        }
        self.write_char(')');
        Ok(())
    }

    fn write_unary(&mut self, op: UnaryOp, operand: &Expr) -> GenResult<()> {
        if op.is_postfix() {
            self.write_child(Priority::Postfix, operand)?;
            self.write(op.as_str());
            return Ok(());
        }
        self.write(op.as_str());
        // `- -x` and `- --x` must not fuse into `--x` / `---x`
        let fuses = matches!(
            &operand.kind,
            ExprKind::Unary {
                op: UnaryOp::Neg | UnaryOp::PreDec | UnaryOp::PreInc,
                ..
            }
        ) || matches!(&operand.kind, ExprKind::Literal(Literal::Int(n)) if *n < 0);
        if fuses {
            self.write_parenthesized(operand)
        } else {
            self.write_child(Priority::Prefix, operand)
        }
    }

    fn write_binary(
        &mut self,
        _expr: &Expr,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
    ) -> GenResult<()> {
        let priority = op.priority();
        self.write_child(priority, left)?;
        self.write_char(' ');
        self.write(op.as_str());
        self.write_char(' ');
        self.write_non_assoc_child(priority, right)
    }

    /// `==` or `!=` (when `not`).
    fn write_equality(
        &mut self,
        expr: &Expr,
        left: &Expr,
        right: &Expr,
        not: bool,
    ) -> GenResult<()> {
        let op = if not { BinaryOp::NotEq } else { BinaryOp::Eq };
        self.write_binary(expr, left, op, right)
    }

    fn write_select(&mut self, cond: &Expr, on_true: &Expr, on_false: &Expr) -> GenResult<()> {
        self.write_child(Priority::CondOr, cond)?;
        self.write(" ? ");
        self.write_child(Priority::Select, on_true)?;
        self.write(" : ");
        self.write_child(Priority::Select, on_false)
    }

    fn write_interpolated(&mut self, _parts: &[InterpolatedPart], _suffix: &str) -> GenResult<()> {
        Err(self.unsupported("interpolated strings are not supported"))
    }

    fn write_resource(&mut self, name: &str) -> GenResult<()> {
        Err(self.unsupported(format!("resource `{}` cannot be embedded", name)))
    }

    // --- Statements ---

    fn write_block(&mut self, block: &Block) -> GenResult<()> {
        self.in_block(|g| g.write_stmts(&block.stmts))
    }

    fn write_stmts(&mut self, stmts: &[Stmt]) -> GenResult<()> {
        for stmt in stmts {
            self.write_stmt(stmt)?;
        }
        Ok(())
    }

    fn write_stmt(&mut self, stmt: &Stmt) -> GenResult<()> {
        match stmt {
            Stmt::Block(block) => self.write_block(block),
            Stmt::Expr(_) | Stmt::Var(_) | Stmt::Assign { .. } => {
                self.write_simple_stmt(stmt)?;
                self.write_line(";");
                self.after_simple_stmt(stmt)
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => self.write_if(cond, then_branch, else_branch.as_deref()),
            Stmt::While { cond, body } => {
                self.write("while (");
                self.write_expr(cond)?;
                self.write_char(')');
                self.write_child_stmt(body)
            }
            Stmt::DoWhile { body, cond } => {
                self.write("do");
                self.write_child_stmt(body)?;
                self.write("while (");
                self.write_expr(cond)?;
                self.write_line(");");
                Ok(())
            }
            Stmt::For {
                init,
                cond,
                advance,
                body,
            } => self.write_for(init.as_deref(), cond.as_ref(), advance.as_deref(), body),
            Stmt::Break => {
                self.write_line("break;");
                Ok(())
            }
            Stmt::Continue => {
                self.write_line("continue;");
                Ok(())
            }
            Stmt::Return(value) => self.write_return(value.as_ref()),
            Stmt::Throw(message) => self.write_throw(message),
            Stmt::Native(text) => {
                self.writer().write_lines(text);
                Ok(())
            }
        }
    }

    /// Expression, local or assignment, without `;`.
    fn write_simple_stmt(&mut self, stmt: &Stmt) -> GenResult<()> {
        match stmt {
            Stmt::Expr(expr) => self.write_expr(expr),
            Stmt::Var(var) => self.write_var(var),
            Stmt::Assign { target, op, value } => self.write_assign(target, *op, value),
            _ => Err(self.unsupported("only expressions, locals and assignments may appear in a for clause")),
        }
    }

    /// The first clause of a `for`. Nothing runs after it.
    fn write_for_init(&mut self, init: &Stmt) -> GenResult<()> {
        self.write_simple_stmt(init)
    }

    /// Runs after a simple statement and its `;`.
    fn after_simple_stmt(&mut self, _stmt: &Stmt) -> GenResult<()> {
        Ok(())
    }

    fn write_assign(&mut self, target: &Expr, op: AssignOp, value: &Expr) -> GenResult<()> {
        self.write_expr(target)?;
        self.write_char(' ');
        self.write(op.as_str());
        self.write_char(' ');
        self.write_expr(value)
    }

    /// A nested statement: blocks stay on the header line, anything else
    /// goes one level deeper on the next line.
    fn write_child_stmt(&mut self, stmt: &Stmt) -> GenResult<()> {
        if let Stmt::Block(block) = stmt {
            self.write_char(' ');
            return self.write_block(block);
        }
        self.newline();
        self.writer().indent();
        let result = self.write_stmt(stmt);
        self.writer().dedent();
        result
    }

    fn write_if(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> GenResult<()> {
        self.write("if (");
        self.write_expr(cond)?;
        self.write_char(')');
        self.write_child_stmt(then_branch)?;
        if let Some(else_branch) = else_branch {
            self.write("else");
            if matches!(else_branch, Stmt::If { .. }) {
                self.write_char(' ');
                self.write_stmt(else_branch)?;
            } else {
                self.write_child_stmt(else_branch)?;
            }
        }
        Ok(())
    }

    fn write_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        advance: Option<&Stmt>,
        body: &Stmt,
    ) -> GenResult<()> {
        self.write("for (");
        if let Some(init) = init {
            self.write_for_init(init)?;
        }
        self.write_char(';');
        if let Some(cond) = cond {
            self.write_char(' ');
            self.write_expr(cond)?;
        }
        self.write_char(';');
        if let Some(advance) = advance {
            self.write_char(' ');
            self.write_simple_stmt(advance)?;
        }
        self.write_char(')');
        self.write_child_stmt(body)
    }

    fn write_return(&mut self, value: Option<&Expr>) -> GenResult<()> {
        match value {
            Some(value) => {
                self.write("return ");
                self.write_expr(value)?;
                self.write_line(";");
            }
            None => self.write_line("return;"),
        }
        Ok(())
    }
}

/// Float literal that always reads back as floating point.
pub fn format_float(f: f64) -> String {
    let s = format!("{:?}", f);
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{}.0", s)
    }
}
