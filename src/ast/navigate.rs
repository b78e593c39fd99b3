//! AST navigation: look declarations up by id or name, and check that
//! every id the program mentions points at a declaration.

use super::{
    Block, ClassDef, ClassId, ConstDef, ConstValue, EnumDef, EnumId, Expr, ExprKind, FieldDef,
    GlobalRef, Member, MethodDef, MethodRef, Program, Stmt, Type,
};

impl Program {
    /// The enum with the given id. Ids come from a validated program.
    pub fn enum_def(&self, id: EnumId) -> &EnumDef {
        &self.enums[id.0]
    }

    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.0]
    }

    pub fn enum_name(&self, id: EnumId) -> &str {
        self.enums.get(id.0).map_or("<unknown enum>", |e| e.name.as_str())
    }

    pub fn class_name(&self, id: ClassId) -> &str {
        self.classes
            .get(id.0)
            .map_or("<unknown class>", |c| c.name.as_str())
    }

    /// All classes in global declaration order.
    pub fn classes_in_order(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> {
        self.globals.iter().filter_map(|g| match g {
            GlobalRef::Class(id) => Some((*id, self.class(*id))),
            GlobalRef::Enum(_) => None,
        })
    }

    /// All enums in global declaration order.
    pub fn enums_in_order(&self) -> impl Iterator<Item = (EnumId, &EnumDef)> {
        self.globals.iter().filter_map(|g| match g {
            GlobalRef::Enum(id) => Some((*id, self.enum_def(*id))),
            GlobalRef::Class(_) => None,
        })
    }

    /// Find the first id that does not resolve to a declaration.
    pub fn find_dangling_id(&self) -> Option<String> {
        let mut checker = IdChecker {
            program: self,
            dangling: None,
        };
        for global in &self.globals {
            match global {
                GlobalRef::Enum(id) => checker.enum_id(*id),
                GlobalRef::Class(id) => checker.class_id(*id),
            }
        }
        for class in &self.classes {
            if let Some(ctor) = &class.constructor {
                checker.block(ctor);
            }
            for member in &class.members {
                match member {
                    Member::Field(f) => {
                        checker.ty(&f.ty);
                        if let Some(value) = &f.value {
                            checker.expr(value);
                        }
                    }
                    Member::Const(c) => checker.constant(c),
                    Member::Method(m) => {
                        checker.ty(&m.return_type);
                        for p in &m.params {
                            checker.ty(&p.ty);
                        }
                        checker.block(&m.body);
                    }
                }
            }
            for c in &class.const_arrays {
                checker.constant(c);
            }
        }
        checker.dangling
    }
}

impl ClassDef {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(f) => Some(f),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) => Some(m),
            _ => None,
        })
    }

    pub fn consts(&self) -> impl Iterator<Item = &ConstDef> {
        self.members.iter().filter_map(|m| match m {
            Member::Const(c) => Some(c),
            _ => None,
        })
    }

    /// Find a scalar or array constant by source name or global name.
    pub fn find_const(&self, name: &str) -> Option<&ConstDef> {
        self.consts()
            .chain(self.const_arrays.iter())
            .find(|c| c.name == name || c.global_name.as_deref() == Some(name))
    }

    /// A class with only static methods and no state.
    pub fn is_static(&self) -> bool {
        self.constructor.is_none()
            && self.fields().next().is_none()
            && self.methods().all(|m| m.is_static)
    }
}

struct IdChecker<'a> {
    program: &'a Program,
    dangling: Option<String>,
}

impl IdChecker<'_> {
    fn enum_id(&mut self, id: EnumId) {
        if self.dangling.is_none() && id.0 >= self.program.enums.len() {
            self.dangling = Some(format!("enum #{}", id.0));
        }
    }

    fn class_id(&mut self, id: ClassId) {
        if self.dangling.is_none() && id.0 >= self.program.classes.len() {
            self.dangling = Some(format!("class #{}", id.0));
        }
    }

    fn ty(&mut self, ty: &Type) {
        match ty {
            Type::Enum(id) => self.enum_id(*id),
            Type::ClassStorage(id) | Type::ClassRef(id) => self.class_id(*id),
            Type::Array(array) => self.ty(&array.element),
            _ => {}
        }
    }

    fn constant(&mut self, c: &ConstDef) {
        self.ty(&c.ty);
        self.const_value(&c.value);
    }

    fn const_value(&mut self, value: &ConstValue) {
        match value {
            ConstValue::EnumValue { enum_id, .. } => self.enum_id(*enum_id),
            ConstValue::Array(items) => items.iter().for_each(|v| self.const_value(v)),
            _ => {}
        }
    }

    fn block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(b) => self.block(b),
            Stmt::Expr(e) | Stmt::Throw(e) => self.expr(e),
            Stmt::Var(v) => {
                self.ty(&v.ty);
                if let Some(value) = &v.value {
                    self.expr(value);
                }
            }
            Stmt::Assign { target, value, .. } => {
                self.expr(target);
                self.expr(value);
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.expr(cond);
                self.stmt(then_branch);
                if let Some(e) = else_branch {
                    self.stmt(e);
                }
            }
            Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
                self.expr(cond);
                self.stmt(body);
            }
            Stmt::For {
                init,
                cond,
                advance,
                body,
            } => {
                if let Some(s) = init {
                    self.stmt(s);
                }
                if let Some(c) = cond {
                    self.expr(c);
                }
                if let Some(s) = advance {
                    self.stmt(s);
                }
                self.stmt(body);
            }
            Stmt::Return(Some(e)) => self.expr(e),
            Stmt::Return(None) | Stmt::Break | Stmt::Continue | Stmt::Native(_) => {}
        }
    }

    fn expr(&mut self, expr: &Expr) {
        self.ty(&expr.ty);
        match &expr.kind {
            ExprKind::Const { class, .. } => self.class_id(*class),
            ExprKind::EnumValue { enum_id, .. } => self.enum_id(*enum_id),
            ExprKind::Field { obj, .. } | ExprKind::Property { obj, .. } => self.expr(obj),
            ExprKind::Call { obj, method, args } => {
                if let MethodRef::User { class, .. } = method {
                    self.class_id(*class);
                }
                if let Some(o) = obj {
                    self.expr(o);
                }
                args.iter().for_each(|a| self.expr(a));
            }
            ExprKind::Index { array, index } => {
                self.expr(array);
                self.expr(index);
            }
            ExprKind::Unary { operand, .. } => self.expr(operand),
            ExprKind::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            ExprKind::Select {
                cond,
                on_true,
                on_false,
            } => {
                self.expr(cond);
                self.expr(on_true);
                self.expr(on_false);
            }
            ExprKind::Interpolated { parts, .. } => parts.iter().for_each(|p| self.expr(&p.arg)),
            ExprKind::Literal(_) | ExprKind::Var(_) | ExprKind::This | ExprKind::Resource(_) => {}
        }
    }
}
