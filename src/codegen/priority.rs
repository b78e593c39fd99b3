//! Operator priorities for parenthesization.
//!
//! The default table follows C, which ActionScript and OpenCL C share.
//! A child is parenthesized when its priority is below the one its
//! position requires (or equal, on the non-associative side).

use crate::ast::{BinaryOp, Expr, ExprKind, Literal};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Statement,
    Argument,
    Select,
    CondOr,
    CondAnd,
    Or,
    Xor,
    And,
    Equality,
    Rel,
    Shift,
    Add,
    Mul,
    Prefix,
    Postfix,
    Primary,
}

impl BinaryOp {
    pub fn priority(&self) -> Priority {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => Priority::Mul,
            BinaryOp::Add | BinaryOp::Sub => Priority::Add,
            BinaryOp::Shl | BinaryOp::Shr => Priority::Shift,
            BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
                Priority::Rel
            }
            BinaryOp::Eq | BinaryOp::NotEq => Priority::Equality,
            BinaryOp::BitAnd => Priority::And,
            BinaryOp::BitXor => Priority::Xor,
            BinaryOp::BitOr => Priority::Or,
            BinaryOp::And => Priority::CondAnd,
            BinaryOp::Or => Priority::CondOr,
        }
    }
}

/// Priority of an expression printed in its generic form.
pub fn default_priority(expr: &Expr) -> Priority {
    match &expr.kind {
        ExprKind::Literal(Literal::Int(n)) if *n < 0 => Priority::Prefix,
        ExprKind::Literal(Literal::Float(f)) if *f < 0.0 => Priority::Prefix,
        ExprKind::Literal(_)
        | ExprKind::Var(_)
        | ExprKind::This
        | ExprKind::Const { .. }
        | ExprKind::EnumValue { .. }
        | ExprKind::Resource(_)
        | ExprKind::Interpolated { .. } => Priority::Primary,
        ExprKind::Field { .. }
        | ExprKind::Property { .. }
        | ExprKind::Call { .. }
        | ExprKind::Index { .. } => Priority::Postfix,
        ExprKind::Unary { op, .. } => {
            if op.is_postfix() {
                Priority::Postfix
            } else {
                Priority::Prefix
            }
        }
        ExprKind::Binary { op, .. } => op.priority(),
        ExprKind::Select { .. } => Priority::Select,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Type, UnaryOp};

    #[test]
    fn test_multiplicative_binds_tighter_than_additive() {
        assert!(BinaryOp::Mul.priority() > BinaryOp::Add.priority());
        assert!(BinaryOp::Div.priority() > BinaryOp::Sub.priority());
    }

    #[test]
    fn test_c_bitwise_below_equality() {
        assert!(BinaryOp::BitAnd.priority() < BinaryOp::Eq.priority());
        assert!(BinaryOp::BitOr.priority() < BinaryOp::BitXor.priority());
    }

    #[test]
    fn test_negative_literal_is_prefix() {
        assert_eq!(default_priority(&Expr::int(-1)), Priority::Prefix);
        assert_eq!(default_priority(&Expr::int(1)), Priority::Primary);
    }

    #[test]
    fn test_postfix_increment() {
        let e = Expr::unary(UnaryOp::PostInc, Expr::var("i", Type::int()));
        assert_eq!(default_priority(&e), Priority::Postfix);
        let e = Expr::unary(UnaryOp::Neg, Expr::var("i", Type::int()));
        assert_eq!(default_priority(&e), Priority::Prefix);
    }
}
