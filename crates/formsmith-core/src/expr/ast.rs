//! Formula syntax tree

use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Concat => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Ident(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Variable names this expression reads, first occurrence first.
    ///
    /// Called function names are not included.
    pub fn references(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references(&self, names: &mut Vec<String>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Ident(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            Expr::Unary { operand, .. } => operand.collect_references(names),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_references(names);
                rhs.collect_references(names);
            }
            Expr::Conditional { cond, then, otherwise } => {
                cond.collect_references(names);
                then.collect_references(names);
                otherwise.collect_references(names);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_references(names);
                }
            }
        }
    }

    /// Function names this expression calls.
    pub fn calls(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_calls(&mut names);
        names
    }

    fn collect_calls(&self, names: &mut Vec<String>) {
        match self {
            Expr::Literal(_) | Expr::Ident(_) => {}
            Expr::Unary { operand, .. } => operand.collect_calls(names),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_calls(names);
                rhs.collect_calls(names);
            }
            Expr::Conditional { cond, then, otherwise } => {
                cond.collect_calls(names);
                then.collect_calls(names);
                otherwise.collect_calls(names);
            }
            Expr::Call { name, args } => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
                for arg in args {
                    arg.collect_calls(names);
                }
            }
        }
    }
}
