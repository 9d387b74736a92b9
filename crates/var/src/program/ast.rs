// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use crate::var::Var;
use arcstr::ArcStr;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NEq,
    StrictEq,
    StrictNEq,
    Lt,
    LtE,
    Gt,
    GtE,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::NEq => "!=",
            Self::StrictEq => "===",
            Self::StrictNEq => "!==",
            Self::Lt => "<",
            Self::LtE => "<=",
            Self::Gt => ">",
            Self::GtE => ">=",
        })
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Value(Var),
    Id(ArcStr),
    This,
    Array(Vec<Expr>),
    Object(Vec<(ArcStr, Expr)>),
    Member {
        base: Box<Expr>,
        name: ArcStr,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Cond {
        condition: Box<Expr>,
        consequence: Box<Expr>,
        alternative: Box<Expr>,
    },
    Assign {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Lambda {
        params: Vec<ArcStr>,
        body: Arc<LambdaBody>,
        /// The text the lambda was written as; what a function stored on an object keeps.
        source: ArcStr,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub enum LambdaBody {
    Expr(Expr),
    Block(Vec<Stmt>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Stmt {
    pub node: StmtNode,
    /// 1-based source line the statement starts on.
    pub line: usize,
}

impl Stmt {
    pub fn new(node: StmtNode, line: usize) -> Self {
        Self { node, line }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum StmtNode {
    Let { name: ArcStr, value: Option<Expr> },
    Expr(Expr),
    If {
        condition: Expr,
        then_arm: Vec<Stmt>,
        else_arm: Vec<Stmt>,
    },
    While { condition: Expr, body: Vec<Stmt> },
    Block(Vec<Stmt>),
    Return(Option<Expr>),
    Throw(Expr),
}

/// A compiled unit of top-level statements.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}
