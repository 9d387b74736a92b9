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

use std::sync::Arc;

use arcstr::ArcStr;
use pest::Parser;
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use tracing::trace;

use crate::errors::CompileError;
use crate::parse::warren::{Rule, WarrenParser};
use warren_var::program::{BinaryOp, Expr, LambdaBody, Program, Stmt, StmtNode, UnaryOp};
use warren_var::{Var, v_bool, v_float, v_int, v_null, v_string, v_undefined};

pub mod warren {
    #[derive(Parser)]
    #[grammar = "src/warren.pest"]
    pub struct WarrenParser;
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct CompileOptions {
    /// Turn a trailing top-level expression statement into the program's return value, the
    /// way an interactive console reports the last thing evaluated.
    pub implicit_return: bool,
}

pub struct TreeTransformer {
    pratt: PrattParser<Rule>,
}

impl TreeTransformer {
    pub fn new() -> Self {
        let pratt = PrattParser::new()
            // Precedence from lowest to highest.
            // Assignment is lowest, and right-hand sides are parsed as whole expressions.
            .op(Op::postfix(Rule::assign))
            // Ternary conditional
            .op(Op::postfix(Rule::cond_expr))
            .op(Op::infix(Rule::lor, Assoc::Left))
            .op(Op::infix(Rule::land, Assoc::Left))
            // Equality, loose and strict
            .op(Op::infix(Rule::eq, Assoc::Left)
                | Op::infix(Rule::neq, Assoc::Left)
                | Op::infix(Rule::strict_eq, Assoc::Left)
                | Op::infix(Rule::strict_neq, Assoc::Left))
            // Relational operators
            .op(Op::infix(Rule::gt, Assoc::Left)
                | Op::infix(Rule::lt, Assoc::Left)
                | Op::infix(Rule::gte, Assoc::Left)
                | Op::infix(Rule::lte, Assoc::Left))
            .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
            .op(Op::infix(Rule::mul, Assoc::Left)
                | Op::infix(Rule::div, Assoc::Left)
                | Op::infix(Rule::modulus, Assoc::Left))
            // Unary negation & logical-not
            .op(Op::prefix(Rule::neg) | Op::prefix(Rule::not))
            // Member access, indexing and calls bind tightest.
            .op(Op::postfix(Rule::member) | Op::postfix(Rule::index) | Op::postfix(Rule::call));
        Self { pratt }
    }

    fn parse_statements(&self, pairs: Pairs<Rule>) -> Result<Vec<Stmt>, CompileError> {
        let mut stmts = vec![];
        for pair in pairs {
            if let Some(stmt) = self.parse_statement(pair)? {
                stmts.push(stmt);
            }
        }
        Ok(stmts)
    }

    /// The arm of an `if`/`while`: a block contributes its statements, anything else is a
    /// single statement.
    fn parse_arm(&self, pair: Pair<Rule>) -> Result<Vec<Stmt>, CompileError> {
        match pair.as_rule() {
            Rule::block_statement => self.parse_statements(pair.into_inner()),
            _ => Ok(self.parse_statement(pair)?.into_iter().collect()),
        }
    }

    fn parse_statement(&self, pair: Pair<Rule>) -> Result<Option<Stmt>, CompileError> {
        let line = pair.line_col().0;
        let node = match pair.as_rule() {
            Rule::let_statement => {
                let mut parts = pair.into_inner();
                let _let_kw = parts.next();
                let name = ArcStr::from(parts.next().unwrap().as_str());
                let value = parts
                    .next()
                    .map(|e| self.parse_expr(e.into_inner()))
                    .transpose()?;
                StmtNode::Let { name, value }
            }
            Rule::if_statement => {
                let mut parts = pair.into_inner();
                let _if_kw = parts.next();
                let condition = self.parse_expr(parts.next().unwrap().into_inner())?;
                let then_arm = self.parse_arm(parts.next().unwrap())?;
                let else_arm = match parts.next() {
                    Some(else_arm) => {
                        let mut else_parts = else_arm.into_inner();
                        let _else_kw = else_parts.next();
                        self.parse_arm(else_parts.next().unwrap())?
                    }
                    None => vec![],
                };
                StmtNode::If {
                    condition,
                    then_arm,
                    else_arm,
                }
            }
            Rule::while_statement => {
                let mut parts = pair.into_inner();
                let _while_kw = parts.next();
                let condition = self.parse_expr(parts.next().unwrap().into_inner())?;
                let body = self.parse_arm(parts.next().unwrap())?;
                StmtNode::While { condition, body }
            }
            Rule::return_statement => {
                let mut parts = pair.into_inner();
                let _return_kw = parts.next();
                let value = parts
                    .next()
                    .map(|e| self.parse_expr(e.into_inner()))
                    .transpose()?;
                StmtNode::Return(value)
            }
            Rule::throw_statement => {
                let mut parts = pair.into_inner();
                let _throw_kw = parts.next();
                StmtNode::Throw(self.parse_expr(parts.next().unwrap().into_inner())?)
            }
            Rule::block_statement => StmtNode::Block(self.parse_statements(pair.into_inner())?),
            Rule::expr_statement => {
                let expr = pair.into_inner().next().unwrap();
                StmtNode::Expr(self.parse_expr(expr.into_inner())?)
            }
            Rule::empty_statement | Rule::EOI => return Ok(None),
            _ => unreachable!("Unexpected statement rule: {:?}", pair.as_rule()),
        };
        Ok(Some(Stmt::new(node, line)))
    }

    fn parse_expr(&self, pairs: Pairs<Rule>) -> Result<Expr, CompileError> {
        self.pratt
            .map_primary(|primary| self.parse_primary(primary))
            .map_prefix(|op, rhs| match op.as_rule() {
                Rule::neg => Ok(Expr::Unary(UnaryOp::Neg, Box::new(rhs?))),
                Rule::not => Ok(Expr::Unary(UnaryOp::Not, Box::new(rhs?))),
                _ => unreachable!("Unexpected prefix: {:?}", op.as_rule()),
            })
            .map_postfix(|lhs, op| self.parse_postfix(lhs?, op))
            .map_infix(|lhs, op, rhs| {
                let (lhs, rhs) = (Box::new(lhs?), Box::new(rhs?));
                let op = match op.as_rule() {
                    Rule::land => return Ok(Expr::And(lhs, rhs)),
                    Rule::lor => return Ok(Expr::Or(lhs, rhs)),
                    Rule::add => BinaryOp::Add,
                    Rule::sub => BinaryOp::Sub,
                    Rule::mul => BinaryOp::Mul,
                    Rule::div => BinaryOp::Div,
                    Rule::modulus => BinaryOp::Mod,
                    Rule::eq => BinaryOp::Eq,
                    Rule::neq => BinaryOp::NEq,
                    Rule::strict_eq => BinaryOp::StrictEq,
                    Rule::strict_neq => BinaryOp::StrictNEq,
                    Rule::lt => BinaryOp::Lt,
                    Rule::lte => BinaryOp::LtE,
                    Rule::gt => BinaryOp::Gt,
                    Rule::gte => BinaryOp::GtE,
                    _ => unreachable!("Unexpected infix: {:?}", op.as_rule()),
                };
                Ok(Expr::Binary(op, lhs, rhs))
            })
            .parse(pairs)
    }

    fn parse_exprs(&self, pairs: Pairs<Rule>) -> Result<Vec<Expr>, CompileError> {
        pairs.map(|p| self.parse_expr(p.into_inner())).collect()
    }

    fn parse_postfix(&self, lhs: Expr, op: Pair<Rule>) -> Result<Expr, CompileError> {
        match op.as_rule() {
            Rule::member => {
                let name = op.into_inner().next().unwrap();
                Ok(Expr::Member {
                    base: Box::new(lhs),
                    name: ArcStr::from(name.as_str()),
                })
            }
            Rule::index => {
                let index = self.parse_expr(op.into_inner().next().unwrap().into_inner())?;
                Ok(Expr::Index {
                    base: Box::new(lhs),
                    index: Box::new(index),
                })
            }
            Rule::call => Ok(Expr::Call {
                callee: Box::new(lhs),
                args: self.parse_exprs(op.into_inner())?,
            }),
            Rule::assign => {
                let (line, col) = op.line_col();
                if !matches!(
                    lhs,
                    Expr::Id(_) | Expr::Member { .. } | Expr::Index { .. }
                ) {
                    return Err(CompileError::InvalidAssignmentTarget { line, col });
                }
                let right = self.parse_expr(op.into_inner().next().unwrap().into_inner())?;
                Ok(Expr::Assign {
                    left: Box::new(lhs),
                    right: Box::new(right),
                })
            }
            Rule::cond_expr => {
                let mut parts = op.into_inner();
                let consequence = self.parse_expr(parts.next().unwrap().into_inner())?;
                let alternative = self.parse_expr(parts.next().unwrap().into_inner())?;
                Ok(Expr::Cond {
                    condition: Box::new(lhs),
                    consequence: Box::new(consequence),
                    alternative: Box::new(alternative),
                })
            }
            _ => unreachable!("Unexpected postfix: {:?}", op.as_rule()),
        }
    }

    fn parse_primary(&self, pair: Pair<Rule>) -> Result<Expr, CompileError> {
        match pair.as_rule() {
            Rule::ident => Ok(Expr::Id(ArcStr::from(pair.as_str()))),
            Rule::this_kw => Ok(Expr::This),
            Rule::true_kw => Ok(Expr::Value(v_bool(true))),
            Rule::false_kw => Ok(Expr::Value(v_bool(false))),
            Rule::null_kw => Ok(Expr::Value(v_null())),
            Rule::undefined_kw => Ok(Expr::Value(v_undefined())),
            Rule::number => Ok(Expr::Value(parse_number(pair.as_str()))),
            Rule::string => Ok(Expr::Value(v_string(self.parse_string(pair)?))),
            Rule::paren => self.parse_expr(pair.into_inner().next().unwrap().into_inner()),
            Rule::array => Ok(Expr::Array(self.parse_exprs(pair.into_inner())?)),
            Rule::object => {
                let mut entries = vec![];
                for property in pair.into_inner() {
                    let mut parts = property.into_inner();
                    let key = parts.next().unwrap();
                    let value = match parts.next() {
                        Some(value) => self.parse_expr(value.into_inner())?,
                        // Shorthand `{ a }` means `{ a: a }`.
                        None => Expr::Id(ArcStr::from(key.as_str())),
                    };
                    let key = match key.as_rule() {
                        Rule::string => ArcStr::from(self.parse_string(key)?),
                        _ => ArcStr::from(key.as_str()),
                    };
                    entries.push((key, value));
                }
                Ok(Expr::Object(entries))
            }
            Rule::lambda => {
                let source = ArcStr::from(pair.as_str());
                let mut parts = pair.into_inner();
                let params = parts
                    .next()
                    .unwrap()
                    .into_inner()
                    .map(|p| ArcStr::from(p.as_str()))
                    .collect();
                let body = parts.next().unwrap();
                let body = match body.as_rule() {
                    Rule::lambda_block => {
                        LambdaBody::Block(self.parse_statements(body.into_inner())?)
                    }
                    _ => LambdaBody::Expr(self.parse_expr(body.into_inner())?),
                };
                Ok(Expr::Lambda {
                    params,
                    body: Arc::new(body),
                    source,
                })
            }
            _ => unreachable!("Unexpected primary: {:?}", pair.as_rule()),
        }
    }

    fn parse_string(&self, pair: Pair<Rule>) -> Result<String, CompileError> {
        let line = pair.line_col().0;
        let contents = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
        unquote_str(contents).map_err(|message| CompileError::InvalidString { line, message })
    }
}

impl Default for TreeTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(text: &str) -> Var {
    if !text.contains(['.', 'e', 'E'])
        && let Ok(i) = text.parse::<i64>()
    {
        return v_int(i);
    }
    // Integers too large for i64 become floats, as they would in JavaScript.
    v_float(text.parse::<f64>().unwrap_or(f64::NAN))
}

/// Resolve the escapes in the body of a string literal (without its quotes). Unknown escapes
/// stand for the escaped character itself.
pub fn unquote_str(s: &str) -> Result<String, String> {
    let mut output = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => output.push('\n'),
            Some('t') => output.push('\t'),
            Some('r') => output.push('\r'),
            Some('0') => output.push('\0'),
            Some(c) => output.push(c),
            None => return Err("Unexpected end of string".to_string()),
        }
    }
    Ok(output)
}

/// Compile a program. Syntax problems are reported with the line and column they were found at.
pub fn compile(source: &str, options: CompileOptions) -> Result<Program, CompileError> {
    let mut pairs = match WarrenParser::parse(Rule::program, source) {
        Ok(pairs) => pairs,
        Err(e) => {
            let (line, col) = match e.line_col {
                LineColLocation::Pos(lc) => lc,
                LineColLocation::Span(begin, _) => begin,
            };
            return Err(CompileError::ParseError {
                line,
                col,
                context: e.line().to_string(),
                message: e.variant.message().to_string(),
            });
        }
    };
    let Some(program) = pairs.next() else {
        return Ok(Program::default());
    };

    let transformer = TreeTransformer::new();
    let mut stmts = transformer.parse_statements(program.into_inner())?;

    if options.implicit_return
        && let Some(Stmt { node, .. }) = stmts.last_mut()
        && let StmtNode::Expr(_) = node
        && let StmtNode::Expr(e) = std::mem::replace(node, StmtNode::Return(None))
    {
        *node = StmtNode::Return(Some(e));
    }
    trace!(statements = stmts.len(), "compiled program");
    Ok(Program { stmts })
}

/// Compile source which must consist of exactly one expression, such as the lambda text of a
/// stored function.
pub fn compile_expr(source: &str) -> Result<Expr, CompileError> {
    let mut program = compile(source, CompileOptions::default())?;
    match program.stmts.pop() {
        Some(Stmt {
            node: StmtNode::Expr(expr),
            ..
        }) if program.stmts.is_empty() => Ok(expr),
        _ => Err(CompileError::NotAnExpression),
    }
}
