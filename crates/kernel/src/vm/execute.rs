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

use std::cmp::Ordering;

use arcstr::ArcStr;
use warren_common::tasks::ScriptError;
use warren_var::program::{BinaryOp, Expr, LambdaBody, Program, Stmt, StmtNode, UnaryOp};
use warren_var::{
    Error, Lambda, List, Map, Obj, Var, Variant, v_bool, v_builtin, v_int, v_list_iter, v_map,
    v_null, v_obj, v_str, v_string, v_undefined,
};

use crate::vm::builtins::{self, GLOBAL_BUILTINS, RUN_BUILTINS};
use crate::vm::{Environment, ExecState};

/// How control leaves a statement.
enum Flow {
    Normal,
    Return(Var),
}

/// Methods every object answers to, after its own and inherited members.
const OBJECT_INTRINSICS: &[&str] = &["new", "destroy", "send"];

/// Highest array position, as in JavaScript.
const MAX_ARRAY_INDEX: usize = u32::MAX as usize - 1;

/// Arrays are dense: an assignment may not grow one further than this past its end.
const MAX_ARRAY_GROWTH: usize = 1 << 16;

impl ExecState<'_> {
    pub(crate) fn exec_program(
        &mut self,
        program: &Program,
        env: &mut Environment,
    ) -> Result<Var, ScriptError> {
        match self.exec_stmts(&program.stmts, env)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(v_undefined()),
        }
    }

    fn exec_block(&mut self, stmts: &[Stmt], env: &mut Environment) -> Result<Flow, ScriptError> {
        env.push_scope();
        let flow = self.exec_stmts(stmts, env);
        env.pop_scope();
        flow
    }

    fn exec_stmts(&mut self, stmts: &[Stmt], env: &mut Environment) -> Result<Flow, ScriptError> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt, env)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &mut Environment) -> Result<Flow, ScriptError> {
        self.step()?;
        self.set_line(stmt.line);
        match &stmt.node {
            StmtNode::Let { name, value } => {
                let value = match value {
                    Some(expr) => self.eval(expr, env)?,
                    None => v_undefined(),
                };
                env.declare(name, value);
            }
            StmtNode::Expr(expr) => {
                self.eval(expr, env)?;
            }
            StmtNode::If {
                condition,
                then_arm,
                else_arm,
            } => {
                let arm = if self.eval(condition, env)?.is_true() {
                    then_arm
                } else {
                    else_arm
                };
                return self.exec_block(arm, env);
            }
            StmtNode::While { condition, body } => {
                while self.eval(condition, env)?.is_true() {
                    self.step()?;
                    if let Flow::Return(value) = self.exec_block(body, env)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            StmtNode::Block(stmts) => return self.exec_block(stmts, env),
            StmtNode::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(expr, env)?,
                    None => v_undefined(),
                };
                return Ok(Flow::Return(value));
            }
            StmtNode::Throw(expr) => {
                let value = self.eval(expr, env)?;
                return Err(ScriptError::Thrown(value));
            }
        }
        Ok(Flow::Normal)
    }

    pub(crate) fn eval(&mut self, expr: &Expr, env: &mut Environment) -> Result<Var, ScriptError> {
        match expr {
            Expr::Value(v) => Ok(v.clone()),
            Expr::Id(name) => self.lookup(name, env),
            Expr::This => Ok(env.this().clone()),
            Expr::Array(items) => {
                let mut list = List::new();
                for item in items {
                    list.push(self.eval(item, env)?);
                }
                Ok(Var::from_variant(Variant::List(list)))
            }
            Expr::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let value = self.eval(value, env)?;
                    map.insert(key, value);
                }
                Ok(v_map(map))
            }
            Expr::Member { base, name } => {
                let base = self.eval(base, env)?;
                self.get_member(&base, name)
            }
            Expr::Index { base, index } => {
                let base = self.eval(base, env)?;
                let index = self.eval(index, env)?;
                self.get_index(&base, &index)
            }
            Expr::Call { callee, args } => self.eval_call(callee, args, env),
            Expr::Unary(op, operand) => {
                let operand = self.eval(operand, env)?;
                match op {
                    UnaryOp::Neg => Ok(operand.negative()?),
                    UnaryOp::Not => Ok(v_bool(!operand.is_true())),
                }
            }
            Expr::Binary(op, left, right) => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                binary(*op, &left, &right)
            }
            Expr::And(left, right) => {
                let left = self.eval(left, env)?;
                if !left.is_true() {
                    return Ok(left);
                }
                self.eval(right, env)
            }
            Expr::Or(left, right) => {
                let left = self.eval(left, env)?;
                if left.is_true() {
                    return Ok(left);
                }
                self.eval(right, env)
            }
            Expr::Cond {
                condition,
                consequence,
                alternative,
            } => {
                if self.eval(condition, env)?.is_true() {
                    self.eval(consequence, env)
                } else {
                    self.eval(alternative, env)
                }
            }
            Expr::Assign { left, right } => {
                let value = self.eval(right, env)?;
                self.store(left, value.clone(), env)?;
                Ok(value)
            }
            Expr::Lambda {
                params,
                body,
                source,
            } => Ok(Var::mk_lambda(Lambda {
                params: params.clone(),
                body: body.clone(),
                source: source.clone(),
                captured: env.capture(),
                this: env.this().clone(),
            })),
        }
    }

    /// Resolve a bare identifier: local bindings, then the host globals, then an object with
    /// that id.
    fn lookup(&mut self, name: &ArcStr, env: &Environment) -> Result<Var, ScriptError> {
        if let Some(value) = env.get(name) {
            return Ok(value.clone());
        }
        if GLOBAL_BUILTINS.contains(&name.as_str()) {
            return Ok(v_builtin(name, None));
        }
        match name.as_str() {
            "players" => {
                let players: Map = self
                    .world
                    .players()
                    .into_iter()
                    .map(|p| (p.as_str().to_string(), v_obj(p)))
                    .collect();
                return Ok(v_map(players));
            }
            "run" => {
                let run: Map = RUN_BUILTINS
                    .iter()
                    .map(|op| (*op, v_builtin(&format!("run.{op}"), None)))
                    .collect();
                return Ok(v_map(run));
            }
            _ => {}
        }
        let id = Obj::mk_id(name);
        if self.world.contains(&id) {
            return Ok(v_obj(id));
        }
        Err(Error::not_defined(name).into())
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        env: &mut Environment,
    ) -> Result<Var, ScriptError> {
        let (function, receiver) = match callee {
            Expr::Member { base, name } => {
                let receiver = self.eval(base, env)?;
                (self.get_member(&receiver, name)?, Some(receiver))
            }
            Expr::Index { base, index } => {
                let receiver = self.eval(base, env)?;
                let index = self.eval(index, env)?;
                (self.get_index(&receiver, &index)?, Some(receiver))
            }
            _ => (self.eval(callee, env)?, None),
        };
        if !function.is_callable() {
            return Err(Error::type_error(format!("{} is not a function", describe(callee))).into());
        }
        let mut arguments = Vec::with_capacity(args.len());
        for arg in args {
            arguments.push(self.eval(arg, env)?);
        }
        self.invoke(&function, receiver, arguments, describe(callee))
    }

    /// Call `callable` with `receiver` as the object it was looked up on, if any.
    pub(crate) fn call(
        &mut self,
        callable: &Var,
        receiver: Option<Var>,
        args: Vec<Var>,
    ) -> Result<Var, ScriptError> {
        if !callable.is_callable() {
            return Err(Error::type_error(format!(
                "{} is not a function",
                callable.type_name()
            ))
            .into());
        }
        self.invoke(callable, receiver, args, "<anonymous>".to_string())
    }

    fn invoke(
        &mut self,
        callable: &Var,
        receiver: Option<Var>,
        args: Vec<Var>,
        frame: String,
    ) -> Result<Var, ScriptError> {
        self.step()?;
        self.enter(frame)?;
        let result = self.apply(callable, receiver, args);
        self.exit(result.is_err());
        result
    }

    fn apply(
        &mut self,
        callable: &Var,
        receiver: Option<Var>,
        args: Vec<Var>,
    ) -> Result<Var, ScriptError> {
        match callable.variant() {
            Variant::Lambda(lambda) => self.apply_lambda(lambda, args),
            Variant::Builtin(builtin) => builtins::call_builtin(self, builtin, args),
            Variant::Function(function) => self.apply_source(&function.source, receiver, args),
            Variant::Verb(verb) => self.apply_source(&verb.code, receiver, args),
            _ => Err(Error::type_error(format!("{} is not a function", callable.type_name())).into()),
        }
    }

    fn apply_lambda(&mut self, lambda: &Lambda, args: Vec<Var>) -> Result<Var, ScriptError> {
        let mut env = Environment::for_lambda(lambda);
        let mut args = args.into_iter();
        for param in &lambda.params {
            env.declare(param, args.next().unwrap_or_default());
        }
        match lambda.body.as_ref() {
            LambdaBody::Expr(expr) => self.eval(expr, &mut env),
            LambdaBody::Block(stmts) => match self.exec_stmts(stmts, &mut env)? {
                Flow::Return(value) => Ok(value),
                Flow::Normal => Ok(v_undefined()),
            },
        }
    }

    /// Functions and verbs are stored as source: compile it (once per distinct source), evaluate
    /// it with `this` bound to the owning object, and apply what it produces.
    fn apply_source(
        &mut self,
        source: &ArcStr,
        receiver: Option<Var>,
        args: Vec<Var>,
    ) -> Result<Var, ScriptError> {
        let expr = self.world.compile_source(source)?;
        let mut env = Environment::new(receiver.unwrap_or_default());
        let produced = self.eval(&expr, &mut env)?;
        match produced.variant() {
            Variant::Lambda(lambda) => self.apply_lambda(lambda, args),
            _ if produced.is_callable() => self.apply(&produced, None, args),
            _ => Err(Error::type_error(format!(
                "stored source does not evaluate to a function: {source}"
            ))
            .into()),
        }
    }

    pub(crate) fn get_member(&mut self, base: &Var, name: &str) -> Result<Var, ScriptError> {
        match base.variant() {
            Variant::Obj(o) => self.get_object_member(o, name),
            Variant::Map(m) => Ok(m.get(name).cloned().unwrap_or_default()),
            Variant::List(l) if name == "length" => Ok(v_int(l.len() as i64)),
            Variant::Str(s) if name == "length" => Ok(v_int(s.chars().count() as i64)),
            Variant::Undefined | Variant::Null => Err(Error::type_error(format!(
                "Cannot read properties of {} (reading '{name}')",
                base.to_text()
            ))
            .into()),
            _ => Ok(v_undefined()),
        }
    }

    fn get_object_member(&mut self, id: &Obj, name: &str) -> Result<Var, ScriptError> {
        let Some(object) = self.world.get(id) else {
            if name == "id" {
                return Ok(v_str(id.as_str()));
            }
            return Err(Error::type_error(format!(
                "Cannot read properties of destroyed object {id} (reading '{name}')"
            ))
            .into());
        };
        let objs = |ids: &[Obj]| v_list_iter(ids.iter().cloned().map(v_obj));
        let value = match name {
            "id" => v_str(id.as_str()),
            "name" => v_str(&object.name),
            "aliases" => v_list_iter(object.aliases.iter().map(|a| v_str(a))),
            "traits" => objs(&object.traits),
            "location" => object.location.clone().map(v_obj).unwrap_or_else(v_null),
            "contents" => objs(&object.contents),
            _ => match self.world.find_member(id, name) {
                Some(member) => member.to_var(),
                None if OBJECT_INTRINSICS.contains(&name) => v_builtin(name, Some(id.clone())),
                None => v_undefined(),
            },
        };
        Ok(value)
    }

    fn get_index(&mut self, base: &Var, index: &Var) -> Result<Var, ScriptError> {
        match (base.variant(), index.variant()) {
            (Variant::List(l), _) => Ok(list_index(index)
                .and_then(|i| l.get(i).cloned())
                .unwrap_or_default()),
            (Variant::Str(s), _) => Ok(list_index(index)
                .and_then(|i| s.chars().nth(i))
                .map(|c| v_string(c.to_string()))
                .unwrap_or_default()),
            (_, Variant::Str(key)) => self.get_member(base, key),
            _ => self.get_member(base, &index.to_text()),
        }
    }

    /// Assign `value` to the place `target` names.
    fn store(&mut self, target: &Expr, value: Var, env: &mut Environment) -> Result<(), ScriptError> {
        match target {
            Expr::Id(name) => {
                if !env.assign(name, value.clone()) {
                    env.declare_global(name, value);
                }
                Ok(())
            }
            Expr::Member { base, name } => {
                let container = self.eval(base, env)?;
                self.store_into(base, container, &v_str(name), value, env)
            }
            Expr::Index { base, index } => {
                let container = self.eval(base, env)?;
                let key = self.eval(index, env)?;
                self.store_into(base, container, &key, value, env)
            }
            _ => Err(Error::syntax("Invalid left-hand side in assignment").into()),
        }
    }

    /// Objects are updated in place; arrays and maps are values, so the updated copy is written
    /// back to wherever the container came from.
    fn store_into(
        &mut self,
        base: &Expr,
        container: Var,
        key: &Var,
        value: Var,
        env: &mut Environment,
    ) -> Result<(), ScriptError> {
        match container.variant() {
            Variant::Obj(o) => {
                let name = key.to_text();
                self.world.set_property(o, &name, value)
            }
            Variant::Map(m) => {
                let mut m = m.clone();
                m.insert(&key.to_text(), value);
                self.store(base, v_map(m), env)
            }
            Variant::List(l) => {
                let Some(i) = list_index(key).filter(|i| *i <= l.len() + MAX_ARRAY_GROWTH) else {
                    return Err(Error::range(format!("Invalid array index {}", key.to_text())).into());
                };
                let mut l = l.clone();
                l.set(i, value);
                self.store(base, Var::from_variant(Variant::List(l)), env)
            }
            _ => Err(Error::type_error(format!(
                "Cannot set properties of {} (setting '{}')",
                container.to_text(),
                key.to_text()
            ))
            .into()),
        }
    }
}

fn binary(op: BinaryOp, left: &Var, right: &Var) -> Result<Var, ScriptError> {
    let ordered = |accept: fn(Ordering) -> bool| -> Result<Var, ScriptError> {
        Ok(v_bool(left.compare(op, right)?.is_some_and(accept)))
    };
    let result = match op {
        BinaryOp::Add => left.add(right)?,
        BinaryOp::Sub => left.sub(right)?,
        BinaryOp::Mul => left.mul(right)?,
        BinaryOp::Div => left.div(right)?,
        BinaryOp::Mod => left.modulus(right)?,
        BinaryOp::Eq => v_bool(left.loose_eq(right)),
        BinaryOp::NEq => v_bool(!left.loose_eq(right)),
        BinaryOp::StrictEq => v_bool(left.strict_eq(right)),
        BinaryOp::StrictNEq => v_bool(!left.strict_eq(right)),
        BinaryOp::Lt => return ordered(|o| o == Ordering::Less),
        BinaryOp::LtE => return ordered(|o| o != Ordering::Greater),
        BinaryOp::Gt => return ordered(|o| o == Ordering::Greater),
        BinaryOp::GtE => return ordered(|o| o != Ordering::Less),
    };
    Ok(result)
}

/// A non-negative integral number usable as an array position.
fn list_index(index: &Var) -> Option<usize> {
    let i = match index.variant() {
        Variant::Int(i) => usize::try_from(*i).ok()?,
        Variant::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= MAX_ARRAY_INDEX as f64 => {
            *f as usize
        }
        _ => return None,
    };
    (i <= MAX_ARRAY_INDEX).then_some(i)
}

/// How a callee reads in error messages and backtraces.
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Id(name) => name.to_string(),
        Expr::This => "this".to_string(),
        Expr::Member { base, name } => format!("{}.{name}", describe(base)),
        Expr::Index { base, .. } => format!("{}[...]", describe(base)),
        Expr::Call { callee, .. } => format!("{}(...)", describe(callee)),
        _ => "expression".to_string(),
    }
}
