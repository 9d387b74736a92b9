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

//! Host operations exposed to scripts: the global helpers, the `run.*` deferred-task namespace
//! and the methods every object answers to.

use std::sync::LazyLock;

use ahash::AHashMap;
use arcstr::ArcStr;
use warren_common::tasks::ScriptError;
use warren_var::{Builtin, Error, Obj, Var};

use crate::vm::ExecState;
use crate::vm::builtins::bf_objects::register_bf_objects;
use crate::vm::builtins::bf_run::register_bf_run;
use crate::vm::builtins::bf_world::register_bf_world;

mod bf_objects;
mod bf_run;
mod bf_world;

/// Names a bare identifier resolves to a builtin for.
pub(crate) const GLOBAL_BUILTINS: &[&str] = &["$", "nextId", "all", "allPlayers"];

/// Operations under the `run` namespace; registered as `run.<op>`.
pub(crate) const RUN_BUILTINS: &[&str] = &["in", "next", "every", "cancel", "check", "list"];

pub(crate) type BfRet = Result<Var, ScriptError>;

pub(crate) type BuiltinFunction = fn(&mut BfCallState<'_, '_>) -> BfRet;

static BUILTINS: LazyLock<BuiltinRegistry> = LazyLock::new(BuiltinRegistry::new);

/// The builtins by name.
pub(crate) struct BuiltinRegistry {
    builtins: AHashMap<&'static str, BuiltinFunction>,
}

impl BuiltinRegistry {
    fn new() -> Self {
        let mut builtins = AHashMap::new();
        register_bf_world(&mut builtins);
        register_bf_objects(&mut builtins);
        register_bf_run(&mut builtins);
        Self { builtins }
    }

    fn builtin_for(&self, name: &str) -> Option<BuiltinFunction> {
        self.builtins.get(name).copied()
    }
}

/// The arguments and other state passed to a builtin.
pub(crate) struct BfCallState<'a, 'w> {
    /// The name the builtin was invoked as.
    pub(crate) name: ArcStr,
    pub(crate) args: Vec<Var>,
    /// The object a method was looked up on, for `obj.new` and friends.
    pub(crate) receiver: Option<Obj>,
    pub(crate) exec_state: &'a mut ExecState<'w>,
}

impl BfCallState<'_, '_> {
    pub(crate) fn arg(&self, index: usize) -> Option<&Var> {
        self.args.get(index)
    }

    /// The receiver, for builtins that only make sense as methods.
    pub(crate) fn receiver(&self) -> Result<Obj, ScriptError> {
        self.receiver.clone().ok_or_else(|| {
            Error::type_error(format!("{} must be called on an object", self.name)).into()
        })
    }

    /// The `index`th argument as a string, or a `TypeError` naming what was expected.
    pub(crate) fn str_arg(&self, index: usize, what: &str) -> Result<String, ScriptError> {
        match self.arg(index).and_then(|v| v.as_str()) {
            Some(s) => Ok(s.to_string()),
            None => Err(Error::type_error(format!("{}: {what} must be a string", self.name)).into()),
        }
    }
}

pub(crate) fn call_builtin(
    exec_state: &mut ExecState<'_>,
    builtin: &Builtin,
    args: Vec<Var>,
) -> BfRet {
    let Some(f) = BUILTINS.builtin_for(&builtin.name) else {
        return Err(Error::type_error(format!("{} is not a function", builtin.name)).into());
    };
    let mut bf_args = BfCallState {
        name: builtin.name.clone(),
        args,
        receiver: builtin.receiver.clone(),
        exec_state,
    };
    f(&mut bf_args)
}
