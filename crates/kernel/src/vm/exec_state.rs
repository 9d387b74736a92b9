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

use std::time::Instant;

use warren_common::tasks::{Exception, ScriptError};
use warren_var::program::Program;
use warren_var::{Error, Obj, Var, v_obj};

use crate::vm::Environment;
use crate::world_state::WorldState;

/// One activation record, for backtraces.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) name: String,
    pub(crate) line: usize,
}

/// The state of one turn of execution against the world.
pub struct ExecState<'w> {
    pub(crate) world: &'w mut WorldState,
    /// Who the turn runs on behalf of.
    pub(crate) player: Obj,
    /// When the turn started; deferred tasks are scheduled relative to it.
    pub(crate) now: Instant,
    pub(crate) frames: Vec<Frame>,
    label: String,
    steps: usize,
    max_steps: Option<usize>,
    max_depth: usize,
    backtrace: Option<Vec<String>>,
}

impl<'w> ExecState<'w> {
    pub fn new(world: &'w mut WorldState, player: Obj, label: &str, now: Instant) -> Self {
        let max_steps = world.config().max_steps;
        let max_depth = world.config().max_depth;
        Self {
            world,
            player,
            now,
            frames: vec![],
            label: label.to_string(),
            steps: 0,
            max_steps,
            max_depth,
            backtrace: None,
        }
    }

    /// Run a top-level program with `this` bound to the player.
    pub fn run_program(mut self, program: &Program) -> Result<Var, Exception> {
        let mut env = Environment::new(v_obj(self.player.clone()));
        self.frames.push(Frame {
            name: self.label.clone(),
            line: 0,
        });
        let result = self.exec_program(program, &mut env);
        self.finish(result)
    }

    /// Call a callable value with no arguments, as a deferred task does when it fires.
    pub fn run_callable(mut self, callable: &Var) -> Result<Var, Exception> {
        self.frames.push(Frame {
            name: self.label.clone(),
            line: 0,
        });
        let result = self.call(callable, None, vec![]);
        self.finish(result)
    }

    fn finish(mut self, result: Result<Var, ScriptError>) -> Result<Var, Exception> {
        result.map_err(|error| {
            self.capture_backtrace();
            Exception {
                error,
                label: self.label.clone(),
                backtrace: self.backtrace.take().unwrap_or_default(),
            }
        })
    }

    /// Count one unit of work against the step budget.
    pub(crate) fn step(&mut self) -> Result<(), ScriptError> {
        self.steps += 1;
        match self.max_steps {
            Some(max) if self.steps > max => {
                Err(Error::range("step budget exhausted").into())
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn enter(&mut self, name: String) -> Result<(), ScriptError> {
        if self.frames.len() >= self.max_depth {
            return Err(Error::range("Maximum call stack size exceeded").into());
        }
        self.frames.push(Frame { name, line: 0 });
        Ok(())
    }

    pub(crate) fn exit(&mut self, failed: bool) {
        if failed {
            self.capture_backtrace();
        }
        self.frames.pop();
    }

    pub(crate) fn set_line(&mut self, line: usize) {
        if let Some(frame) = self.frames.last_mut() {
            frame.line = line;
        }
    }

    /// Remember the stack as it is at the point an error first unwinds through it.
    fn capture_backtrace(&mut self) {
        if self.backtrace.is_some() {
            return;
        }
        let trace = self
            .frames
            .iter()
            .rev()
            .map(|f| match f.line {
                0 => f.name.clone(),
                line => format!("{} (line {line})", f.name),
            })
            .collect();
        self.backtrace = Some(trace);
    }
}
