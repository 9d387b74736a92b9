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

//! The live world and everything that runs against it: the script evaluator, the result
//! formatter, deferred tasks, the scheduler thread, and the programmer operations built on top.

use std::sync::{Mutex, MutexGuard, PoisonError};

use warren_common::model::{Member, WorldObject};
use warren_common::tasks::Exception;
use warren_compiler::EvalUnit;
use warren_var::{Obj, Var};

pub use crate::config::{Config, EvalConfig, SearchConfig};
pub use crate::programmer::{
    ProgrammerController, ProgrammerRequest, format_error, highlight_errors,
};
pub use crate::tasks::{Scheduler, SchedulerClient};
pub use crate::world_state::WorldState;

pub mod bootstrap;
pub mod config;
pub mod deferred;
pub mod print;
pub mod programmer;
pub mod tasks;
pub mod testing;
pub mod vm;
pub mod world_state;

/// The live world, as the programmer operations see it.
pub trait World: Send + Sync {
    /// Execute an eval unit as one turn.
    fn run(&self, unit: &EvalUnit) -> Result<Var, Exception>;

    /// Render a value against the current state of the world.
    fn format(&self, value: &Var, depth: usize) -> String;

    /// Every live object, in registration order.
    fn all(&self) -> Vec<WorldObject>;

    fn get(&self, id: &Obj) -> Option<WorldObject>;

    /// The member `name` as a property access on `id` sees it, searching its traits.
    fn find_member(&self, id: &Obj, name: &str) -> Option<Member>;

    /// Execute and render the result.
    fn eval(&self, unit: &EvalUnit, depth: usize) -> Result<String, Exception> {
        let value = self.run(unit)?;
        Ok(self.format(&value, depth))
    }
}

/// Lock a directly driven world. Turns contain their own panics, so a poisoned lock still
/// guards a usable world.
pub fn lock_world(world: &Mutex<WorldState>) -> MutexGuard<'_, WorldState> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A world driven directly by the caller, without a scheduler thread. Deferred tasks only fire
/// when the owner calls `run_due_tasks`.
impl World for Mutex<WorldState> {
    fn run(&self, unit: &EvalUnit) -> Result<Var, Exception> {
        lock_world(self).run(unit)
    }

    fn format(&self, value: &Var, depth: usize) -> String {
        lock_world(self).format(value, depth)
    }

    fn all(&self) -> Vec<WorldObject> {
        lock_world(self).objects().cloned().collect()
    }

    fn get(&self, id: &Obj) -> Option<WorldObject> {
        lock_world(self).get(id).cloned()
    }

    fn find_member(&self, id: &Obj, name: &str) -> Option<Member> {
        lock_world(self).find_member(id, name)
    }

    fn eval(&self, unit: &EvalUnit, depth: usize) -> Result<String, Exception> {
        let mut world = lock_world(self);
        let value = world.run(unit)?;
        Ok(world.format(&value, depth))
    }
}

impl<W: World + ?Sized> World for std::sync::Arc<W> {
    fn run(&self, unit: &EvalUnit) -> Result<Var, Exception> {
        (**self).run(unit)
    }

    fn format(&self, value: &Var, depth: usize) -> String {
        (**self).format(value, depth)
    }

    fn all(&self) -> Vec<WorldObject> {
        (**self).all()
    }

    fn get(&self, id: &Obj) -> Option<WorldObject> {
        (**self).get(id)
    }

    fn find_member(&self, id: &Obj, name: &str) -> Option<Member> {
        (**self).find_member(id, name)
    }

    fn eval(&self, unit: &EvalUnit, depth: usize) -> Result<String, Exception> {
        (**self).eval(unit, depth)
    }
}
