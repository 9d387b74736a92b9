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

use std::panic::{AssertUnwindSafe, catch_unwind};

use flume::Sender;
use tracing::warn;
use warren_common::model::{Member, WorldObject};
use warren_common::tasks::{Exception, SchedulerError, ScriptError};
use warren_compiler::EvalUnit;
use warren_var::{Error, Obj, Var};

use crate::World;
use crate::tasks::{SchedulerClientMsg, panic_message};
use crate::world_state::WorldState;

/// A handle for talking to the scheduler from the outside world: the programmer controller,
/// the console, tests.
#[derive(Clone)]
pub struct SchedulerClient {
    pub(crate) scheduler_sender: Sender<SchedulerClientMsg>,
}

impl SchedulerClient {
    pub fn new(scheduler_sender: Sender<SchedulerClientMsg>) -> Self {
        Self { scheduler_sender }
    }

    /// Run `f` against the world as one turn and wait for what it returns.
    pub fn turn<R, F>(&self, f: F) -> Result<R, SchedulerError>
    where
        R: Send + 'static,
        F: FnOnce(&mut WorldState) -> R + Send + 'static,
    {
        let (reply, receive) = oneshot::channel();
        self.scheduler_sender
            .send(SchedulerClientMsg::Turn(Box::new(move |world| {
                let result = catch_unwind(AssertUnwindSafe(|| f(world)))
                    .map_err(|panic| SchedulerError::TurnAborted(panic_message(&*panic)));
                let _ = reply.send(result);
            })))
            .map_err(|_| SchedulerError::SchedulerNotResponding)?;
        receive
            .recv()
            .map_err(|_| SchedulerError::SchedulerNotResponding)?
    }

    pub fn shutdown(&self) -> Result<(), SchedulerError> {
        self.scheduler_sender
            .send(SchedulerClientMsg::Shutdown)
            .map_err(|_| SchedulerError::ShuttingDown)
    }
}

fn unavailable(e: SchedulerError, unit: &EvalUnit) -> Exception {
    Exception::new(ScriptError::Raised(Error::domain(e.to_string())), &unit.label)
}

impl World for SchedulerClient {
    fn run(&self, unit: &EvalUnit) -> Result<Var, Exception> {
        let owned = unit.clone();
        self.turn(move |world| world.run(&owned))
            .map_err(|e| unavailable(e, unit))?
    }

    fn format(&self, value: &Var, depth: usize) -> String {
        let value = value.clone();
        self.turn(move |world| world.format(&value, depth))
            .unwrap_or_else(|e| format!("<{e}>"))
    }

    fn all(&self) -> Vec<WorldObject> {
        self.turn(|world| world.objects().cloned().collect())
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not list objects");
                vec![]
            })
    }

    fn get(&self, id: &Obj) -> Option<WorldObject> {
        let lookup = id.clone();
        self.turn(move |world| world.get(&lookup).cloned())
            .unwrap_or_else(|e| {
                warn!(error = %e, id = %id, "Could not fetch object");
                None
            })
    }

    fn find_member(&self, id: &Obj, name: &str) -> Option<Member> {
        let (lookup, member) = (id.clone(), name.to_string());
        self.turn(move |world| world.find_member(&lookup, &member))
            .unwrap_or_else(|e| {
                warn!(error = %e, id = %id, name, "Could not look up member");
                None
            })
    }

    /// Run and render in the same turn, so the rendering sees the world as the code left it.
    fn eval(&self, unit: &EvalUnit, depth: usize) -> Result<String, Exception> {
        let owned = unit.clone();
        self.turn(move |world| world.run(&owned).map(|v| world.format(&v, depth)))
            .map_err(|e| unavailable(e, unit))?
    }
}
