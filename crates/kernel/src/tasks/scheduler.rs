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
use std::thread::JoinHandle;
use std::time::Instant;

use flume::{Receiver, RecvTimeoutError};
use tracing::{debug, error, info, trace};

use crate::tasks::{SchedulerClient, panic_message};
use crate::world_state::WorldState;

/// Script calls recurse on the native stack.
const SCHEDULER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// A unit of work against the world, run on the scheduler thread.
pub type Turn = Box<dyn FnOnce(&mut WorldState) + Send>;

pub enum SchedulerClientMsg {
    /// Run the closure against the world, as one turn.
    Turn(Turn),
    /// Stop once the messages already queued have been handled.
    Shutdown,
}

pub struct Scheduler {
    world: WorldState,
    receiver: Receiver<SchedulerClientMsg>,
}

impl Scheduler {
    pub fn new(world: WorldState) -> (Self, SchedulerClient) {
        let (sender, receiver) = flume::unbounded();
        (Self { world, receiver }, SchedulerClient::new(sender))
    }

    /// Spawn the scheduler thread.
    pub fn start(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("warren-scheduler".to_string())
            .stack_size(SCHEDULER_STACK_SIZE)
            .spawn(move || self.run())
    }

    /// The scheduler loop: fire what is due, then wait for a message or the next due task,
    /// whichever comes first.
    pub fn run(mut self) {
        info!("Scheduler started");
        loop {
            match catch_unwind(AssertUnwindSafe(|| self.world.run_due_tasks(Instant::now()))) {
                Ok(0) => {}
                Ok(ran) => trace!(ran, "Ran deferred tasks"),
                Err(panic) => error!(panic = %panic_message(&*panic), "Deferred tasks panicked"),
            }
            let msg = match self.world.next_due() {
                Some(due) => match self.receiver.recv_deadline(due) {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.receiver.recv() {
                    Ok(msg) => msg,
                    Err(_) => break,
                },
            };
            match msg {
                SchedulerClientMsg::Turn(turn) => {
                    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| turn(&mut self.world))) {
                        error!(panic = %panic_message(&*panic), "Turn panicked");
                    }
                }
                SchedulerClientMsg::Shutdown => {
                    debug!("Scheduler shutdown requested");
                    break;
                }
            }
        }
        info!("Scheduler done.");
    }
}
