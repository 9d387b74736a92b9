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

//! The world driven from its own scheduler thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use warren_common::tasks::{BufferedSession, SchedulerError};
use warren_db::MemoryStore;
use warren_kernel::bootstrap::seed_records;
use warren_kernel::{Config, ProgrammerController, Scheduler, World, WorldState};
use warren_var::Obj;

struct Running {
    controller: ProgrammerController<warren_kernel::SchedulerClient, Arc<MemoryStore>>,
    session: Arc<BufferedSession>,
    scheduler: warren_kernel::SchedulerClient,
    thread: std::thread::JoinHandle<()>,
}

fn start() -> Running {
    let records = seed_records("test");
    let session = Arc::new(BufferedSession::new());
    session.connect(&Obj::mk_id("test"));
    let config = Config::default();
    let world = WorldState::from_records(&records, session.clone(), config.eval.clone());
    let (scheduler, client) = Scheduler::new(world);
    let thread = scheduler.start().unwrap();
    let store = Arc::new(MemoryStore::with_records(records));
    Running {
        controller: ProgrammerController::new(client.clone(), store, Obj::mk_id("test"), config),
        session,
        scheduler: client,
        thread,
    }
}

#[test]
fn test_eval_through_scheduler() {
    let running = start();
    assert_eq!(running.controller.eval("2 + 2"), "4");
    assert_eq!(running.controller.eval("nextId('root')"), "'root1'");
    assert_eq!(running.controller.search("echo").len(), 1);
    assert!(running.controller.get_verb("root", "echo").is_some());
    assert_eq!(running.scheduler.all().len(), 2);

    running.scheduler.shutdown().unwrap();
    running.thread.join().unwrap();
}

#[test]
fn test_deferred_tasks_fire_on_their_own() {
    let running = start();
    running
        .controller
        .eval("run.in(() => this.send('fired'), 10)");

    let player = Obj::mk_id("test");
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut output = vec![];
    while output.is_empty() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
        output = running.session.take_output(&player);
    }
    assert_eq!(output, vec!["fired".to_string()]);

    running.scheduler.shutdown().unwrap();
    running.thread.join().unwrap();
}

#[test]
fn test_client_after_shutdown() {
    let running = start();
    running.scheduler.shutdown().unwrap();
    running.thread.join().unwrap();
    assert_eq!(
        running.scheduler.turn(|world| world.objects().count()),
        Err(SchedulerError::SchedulerNotResponding)
    );
    assert!(running.controller.eval("1").contains("Scheduler not responding"));
}

#[test]
fn test_bad_delay_leaves_scheduler_running() {
    let running = start();
    let error = running.controller.eval("run.in(() => 1, 1e300)");
    assert!(error.contains("RangeError"), "{error}");
    assert_eq!(running.controller.eval("2 + 2"), "4");
    assert_eq!(running.controller.search("greet").len(), 1);

    running.scheduler.shutdown().unwrap();
    running.thread.join().unwrap();
}

#[test]
fn test_panicking_turn_is_contained() {
    let running = start();
    let result: Result<usize, SchedulerError> = running.scheduler.turn(|_| panic!("boom"));
    assert_eq!(result, Err(SchedulerError::TurnAborted("boom".to_string())));
    assert_eq!(running.controller.eval("2 + 2"), "4");
    assert_eq!(running.scheduler.all().len(), 2);

    running.scheduler.shutdown().unwrap();
    running.thread.join().unwrap();
}
