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

//! The `run.*` namespace and the firing of deferred tasks.

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use warren_kernel::testing::TestWorld;
use warren_var::Variant;

fn handle(tw: &TestWorld, code: &str) -> String {
    let value = tw.run(code).unwrap();
    let Variant::Str(s) = value.variant() else {
        panic!("expected a handle, got {value:?}");
    };
    s.to_string()
}

fn fire(tw: &TestWorld, at: Instant) -> usize {
    tw.world.lock().unwrap().run_due_tasks(at)
}

#[test]
fn test_handles_are_quoted_alphanumerics() {
    let tw = TestWorld::new();
    for code in ["run.in(() => 1, 1000)", "run.next(() => 1)"] {
        let value = tw.run(code).unwrap();
        let rendered = tw.world.lock().unwrap().format(&value, 1);
        assert!(rendered.starts_with('\'') && rendered.ends_with('\''), "{rendered}");
        let inner = &rendered[1..rendered.len() - 1];
        assert!(!inner.is_empty());
        assert!(inner.chars().all(|c| c.is_ascii_alphanumeric()), "{rendered}");
    }
}

#[test]
fn test_unknown_handles() {
    let tw = TestWorld::new();
    let world = || tw.world.lock().unwrap();
    let check = |code: &str| {
        let value = tw.run(code).unwrap();
        world().format(&value, 1)
    };
    assert_eq!(check("run.cancel(\"foo\")"), "false");
    assert_eq!(check("run.check(\"bogus\")"), "false");
    assert_eq!(check("run.cancel(42)"), "false");
    assert_eq!(check("run.list()"), "[]");
}

#[test]
fn test_fires_in_due_order() {
    let tw = TestWorld::new();
    let start = Instant::now();
    tw.run("run.in(() => this.send('second'), 20); run.in(() => this.send('first'), 10)")
        .unwrap();
    assert_eq!(tw.world.lock().unwrap().deferred().len(), 2);
    assert_eq!(fire(&tw, start), 0);
    assert_eq!(fire(&tw, start + Duration::from_secs(1)), 2);
    assert_eq!(tw.output(), vec!["first".to_string(), "second".to_string()]);
    assert!(tw.world.lock().unwrap().deferred().is_empty());
}

#[test]
fn test_ties_fire_in_registration_order() {
    let tw = TestWorld::new();
    tw.run("run.next(() => this.send('a')); run.next(() => this.send('b'))")
        .unwrap();
    fire(&tw, Instant::now() + Duration::from_millis(1));
    assert_eq!(tw.output(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_cancel_and_check() {
    let tw = TestWorld::new();
    let h = handle(&tw, "run.in(() => this.send('never'), 10)");
    let code = format!("[run.check('{h}'), run.list().length]");
    let value = tw.run(&code).unwrap();
    assert_eq!(tw.world.lock().unwrap().format(&value, 1), "[ true,\n  1 ]");

    let value = tw.run(&format!("run.cancel('{h}')")).unwrap();
    assert_eq!(tw.world.lock().unwrap().format(&value, 1), "true");
    let value = tw.run(&format!("run.cancel('{h}')")).unwrap();
    assert_eq!(tw.world.lock().unwrap().format(&value, 1), "false");

    fire(&tw, Instant::now() + Duration::from_secs(1));
    assert!(tw.output().is_empty());
}

#[test]
fn test_every_rearms() {
    let tw = TestWorld::new();
    let start = Instant::now();
    let h = handle(&tw, "run.every(() => this.send('tick'), 100)");
    assert_eq!(fire(&tw, start + Duration::from_millis(150)), 1);
    assert!(tw.world.lock().unwrap().deferred().check(&h));
    assert_eq!(fire(&tw, start + Duration::from_millis(300)), 1);
    assert_eq!(tw.output(), vec!["tick".to_string(), "tick".to_string()]);

    assert!(tw.world.lock().unwrap().deferred_mut().cancel(&h));
    assert_eq!(fire(&tw, start + Duration::from_secs(10)), 0);
}

#[test]
fn test_failing_task_does_not_stop_others() {
    let tw = TestWorld::new();
    tw.run("run.next(() => missing); run.next(() => this.send('still here'))")
        .unwrap();
    assert_eq!(fire(&tw, Instant::now() + Duration::from_millis(1)), 2);
    assert_eq!(tw.output(), vec!["still here".to_string()]);
}

#[test]
fn test_run_requires_a_function() {
    let tw = TestWorld::new();
    assert!(tw.run("run.in(5, 10)").is_err());
    assert!(tw.run("run.in(() => 1, -1)").is_err());
}

#[test]
fn test_out_of_range_delays_raise() {
    let tw = TestWorld::new();
    for code in [
        "run.in(() => 1, 1e300)",
        "run.every(() => 1, 1e300)",
        "run.in(() => 1, 1e22)",
        "run.in(() => 1, 1 / 0)",
    ] {
        let error = tw.run(code).unwrap_err().error.to_string();
        assert!(error.starts_with("RangeError: "), "{code}: {error}");
    }
    assert!(tw.world.lock().unwrap().deferred().is_empty());
    assert_eq!(tw.controller().eval("2 + 2"), "4");
}
