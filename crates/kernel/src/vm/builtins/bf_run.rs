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

//! The `run` namespace: registering work for later turns.

use std::time::Duration;

use ahash::AHashMap;
use warren_common::tasks::ScriptError;
use warren_var::{Error, Var, v_bool, v_list_iter, v_string};

use crate::deferred::MIN_REPEAT_INTERVAL;
use crate::vm::builtins::{BfCallState, BfRet, BuiltinFunction};

fn callable_arg(bf_args: &BfCallState<'_, '_>) -> Result<Var, ScriptError> {
    match bf_args.arg(0) {
        Some(f) if f.is_callable() => Ok(f.clone()),
        _ => Err(Error::type_error(format!("{}: expected a function", bf_args.name)).into()),
    }
}

fn millis_arg(bf_args: &BfCallState<'_, '_>) -> Result<Duration, ScriptError> {
    let Some(ms) = bf_args.arg(1).and_then(|v| v.as_number()).filter(|ms| *ms >= 0.0) else {
        return Err(Error::type_error(format!(
            "{}: expected a non-negative delay in milliseconds",
            bf_args.name
        ))
        .into());
    };
    Duration::try_from_secs_f64(ms / 1000.0)
        .map_err(|_| out_of_range(bf_args, ms).into())
}

fn out_of_range(bf_args: &BfCallState<'_, '_>, ms: f64) -> Error {
    Error::range(format!("{}: delay of {ms}ms is out of range", bf_args.name))
}

fn schedule(
    bf_args: &mut BfCallState<'_, '_>,
    callable: Var,
    delay: Duration,
    repeat: bool,
) -> BfRet {
    let Some(due) = bf_args.exec_state.now.checked_add(delay) else {
        return Err(out_of_range(bf_args, delay.as_secs_f64() * 1000.0).into());
    };
    let exec = &mut *bf_args.exec_state;
    let player = exec.player.clone();
    let handle = exec
        .world
        .deferred_mut()
        .schedule(due, callable, player, repeat.then_some(delay));
    Ok(v_string(handle))
}

/// Usage: `run.in(fn, ms)`
fn bf_run_in(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let callable = callable_arg(bf_args)?;
    let delay = millis_arg(bf_args)?;
    schedule(bf_args, callable, delay, false)
}

/// Usage: `run.next(fn)`
/// Run on the next tick of the scheduler, after the current turn.
fn bf_run_next(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let callable = callable_arg(bf_args)?;
    schedule(bf_args, callable, Duration::ZERO, false)
}

/// Usage: `run.every(fn, ms)`
/// The first run happens one interval from now.
fn bf_run_every(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let callable = callable_arg(bf_args)?;
    let interval = millis_arg(bf_args)?.max(MIN_REPEAT_INTERVAL);
    schedule(bf_args, callable, interval, true)
}

/// Usage: `run.cancel(handle)`
/// Never raises; anything that is not a pending handle just gives false.
fn bf_run_cancel(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let Some(handle) = bf_args.arg(0).and_then(|v| v.as_str()).map(str::to_string) else {
        return Ok(v_bool(false));
    };
    Ok(v_bool(bf_args.exec_state.world.deferred_mut().cancel(&handle)))
}

/// Usage: `run.check(handle)`
fn bf_run_check(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let pending = bf_args
        .arg(0)
        .and_then(|v| v.as_str())
        .is_some_and(|h| bf_args.exec_state.world.deferred().check(h));
    Ok(v_bool(pending))
}

/// Usage: `run.list()`
fn bf_run_list(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let handles = bf_args.exec_state.world.deferred().list();
    Ok(v_list_iter(handles.into_iter().map(v_string)))
}

pub(crate) fn register_bf_run(builtins: &mut AHashMap<&'static str, BuiltinFunction>) {
    builtins.insert("run.in", bf_run_in);
    builtins.insert("run.next", bf_run_next);
    builtins.insert("run.every", bf_run_every);
    builtins.insert("run.cancel", bf_run_cancel);
    builtins.insert("run.check", bf_run_check);
    builtins.insert("run.list", bf_run_list);
}
