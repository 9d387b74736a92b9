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

//! Globals for finding things in the world: `$`, `nextId`, `all`, `allPlayers`.

use ahash::AHashMap;
use warren_var::{Error, Obj, v_list_iter, v_null, v_obj, v_str};

use crate::vm::builtins::{BfCallState, BfRet, BuiltinFunction};

/// Usage: `$(id)`
/// The object with the given id, or `null`.
fn bf_lookup(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let Some(id) = bf_args.arg(0).and_then(|v| v.as_str()) else {
        return Ok(v_null());
    };
    let id = Obj::mk_id(id);
    if bf_args.exec_state.world.contains(&id) {
        Ok(v_obj(id))
    } else {
        Ok(v_null())
    }
}

/// Usage: `nextId(base)`
/// The first of `base1`, `base2`, ... that no object has.
fn bf_next_id(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let base = bf_args.str_arg(0, "base")?;
    if base.is_empty() {
        return Err(Error::type_error("nextId: base must not be empty").into());
    }
    let id = bf_args.exec_state.world.next_id(&base);
    Ok(v_str(id.as_str()))
}

/// Usage: `all()`
/// Every live object, in the order they were registered.
fn bf_all(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let world = &bf_args.exec_state.world;
    Ok(v_list_iter(world.objects().map(|o| v_obj(o.id.clone()))))
}

/// Usage: `allPlayers()`
fn bf_all_players(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let players = bf_args.exec_state.world.players();
    Ok(v_list_iter(players.into_iter().map(v_obj)))
}

pub(crate) fn register_bf_world(builtins: &mut AHashMap<&'static str, BuiltinFunction>) {
    builtins.insert("$", bf_lookup);
    builtins.insert("nextId", bf_next_id);
    builtins.insert("all", bf_all);
    builtins.insert("allPlayers", bf_all_players);
}
