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

//! Methods every object answers to: `new`, `destroy` and `send`.

use ahash::AHashMap;
use tracing::debug;
use warren_var::{Error, Obj, Variant, v_bool, v_obj, v_undefined};

use crate::vm::builtins::{BfCallState, BfRet, BuiltinFunction};

/// Usage: `parent.new(id, props?)`
/// Create an object with `parent` as its only trait, optionally setting properties from a map.
fn bf_new(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let parent = bf_args.receiver()?;
    let id = bf_args.str_arg(0, "id")?;
    if !Obj::is_valid_id(&id) {
        return Err(Error::type_error(format!("Invalid identifier '{id}'")).into());
    }
    let props = match bf_args.arg(1).map(|v| v.variant()) {
        None | Some(Variant::Undefined) => None,
        Some(Variant::Map(m)) => Some(m.clone()),
        Some(_) => {
            return Err(Error::type_error("new: properties must be an object").into());
        }
    };

    let props = props
        .iter()
        .flat_map(|m| m.iter())
        .map(|(name, value)| (name.as_str(), value.clone()));
    let id = bf_args
        .exec_state
        .world
        .create(Obj::mk_id(&id), &parent, props)?;
    Ok(v_obj(id))
}

/// Usage: `obj.destroy()`
/// Remove the object from the world. False if it was already gone.
fn bf_destroy(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let id = bf_args.receiver()?;
    Ok(v_bool(bf_args.exec_state.world.destroy(&id)?))
}

/// Usage: `player.send(text)`
/// Deliver text to the player's session. Text for a player without one is dropped.
fn bf_send(bf_args: &mut BfCallState<'_, '_>) -> BfRet {
    let player = bf_args.receiver()?;
    let text = bf_args.arg(0).map(|v| v.to_text()).unwrap_or_default();
    if let Err(e) = bf_args.exec_state.world.send(&player, &text) {
        debug!(?player, error = %e, "Dropping text for player");
    }
    Ok(v_undefined())
}

pub(crate) fn register_bf_objects(builtins: &mut AHashMap<&'static str, BuiltinFunction>) {
    builtins.insert("new", bf_new);
    builtins.insert("destroy", bf_destroy);
    builtins.insert("send", bf_send);
}
