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

//! The objects a fresh world starts with.

use serde_json::Value;
use warren_common::model::{PLAYER_FLAG, PersistentObjectRecord, StoredProperty};
use warren_var::{ArgSpec, Obj, PrepSpec};

pub const ROOT_ID: &str = "root";
pub const DEFAULT_PLAYER_ID: &str = "test";

/// `root`, carrying a greeting function, an echo verb and a couple of plain values, and a
/// player object named `player` deriving from it.
pub fn seed_records(player: &str) -> Vec<PersistentObjectRecord> {
    let mut root = PersistentObjectRecord::new(ROOT_ID, ROOT_ID);
    root.properties.insert(
        "greet".to_string(),
        StoredProperty::Function {
            function: "(who) => who.send('Hello, ' + who.name + '!')".to_string(),
        },
    );
    root.properties.insert(
        "echo".to_string(),
        StoredProperty::Verb {
            verb: "(args) => args".to_string(),
            pattern: "echo".to_string(),
            dobjarg: ArgSpec::Any,
            preparg: PrepSpec::Any,
            iobjarg: ArgSpec::Any,
        },
    );
    root.properties.insert(
        "desc".to_string(),
        StoredProperty::Value {
            value: Value::String("The root of everything.".to_string()),
        },
    );
    root.properties.insert(
        "empty".to_string(),
        StoredProperty::Value {
            value: Value::String(String::new()),
        },
    );

    let mut player_record = PersistentObjectRecord::new(player, player);
    player_record.traits = vec![Obj::mk_id(ROOT_ID)];
    player_record.properties.insert(
        PLAYER_FLAG.to_string(),
        StoredProperty::Value {
            value: Value::Bool(true),
        },
    );
    vec![root, player_record]
}
