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

//! The durable form of world objects, as kept by the store.

use crate::model::objects::{Member, WorldObject};
use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::sync::Arc;
use tracing::warn;
use warren_var::{
    ArgSpec, Function, Map, Obj, PrepSpec, Var, Variant, Verb, VerbArgsSpec, v_bool, v_float,
    v_int, v_list_iter, v_map, v_null, v_obj, v_str,
};

/// Key under which an object reference is stored inside a JSON value.
const OBJ_REF_KEY: &str = "$obj";

/// One entry of a persisted property bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredProperty {
    Verb {
        verb: String,
        pattern: String,
        dobjarg: ArgSpec,
        preparg: PrepSpec,
        iobjarg: ArgSpec,
    },
    Function {
        function: String,
    },
    Value {
        value: Value,
    },
}

/// The durable counterpart of a `WorldObject`. `contents` is not stored; it is derived from
/// every object's `location` when the world loads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistentObjectRecord {
    pub id: Obj,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub traits: Vec<Obj>,
    #[serde(default)]
    pub location: Option<Obj>,
    #[serde(default)]
    pub properties: IndexMap<String, StoredProperty>,
}

impl PersistentObjectRecord {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: Obj::mk_id(id),
            name: name.to_string(),
            aliases: vec![],
            traits: vec![],
            location: None,
            properties: IndexMap::new(),
        }
    }
}

impl StoredProperty {
    fn to_member(&self, name: &str) -> Member {
        match self {
            StoredProperty::Verb {
                verb,
                pattern,
                dobjarg,
                preparg,
                iobjarg,
            } => Member::Verb(Arc::new(Verb {
                name: ArcStr::from(name),
                code: ArcStr::from(verb.as_str()),
                pattern: ArcStr::from(pattern.as_str()),
                args: VerbArgsSpec {
                    dobj: *dobjarg,
                    prep: *preparg,
                    iobj: *iobjarg,
                },
            })),
            StoredProperty::Function { function } => {
                Member::Function(Arc::new(Function::new(function)))
            }
            StoredProperty::Value { value } => Member::Value(json_to_var(value)),
        }
    }

    fn from_member(member: &Member) -> Self {
        match member {
            Member::Verb(v) => StoredProperty::Verb {
                verb: v.code.to_string(),
                pattern: v.pattern.to_string(),
                dobjarg: v.args.dobj,
                preparg: v.args.prep,
                iobjarg: v.args.iobj,
            },
            Member::Function(f) => StoredProperty::Function {
                function: f.source.to_string(),
            },
            Member::Value(v) => StoredProperty::Value {
                value: var_to_json(v),
            },
        }
    }
}

impl From<&PersistentObjectRecord> for WorldObject {
    fn from(record: &PersistentObjectRecord) -> Self {
        let mut object = WorldObject::new(record.id.clone(), &record.name);
        object.aliases = record.aliases.clone();
        object.traits = record.traits.clone();
        object.location = record.location.clone();
        for (name, property) in &record.properties {
            object.set_member(name, property.to_member(name));
        }
        object
    }
}

impl From<&WorldObject> for PersistentObjectRecord {
    fn from(object: &WorldObject) -> Self {
        Self {
            id: object.id.clone(),
            name: object.name.clone(),
            aliases: object.aliases.clone(),
            traits: object.traits.clone(),
            location: object.location.clone(),
            properties: object
                .members()
                .map(|(name, member)| (name.to_string(), StoredProperty::from_member(member)))
                .collect(),
        }
    }
}

/// Convert a plain value to JSON for storage. Callables have no data form and are stored as
/// `null`.
pub fn var_to_json(var: &Var) -> Value {
    match var.variant() {
        Variant::Undefined | Variant::Null => Value::Null,
        Variant::Bool(b) => Value::Bool(*b),
        Variant::Int(i) => Value::Number((*i).into()),
        Variant::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Variant::Str(s) => Value::String(s.to_string()),
        Variant::List(l) => Value::Array(l.iter().map(var_to_json).collect()),
        Variant::Map(m) => Value::Object(
            m.iter()
                .map(|(k, v)| (k.to_string(), var_to_json(v)))
                .collect(),
        ),
        Variant::Obj(o) => {
            let mut reference = serde_json::Map::new();
            reference.insert(OBJ_REF_KEY.to_string(), Value::String(o.to_string()));
            Value::Object(reference)
        }
        Variant::Lambda(_) | Variant::Builtin(_) | Variant::Function(_) | Variant::Verb(_) => {
            warn!(?var, "callable value has no stored form; storing null");
            Value::Null
        }
    }
}

pub fn json_to_var(value: &Value) -> Var {
    match value {
        Value::Null => v_null(),
        Value::Bool(b) => v_bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => v_int(i),
            None => v_float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => v_str(s),
        Value::Array(a) => v_list_iter(a.iter().map(json_to_var)),
        Value::Object(o) => {
            if o.len() == 1
                && let Some(Value::String(id)) = o.get(OBJ_REF_KEY)
            {
                return v_obj(Obj::mk_id(id));
            }
            v_map(o.iter().map(|(k, v)| (k, json_to_var(v))).collect::<Map>())
        }
    }
}
