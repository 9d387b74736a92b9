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

//! Requests arriving as JSON: `{"op": "<operation>", ...payload}`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;
use warren_common::model::{FunctionDescriptor, MemberRef, SaveVerbRequest, SearchRequest};
use warren_db::Store;

use crate::World;
use crate::programmer::ProgrammerController;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ProgrammerRequest {
    Eval { code: String },
    Search(SearchRequest),
    GetVerb(MemberRef),
    GetFunction(MemberRef),
    SaveVerb(SaveVerbRequest),
    SaveFunction(FunctionDescriptor),
}

fn to_json<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| json!({ "error": e.to_string() }))
}

impl<W: World, S: Store> ProgrammerController<W, S> {
    /// Decode and handle one request. Malformed requests get `{"error": ...}` back.
    pub fn dispatch(&self, request: &str) -> Value {
        match serde_json::from_str::<ProgrammerRequest>(request) {
            Ok(request) => self.handle(request),
            Err(e) => {
                warn!(error = %e, "Malformed programmer request");
                json!({ "error": e.to_string() })
            }
        }
    }

    pub fn handle(&self, request: ProgrammerRequest) -> Value {
        match request {
            ProgrammerRequest::Eval { code } => Value::String(self.eval(&code)),
            ProgrammerRequest::Search(SearchRequest { query }) => to_json(self.search(&query)),
            ProgrammerRequest::GetVerb(r) => to_json(self.get_verb(&r.object_id, &r.name)),
            ProgrammerRequest::GetFunction(r) => {
                to_json(self.get_function(&r.object_id, &r.name))
            }
            ProgrammerRequest::SaveVerb(r) => to_json(self.save_verb(&r)),
            ProgrammerRequest::SaveFunction(r) => to_json(self.save_function(&r)),
        }
    }
}
