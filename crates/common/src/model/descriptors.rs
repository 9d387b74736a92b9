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

//! The payloads exchanged with programmers for searching, fetching and saving verbs and
//! functions. Field names follow the wire format (`objectId`, `searchStr`, ...).

use serde::{Deserialize, Serialize};
use strum::Display;
use warren_var::{ArgSpec, PrepSpec};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VerbDescriptor {
    pub name: String,
    pub code: String,
    pub pattern: String,
    pub dobjarg: ArgSpec,
    pub preparg: PrepSpec,
    pub iobjarg: ArgSpec,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVerbResponse {
    pub object_id: String,
    pub verb: VerbDescriptor,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    pub object_id: String,
    pub src: String,
    pub name: String,
}

/// Names a member on an object, for `getVerb` / `getFunction`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub object_id: String,
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVerbRequest {
    pub object_id: String,
    pub verb: VerbDescriptor,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Which callable a search result points at; serialized as `"verb": name` or
/// `"function": name` alongside the other result fields.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchHit {
    Verb(String),
    Function(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub search_str: String,
    pub object_id: String,
    #[serde(flatten)]
    pub hit: SearchHit,
}

/// Acknowledgement for a save.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, Display)]
pub enum SaveOutcome {
    #[serde(rename = "saved")]
    #[strum(serialize = "saved")]
    Saved,
    #[serde(rename = "no such object")]
    #[strum(serialize = "no such object")]
    NoSuchObject,
    #[serde(rename = "error saving")]
    #[strum(serialize = "error saving")]
    Failed,
}
