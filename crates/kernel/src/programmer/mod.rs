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

//! The operations offered to programmers: evaluating code as themselves, searching the world
//! for verbs and functions, and fetching and saving them.

use tracing::{Span, debug, info_span, warn};
use uuid::Uuid;
use warren_common::model::{
    FunctionDescriptor, GetVerbResponse, Member, MemberKind, PersistentObjectRecord, SaveOutcome,
    SaveVerbRequest, SearchHit, SearchResult, StoredProperty, VerbDescriptor,
};
use warren_common::tasks::ScriptError;
use warren_compiler::rewrite_eval;
use warren_db::Store;
use warren_var::{Error, Obj};

use crate::World;
use crate::config::Config;

pub use dispatch::ProgrammerRequest;
pub use errors::{error_text, format_error, highlight_errors};
pub use search::{fuzzy_score, rank};

mod dispatch;
mod errors;
mod search;

/// One programmer's session against the world and the store.
pub struct ProgrammerController<W: World, S: Store> {
    world: W,
    store: S,
    player: Obj,
    session_id: Uuid,
    config: Config,
}

impl<W: World, S: Store> ProgrammerController<W, S> {
    pub fn new(world: W, store: S, player: Obj, config: Config) -> Self {
        Self {
            world,
            store,
            player,
            session_id: Uuid::new_v4(),
            config,
        }
    }

    pub fn player(&self) -> &Obj {
        &self.player
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn span(&self) -> Span {
        info_span!("programmer", player = %self.player, session = %self.session_id)
    }

    /// Run `code` as the programmer and render the result, or the error it raised. The full
    /// error goes to the log; the caller only gets the formatted message.
    pub fn eval(&self, code: &str) -> String {
        let span = self.span();
        let _enter = span.enter();
        let unit = match rewrite_eval(code, self.player.as_str()) {
            Ok(unit) => unit,
            Err(e) => {
                warn!(error = %e, "Could not prepare eval");
                return format_error(&ScriptError::Raised(Error::domain(e.to_string())));
            }
        };
        match self.world.eval(&unit, self.config.eval.print_depth) {
            Ok(text) => {
                debug!(label = %unit.label, "Eval completed");
                text
            }
            Err(exception) => {
                warn!(
                    label = %exception.label,
                    error = %exception.error,
                    kind = ?exception.error.kind(),
                    backtrace = ?exception.backtrace,
                    "Eval failed"
                );
                format_error(&exception.error)
            }
        }
    }

    /// Every verb and function in the world whose `object.member` name fuzzily matches
    /// `query`, best first.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let span = self.span();
        let _enter = span.enter();
        let candidates: Vec<SearchResult> = self
            .world
            .all()
            .iter()
            .flat_map(|object| {
                object.list_members().into_iter().filter_map(move |member| {
                    let name = member.name.to_string();
                    let hit = match member.kind {
                        MemberKind::Verb => SearchHit::Verb(name.clone()),
                        MemberKind::Function => SearchHit::Function(name.clone()),
                        MemberKind::Value => return None,
                    };
                    Some(SearchResult {
                        search_str: format!("{}.{name}", object.id),
                        object_id: object.id.to_string(),
                        hit,
                    })
                })
            })
            .collect();
        let total = candidates.len();
        let results = rank(
            query,
            candidates,
            |c| c.search_str.as_str(),
            self.config.search.max_results,
        );
        debug!(query, candidates = total, results = results.len(), "Search");
        results
    }

    pub fn get_verb(&self, object_id: &str, name: &str) -> Option<GetVerbResponse> {
        let id = Obj::mk_id(object_id);
        let Some(Member::Verb(verb)) = self.world.find_member(&id, name) else {
            return None;
        };
        Some(GetVerbResponse {
            object_id: object_id.to_string(),
            verb: VerbDescriptor {
                name: name.to_string(),
                code: verb.code.to_string(),
                pattern: verb.pattern.to_string(),
                dobjarg: verb.args.dobj,
                preparg: verb.args.prep,
                iobjarg: verb.args.iobj,
            },
        })
    }

    pub fn get_function(&self, object_id: &str, name: &str) -> Option<FunctionDescriptor> {
        let id = Obj::mk_id(object_id);
        let Some(Member::Function(function)) = self.world.find_member(&id, name) else {
            return None;
        };
        Some(FunctionDescriptor {
            object_id: object_id.to_string(),
            src: function.source.to_string(),
            name: name.to_string(),
        })
    }

    /// Write a verb into the stored object. The live object is left alone.
    pub fn save_verb(&self, request: &SaveVerbRequest) -> SaveOutcome {
        let verb = &request.verb;
        self.save_property(
            &request.object_id,
            &verb.name,
            StoredProperty::Verb {
                verb: verb.code.clone(),
                pattern: verb.pattern.clone(),
                dobjarg: verb.dobjarg,
                preparg: verb.preparg,
                iobjarg: verb.iobjarg,
            },
        )
    }

    /// Write a function into the stored object. The live object is left alone.
    pub fn save_function(&self, request: &FunctionDescriptor) -> SaveOutcome {
        self.save_property(
            &request.object_id,
            &request.name,
            StoredProperty::Function {
                function: request.src.clone(),
            },
        )
    }

    fn save_property(&self, object_id: &str, name: &str, property: StoredProperty) -> SaveOutcome {
        let span = self.span();
        let _enter = span.enter();
        let mut record: PersistentObjectRecord = match self.store.find_by_id(object_id) {
            Ok(Some(record)) => record,
            Ok(None) => return SaveOutcome::NoSuchObject,
            Err(e) => {
                warn!(object_id, name, error = %e, "Could not load object for saving");
                return SaveOutcome::Failed;
            }
        };
        record.properties.insert(name.to_string(), property);
        match self.store.save(&record) {
            Ok(()) => {
                debug!(object_id, name, "Saved member");
                SaveOutcome::Saved
            }
            Err(e) => {
                warn!(object_id, name, error = %e, "Could not save member");
                SaveOutcome::Failed
            }
        }
    }
}
