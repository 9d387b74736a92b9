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

//! The live world: every object, the deferred task queue, and the session text goes out on.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use ahash::{AHashMap, AHashSet};
use arcstr::ArcStr;
use indexmap::IndexMap;
use tracing::{debug, error, info_span, warn};
use warren_common::model::{Member, PersistentObjectRecord, WorldObject};
use warren_common::tasks::{Exception, ScriptError, Session, SessionError};
use warren_compiler::{EvalUnit, compile_expr};
use warren_var::program::Expr;
use warren_var::{Error, Obj, Var, Variant};

use crate::config::EvalConfig;
use crate::deferred::DeferredQueue;
use crate::print::{ObjectResolver, format_value};
use crate::tasks::panic_message;
use crate::vm::ExecState;

/// Members whose value is maintained by the world and cannot be assigned by scripts.
const READ_ONLY_MEMBERS: &[&str] = &["id", "traits", "location", "contents"];

pub struct WorldState {
    /// In registration order.
    objects: IndexMap<Obj, WorldObject>,
    deferred: DeferredQueue,
    session: Arc<dyn Session>,
    config: EvalConfig,
    /// Stored function and verb sources, compiled.
    compiled: AHashMap<ArcStr, Arc<Expr>>,
}

impl WorldState {
    pub fn new(session: Arc<dyn Session>, config: EvalConfig) -> Self {
        Self {
            objects: IndexMap::new(),
            deferred: DeferredQueue::new(),
            session,
            config,
            compiled: AHashMap::new(),
        }
    }

    /// Build the world from stored records, deriving every object's `contents` from the
    /// locations of the others.
    pub fn from_records(
        records: &[PersistentObjectRecord],
        session: Arc<dyn Session>,
        config: EvalConfig,
    ) -> Self {
        let mut world = Self::new(session, config);
        for record in records {
            world.objects.insert(record.id.clone(), WorldObject::from(record));
        }
        let located: Vec<_> = world
            .objects
            .values()
            .filter_map(|o| o.location.clone().map(|l| (o.id.clone(), l)))
            .collect();
        for (id, location) in located {
            match world.objects.get_mut(&location) {
                Some(container) => container.contents.push(id),
                None => warn!(?id, ?location, "Object located in a missing object"),
            }
        }
        debug!(objects = world.objects.len(), "Loaded world");
        world
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn get(&self, id: &Obj) -> Option<&WorldObject> {
        self.objects.get(id)
    }

    pub fn contains(&self, id: &Obj) -> bool {
        self.objects.contains_key(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.values()
    }

    pub fn players(&self) -> Vec<Obj> {
        self.objects
            .values()
            .filter(|o| o.is_player())
            .map(|o| o.id.clone())
            .collect()
    }

    /// Whether a session is attached to `id`.
    pub fn is_online(&self, id: &Obj) -> bool {
        self.session.is_connected(id).unwrap_or(false)
    }

    /// The first of `base1`, `base2`, ... not taken by an object.
    pub fn next_id(&self, base: &str) -> Obj {
        let mut n = 1usize;
        loop {
            let id = Obj::mk_id(&format!("{base}{n}"));
            if !self.contains(&id) {
                return id;
            }
            n += 1;
        }
    }

    /// Register a new object whose single trait is `parent`, with `props` assigned to it. If
    /// any assignment fails the object is not registered.
    pub fn create<'a>(
        &mut self,
        id: Obj,
        parent: &Obj,
        props: impl IntoIterator<Item = (&'a str, Var)>,
    ) -> Result<Obj, ScriptError> {
        if self.contains(&id) {
            return Err(
                Error::type_error(format!("Identifier '{id}' has already been declared")).into(),
            );
        }
        if !self.contains(parent) {
            return Err(
                Error::type_error(format!("Cannot create from missing object {parent}")).into(),
            );
        }
        let mut object = WorldObject::new(id.clone(), id.as_str());
        object.traits = vec![parent.clone()];
        debug!(?id, ?parent, "Created object");
        self.objects.insert(id.clone(), object);
        for (name, value) in props {
            if let Err(e) = self.set_property(&id, name, value) {
                self.objects.shift_remove(&id);
                return Err(e);
            }
        }
        Ok(id)
    }

    /// Remove an object, detaching it from its location and its contents from it. False if
    /// there was no such object.
    pub fn destroy(&mut self, id: &Obj) -> Result<bool, ScriptError> {
        let Some(object) = self.objects.get(id) else {
            return Ok(false);
        };
        if object.is_player() && self.is_online(id) {
            return Err(Error::domain(format!("{id} is a player and is online")).into());
        }
        let Some(object) = self.objects.shift_remove(id) else {
            return Ok(false);
        };
        if let Some(container) = object
            .location
            .as_ref()
            .and_then(|l| self.objects.get_mut(l))
        {
            container.contents.retain(|c| c != id);
        }
        for content in &object.contents {
            if let Some(o) = self.objects.get_mut(content) {
                o.location = None;
            }
        }
        debug!(?id, "Destroyed object");
        Ok(true)
    }

    /// Assign a member on an object. The structural fields are read-only; `name` and `aliases`
    /// must hold strings.
    pub fn set_property(&mut self, id: &Obj, name: &str, value: Var) -> Result<(), ScriptError> {
        let Some(object) = self.objects.get_mut(id) else {
            return Err(Error::type_error(format!(
                "Cannot set properties of destroyed object {id} (setting '{name}')"
            ))
            .into());
        };
        if READ_ONLY_MEMBERS.contains(&name) {
            return Err(Error::type_error(format!(
                "Cannot assign to read only property '{name}' of object '{id}'"
            ))
            .into());
        }
        match name {
            "name" => {
                let Some(s) = value.as_str() else {
                    return Err(Error::type_error("name must be a string").into());
                };
                object.name = s.to_string();
            }
            "aliases" => {
                let Variant::List(l) = value.variant() else {
                    return Err(Error::type_error("aliases must be an array of strings").into());
                };
                let aliases: Option<Vec<_>> =
                    l.iter().map(|a| a.as_str().map(str::to_string)).collect();
                let Some(aliases) = aliases else {
                    return Err(Error::type_error("aliases must be an array of strings").into());
                };
                object.aliases = aliases;
            }
            _ => object.set_member(name, Member::from_var(value)),
        }
        Ok(())
    }

    /// Look a member up on the object itself, then on its traits, depth first.
    pub fn find_member(&self, id: &Obj, name: &str) -> Option<Member> {
        let mut visited = AHashSet::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(object) = self.objects.get(&current) else {
                continue;
            };
            if let Some(member) = object.member(name) {
                return Some(member.clone());
            }
            stack.extend(object.traits.iter().rev().cloned());
        }
        None
    }

    pub fn send(&self, player: &Obj, text: &str) -> Result<(), SessionError> {
        self.session.send_text(player, text)
    }

    /// The expression a stored function or verb source compiles to.
    pub(crate) fn compile_source(&mut self, source: &ArcStr) -> Result<Arc<Expr>, ScriptError> {
        if let Some(expr) = self.compiled.get(source) {
            return Ok(expr.clone());
        }
        let expr = Arc::new(compile_expr(source).map_err(Error::from)?);
        self.compiled.insert(source.clone(), expr.clone());
        Ok(expr)
    }

    pub fn deferred(&self) -> &DeferredQueue {
        &self.deferred
    }

    pub fn deferred_mut(&mut self) -> &mut DeferredQueue {
        &mut self.deferred
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.deferred.next_due()
    }

    /// Execute an eval unit as one turn.
    pub fn run(&mut self, unit: &EvalUnit) -> Result<Var, Exception> {
        let program = unit
            .compile()
            .map_err(|e| Exception::new(Error::from(e).into(), &unit.label))?;
        let now = Instant::now();
        catch_unwind(AssertUnwindSafe(|| {
            ExecState::new(self, unit.player.clone(), &unit.label, now).run_program(&program)
        }))
        .unwrap_or_else(|panic| Err(aborted(&unit.label, panic)))
    }

    /// Run every deferred task due at `now`, each as its own turn. Failures are logged; there
    /// is nobody to report them to. Returns how many ran.
    pub fn run_due_tasks(&mut self, now: Instant) -> usize {
        let due = self.deferred.take_due(now);
        let count = due.len();
        for task in due {
            let span = info_span!("deferred", handle = %task.handle, player = %task.player);
            let _enter = span.enter();
            let label = format!("Deferred::{}", task.handle);
            let result = catch_unwind(AssertUnwindSafe(|| {
                ExecState::new(self, task.player.clone(), &label, now).run_callable(&task.callable)
            }))
            .unwrap_or_else(|panic| Err(aborted(&label, panic)));
            match result {
                Ok(_) => debug!("Deferred task completed"),
                Err(e) => warn!(
                    error = %e.error,
                    label = %e.label,
                    backtrace = ?e.backtrace,
                    "Deferred task failed"
                ),
            }
        }
        count
    }

    /// Render a value the way eval results are shown.
    pub fn format(&self, value: &Var, depth: usize) -> String {
        format_value(self, value, depth)
    }
}

/// A turn that panicked ends like one that raised, so the world stays usable.
fn aborted(label: &str, panic: Box<dyn Any + Send>) -> Exception {
    let message = panic_message(&*panic);
    error!(label, panic = %message, "Turn aborted by a panic");
    Exception::new(Error::domain(format!("Internal error: {message}")).into(), label)
}

impl ObjectResolver for WorldState {
    fn resolve(&self, id: &Obj) -> Option<&WorldObject> {
        self.objects.get(id)
    }
}
