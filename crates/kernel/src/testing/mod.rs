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

//! Testing utilities for the kernel crate: a seeded world with the default player connected.

use std::sync::{Arc, Mutex};

use warren_common::tasks::{BufferedSession, Exception};
use warren_compiler::rewrite_eval;
use warren_db::{MemoryStore, Store};
use warren_var::{Obj, Var};

use crate::bootstrap::{DEFAULT_PLAYER_ID, seed_records};
use crate::config::Config;
use crate::lock_world;
use crate::programmer::{ProgrammerController, highlight_errors};
use crate::world_state::WorldState;

pub type TestController = ProgrammerController<Arc<Mutex<WorldState>>, Arc<MemoryStore>>;

/// The seeded world, its session and the store it was loaded from.
pub struct TestWorld {
    pub world: Arc<Mutex<WorldState>>,
    pub session: Arc<BufferedSession>,
    pub store: Arc<MemoryStore>,
    pub config: Config,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        highlight_errors(true);
        let records = seed_records(DEFAULT_PLAYER_ID);
        let store = Arc::new(MemoryStore::with_records(records.clone()));
        let session = Arc::new(BufferedSession::new());
        session.connect(&Self::player());
        let world = WorldState::from_records(&records, session.clone(), config.eval.clone());
        Self {
            world: Arc::new(Mutex::new(world)),
            session,
            store,
            config,
        }
    }

    pub fn player() -> Obj {
        Obj::mk_id(DEFAULT_PLAYER_ID)
    }

    pub fn controller(&self) -> TestController {
        ProgrammerController::new(
            self.world.clone(),
            self.store.clone(),
            Self::player(),
            self.config.clone(),
        )
    }

    /// Run `code` as the default player and return the raw result.
    pub fn run(&self, code: &str) -> Result<Var, Exception> {
        let unit = rewrite_eval(code, DEFAULT_PLAYER_ID).unwrap();
        lock_world(&self.world).run(&unit)
    }

    /// Text sent to the default player since the last call.
    pub fn output(&self) -> Vec<String> {
        self.session.take_output(&Self::player())
    }

    /// Reload the live world from the store, as a restart would.
    pub fn reload(&self) {
        let records = self.store.all_records().unwrap();
        let world =
            WorldState::from_records(&records, self.session.clone(), self.config.eval.clone());
        *lock_world(&self.world) = world;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
