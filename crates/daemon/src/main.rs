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

use crate::args::Args;
use clap::Parser;
use eyre::{Report, bail, eyre};
use std::sync::Arc;
use tracing::{info, warn};
use warren_common::tasks::{BufferedSession, Session};
use warren_db::{Store, open_store};
use warren_kernel::bootstrap::seed_records;
use warren_kernel::{ProgrammerController, Scheduler, WorldState};
use warren_var::Obj;

mod args;
mod console;

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args: Args = Args::parse();

    warren_common::tracing::init_tracing(args.debug)
        .map_err(|e| eyre!("Unable to configure logging: {}", e))?;

    let config = args.load_config()?;
    warren_kernel::highlight_errors(true);

    if !Obj::is_valid_id(&args.player) {
        bail!("Invalid player id: {}", args.player);
    }
    let player = Obj::mk_id(&args.player);

    if let Some(path) = config.db.path.as_ref().filter(|_| !config.db.in_memory) {
        info!(?path, "Opening world database");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    } else {
        info!("Running with an in-memory world; nothing will be saved");
    }
    let (store, fresh) = open_store(&config.db)?;
    if fresh {
        info!(player = %player, "Fresh database; seeding the initial world");
        for record in seed_records(&args.player) {
            store.save(&record)?;
        }
        store.sync()?;
    }

    let records = store.all_records()?;
    if !records.iter().any(|r| r.id == player) {
        bail!("No such player: {player}");
    }
    info!(objects = records.len(), "Loaded world");

    let session = Arc::new(BufferedSession::new());
    session.connect(&player);
    let world = WorldState::from_records(
        &records,
        session.clone() as Arc<dyn Session>,
        config.kernel.eval.clone(),
    );

    let (scheduler, scheduler_client) = Scheduler::new(world);
    let scheduler_thread = scheduler.start()?;

    let controller = ProgrammerController::new(
        scheduler_client.clone(),
        store.clone(),
        player.clone(),
        config.kernel.clone(),
    );
    let result = console::console_loop(&controller, &session);

    info!("Shutting down scheduler");
    if let Err(e) = scheduler_client.shutdown() {
        warn!(error = %e, "Scheduler did not acknowledge shutdown");
    }
    if scheduler_thread.join().is_err() {
        warn!("Scheduler thread panicked");
    }
    store.sync()?;
    session.disconnect(&player);
    info!("Done.");
    result
}
