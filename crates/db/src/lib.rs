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

//! Where world objects live between runs. The live world is loaded from a `Store` at startup;
//! afterwards only edits to verbs and functions are written back.

use std::sync::Arc;

use thiserror::Error;
use warren_common::model::PersistentObjectRecord;

pub use config::{DatabaseConfig, TableConfig};
pub use fjall_store::FjallStore;
pub use memory_store::MemoryStore;

mod config;
mod fjall_store;
mod memory_store;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("Could not open store: {0}")]
    CouldNotOpen(String),
    #[error("Could not load records: {0}")]
    CouldNotLoad(String),
    #[error("Could not save record {0}: {1}")]
    CouldNotSave(String, String),
    #[error("Corrupt record {0}: {1}")]
    CorruptRecord(String, String),
}

pub trait Store: Send + Sync {
    fn find_by_id(&self, id: &str) -> Result<Option<PersistentObjectRecord>, StoreError>;

    /// Create or replace the record with the record's id. Records keep the position they were
    /// first saved at.
    fn save(&self, record: &PersistentObjectRecord) -> Result<(), StoreError>;

    /// Every record, in the order they were first saved.
    fn all_records(&self) -> Result<Vec<PersistentObjectRecord>, StoreError>;

    /// Make everything saved so far durable.
    fn sync(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn find_by_id(&self, id: &str) -> Result<Option<PersistentObjectRecord>, StoreError> {
        (**self).find_by_id(id)
    }

    fn save(&self, record: &PersistentObjectRecord) -> Result<(), StoreError> {
        (**self).save(record)
    }

    fn all_records(&self) -> Result<Vec<PersistentObjectRecord>, StoreError> {
        (**self).all_records()
    }

    fn sync(&self) -> Result<(), StoreError> {
        (**self).sync()
    }
}

/// Open the store the configuration describes. Returns the store and whether it was freshly
/// created (and so needs seeding).
pub fn open_store(config: &DatabaseConfig) -> Result<(Arc<dyn Store>, bool), StoreError> {
    match &config.path {
        Some(path) if !config.in_memory => {
            let (store, fresh) = FjallStore::open(path, config)?;
            Ok((Arc::new(store), fresh))
        }
        _ => Ok((Arc::new(MemoryStore::new()), true)),
    }
}
