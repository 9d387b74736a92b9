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

use std::sync::RwLock;

use indexmap::IndexMap;
use warren_common::model::PersistentObjectRecord;
use warren_var::Obj;

use crate::{Store, StoreError};

/// Records held in memory, for tests and for worlds that need not survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<IndexMap<Obj, PersistentObjectRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = PersistentObjectRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

impl Store for MemoryStore {
    fn find_by_id(&self, id: &str) -> Result<Option<PersistentObjectRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::CouldNotLoad(e.to_string()))?;
        Ok(records.get(id).cloned())
    }

    fn save(&self, record: &PersistentObjectRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::CouldNotSave(record.id.to_string(), e.to_string()))?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn all_records(&self) -> Result<Vec<PersistentObjectRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::CouldNotLoad(e.to_string()))?;
        Ok(records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_replaces_in_place() {
        let store = MemoryStore::new();
        store.save(&PersistentObjectRecord::new("root", "root")).unwrap();
        store.save(&PersistentObjectRecord::new("test", "test")).unwrap();
        store.save(&PersistentObjectRecord::new("root", "Root")).unwrap();

        let all = store.all_records().unwrap();
        let names: Vec<_> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Root", "test"]);
        assert_eq!(store.find_by_id("nope").unwrap(), None);
        assert_eq!(store.find_by_id("root").unwrap().unwrap().name, "Root");
    }
}
