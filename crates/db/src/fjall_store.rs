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

use std::path::Path;
use std::sync::Mutex;

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use tracing::{debug, error};
use warren_common::model::PersistentObjectRecord;

use crate::{DatabaseConfig, Store, StoreError};

/// Records kept in a fjall keyspace, as JSON documents keyed by object id. A second partition
/// keys ids by a sequence number, so records come back in the order they were first saved.
pub struct FjallStore {
    keyspace: Keyspace,
    objects: PartitionHandle,
    sequence: PartitionHandle,
    next_seq: Mutex<u64>,
}

impl FjallStore {
    pub fn open(path: &Path, config: &DatabaseConfig) -> Result<(Self, bool), StoreError> {
        let keyspace = Config::new(path)
            .open()
            .map_err(|e| StoreError::CouldNotOpen(e.to_string()))?;
        let fresh = keyspace.partition_count() == 0;
        let object_options = config
            .objects
            .as_ref()
            .map(|t| t.partition_options())
            .unwrap_or_default();
        let objects = keyspace
            .open_partition("objects", object_options)
            .map_err(|e| StoreError::CouldNotOpen(e.to_string()))?;
        let sequence = keyspace
            .open_partition("sequence", PartitionCreateOptions::default())
            .map_err(|e| StoreError::CouldNotOpen(e.to_string()))?;
        let next_seq = match sequence
            .last_key_value()
            .map_err(|e| StoreError::CouldNotOpen(e.to_string()))?
        {
            Some((key, _)) => decode_seq(key.as_ref())? + 1,
            None => 0,
        };
        debug!(?path, fresh, next_seq, "Opened object store");
        Ok((
            Self {
                keyspace,
                objects,
                sequence,
                next_seq: Mutex::new(next_seq),
            },
            fresh,
        ))
    }

    fn decode(&self, id: &str, bytes: &[u8]) -> Result<PersistentObjectRecord, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| {
            error!(id, "Failed to decode object record: {:?}", e);
            StoreError::CorruptRecord(id.to_string(), e.to_string())
        })
    }
}

fn decode_seq(key: &[u8]) -> Result<u64, StoreError> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| StoreError::CouldNotLoad(format!("bad sequence key {key:?}")))?;
    Ok(u64::from_be_bytes(bytes))
}

impl Store for FjallStore {
    fn find_by_id(&self, id: &str) -> Result<Option<PersistentObjectRecord>, StoreError> {
        let Some(bytes) = self
            .objects
            .get(id.as_bytes())
            .map_err(|e| StoreError::CouldNotLoad(e.to_string()))?
        else {
            return Ok(None);
        };
        self.decode(id, bytes.as_ref()).map(Some)
    }

    fn save(&self, record: &PersistentObjectRecord) -> Result<(), StoreError> {
        let id = record.id.as_str();
        let bytes = serde_json::to_vec(record)
            .map_err(|e| StoreError::CouldNotSave(id.to_string(), e.to_string()))?;

        let mut next_seq = self
            .next_seq
            .lock()
            .map_err(|e| StoreError::CouldNotSave(id.to_string(), e.to_string()))?;
        let existing = self
            .objects
            .contains_key(id.as_bytes())
            .map_err(|e| StoreError::CouldNotSave(id.to_string(), e.to_string()))?;
        if !existing {
            self.sequence
                .insert(next_seq.to_be_bytes(), id.as_bytes())
                .map_err(|e| {
                    error!(id, "Failed to insert sequence entry: {:?}", e);
                    StoreError::CouldNotSave(id.to_string(), e.to_string())
                })?;
            *next_seq += 1;
        }
        self.objects.insert(id.as_bytes(), bytes).map_err(|e| {
            error!(id, "Failed to insert record: {:?}", e);
            StoreError::CouldNotSave(id.to_string(), e.to_string())
        })?;
        Ok(())
    }

    fn all_records(&self) -> Result<Vec<PersistentObjectRecord>, StoreError> {
        let mut records = vec![];
        for entry in self.sequence.iter() {
            let (_, id) = entry.map_err(|e| StoreError::CouldNotLoad(e.to_string()))?;
            let id = String::from_utf8_lossy(id.as_ref()).to_string();
            match self.find_by_id(&id)? {
                Some(record) => records.push(record),
                None => error!(id, "Sequence entry for missing record"),
            }
        }
        Ok(records)
    }

    fn sync(&self) -> Result<(), StoreError> {
        self.keyspace.persist(PersistMode::SyncAll).map_err(|e| {
            error!("Failed to persist object store: {:?}", e);
            StoreError::CouldNotSave("*".to_string(), e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use warren_common::model::StoredProperty;

    // Verify creation of an empty store, and that records and their order survive reopening.
    #[test]
    fn open_reopen() {
        let tmpdir = tempfile::tempdir().expect("Unable to create temporary directory");
        let path = tmpdir.path();
        let config = DatabaseConfig::default();
        {
            let (store, fresh) = FjallStore::open(path, &config).unwrap();
            assert!(fresh);
            assert!(store.all_records().unwrap().is_empty());

            let mut zeta = PersistentObjectRecord::new("zeta", "zeta");
            zeta.properties.insert(
                "greet".to_string(),
                StoredProperty::Function {
                    function: "() => 'hi'".to_string(),
                },
            );
            store.save(&zeta).unwrap();
            store.save(&PersistentObjectRecord::new("alpha", "alpha")).unwrap();
            zeta.properties.insert(
                "count".to_string(),
                StoredProperty::Value { value: json!(3) },
            );
            store.save(&zeta).unwrap();
            store.sync().unwrap();
        }
        {
            let (store, fresh) = FjallStore::open(path, &config).unwrap();
            assert!(!fresh);
            let ids: Vec<_> = store
                .all_records()
                .unwrap()
                .into_iter()
                .map(|r| r.id.to_string())
                .collect();
            assert_eq!(ids, vec!["zeta", "alpha"]);
            let zeta = store.find_by_id("zeta").unwrap().unwrap();
            assert_eq!(zeta.properties.len(), 2);
            assert_eq!(store.find_by_id("missing").unwrap(), None);

            // New ids continue the sequence after a reopen.
            store.save(&PersistentObjectRecord::new("beta", "beta")).unwrap();
            let ids: Vec<_> = store
                .all_records()
                .unwrap()
                .into_iter()
                .map(|r| r.id.to_string())
                .collect();
            assert_eq!(ids, vec!["zeta", "alpha", "beta"]);
        }
    }
}
