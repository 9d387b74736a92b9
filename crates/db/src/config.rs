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

use fjall::PartitionCreateOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory of the on-disk store. Without one, records are kept in memory only.
    pub path: Option<PathBuf>,
    /// Keep records in memory even when a path is given.
    #[serde(default)]
    pub in_memory: bool,
    /// Partition options for the object records.
    pub objects: Option<TableConfig>,
}

#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct TableConfig {
    /// Various fjall partition creation options.
    /// Refer to the fjall documentation for more information.
    pub max_memtable_size: Option<u32>,
    pub block_size: Option<u32>,
}

impl TableConfig {
    pub fn partition_options(&self) -> PartitionCreateOptions {
        let mut opts = PartitionCreateOptions::default();
        if let Some(max_memtable_size) = self.max_memtable_size {
            opts = opts.max_memtable_size(max_memtable_size);
        }
        if let Some(block_size) = self.block_size {
            opts = opts.block_size(block_size);
        }
        opts
    }
}
