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

use serde::{Deserialize, Serialize};

pub const DEFAULT_PRINT_DEPTH: usize = 1;
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 50;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub eval: EvalConfig,
    pub search: SearchConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// How many levels of nested arrays, maps and objects a result is expanded to.
    pub print_depth: usize,
    /// Statements and calls a single turn may execute before it is aborted. Unlimited if unset.
    pub max_steps: Option<usize>,
    /// How deeply calls may nest.
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            print_depth: DEFAULT_PRINT_DEPTH,
            max_steps: None,
            max_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_SEARCH_RESULTS,
        }
    }
}
